use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_OPPORTUNITY_LIMIT, MS_PER_DAY};
use crate::engine::is_active;
use crate::types::{Opportunity, OpportunityReport, SponsoredEvent, SponsoredSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    /// Inclusive lower bound on `rate_per_day_usdc`. Negative values are used as-is.
    pub min_rate_per_day: f64,
    pub limit: usize,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            min_rate_per_day: 0.0,
            limit: DEFAULT_OPPORTUNITY_LIMIT,
        }
    }
}

/// Rank the active events of `snapshot` by daily reward rate.
///
/// Filters to active events at or above `min_rate_per_day`, sorts by rate
/// descending (stable, so equal rates keep upstream order), then keeps the
/// first `limit`. `total_daily_rate` is summed after truncation and so covers
/// the returned items only.
pub fn rank(snapshot: &SponsoredSnapshot, now: DateTime<Utc>, params: RankParams) -> OpportunityReport {
    let mut active: Vec<&SponsoredEvent> = snapshot
        .events
        .iter()
        .filter(|e| is_active(e, now) && e.rate_per_day_usdc >= params.min_rate_per_day)
        .collect();

    active.sort_by(|a, b| b.rate_per_day_usdc.total_cmp(&a.rate_per_day_usdc));
    active.truncate(params.limit);

    let opportunities: Vec<Opportunity> = active
        .into_iter()
        .map(|e| Opportunity {
            days_remaining: days_remaining(e.end_time, now),
            event_url: e.event_url(),
            tx_url: e.tx_url(),
            event: e.clone(),
        })
        .collect();

    let total_daily_rate = opportunities
        .iter()
        .map(|o| o.event.rate_per_day_usdc)
        .sum();

    OpportunityReport {
        count: opportunities.len(),
        total_daily_rate,
        min_rate_per_day: params.min_rate_per_day,
        limit: params.limit,
        opportunities,
    }
}

/// Days left until `end`, rounded up.
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (end - now).num_milliseconds() as f64;
    (ms / MS_PER_DAY).ceil() as i64
}
