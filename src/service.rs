use chrono::Utc;
use tracing::info;

use crate::config::DEFAULT_SPONSOR_LIMIT;
use crate::engine::{rank, top_sponsors, RankParams};
use crate::error::Result;
use crate::gateway::SnapshotSource;
use crate::types::{OpportunityReport, SponsorSummary, SponsoredSnapshot};

/// The three read-only queries. Each call fetches exactly one snapshot and
/// computes its answer from scratch.
pub struct QueryService<S> {
    source: S,
}

impl<S: SnapshotSource> QueryService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Full snapshot, as delivered upstream.
    pub async fn get_sponsored_rewards(&self, force: bool) -> Result<SponsoredSnapshot> {
        let snapshot = self.source.fetch(force).await?;
        info!(
            force,
            events = snapshot.events.len(),
            "[QUERY] get_sponsored_rewards"
        );
        Ok(snapshot)
    }

    pub async fn get_active_opportunities(&self, params: RankParams) -> Result<OpportunityReport> {
        let snapshot = self.source.fetch(false).await?;
        let report = rank(&snapshot, Utc::now(), params);
        info!(
            min_rate_per_day = params.min_rate_per_day,
            limit = params.limit,
            returned = report.count,
            total_daily_rate = report.total_daily_rate,
            "[QUERY] get_active_opportunities"
        );
        Ok(report)
    }

    pub async fn get_top_sponsors(&self, limit: Option<usize>) -> Result<Vec<SponsorSummary>> {
        let limit = limit.unwrap_or(DEFAULT_SPONSOR_LIMIT);
        let snapshot = self.source.fetch(false).await?;
        let ranked = top_sponsors(&snapshot, limit);
        info!(limit, returned = ranked.len(), "[QUERY] get_top_sponsors");
        Ok(ranked)
    }
}
