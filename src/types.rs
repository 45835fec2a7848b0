use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{POLYGONSCAN_TX_URL, POLYMARKET_EVENT_URL};

// ---------------------------------------------------------------------------
// Upstream snapshot
// ---------------------------------------------------------------------------

/// One sponsorship deposit tied to one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredEvent {
    pub market_id: String,
    /// Address-like identity. Compared case-insensitively when grouping.
    pub sponsor: String,
    pub amount_usdc: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_days: f64,
    pub rate_per_day_usdc: f64,
    pub tx_hash: String,
    pub block_number: u64,
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub market_question: Option<String>,
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub market_slug: Option<String>,
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub event_slug: Option<String>,
    /// Sponsor pulled the unconsumed balance back.
    pub withdrawn: bool,
    /// Refunded to the sponsor.
    pub returned_usdc: f64,
    /// Paid out to liquidity providers.
    pub consumed_usdc: f64,
}

impl SponsoredEvent {
    /// Deposit minus refund.
    pub fn net_usdc(&self) -> f64 {
        self.amount_usdc - self.returned_usdc
    }

    pub fn event_url(&self) -> Option<String> {
        self.event_slug
            .as_deref()
            .map(|slug| format!("{POLYMARKET_EVENT_URL}/{slug}"))
    }

    pub fn tx_url(&self) -> String {
        format!("{POLYGONSCAN_TX_URL}/{}", self.tx_hash)
    }
}

/// Totals computed upstream. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_events: u64,
    pub unique_sponsors: u64,
    pub unique_markets: u64,
    pub total_amount_usdc: f64,
    pub net_amount_usdc: f64,
    pub total_returned_usdc: f64,
    pub total_consumed_usdc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredSnapshot {
    /// Upstream order; not assumed sorted.
    pub events: Vec<SponsoredEvent>,
    pub overall: OverallStats,
    pub fetched_at: DateTime<Utc>,
    pub from_block: u64,
    pub to_block: u64,
    /// Upstream body exactly as decoded, kept for pass-through output.
    /// `Null` when the snapshot was built locally.
    #[serde(skip)]
    pub raw: Value,
}

impl SponsoredSnapshot {
    /// Decode an upstream body, keeping the untyped document alongside.
    pub fn from_upstream(raw: Value) -> serde_json::Result<Self> {
        let mut snapshot = Self::deserialize(&raw)?;
        snapshot.raw = raw;
        Ok(snapshot)
    }

    /// `fetchedAt` as upstream wrote it, falling back to RFC 3339 millis.
    pub fn fetched_at_text(&self) -> String {
        match self.raw.get("fetchedAt").and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => self.fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Pretty JSON of the upstream document, or of the typed snapshot when
    /// there is none.
    pub fn pass_through_json(&self) -> serde_json::Result<String> {
        if self.raw.is_null() {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string_pretty(&self.raw)
        }
    }
}

/// Absent, `null` and whitespace-only strings all map to `None`.
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// An active event as returned by the opportunity ranker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    #[serde(flatten)]
    pub event: SponsoredEvent,
    /// Whole days until `end_time`, rounded up.
    pub days_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_url: Option<String>,
    pub tx_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityReport {
    pub count: usize,
    /// Sum of `rate_per_day_usdc` over `opportunities` only.
    pub total_daily_rate: f64,
    pub min_rate_per_day: f64,
    pub limit: usize,
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorSummary {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Lowercased sponsor address.
    pub address: String,
    pub net_usdc: f64,
    pub market_count: usize,
}
