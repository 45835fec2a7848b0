use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::engine::RankParams;
use crate::error::AppError;
use crate::gateway::SnapshotSource;
use crate::service::QueryService;
use crate::types::{OpportunityReport, SponsorSummary, SponsoredSnapshot};

pub struct ApiState<S> {
    pub service: Arc<QueryService<S>>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            health: Arc::clone(&self.health),
            latency: Arc::clone(&self.latency),
        }
    }
}

pub fn router<S: SnapshotSource + 'static>(state: ApiState<S>) -> Router {
    Router::new()
        .route("/rewards", get(get_rewards::<S>))
        .route("/opportunities", get(get_opportunities::<S>))
        .route("/sponsors", get(get_sponsors::<S>))
        .route("/health", get(get_health::<S>))
        .route("/stats/latency", get(get_stats_latency::<S>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RewardsQuery {
    /// `true`/`false` or `1`/`0`, the form upstream uses.
    pub force: Option<String>,
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(AppError::InvalidParams(format!(
            "force must be true, false, 1 or 0, got {other:?}"
        ))),
    }
}

#[derive(Deserialize)]
pub struct OpportunitiesQuery {
    pub min_rate_per_day: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct SponsorsQuery {
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub upstream_ok: bool,
    pub last_status: u16,
    pub last_success_at_ms: u64,
    pub fetch_count: u64,
    pub failure_count: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_rewards<S: SnapshotSource + 'static>(
    State(state): State<ApiState<S>>,
    Query(params): Query<RewardsQuery>,
) -> Result<Json<SponsoredSnapshot>, AppError> {
    let force = params.force.as_deref().map(parse_flag).transpose()?.unwrap_or(false);
    let snapshot = state.service.get_sponsored_rewards(force).await?;
    Ok(Json(snapshot))
}

async fn get_opportunities<S: SnapshotSource + 'static>(
    State(state): State<ApiState<S>>,
    Query(params): Query<OpportunitiesQuery>,
) -> Result<Json<OpportunityReport>, AppError> {
    let defaults = RankParams::default();
    let report = state
        .service
        .get_active_opportunities(RankParams {
            min_rate_per_day: params.min_rate_per_day.unwrap_or(defaults.min_rate_per_day),
            limit: params.limit.unwrap_or(defaults.limit),
        })
        .await?;
    Ok(Json(report))
}

async fn get_sponsors<S: SnapshotSource + 'static>(
    State(state): State<ApiState<S>>,
    Query(params): Query<SponsorsQuery>,
) -> Result<Json<Vec<SponsorSummary>>, AppError> {
    let ranked = state.service.get_top_sponsors(params.limit).await?;
    Ok(Json(ranked))
}

async fn get_health<S: SnapshotSource + 'static>(
    State(state): State<ApiState<S>>,
) -> Json<HealthResponse> {
    let h = &state.health;
    Json(HealthResponse {
        upstream_ok: h.upstream_ok(),
        last_status: h.last_status(),
        last_success_at_ms: h.last_success_at_ms(),
        fetch_count: h.fetch_count(),
        failure_count: h.failure_count(),
    })
}

async fn get_stats_latency<S: SnapshotSource + 'static>(
    State(state): State<ApiState<S>>,
) -> Json<LatencyResponse> {
    let (p50, p95, p99) = state.latency.percentiles();
    let to_ms = |us: Option<u64>| us.map(|v| v as f64 / 1000.0);
    Json(LatencyResponse {
        p50_ms: to_ms(p50),
        p95_ms: to_ms(p95),
        p99_ms: to_ms(p99),
        sample_count: state.latency.len(),
    })
}
