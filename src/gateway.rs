use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::SponsoredSnapshot;

/// Supplies snapshots to the query service.
///
/// `force` asks the source to skip whatever staleness tolerance it has; the
/// flag is forwarded unmodified.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self, force: bool) -> impl Future<Output = Result<SponsoredSnapshot>> + Send;
}

/// Fetches snapshots from the sponsored-rewards HTTP endpoint.
pub struct HttpGateway {
    client: reqwest::Client,
    url: String,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
}

impl HttpGateway {
    pub fn new(
        cfg: &Config,
        health: Arc<HealthState>,
        latency: Arc<LatencyStats>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: cfg.rewards_api_url.clone(),
            health,
            latency,
        })
    }

    /// Request URL for the given freshness flag.
    pub fn snapshot_url(&self, force: bool) -> String {
        if force {
            format!("{}?force=1", self.url)
        } else {
            self.url.clone()
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<SponsoredSnapshot> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                // No response at all; don't leave an older status standing.
                self.health.set_last_status(0);
                return Err(e.into());
            }
        };
        let status = resp.status();
        self.health.set_last_status(status.as_u16());

        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body)
            .and_then(SponsoredSnapshot::from_upstream)
            .map_err(|e| AppError::MalformedSnapshot(e.to_string()))
    }
}

impl SnapshotSource for HttpGateway {
    async fn fetch(&self, force: bool) -> Result<SponsoredSnapshot> {
        let url = self.snapshot_url(force);
        debug!(url = %url, force, "[GATEWAY] fetching snapshot");

        let started = Instant::now();
        let result = self.fetch_once(&url).await;
        let elapsed = started.elapsed();
        self.latency.record(elapsed);

        match &result {
            Ok(snapshot) => {
                self.health.record_success();
                info!(
                    events = snapshot.events.len(),
                    from_block = snapshot.from_block,
                    to_block = snapshot.to_block,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "[GATEWAY] snapshot fetched ({} events, blocks {}→{})",
                    snapshot.events.len(),
                    snapshot.from_block,
                    snapshot.to_block,
                );
            }
            Err(e) => {
                self.health.record_failure();
                warn!(url = %url, "[GATEWAY] snapshot fetch failed: {e}");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{extract::Query, http::StatusCode, routing::get, Router};
    use serde::Deserialize;

    use super::*;
    use crate::config::Transport;
    use crate::types::fixtures::{event, snapshot};

    #[derive(Deserialize)]
    struct ForceQuery {
        force: Option<String>,
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/sponsored")
    }

    fn gateway(url: String) -> (HttpGateway, Arc<HealthState>) {
        let cfg = Config {
            rewards_api_url: url,
            transport: Transport::Http,
            log_level: "info".to_string(),
            api_port: 0,
            http_timeout_secs: 5,
        };
        let health = Arc::new(HealthState::new());
        let gw = HttpGateway::new(&cfg, health.clone(), Arc::new(LatencyStats::new())).unwrap();
        (gw, health)
    }

    #[test]
    fn force_flag_adds_query_param() {
        let (gw, _) = gateway("https://example.test/api/sponsored".to_string());
        assert_eq!(gw.snapshot_url(false), "https://example.test/api/sponsored");
        assert_eq!(gw.snapshot_url(true), "https://example.test/api/sponsored?force=1");
    }

    #[tokio::test]
    async fn fetches_and_decodes_snapshot() {
        let body = serde_json::to_string(&snapshot(vec![event("m1", "0xabc", 3.0)])).unwrap();
        let app = Router::new().route(
            "/api/sponsored",
            get(move |Query(q): Query<ForceQuery>| {
                let body = body.clone();
                async move {
                    assert!(q.force.is_none());
                    body
                }
            }),
        );
        let (gw, health) = gateway(serve(app).await);

        let snap = gw.fetch(false).await.unwrap();
        assert_eq!(snap.events.len(), 1);
        assert_eq!(snap.events[0].market_id, "m1");
        assert_eq!(health.fetch_count(), 1);
        assert_eq!(health.failure_count(), 0);
        assert_eq!(health.last_status(), 200);
    }

    #[tokio::test]
    async fn force_reaches_upstream() {
        let body = serde_json::to_string(&snapshot(vec![])).unwrap();
        let app = Router::new().route(
            "/api/sponsored",
            get(move |Query(q): Query<ForceQuery>| {
                let body = body.clone();
                async move {
                    if q.force.as_deref() == Some("1") {
                        Ok(body)
                    } else {
                        Err(StatusCode::BAD_REQUEST)
                    }
                }
            }),
        );
        let (gw, _) = gateway(serve(app).await);
        assert!(gw.fetch(true).await.is_ok());
        assert!(gw.fetch(false).await.is_err());
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let app = Router::new().route(
            "/api/sponsored",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let (gw, health) = gateway(serve(app).await);

        let err = gw.fetch(false).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: 503 }), "got {err:?}");
        assert_eq!(health.failure_count(), 1);
        assert_eq!(health.last_status(), 503);
    }

    #[tokio::test]
    async fn undecodable_200_after_success_is_unhealthy() {
        let good = serde_json::to_string(&snapshot(vec![event("m1", "0xabc", 3.0)])).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new().route(
            "/api/sponsored",
            get(move || {
                let body = if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    good.clone()
                } else {
                    r#"{"events":1}"#.to_string()
                };
                async move { body }
            }),
        );
        let (gw, health) = gateway(serve(app).await);

        gw.fetch(false).await.unwrap();
        assert!(health.upstream_ok());

        let err = gw.fetch(false).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedSnapshot(_)), "got {err:?}");
        assert_eq!(health.last_status(), 200);
        assert!(!health.upstream_ok());
    }

    #[tokio::test]
    async fn decoded_snapshot_keeps_upstream_document() {
        let mut doc = serde_json::to_value(snapshot(vec![event("m1", "0xabc", 3.0)])).unwrap();
        doc["fetchedAt"] = "2025-06-01T12:00:00Z".into();
        doc["cacheAgeMs"] = 7.into();
        let body = doc.to_string();
        let app = Router::new().route("/api/sponsored", get(move || async move { body }));
        let (gw, _) = gateway(serve(app).await);

        let snap = gw.fetch(false).await.unwrap();
        assert_eq!(snap.raw["cacheAgeMs"], 7);
        assert_eq!(snap.fetched_at_text(), "2025-06-01T12:00:00Z");
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let app = Router::new().route(
            "/api/sponsored",
            get(|| async { r#"{"events":[{"marketId":"m1"}]}"# }),
        );
        let (gw, _) = gateway(serve(app).await);

        let err = gw.fetch(false).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedSnapshot(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (gw, health) = gateway(format!("http://{addr}/api/sponsored"));
        health.set_last_status(200);
        health.record_success();

        let err = gw.fetch(false).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)), "got {err:?}");
        assert!(err.is_upstream());
        assert_eq!(health.last_status(), 0);
        assert!(!health.upstream_ok());
        assert_eq!(health.failure_count(), 1);
    }
}
