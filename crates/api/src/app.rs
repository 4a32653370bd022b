use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use fx_core::domain::summary::{Breakdown, SummaryResponse};
use fx_core::pipeline::RatePipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RatePipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/summary", get(get_summary))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Debug, Deserialize)]
struct SummaryParams {
    start_date: String,
    end_date: String,
    #[serde(default)]
    breakdown: Breakdown,
}

async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let start_date = parse_date("start_date", &params.start_date)?;
    let end_date = parse_date("end_date", &params.end_date)?;
    if start_date > end_date {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("start_date {start_date} is after end_date {end_date}"),
        ));
    }

    let summary = state
        .pipeline
        .summary(start_date, end_date, params.breakdown)
        .await;
    Ok(Json(summary))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, (StatusCode, String)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("{field} must be a YYYY-MM-DD date (got {value:?})"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use fx_core::cache::TtlCache;
    use fx_core::ingest::fallback::FallbackLoader;
    use fx_core::ingest::provider::RateProvider;
    use fx_core::retry::RetryPolicy;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticProvider {
        calls: AtomicU32,
        response: Option<Value>,
    }

    #[async_trait::async_trait]
    impl RateProvider for StaticProvider {
        fn provider_name(&self) -> &'static str {
            "static"
        }

        async fn fetch_rates(&self, _start: NaiveDate, _end: NaiveDate) -> anyhow::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .ok_or_else(|| anyhow::anyhow!("upstream down"))
        }
    }

    fn app_with(response: Option<Value>) -> (Router, Arc<StaticProvider>) {
        let provider = Arc::new(StaticProvider {
            calls: AtomicU32::new(0),
            response,
        });
        let pipeline = RatePipeline::new(
            Arc::new(TtlCache::new(Duration::from_secs(300))),
            provider.clone(),
            FallbackLoader::new("/nonexistent/fx-fallback.json"),
            RetryPolicy {
                max_attempts: 3,
                delay: Duration::from_millis(1),
                attempt_timeout: Duration::from_secs(5),
            },
            "USD",
        );
        let app = router(AppState {
            pipeline: Arc::new(pipeline),
        });
        (app, provider)
    }

    fn sample() -> Value {
        json!({
            "rates": {
                "2024-01-01": {"USD": 1.10},
                "2024-01-02": {"USD": 1.00},
                "2024-01-03": {"USD": 1.21}
            }
        })
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let res = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app_with(None);
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn summary_defaults_to_no_breakdown() {
        let (app, _) = app_with(Some(sample()));
        let (status, body) = get(
            &app,
            "/summary?start_date=2024-01-01&end_date=2024-01-03",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            v,
            json!({
                "start_rate": 1.10,
                "end_rate": 1.21,
                "total_pct_change": 10.0,
                "mean_rate": 1.1033
            })
        );
    }

    #[tokio::test]
    async fn summary_with_day_breakdown() {
        let (app, _) = app_with(Some(sample()));
        let (status, body) = get(
            &app,
            "/summary?start_date=2024-01-01&end_date=2024-01-03&breakdown=day",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            v["daily_breakdown"],
            json!([
                {"date": "2024-01-01", "rate": 1.10, "pct_change": 0.0},
                {"date": "2024-01-02", "rate": 1.00, "pct_change": -9.0909},
                {"date": "2024-01-03", "rate": 1.21, "pct_change": 21.0}
            ])
        );
    }

    #[tokio::test]
    async fn repeated_summary_hits_provider_once() {
        let (app, provider) = app_with(Some(sample()));
        let uri = "/summary?start_date=2024-01-01&end_date=2024-01-03";
        let first = get(&app, uri).await;
        let second = get(&app, uri).await;
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upstream_outage_is_a_200_with_error_body() {
        let (app, provider) = app_with(None);
        let (status, body) = get(
            &app,
            "/summary?start_date=2024-01-01&end_date=2024-01-03",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, json!({"error": "No data available"}));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejects_unknown_breakdown_before_fetching() {
        let (app, provider) = app_with(Some(sample()));
        let (status, _) = get(
            &app,
            "/summary?start_date=2024-01-01&end_date=2024-01-03&breakdown=week",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_missing_and_malformed_dates() {
        let (app, provider) = app_with(Some(sample()));
        for uri in [
            "/summary?end_date=2024-01-03",
            "/summary?start_date=2024-13-01&end_date=2024-01-03",
            "/summary?start_date=01/01/2024&end_date=2024-01-03",
            "/summary?start_date=2024-01-05&end_date=2024-01-03",
        ] {
            let (status, _) = get(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
