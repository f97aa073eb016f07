use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::Utc;
use quotegate_market_data::{MarketDataError, Quote, QuoteProvider};
use quotegate_server::{api::app_router, build_state_with_provider, config::Config};
use rust_decimal_macros::dec;
use tower::ServiceExt;

#[derive(Default)]
struct StubProvider {
    calls: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl QuoteProvider for StubProvider {
    fn id(&self) -> &'static str {
        "STUB"
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if self.fail {
            return Err(MarketDataError::RateLimited {
                provider: "STUB".to_string(),
            });
        }
        Ok(Quote::new(
            symbol.to_string(),
            dec!(250.00),
            Utc::now(),
            "STUB".to_string(),
        ))
    }
}

async fn build_test_router(provider: Arc<StubProvider>) -> axum::Router {
    let config = Config::from_lookup(|_| None);
    let state = build_state_with_provider(&config, provider).await.unwrap();
    app_router(state, &config)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn healthz_reports_stats() {
    let app = build_test_router(Arc::new(StubProvider::default())).await;

    let (status, body) = get_json(&app, "/api/v1/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stats"]["queueLength"], 0);
    assert_eq!(body["stats"]["cacheSize"], 0);
    assert_eq!(body["stats"]["callsInWindow"], 0);
    assert_eq!(body["stats"]["inFlight"], 0);
}

#[tokio::test]
async fn quote_is_fetched_then_served_fresh() {
    let provider = Arc::new(StubProvider::default());
    let app = build_test_router(provider.clone()).await;

    let (status, body) = get_json(&app, "/api/v1/quote/aapl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "live");
    assert_eq!(body["quote"]["symbol"], "AAPL");
    assert_eq!(body["quote"]["price"], 250.0);
    assert_eq!(body["quote"]["synthetic"], false);

    let (status, body) = get_json(&app, "/api/v1/quote/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "fresh");
    assert_eq!(provider.calls.lock().unwrap().len(), 1);

    let (_, health) = get_json(&app, "/api/v1/healthz").await;
    assert_eq!(health["stats"]["cacheSize"], 1);
}

#[tokio::test]
async fn upstream_failure_serves_synthetic() {
    let provider = Arc::new(StubProvider {
        fail: true,
        ..Default::default()
    });
    let app = build_test_router(provider).await;

    let (status, body) = get_json(&app, "/api/v1/quote/MSFT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "synthetic");
    assert_eq!(body["quote"]["price"], serde_json::Value::Null);
    assert_eq!(body["quote"]["source"], "SYNTHETIC");
    assert_eq!(body["ageSecs"], serde_json::Value::Null);
}

#[tokio::test]
async fn invalid_symbol_is_bad_request() {
    let provider = Arc::new(StubProvider::default());
    let app = build_test_router(provider.clone()).await;

    let (status, body) = get_json(&app, "/api/v1/quote/NOT%20A%20SYMBOL").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().unwrap().contains("Invalid input"));
    assert!(provider.calls.lock().unwrap().is_empty());
}
