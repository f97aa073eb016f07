use std::sync::Arc;

use crate::config::Config;
use quotegate_core::{QuoteService, QuoteServiceTrait};
use quotegate_market_data::{AlphaVantageProvider, QuoteProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub quote_service: Arc<dyn QuoteServiceTrait>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = Arc::new(AlphaVantageProvider::new(
        config.alpha_vantage_api_key.clone(),
    ));
    build_state_with_provider(config, provider).await
}

/// Wire the quote service over any provider and kick off warm-up.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn QuoteProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let quote_service = Arc::new(QuoteService::new(provider, &config.gateway)?);

    if !config.warmup_symbols.is_empty() {
        let started = quote_service.warm_up(&config.warmup_symbols).await;
        tracing::info!("Warm-up queued {} symbols", started);
    }

    Ok(Arc::new(AppState { quote_service }))
}
