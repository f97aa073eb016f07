use std::{net::SocketAddr, str::FromStr, time::Duration};

use quotegate_core::GatewayConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub alpha_vantage_api_key: String,
    pub warmup_symbols: Vec<String>,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or unparsable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str, default: u64| -> u64 { parse_or(&lookup, key, default) };
        let defaults = GatewayConfig::default();

        let listen_addr = parse_or(
            &lookup,
            "QG_LISTEN_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        );
        let cors_allow = split_list(lookup("QG_CORS_ALLOW_ORIGINS").unwrap_or_else(|| "*".into()));
        let warmup_symbols = split_list(lookup("QG_WARMUP_SYMBOLS").unwrap_or_default());
        let alpha_vantage_api_key =
            lookup("QG_ALPHA_VANTAGE_API_KEY").unwrap_or_else(|| "demo".into());

        let gateway = GatewayConfig {
            max_calls_per_window: parse_or(
                &lookup,
                "QG_RATE_LIMIT_MAX_CALLS",
                defaults.max_calls_per_window,
            ),
            rate_window: Duration::from_secs(parse(
                "QG_RATE_LIMIT_WINDOW_SECS",
                defaults.rate_window.as_secs(),
            )),
            request_interval: Duration::from_millis(parse(
                "QG_REQUEST_INTERVAL_MS",
                defaults.request_interval.as_millis() as u64,
            )),
            upstream_timeout: Duration::from_millis(parse(
                "QG_UPSTREAM_TIMEOUT_MS",
                defaults.upstream_timeout.as_millis() as u64,
            )),
            caller_timeout: Duration::from_millis(parse(
                "QG_CALLER_TIMEOUT_MS",
                defaults.caller_timeout.as_millis() as u64,
            )),
            max_queue_size: parse_or(&lookup, "QG_MAX_QUEUE_SIZE", defaults.max_queue_size),
            fresh_ttl: Duration::from_secs(parse(
                "QG_FRESH_TTL_SECS",
                defaults.fresh_ttl.as_secs(),
            )),
            stale_ttl: Duration::from_secs(parse(
                "QG_STALE_TTL_SECS",
                defaults.stale_ttl.as_secs(),
            )),
        };

        Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(parse("QG_REQUEST_TIMEOUT_MS", 60000)),
            alpha_vantage_api_key,
            warmup_symbols,
            gateway,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

fn split_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.cors_allow, vec!["*"]);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.alpha_vantage_api_key, "demo");
        assert!(config.warmup_symbols.is_empty());
        assert_eq!(config.gateway, GatewayConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("QG_LISTEN_ADDR", "127.0.0.1:9000"),
            ("QG_RATE_LIMIT_MAX_CALLS", "25"),
            ("QG_REQUEST_INTERVAL_MS", "2400"),
            ("QG_MAX_QUEUE_SIZE", "10"),
            ("QG_WARMUP_SYMBOLS", "AAPL, MSFT,,GOOGL "),
            ("QG_CORS_ALLOW_ORIGINS", "https://a.example,https://b.example"),
        ]);
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.gateway.max_calls_per_window, 25);
        assert_eq!(config.gateway.request_interval, Duration::from_millis(2400));
        assert_eq!(config.gateway.max_queue_size, 10);
        assert_eq!(config.warmup_symbols, vec!["AAPL", "MSFT", "GOOGL"]);
        assert_eq!(config.cors_allow.len(), 2);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("QG_FRESH_TTL_SECS", "five minutes"),
            ("QG_MAX_QUEUE_SIZE", "-3"),
            ("QG_LISTEN_ADDR", "nowhere"),
        ]);
        assert_eq!(config.gateway.fresh_ttl, GatewayConfig::default().fresh_ttl);
        assert_eq!(config.gateway.max_queue_size, 50);
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }
}
