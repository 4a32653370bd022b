pub mod aggregate;
pub mod cache;
pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod retry;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::str::FromStr;
    use std::time::Duration;

    const DEFAULT_API_URL: &str = "https://api.frankfurter.app";
    const DEFAULT_FALLBACK_FILE: &str = "data/sample_fx.json";
    const DEFAULT_CACHE_TTL_SECS: u64 = 300;
    const DEFAULT_RETRIES: u32 = 3;
    const DEFAULT_RETRY_DELAY_SECS: u64 = 1;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_BASE_CURRENCY: &str = "EUR";
    const DEFAULT_QUOTE_CURRENCY: &str = "USD";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_url: String,
        pub fallback_file: PathBuf,
        pub cache_ttl: Duration,
        pub retries: u32,
        pub retry_delay: Duration,
        pub request_timeout: Duration,
        pub base_currency: String,
        pub quote_currency: String,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_url: DEFAULT_API_URL.to_string(),
                fallback_file: PathBuf::from(DEFAULT_FALLBACK_FILE),
                cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                retries: DEFAULT_RETRIES,
                retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
                request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                base_currency: DEFAULT_BASE_CURRENCY.to_string(),
                quote_currency: DEFAULT_QUOTE_CURRENCY.to_string(),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup; blank values count as unset.
        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
            let defaults = Self::default();

            let retries = parse_or(get("FX_RETRIES"), "FX_RETRIES", defaults.retries)?;
            anyhow::ensure!(retries >= 1, "FX_RETRIES must be at least 1 (got {retries})");

            Ok(Self {
                api_url: get("FX_API_URL").unwrap_or(defaults.api_url),
                fallback_file: get("FX_FALLBACK_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.fallback_file),
                cache_ttl: Duration::from_secs(parse_or(
                    get("FX_CACHE_TTL_SECS"),
                    "FX_CACHE_TTL_SECS",
                    DEFAULT_CACHE_TTL_SECS,
                )?),
                retries,
                retry_delay: Duration::from_secs(parse_or(
                    get("FX_RETRY_DELAY_SECS"),
                    "FX_RETRY_DELAY_SECS",
                    DEFAULT_RETRY_DELAY_SECS,
                )?),
                request_timeout: Duration::from_secs(parse_or(
                    get("FX_TIMEOUT_SECS"),
                    "FX_TIMEOUT_SECS",
                    DEFAULT_TIMEOUT_SECS,
                )?),
                base_currency: get("FX_BASE_CURRENCY")
                    .map(|s| s.trim().to_ascii_uppercase())
                    .unwrap_or(defaults.base_currency),
                quote_currency: get("FX_QUOTE_CURRENCY")
                    .map(|s| s.trim().to_ascii_uppercase())
                    .unwrap_or(defaults.quote_currency),
                sentry_dsn: get("SENTRY_DSN"),
            })
        }
    }

    fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match raw {
            Some(s) => s
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} is not a valid number: {s}")),
            None => Ok(default),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let env: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|key| env.get(key).cloned())
        }

        #[test]
        fn defaults_apply_when_env_is_empty() {
            let s = settings_from(&[]).unwrap();
            assert_eq!(s.api_url, "https://api.frankfurter.app");
            assert_eq!(s.cache_ttl, Duration::from_secs(300));
            assert_eq!(s.retries, 3);
            assert_eq!(s.retry_delay, Duration::from_secs(1));
            assert_eq!(s.request_timeout, Duration::from_secs(5));
            assert_eq!(s.base_currency, "EUR");
            assert_eq!(s.quote_currency, "USD");
            assert!(s.sentry_dsn.is_none());
        }

        #[test]
        fn overrides_are_read_and_currencies_uppercased() {
            let s = settings_from(&[
                ("FX_CACHE_TTL_SECS", "60"),
                ("FX_RETRIES", "5"),
                ("FX_QUOTE_CURRENCY", "gbp"),
                ("FX_FALLBACK_FILE", "/tmp/fx.json"),
            ])
            .unwrap();
            assert_eq!(s.cache_ttl, Duration::from_secs(60));
            assert_eq!(s.retries, 5);
            assert_eq!(s.quote_currency, "GBP");
            assert_eq!(s.fallback_file, PathBuf::from("/tmp/fx.json"));
        }

        #[test]
        fn rejects_garbage_and_zero_retries() {
            assert!(settings_from(&[("FX_TIMEOUT_SECS", "soon")]).is_err());
            assert!(settings_from(&[("FX_RETRIES", "0")]).is_err());
        }

        #[test]
        fn blank_values_fall_back_to_defaults() {
            let s = settings_from(&[("FX_API_URL", "  ")]).unwrap();
            assert_eq!(s.api_url, "https://api.frankfurter.app");
        }
    }
}
