use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

use crate::aggregate;
use crate::cache::TtlCache;
use crate::config::Settings;
use crate::domain::summary::{Breakdown, SummaryResponse};
use crate::ingest::fallback::FallbackLoader;
use crate::ingest::provider::{HttpRateProvider, RateProvider};
use crate::retry::{retry, RetryPolicy};

/// Cache → provider (with retry) → fallback.
pub struct RatePipeline {
    cache: Arc<TtlCache<Value>>,
    provider: Arc<dyn RateProvider>,
    fallback: FallbackLoader,
    policy: RetryPolicy,
    quote_currency: String,
}

impl RatePipeline {
    pub fn new(
        cache: Arc<TtlCache<Value>>,
        provider: Arc<dyn RateProvider>,
        fallback: FallbackLoader,
        policy: RetryPolicy,
        quote_currency: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            provider,
            fallback,
            policy,
            quote_currency: quote_currency.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = HttpRateProvider::from_settings(settings)?;
        Ok(Self::new(
            Arc::new(TtlCache::new(settings.cache_ttl)),
            Arc::new(provider),
            FallbackLoader::new(settings.fallback_file.clone()),
            RetryPolicy::from_settings(settings),
            settings.quote_currency.clone(),
        ))
    }

    /// Raw rates for `[start_date, end_date]`. Never fails: an exhausted provider falls back to
    /// the local snapshot, which may be `{}`.
    pub async fn get_rates(&self, start_date: NaiveDate, end_date: NaiveDate) -> Value {
        let key = cache_key(start_date, end_date);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::info!(%key, "cache hit");
            return cached;
        }

        let provider = self.provider.as_ref();
        let fetched = retry(&self.policy, provider.provider_name(), || {
            provider.fetch_rates(start_date, end_date)
        })
        .await;

        match fetched {
            Ok(data) => {
                self.cache.set(key, data.clone()).await;
                data
            }
            Err(err) => {
                tracing::error!(
                    %start_date,
                    %end_date,
                    error = %format!("{err:#}"),
                    "network failed; switching to fallback"
                );
                self.fallback.load().await
            }
        }
    }

    pub async fn summary(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        breakdown: Breakdown,
    ) -> SummaryResponse {
        let raw = self.get_rates(start_date, end_date).await;
        aggregate::summarize(&raw, &self.quote_currency, breakdown)
    }
}

pub fn cache_key(start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!("{start_date}_{end_date}")
}
