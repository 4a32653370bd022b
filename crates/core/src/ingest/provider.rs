use crate::config::Settings;
use crate::ingest::error::ProviderError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;

const PROVIDER_NAME: &str = "frankfurter";

/// A single, unretried fetch of daily rates for an inclusive date range.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_rates(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    http: reqwest::Client,
    base_url: String,
    base_currency: String,
    quote_currency: String,
}

impl HttpRateProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build rate provider http client")?;

        Ok(Self {
            http,
            base_url: settings.api_url.clone(),
            base_currency: settings.base_currency.clone(),
            quote_currency: settings.quote_currency.clone(),
        })
    }

    fn url(&self, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/{}..{}",
            self.base_url.trim_end_matches('/'),
            start_date,
            end_date
        )
    }

    fn error(&self, stage: &'static str, status: Option<u16>, detail: String) -> ProviderError {
        ProviderError {
            provider: PROVIDER_NAME,
            stage,
            status,
            detail,
        }
    }
}

#[async_trait::async_trait]
impl RateProvider for HttpRateProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_rates(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<Value> {
        let url = self.url(start_date, end_date);

        let res = self
            .http
            .get(url)
            .query(&[
                ("from", self.base_currency.as_str()),
                ("to", self.quote_currency.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.error("request", None, e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| self.error("body", Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(self.error("http", Some(status.as_u16()), text).into());
        }

        let raw_json = parse_rates_body(&text)
            .map_err(|e| self.error("decode", Some(status.as_u16()), format!("{e:#}")))?;
        Ok(raw_json)
    }
}

/// Parses a provider body as JSON. Shape is left to the aggregator, which skips unusable dates.
pub fn parse_rates_body(text: &str) -> Result<Value> {
    serde_json::from_str::<Value>(text)
        .with_context(|| format!("provider response is not valid JSON: {text}"))
}
