use serde_json::Value;
use std::collections::BTreeMap;

/// Key under which the upstream and fallback payloads carry their date → rates mapping.
pub const RATES_KEY: &str = "rates";

/// Daily rates for one quote currency, ordered by ISO date.
///
/// ISO `YYYY-MM-DD` strings sort lexicographically in calendar order, so the map's key order is
/// the chronological order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateSeries {
    rates: BTreeMap<String, f64>,
}

impl RateSeries {
    /// Extracts the `quote` series from a raw `{"rates": {date: {currency: rate}}}` payload.
    ///
    /// Returns `None` when the payload is empty or has no `rates` object. Dates without a numeric
    /// rate for `quote` are skipped.
    pub fn from_raw(raw: &Value, quote: &str) -> Option<Self> {
        let obj = raw.as_object().filter(|o| !o.is_empty())?;
        let by_date = obj.get(RATES_KEY)?.as_object()?;

        let mut rates = BTreeMap::new();
        for (date, currencies) in by_date {
            match currencies.get(quote).and_then(Value::as_f64) {
                Some(rate) => {
                    rates.insert(date.clone(), rate);
                }
                None => {
                    tracing::warn!(%date, quote, "no numeric rate for quote currency; skipping date");
                }
            }
        }

        Some(Self { rates })
    }

    #[cfg(test)]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            rates: pairs.into_iter().map(|(d, r)| (d.into(), r)).collect(),
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[cfg(test)]
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(d, r)| (d.as_str(), *r))
    }

    pub fn first(&self) -> Option<(&str, f64)> {
        self.rates.iter().next().map(|(d, r)| (d.as_str(), *r))
    }

    pub fn last(&self) -> Option<(&str, f64)> {
        self.rates.iter().next_back().map(|(d, r)| (d.as_str(), *r))
    }
}
