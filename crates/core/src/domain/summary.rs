use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NO_DATA_AVAILABLE: &str = "No data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakdown {
    Day,
    #[default]
    None,
}

impl FromStr for Breakdown {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "day" => Ok(Self::Day),
            "none" => Ok(Self::None),
            other => anyhow::bail!("breakdown must be one of: day, none (got {other:?})"),
        }
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => f.write_str("day"),
            Self::None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub rate: f64,
    pub pct_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub start_rate: Option<f64>,
    pub end_rate: Option<f64>,
    pub total_pct_change: f64,
    pub mean_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_breakdown: Option<Vec<DailyPoint>>,
}

/// Body of a `/summary` response: either the statistics or an in-band data error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryResponse {
    Unavailable { error: String },
    Summary(Summary),
}

impl SummaryResponse {
    pub fn no_data() -> Self {
        Self::Unavailable {
            error: NO_DATA_AVAILABLE.to_string(),
        }
    }
}
