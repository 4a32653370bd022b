use serde_json::Value;

use crate::domain::rates::RateSeries;
use crate::domain::summary::{Breakdown, DailyPoint, Summary, SummaryResponse};

const DECIMALS: usize = 4;

/// Summarizes a raw provider payload for the `quote` currency.
///
/// An empty payload, or one without a `rates` object, yields the in-band "No data available"
/// error instead of a summary.
pub fn summarize(raw: &Value, quote: &str, breakdown: Breakdown) -> SummaryResponse {
    match RateSeries::from_raw(raw, quote) {
        Some(series) => SummaryResponse::Summary(summarize_series(&series, breakdown)),
        None => SummaryResponse::no_data(),
    }
}

pub fn summarize_series(series: &RateSeries, breakdown: Breakdown) -> Summary {
    let start_rate = series.first().map(|(_, r)| r);
    let end_rate = series.last().map(|(_, r)| r);

    let mut daily = Vec::new();
    let mut sum = 0.0_f64;
    let mut count: usize = 0;
    let mut prev_rate: Option<f64> = None;

    for (date, rate) in series.iter() {
        let pct_change = match prev_rate {
            Some(prev) => pct_change(prev, rate),
            None => 0.0,
        };

        if breakdown == Breakdown::Day {
            daily.push(DailyPoint {
                date: date.to_string(),
                rate,
                pct_change: round_dp(pct_change),
            });
        }

        sum += rate;
        count += 1;
        prev_rate = Some(rate);
    }

    let mean_rate = if count > 0 { sum / count as f64 } else { 0.0 };

    let total_pct_change = match (start_rate, end_rate) {
        (Some(start), Some(end)) => pct_change(start, end),
        _ => 0.0,
    };

    Summary {
        start_rate,
        end_rate,
        total_pct_change: round_dp(total_pct_change),
        mean_rate: round_dp(mean_rate),
        daily_breakdown: (breakdown == Breakdown::Day).then_some(daily),
    }
}

// Zero base means "no change" rather than a division by zero.
fn pct_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Rounds to four decimal places using the exact decimal value of `x`.
pub fn round_dp(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.prec$}", prec = DECIMALS).parse::<f64>().unwrap_or(x)
}
