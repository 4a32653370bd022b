use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_core::domain::summary::Breakdown;
use fx_core::pipeline::RatePipeline;

#[derive(Debug, Parser)]
#[command(name = "fx_cli", about = "Print an FX rate summary for a date range")]
struct Args {
    /// First day of the range (YYYY-MM-DD).
    #[arg(long)]
    start_date: String,

    /// Last day of the range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    end_date: String,

    /// `day` adds a per-day breakdown; `none` prints totals only.
    #[arg(long, default_value = "none")]
    breakdown: String,

    /// Print compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fx_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    // Logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let (start_date, end_date, breakdown) = resolve_args(&args).inspect_err(|e| {
        sentry_anyhow::capture_anyhow(e);
    })?;

    let pipeline = RatePipeline::from_settings(&settings)?;
    let summary = pipeline.summary(start_date, end_date, breakdown).await;

    tracing::info!(%start_date, %end_date, %breakdown, "summary computed");

    let out = if args.compact {
        serde_json::to_string(&summary)?
    } else {
        serde_json::to_string_pretty(&summary)?
    };
    println!("{out}");
    Ok(())
}

fn resolve_args(args: &Args) -> anyhow::Result<(NaiveDate, NaiveDate, Breakdown)> {
    let start_date = NaiveDate::parse_from_str(&args.start_date, "%Y-%m-%d")
        .with_context(|| format!("invalid --start-date: {}", args.start_date))?;
    let end_date = NaiveDate::parse_from_str(&args.end_date, "%Y-%m-%d")
        .with_context(|| format!("invalid --end-date: {}", args.end_date))?;
    anyhow::ensure!(
        start_date <= end_date,
        "--start-date {start_date} is after --end-date {end_date}"
    );
    let breakdown = args.breakdown.parse::<Breakdown>()?;
    Ok((start_date, end_date, breakdown))
}

fn init_sentry(settings: &fx_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
