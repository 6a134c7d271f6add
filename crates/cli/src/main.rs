use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voucher_core::config::Settings;
use voucher_core::domain::deal::Deal;
use voucher_core::domain::location::{RentQuery, Zip};
use voucher_core::history::{zip_rent_stats, LookupRecord};
use voucher_core::hud::client::HudUserClient;
use voucher_core::hud::resolver::RentResolver;
use voucher_core::underwriting::compare::{compare_deals, CompareMetric};

#[derive(Debug, Parser)]
#[command(name = "voucher", about = "Section 8 rent lookup and deal underwriting")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the HUD rent limit for a ZIP and bedroom count.
    Rent {
        #[arg(long)]
        zip: String,

        /// 0 (efficiency) through 4.
        #[arg(long, allow_negative_numbers = true)]
        bedrooms: i64,

        /// Print the lookup log record instead of the bare quote.
        #[arg(long)]
        record: bool,
    },
    /// Underwrite a deal from a JSON document.
    Underwrite {
        #[arg(long)]
        deal: PathBuf,
    },
    /// Compare 2 to 4 deal documents side by side.
    Compare {
        #[arg(required = true)]
        deals: Vec<PathBuf>,
    },
    /// Summarize logged lookups for a ZIP.
    ZipStats {
        #[arg(long)]
        zip: String,

        /// JSON array of lookup records, newest first.
        #[arg(long)]
        records: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args.command, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    result
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Rent {
            zip,
            bedrooms,
            record,
        } => {
            let query = RentQuery::parse(&zip, bedrooms)?;
            let client = HudUserClient::from_settings(settings)?;
            let resolver = RentResolver::new(Arc::new(client));

            let quote = resolver.resolve(&query).await?;
            if record {
                let rec = LookupRecord::from_quote(&quote, chrono::Utc::now());
                let keys = rec.partition_keys();
                print_json(&serde_json::json!({ "keys": keys, "record": rec }))
            } else {
                print_json(&quote)
            }
        }
        Command::Underwrite { deal } => {
            let deal = read_deal(&deal)?;
            print_json(&voucher_core::underwriting::evaluate(&deal))
        }
        Command::Compare { deals } => {
            let deals = read_deals(&deals)?;
            let cmp = compare_deals(&deals)?;
            let best_cashflow = cmp.best_by(CompareMetric::CashflowMonthly);
            tracing::info!(deals = deals.len(), ?best_cashflow, "compared deals");
            print_json(&cmp)
        }
        Command::ZipStats { zip, records } => {
            let zip: Zip = zip.parse()?;
            let text = std::fs::read_to_string(&records)
                .with_context(|| format!("failed to read {}", records.display()))?;
            let records: Vec<LookupRecord> = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a JSON array of lookup records", records.display()))?;

            let stats = zip_rent_stats(records.iter().filter(|r| r.zip == zip));
            print_json(&serde_json::json!({ "zip": zip, "stats": stats }))
        }
    }
}

fn read_deal(path: &Path) -> anyhow::Result<Deal> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a deal document", path.display()))
}

fn read_deals(paths: &[PathBuf]) -> anyhow::Result<Vec<Deal>> {
    paths.iter().map(PathBuf::as_path).map(read_deal).collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
