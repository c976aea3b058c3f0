//! Purchase conversion binary.
//!
//! Loads purchases from a JSON file and prints them converted into the
//! requested currency using historical Treasury exchange rates.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use purchase_common::TransactionId;
use purchase_converter::{ConverterConfig, InMemoryTransactionStore, PurchaseService, TransactionStore};

#[derive(Parser)]
#[command(name = "purchase-convert")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert USD purchases into a target currency", long_about = None)]
struct Cli {
    /// JSON array of stored purchases
    #[arg(short, long, value_name = "FILE")]
    transactions: PathBuf,

    /// Treasury currency descriptor, e.g. "Canada-Dollar"
    #[arg(short, long)]
    currency: String,

    /// Purchase to convert; repeatable. Defaults to every stored purchase
    #[arg(long = "id", value_name = "UUID")]
    ids: Vec<TransactionId>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConverterConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let store = Arc::new(InMemoryTransactionStore::from_json_file(&cli.transactions).await?);
    let ids = if cli.ids.is_empty() {
        store.get_all().await?.into_iter().map(|t| t.id).collect()
    } else {
        cli.ids
    };

    info!(
        purchases = ids.len(),
        currency = %cli.currency,
        "Converting purchases"
    );

    let service = PurchaseService::with_treasury(store, &config)?;
    let converted = service.convert(&ids, &cli.currency).await?;

    println!("{}", serde_json::to_string_pretty(&converted)?);

    if cli.metrics {
        eprintln!("{}", service.orchestrator().metrics().to_prometheus());
    }

    Ok(())
}
