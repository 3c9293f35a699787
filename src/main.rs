use alertsync::client::AlertsApi;
use alertsync::{credentials, reporter, AppConfig, FeedAggregator, HttpAlertsClient, Reconciler};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Keeps alerting-service subscriptions in sync with a keyword list and
/// prints each subscription's feed.
#[derive(Parser, Debug)]
#[command(name = "alertsync", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "alertsync.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    run(config).await
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let credential = credentials::resolve(&config.service.cookie_domain)
        .context("acquiring session credential")?;

    let mut client = HttpAlertsClient::new(&config.service, &credential, &config.fetch.user_agent)
        .context("constructing alerting client")?;

    client.sync().await.context("syncing subscriptions")?;

    let reconciler = Reconciler::new(config.allow_removal);
    let plan = reconciler
        .reconcile(&client, &config.keywords)
        .await
        .context("reconciling keywords")?;
    info!(
        "Reconciled keywords: {} added, {} flagged for removal",
        plan.to_add.len(),
        plan.to_remove.len()
    );

    // Fresh subscriptions get their feed address assigned by the service, so
    // re-sync before reading feeds.
    client.sync().await.context("re-syncing subscriptions")?;

    let aggregator = FeedAggregator::new(&config.fetch).context("constructing feed aggregator")?;
    let results = aggregator
        .aggregate(client.list())
        .await
        .context("aggregating feeds")?;

    reporter::report(&results);
    Ok(())
}
