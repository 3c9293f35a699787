pub mod types;
pub mod config;
pub mod credentials;
pub mod client;
pub mod reconciler;
pub mod fetcher;
pub mod parser;
pub mod aggregator;
pub mod reporter;

pub use types::*;
pub use config::AppConfig;
pub use client::{AlertsApi, HttpAlertsClient};
pub use reconciler::{ReconcilePlan, Reconciler};
pub use fetcher::Fetcher;
pub use aggregator::FeedAggregator;
