use crate::fetcher::Fetcher;
use crate::parser;
use crate::types::{FeedResult, FetchConfig, Result, Subscription};
use futures::future::join_all;
use tracing::{info, warn};

/// Reads each subscription's result feed and collects the entries.
pub struct FeedAggregator {
    fetcher: Fetcher,
}

impl FeedAggregator {
    pub fn new(fetch_config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
        })
    }

    /// Produce one [`FeedResult`] per subscription, in the given order.
    ///
    /// All feed reads are dispatched concurrently and the call waits for
    /// every one; a single failed read rejects the whole aggregation with
    /// that read's error. A subscription without a feed address yields an
    /// empty result and a warning instead of failing.
    pub async fn aggregate(&self, subscriptions: &[Subscription]) -> Result<Vec<FeedResult>> {
        let reads = subscriptions.iter().map(|sub| self.read_subscription(sub));
        join_all(reads).await.into_iter().collect()
    }

    async fn read_subscription(&self, subscription: &Subscription) -> Result<FeedResult> {
        let Some(address) = subscription.feed_address.as_deref() else {
            warn!("Subscription {} missing feed address", subscription.name);
            return Ok(FeedResult::empty(&subscription.name));
        };

        info!("Reading {}", address);
        let content = self.fetcher.fetch(address).await?;
        let parsed = parser::parse_feed(&content)?;

        Ok(FeedResult {
            subscription_name: subscription.name.clone(),
            entries: parsed.entries,
        })
    }
}
