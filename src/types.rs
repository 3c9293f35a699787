use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subscription as reported by the remote alerting service.
///
/// Instances are transient per run: the service owns them, we only hold the
/// copies returned by the last sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Address of the result feed. The service only assigns one once feed
    /// delivery is active, so freshly created subscriptions may lack it.
    pub feed_address: Option<String>,
    pub delivery_mode: DeliveryMode,
    pub frequency: Frequency,
    pub language: String,
    pub region: String,
    pub result_volume: ResultVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Feed,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    AsItHappens,
    AtMostOncePerDay,
    AtMostOncePerWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultVolume {
    Best,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Automatic,
    News,
    Blogs,
    Web,
}

/// Creation request sent to the alerting service. Everything but the keyword
/// is fixed by the subscription template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub name: String,
    pub delivery_mode: DeliveryMode,
    pub frequency: Frequency,
    pub language: String,
    pub region: String,
    pub result_volume: ResultVolume,
    pub source_type: SourceType,
}

impl SubscriptionRequest {
    /// The fixed template: feed delivery, at most one digest a day, English,
    /// any region, best results, automatic sources.
    pub fn for_keyword(keyword: &str) -> Self {
        Self {
            name: keyword.to_string(),
            delivery_mode: DeliveryMode::Feed,
            frequency: Frequency::AtMostOncePerDay,
            language: "en".to_string(),
            region: "any".to_string(),
            result_volume: ResultVolume::Best,
            source_type: SourceType::Automatic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// Parsed feed document before it is attributed to a subscription.
#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Aggregation output for one subscription. Entries hold the full current
/// feed contents; nothing is diffed against previous runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResult {
    pub subscription_name: String,
    pub entries: Vec<FeedEntry>,
}

impl FeedResult {
    pub fn empty(subscription_name: &str) -> Self {
        Self {
            subscription_name: subscription_name.to_string(),
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "alertsync/0.1".to_string(),
            timeout_seconds: 30,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AlertsError {
    #[error("required session cookie {cookie} not found in the browser cookie store")]
    MissingCookie { cookie: String },

    #[error("session cookie {cookie} has no readable value (stored encrypted); set {env_var} instead")]
    UnreadableCookie { cookie: String, env_var: &'static str },

    #[error("no browser cookie store found; set the session credential in the environment")]
    NoCookieStore,

    #[error("cookie store error: {0}")]
    CookieStore(#[from] rusqlite::Error),

    #[error("credential decode error: {0}")]
    BadCredential(String),

    #[error("alerting service error ({context}): HTTP {status}: {message}")]
    Service {
        context: String,
        status: u16,
        message: String,
    },

    #[error("feed fetch failed for {url}: {reason}")]
    FeedFetch { url: String, reason: String },

    #[error("feed parse error: {0}")]
    FeedParse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlertsError>;
