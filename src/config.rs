use crate::types::{AlertsError, FetchConfig, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Runtime configuration, loaded from a TOML file.
///
/// The keyword list lives here rather than in the source: the set of
/// monitored topics is operator data, not program data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keywords the subscription list should converge to. Order is
    /// insignificant for reconciliation but preserved in reporting.
    pub keywords: Vec<String>,
    /// Whether reconciliation may delete subscriptions whose keyword is no
    /// longer configured. Off by default; the removal set is still computed
    /// and logged so enabling this acts on known state.
    pub allow_removal: bool,
    pub service: ServiceConfig,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            allow_removal: false,
            service: ServiceConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the alerting service API.
    pub base_url: String,
    /// Domain whose session cookies authorize the service.
    pub cookie_domain: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/alerts".to_string(),
            cookie_domain: "google.com".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AlertsError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&raw)
            .map_err(|e| AlertsError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}
