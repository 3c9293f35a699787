use crate::config::ServiceConfig;
use crate::credentials;
use crate::types::{AlertsError, Result, Subscription, SubscriptionRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Operations the alerting service exposes over its subscription list.
///
/// The pipeline depends on this interface; the concurrency model behind a
/// given implementation stays its own concern.
#[async_trait]
pub trait AlertsApi: Send + Sync {
    /// Refresh the local view of remote subscriptions.
    async fn sync(&mut self) -> Result<()>;

    /// Subscriptions as of the last sync, in the service's listing order.
    fn list(&self) -> &[Subscription];

    /// Request a new subscription; returns the created entity.
    async fn create(&self, request: SubscriptionRequest) -> Result<Subscription>;

    /// Request deletion of a subscription by id.
    async fn remove(&self, id: &str) -> Result<()>;
}

/// HTTP binding to the remote alerting service.
pub struct HttpAlertsClient {
    client: Client,
    base_url: String,
    cookie_header: String,
    subscriptions: Vec<Subscription>,
}

impl HttpAlertsClient {
    pub fn new(config: &ServiceConfig, credential: &str, user_agent: &str) -> Result<Self> {
        let cookie_header = credentials::cookie_header(credential)?;
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_header,
            subscriptions: Vec::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(reqwest::header::COOKIE, &self.cookie_header)
    }

    async fn handle_json_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AlertsError::Service {
                context: context.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }
        serde_json::from_str(&body).map_err(AlertsError::from)
    }
}

#[async_trait]
impl AlertsApi for HttpAlertsClient {
    async fn sync(&mut self) -> Result<()> {
        debug!("Syncing subscriptions from {}", self.base_url);
        let response = self
            .request(reqwest::Method::GET, "/subscriptions")
            .send()
            .await?;
        self.subscriptions = self
            .handle_json_response(response, "subscription sync")
            .await?;
        info!("Synced {} subscriptions", self.subscriptions.len());
        Ok(())
    }

    fn list(&self) -> &[Subscription] {
        &self.subscriptions
    }

    async fn create(&self, request: SubscriptionRequest) -> Result<Subscription> {
        let name = request.name.clone();
        let response = self
            .request(reqwest::Method::POST, "/subscriptions")
            .json(&request)
            .send()
            .await?;
        self.handle_json_response(response, &format!("create subscription for {}", name))
            .await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/subscriptions/{}", id))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertsError::Service {
                context: format!("remove subscription {}", id),
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}
