use crate::client::auth::{exchange_api_key, Credentials};
use crate::client::core::{Endpoints, GalileoClient};
use crate::client::endpoint::EndpointStrategy;
use crate::config::HarnessConfig;
use crate::poll::PollStrategy;
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Builder for [`GalileoClient`].
///
/// Keep this surface area small and predictable.
pub struct GalileoClientBuilder {
    config: HarnessConfig,
    authenticate: bool,
    poll: PollStrategy,
    endpoints: Endpoints,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
}

impl GalileoClientBuilder {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            authenticate: true,
            poll: PollStrategy::default(),
            endpoints: Endpoints::default(),
            base_url_override: None,
        }
    }

    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(HarnessConfig::from_env()?))
    }

    /// Exchange the API key for a token at build time (default: on).
    ///
    /// When disabled, or when the exchange fails, the API key itself is sent
    /// as the bearer credential.
    pub fn authenticate(mut self, enable: bool) -> Self {
        self.authenticate = enable;
        self
    }

    /// Default strategy for metric and trace polling.
    pub fn poll_strategy(mut self, strategy: PollStrategy) -> Self {
        self.poll = strategy;
        self
    }

    pub fn trace_metrics_endpoints(mut self, strategy: EndpointStrategy) -> Self {
        self.endpoints.trace_metrics = strategy;
        self
    }

    pub fn experiment_endpoints(mut self, list: EndpointStrategy, details: EndpointStrategy) -> Self {
        self.endpoints.experiments = list;
        self.endpoints.experiment_details = details;
        self
    }

    pub fn dataset_endpoints(mut self, list: EndpointStrategy, details: EndpointStrategy) -> Self {
        self.endpoints.datasets = list;
        self.endpoints.dataset_details = details;
        self
    }

    /// Override the configured API base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Build the client, authenticating first when enabled.
    pub async fn build(self) -> Result<GalileoClient> {
        let mut config = self.config;
        if let Some(url) = self.base_url_override {
            config.api_url = url;
        }
        config.log_summary();

        let anonymous = HttpTransport::new(&config.api_url, config.http_timeout)?;

        let mut credentials = Credentials::from_api_key(config.api_key.clone());
        if self.authenticate {
            credentials.token = exchange_api_key(&anonymous, &config.api_key).await;
        }
        let bearer = if credentials.uses_token() { "token" } else { "api_key" };
        info!(bearer, "platform client ready");

        let transport = anonymous.with_bearer(credentials.bearer());

        Ok(GalileoClient {
            config,
            transport: Arc::new(transport),
            credentials,
            endpoints: self.endpoints,
            poll: self.poll,
        })
    }
}
