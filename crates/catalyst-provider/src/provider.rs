//! Provider configuration
//!
//! `configure` resolves settings, builds one remote client and hands it to
//! every resource and data source, so they never construct their own.

use crate::diagnostics::Diagnostics;
use crate::organization::OrganizationDataSource;
use crate::project::{ProjectDataSource, ProjectResource};
use crate::region::{Lookup, RegionDataSource, RegionResource};
use crate::wait::DEFAULT_POLL_INTERVAL;
use catalyst_client::{CatalystClient, ClientConfig, ClientError, HttpClient};
use catalyst_config::{ProviderBlock, ProviderSettings};
use std::sync::Arc;
use std::time::Duration;

/// Builds the remote client from resolved settings
pub trait ClientFactory: Send + Sync {
    fn build(&self, settings: &ProviderSettings) -> Result<Arc<dyn CatalystClient>, ClientError>;
}

/// Production factory backed by [`HttpClient`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(&self, settings: &ProviderSettings) -> Result<Arc<dyn CatalystClient>, ClientError> {
        let config = ClientConfig::new(&settings.endpoint, &settings.api_key);
        Ok(Arc::new(HttpClient::new(config)?))
    }
}

/// A configured provider
#[derive(Clone)]
pub struct CatalystProvider {
    client: Arc<dyn CatalystClient>,
    endpoint: String,
    poll_interval: Duration,
}

impl std::fmt::Debug for CatalystProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalystProvider")
            .field("endpoint", &self.endpoint)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl CatalystProvider {
    /// Resolve `block` against the environment and build the client.
    ///
    /// All configuration problems are returned together as diagnostics.
    pub fn configure(
        block: &ProviderBlock,
        factory: &dyn ClientFactory,
    ) -> Result<Self, Diagnostics> {
        let settings = ProviderSettings::resolve(block).map_err(Diagnostics::from)?;

        let client = factory.build(&settings).map_err(|e| {
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_error(
                "Unable to Create Catalyst API Client",
                format!(
                    "An unexpected error occurred when creating the Catalyst API client: {}",
                    e
                ),
            );
            diagnostics
        })?;

        tracing::debug!("Configured Catalyst provider for {}", settings.endpoint);
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Provider around an existing client
    pub fn with_client(client: Arc<dyn CatalystClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn client(&self) -> Arc<dyn CatalystClient> {
        self.client.clone()
    }

    pub fn regions(&self) -> RegionResource<dyn CatalystClient> {
        RegionResource::new(self.client.clone()).with_poll_interval(self.poll_interval)
    }

    pub fn projects(&self) -> ProjectResource<dyn CatalystClient> {
        ProjectResource::new(self.client.clone()).with_poll_interval(self.poll_interval)
    }

    pub fn region_data(&self, lookup: Lookup) -> RegionDataSource<dyn CatalystClient> {
        RegionDataSource::new(self.client.clone()).with_lookup(lookup)
    }

    pub fn project_data(&self) -> ProjectDataSource<dyn CatalystClient> {
        ProjectDataSource::new(self.client.clone())
    }

    pub fn organization_data(&self) -> OrganizationDataSource<dyn CatalystClient> {
        OrganizationDataSource::new(self.client.clone())
    }
}
