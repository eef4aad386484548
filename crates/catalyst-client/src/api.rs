//! Capability traits, one per remote resource family
//!
//! Reconcilers depend on the narrowest trait they need, so any of them can be
//! driven by [`crate::HttpClient`] in production or by an in-memory double in
//! tests.

use crate::error::{ClientError, Result};
use crate::types::{Organization, Project, Region, User};
use async_trait::async_trait;

/// Region operations
#[async_trait]
pub trait RegionApi: Send + Sync {
    /// Create a private region, returning its join token.
    ///
    /// The token is only ever returned here.
    async fn create_region(&self, region: &Region) -> Result<String>;

    async fn get_region(&self, name: &str) -> Result<Region>;

    async fn list_regions(&self) -> Result<Vec<Region>>;

    /// Replace the region with the given full object.
    async fn update_region(&self, region: &Region) -> Result<()>;

    async fn delete_region(&self, name: &str) -> Result<()>;
}

/// Project operations
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn create_project(&self, project: &Project) -> Result<()>;

    async fn get_project(&self, name: &str) -> Result<Project>;

    /// Patch the project with the given full object.
    async fn update_project(&self, project: &Project) -> Result<()>;

    async fn delete_project(&self, name: &str) -> Result<()>;
}

/// Organization and principal lookups
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    async fn get_current_user(&self) -> Result<User>;

    async fn get_organization(&self, id: &str) -> Result<Organization>;

    /// Organization of the authenticated principal
    async fn get_user_org(&self) -> Result<Organization> {
        let user = self.get_current_user().await?;
        let org_id = user
            .organization_id()
            .ok_or(ClientError::MissingField("user.attributes.organization.id"))?
            .to_string();

        tracing::debug!("Resolved current user organization: {}", org_id);
        self.get_organization(&org_id).await
    }
}

/// Everything the provider talks to
pub trait CatalystClient: RegionApi + ProjectApi + OrganizationApi {}

impl<T> CatalystClient for T where T: RegionApi + ProjectApi + OrganizationApi {}
