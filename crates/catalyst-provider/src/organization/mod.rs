//! `catalyst_organization` data source

use crate::attr::Attr;
use crate::context::Context;
use crate::error::{During, Result};
use crate::resource::DataSource;
use async_trait::async_trait;
use catalyst_client::{Organization, OrganizationApi};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Organization of the authenticated principal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    /// Runtime product plan
    pub plan: Attr<String>,
}

impl From<&Organization> for OrganizationModel {
    fn from(org: &Organization) -> Self {
        let owned = |value: Option<&str>| Attr::from_option(value.map(str::to_string));
        Self {
            id: owned(org.id()),
            name: owned(org.name()),
            plan: owned(org.runtime_plan()),
        }
    }
}

pub struct OrganizationDataSource<C: ?Sized> {
    client: Arc<C>,
}

impl<C: OrganizationApi + ?Sized> OrganizationDataSource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: OrganizationApi + ?Sized + 'static> DataSource for OrganizationDataSource<C> {
    type Config = ();
    type Model = OrganizationModel;

    const TYPE_NAME: &'static str = "catalyst_organization";

    async fn read(&self, ctx: &Context, _config: &()) -> Result<Option<OrganizationModel>> {
        let org = match ctx
            .run(self.client.get_user_org())
            .await
            .during("read", "organization", "current")
        {
            Ok(org) => org,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Organization of the current user not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let model = OrganizationModel::from(&org);
        tracing::debug!("Read organization {}", model.id);
        Ok(Some(model))
    }
}
