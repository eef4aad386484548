//! Project data source

use super::mapper;
use super::model::ProjectModel;
use crate::attr::Attr;
use crate::context::Context;
use crate::error::{During, Result};
use crate::resource::DataSource;
use async_trait::async_trait;
use catalyst_client::ProjectApi;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectQuery {
    pub name: String,

    /// Echoed into the model; projects are looked up within the key's organization
    pub organization_id: Option<String>,
}

impl ProjectQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            organization_id: None,
        }
    }
}

pub struct ProjectDataSource<C: ?Sized> {
    client: Arc<C>,
}

impl<C: ProjectApi + ?Sized> ProjectDataSource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: ProjectApi + ?Sized + 'static> DataSource for ProjectDataSource<C> {
    type Config = ProjectQuery;
    type Model = ProjectModel;

    const TYPE_NAME: &'static str = "catalyst_project";

    async fn read(&self, ctx: &Context, query: &ProjectQuery) -> Result<Option<ProjectModel>> {
        let name = query.name.as_str();
        let project = match ctx
            .run(self.client.get_project(name))
            .await
            .during("read", "project", name)
        {
            Ok(project) => project,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Project {} not found", name);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut model = ProjectModel {
            organization_id: Attr::from_option(query.organization_id.clone()),
            ..ProjectModel::new(name)
        };
        mapper::refresh(&mut model, &project);
        Ok(Some(model))
    }
}
