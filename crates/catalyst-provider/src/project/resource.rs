//! Project reconciler
//!
//! Projects are scoped to the organization of the API key. The organization
//! is resolved on create and import and recorded in state as part of the
//! project identity; a configured value that disagrees with the key's
//! organization is rejected before anything is sent.

use super::mapper;
use super::model::ProjectModel;
use crate::action::ActionType;
use crate::attr::Attr;
use crate::context::Context;
use crate::error::{During, ProviderError, Result};
use crate::resource::{PlannedChange, ReadOutcome, Resource};
use crate::wait::{DEFAULT_POLL_INTERVAL, wait_until};
use async_trait::async_trait;
use catalyst_client::{ClientError, OrganizationApi, Project, ProjectApi};
use std::sync::Arc;
use std::time::Duration;

const KIND: &str = "project";

/// Local checks for a declared project; no remote calls.
pub fn validate_project(desired: &ProjectModel) -> Result<()> {
    if desired.name.is_empty() {
        return Err(ProviderError::validation("name", "must not be empty"));
    }
    match desired.region.known() {
        Some(region) if !region.is_empty() => {}
        _ => return Err(ProviderError::validation("region", "is required")),
    }
    if desired
        .organization_id
        .known()
        .is_some_and(|id| id.is_empty())
    {
        return Err(ProviderError::validation("organization_id", "must not be empty"));
    }
    Ok(())
}

pub struct ProjectResource<C: ?Sized> {
    client: Arc<C>,
    poll_interval: Duration,
}

impl<C: ProjectApi + OrganizationApi + ?Sized> ProjectResource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Organization of the API key, checked against a configured value.
    async fn resolve_organization(
        &self,
        ctx: &Context,
        op: &'static str,
        configured: Option<&str>,
    ) -> Result<String> {
        let org = ctx
            .run(self.client.get_user_org())
            .await
            .during(op, "organization", "current")?;
        let id = org
            .id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(ClientError::MissingField("organization.data.id"))
            .during(op, "organization", "current")?;

        match configured {
            Some(want) if want != id => Err(ProviderError::validation(
                "organization_id",
                format!(
                    "{:?} does not match the organization of the API key ({:?})",
                    want, id
                ),
            )),
            _ => Ok(id),
        }
    }

    async fn fetch(&self, ctx: &Context, op: &'static str, name: &str) -> Result<Project> {
        ctx.run(self.client.get_project(name))
            .await
            .during(op, KIND, name)
    }

    async fn wait_for_status(
        &self,
        ctx: &Context,
        op: &'static str,
        name: &str,
        wait_for_ready: bool,
    ) -> Result<()> {
        let client = &*self.client;
        wait_until(ctx, self.poll_interval, move || async move {
            let project = client.get_project(name).await?;
            let status = project.status();
            if mapper::is_terminal(status, wait_for_ready) {
                return Ok(true);
            }
            tracing::debug!(
                "Project {} status is {:?}, waiting (wait_for_ready: {})",
                name,
                status,
                wait_for_ready
            );
            Ok::<_, ClientError>(false)
        })
        .await
        .during(op, KIND, name)
    }

    async fn wait_for_deletion(&self, ctx: &Context, name: &str) -> Result<()> {
        let client = &*self.client;
        wait_until(ctx, self.poll_interval, move || async move {
            match client.get_project(name).await {
                Ok(project) => {
                    tracing::debug!(
                        "Project {} still present with status {:?}",
                        name,
                        project.status()
                    );
                    Ok(false)
                }
                Err(e) if e.is_not_found() => Ok(true),
                Err(e) => Err(e),
            }
        })
        .await
        .during("delete", KIND, name)
    }
}

fn planned_for_create(desired: &ProjectModel) -> ProjectModel {
    ProjectModel {
        organization_id: desired.organization_id.clone().or_unknown(),
        managed_pubsub: desired.managed_pubsub.clone().or_unknown(),
        managed_kvstore: desired.managed_kvstore.clone().or_unknown(),
        managed_workflow: desired.managed_workflow.clone().or_unknown(),
        grpc_endpoint: Attr::Unknown,
        http_endpoint: Attr::Unknown,
        ..desired.clone()
    }
}

#[async_trait]
impl<C: ProjectApi + OrganizationApi + ?Sized + 'static> Resource for ProjectResource<C> {
    type Model = ProjectModel;

    const TYPE_NAME: &'static str = "catalyst_project";

    fn validate(&self, desired: &ProjectModel) -> Result<()> {
        validate_project(desired)
    }

    fn plan(
        &self,
        desired: &ProjectModel,
        prior: Option<&ProjectModel>,
    ) -> PlannedChange<ProjectModel> {
        let Some(prior) = prior else {
            return PlannedChange::new(ActionType::Create, planned_for_create(desired), Vec::new());
        };

        if let (Some(want), Some(have)) = (desired.organization_id.known(), prior.organization_id.known())
            && want != have
        {
            return PlannedChange::new(
                ActionType::Replace,
                planned_for_create(desired),
                vec!["organization_id"],
            );
        }
        if desired.name != prior.name {
            return PlannedChange::new(ActionType::Replace, planned_for_create(desired), vec!["name"]);
        }

        let mut changed = Vec::new();
        if desired.region != prior.region {
            changed.push("region");
        }
        let toggles = [
            ("managed_pubsub", &desired.managed_pubsub, &prior.managed_pubsub),
            ("managed_kvstore", &desired.managed_kvstore, &prior.managed_kvstore),
            ("managed_workflow", &desired.managed_workflow, &prior.managed_workflow),
        ];
        for (field, want, have) in toggles {
            if want.is_known() && want != have {
                changed.push(field);
            }
        }

        if changed.is_empty() {
            let planned = ProjectModel {
                wait_for_ready: desired.wait_for_ready,
                ..prior.clone()
            };
            return PlannedChange::new(ActionType::NoOp, planned, changed);
        }

        let planned = ProjectModel {
            organization_id: prior.organization_id.clone(),
            managed_pubsub: desired.managed_pubsub.clone().or(prior.managed_pubsub.clone()),
            managed_kvstore: desired.managed_kvstore.clone().or(prior.managed_kvstore.clone()),
            managed_workflow: desired
                .managed_workflow
                .clone()
                .or(prior.managed_workflow.clone()),
            grpc_endpoint: Attr::Unknown,
            http_endpoint: Attr::Unknown,
            ..desired.clone()
        };
        PlannedChange::new(ActionType::Update, planned, changed)
    }

    async fn create(&self, ctx: &Context, planned: ProjectModel) -> Result<ProjectModel> {
        self.validate(&planned)?;
        let name = planned.name.clone();
        let org_id = self
            .resolve_organization(ctx, "create", planned.organization_id.known().map(String::as_str))
            .await?;
        tracing::debug!("Creating project {} in organization {}", name, org_id);

        let request = Project::new(&name, mapper::to_spec(&planned));
        ctx.run(self.client.create_project(&request))
            .await
            .during("create", KIND, &name)?;

        let mut model = planned;
        model.organization_id = Attr::Known(org_id);

        let settled = async {
            self.wait_for_status(ctx, "create", &name, model.wait_for_ready)
                .await?;
            self.fetch(ctx, "create", &name).await
        };
        let project = settled.await.map_err(|e| e.with_partial(&model))?;
        mapper::refresh(&mut model, &project);
        model.settle();

        tracing::info!("Project {} created with status {:?}", name, project.status());
        Ok(model)
    }

    async fn read(&self, ctx: &Context, state: ProjectModel) -> Result<ReadOutcome<ProjectModel>> {
        let name = state.name.clone();
        match self.fetch(ctx, "read", &name).await {
            Ok(project) => {
                let mut model = state;
                mapper::refresh(&mut model, &project);
                Ok(ReadOutcome::Present(model))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("Project {} no longer exists; removing it from state", name);
                Ok(ReadOutcome::Absent)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: ProjectModel,
        prior: &ProjectModel,
    ) -> Result<ProjectModel> {
        self.validate(&planned)?;
        let name = planned.name.clone();
        if let (Some(want), Some(have)) = (planned.organization_id.known(), prior.organization_id.known())
            && want != have
        {
            return Err(ProviderError::validation(
                "organization_id",
                "cannot be changed in place; the project must be replaced",
            ));
        }
        tracing::debug!("Updating project {}", name);

        let mut current = self
            .fetch(ctx, "update", &name)
            .await
            .map_err(ProviderError::into_gone)?;
        mapper::apply_update(&mut current, &planned);
        ctx.run(self.client.update_project(&current))
            .await
            .during("update", KIND, &name)
            .map_err(ProviderError::into_gone)?;

        self.wait_for_status(ctx, "update", &name, planned.wait_for_ready)
            .await?;
        let project = self.fetch(ctx, "update", &name).await?;

        let mut model = planned;
        if !model.organization_id.is_known() {
            model.organization_id = prior.organization_id.clone();
        }
        mapper::refresh(&mut model, &project);
        model.settle();

        tracing::info!("Project {} updated", name);
        Ok(model)
    }

    async fn delete(&self, ctx: &Context, state: &ProjectModel) -> Result<()> {
        let name = state.name.as_str();
        tracing::debug!("Deleting project {}", name);

        match ctx
            .run(self.client.delete_project(name))
            .await
            .during("delete", KIND, name)
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("Project {} already deleted", name);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        self.wait_for_deletion(ctx, name).await?;
        tracing::info!("Project {} deleted", name);
        Ok(())
    }

    /// Import by `name` or `organization_id/name`.
    async fn import(&self, ctx: &Context, id: &str) -> Result<ReadOutcome<ProjectModel>> {
        let (configured, name) = match id.split_once('/') {
            Some((org, name)) => (Some(org), name),
            None => (None, id),
        };
        if name.is_empty() || configured.is_some_and(str::is_empty) {
            return Err(ProviderError::validation(
                "id",
                format!("{:?} is not of the form <name> or <organization_id>/<name>", id),
            ));
        }

        let org_id = self.resolve_organization(ctx, "import", configured).await?;
        let model = ProjectModel::new(name).with_organization(org_id);
        self.read(ctx, model).await
    }

    fn instance_name(model: &ProjectModel) -> &str {
        &model.name
    }
}
