//! Region reconciler
//!
//! `absent -> creating -> ready -> updating -> ready -> deleting -> absent`.
//! Every mutation waits for the server to report `ready` (or, for delete,
//! not-found) before the refreshed model is returned.

use super::mapper;
use super::model::RegionModel;
use crate::action::ActionType;
use crate::attr::{Attr, WriteOnce};
use crate::context::Context;
use crate::error::{During, ProviderError, Result};
use crate::resource::{PlannedChange, ReadOutcome, Resource};
use crate::wait::{DEFAULT_POLL_INTERVAL, wait_until};
use async_trait::async_trait;
use catalyst_client::{ClientError, Region, RegionApi};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

const KIND: &str = "region";
const READY: &str = "ready";

static INGRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://\*\.[^:]+:\d+$").expect("ingress pattern is a valid regex")
});

const INGRESS_MESSAGE: &str =
    "must start with http://*. or https://*., contain a hostname, and include a port";

/// Check an ingress value against `^https?://\*\.[^:]+:\d+$`.
pub fn validate_ingress(ingress: &str) -> Result<()> {
    if INGRESS_PATTERN.is_match(ingress) {
        Ok(())
    } else {
        Err(ProviderError::validation(
            "ingress",
            format!("{:?} {}", ingress, INGRESS_MESSAGE),
        ))
    }
}

/// Local checks for a declared region; no remote calls.
pub fn validate_region(desired: &RegionModel) -> Result<()> {
    if desired.name.is_empty() {
        return Err(ProviderError::validation("name", "must not be empty"));
    }
    match desired.ingress.known() {
        Some(ingress) => validate_ingress(ingress),
        None => Err(ProviderError::validation("ingress", "is required")),
    }
}

pub struct RegionResource<C: ?Sized> {
    client: Arc<C>,
    poll_interval: Duration,
}

impl<C: RegionApi + ?Sized> RegionResource<C> {
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

    async fn fetch(&self, ctx: &Context, op: &'static str, name: &str) -> Result<Region> {
        ctx.run(self.client.get_region(name))
            .await
            .during(op, KIND, name)
    }

    async fn wait_for_ready(&self, ctx: &Context, op: &'static str, name: &str) -> Result<()> {
        let client = &*self.client;
        wait_until(ctx, self.poll_interval, move || async move {
            let region = client.get_region(name).await?;
            match region.status() {
                Some(READY) => Ok(true),
                status => {
                    tracing::debug!(
                        "Region {} status is {:?}, waiting for {}",
                        name,
                        status,
                        READY
                    );
                    Ok::<_, ClientError>(false)
                }
            }
        })
        .await
        .during(op, KIND, name)
    }

    async fn wait_for_deletion(&self, ctx: &Context, name: &str) -> Result<()> {
        let client = &*self.client;
        wait_until(ctx, self.poll_interval, move || async move {
            match client.get_region(name).await {
                Ok(region) => {
                    tracing::debug!(
                        "Region {} still present with status {:?}",
                        name,
                        region.status()
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

#[async_trait]
impl<C: RegionApi + ?Sized + 'static> Resource for RegionResource<C> {
    type Model = RegionModel;

    const TYPE_NAME: &'static str = "catalyst_region";

    fn validate(&self, desired: &RegionModel) -> Result<()> {
        validate_region(desired)
    }

    fn plan(&self, desired: &RegionModel, prior: Option<&RegionModel>) -> PlannedChange<RegionModel> {
        let Some(prior) = prior else {
            let planned = RegionModel {
                region_type: Attr::Unknown,
                connected: Attr::Unknown,
                join_token: WriteOnce::unknown(),
                ..desired.clone()
            };
            return PlannedChange::new(ActionType::Create, planned, Vec::new());
        };

        if desired.name != prior.name {
            let planned = RegionModel {
                region_type: Attr::Unknown,
                connected: Attr::Unknown,
                join_token: WriteOnce::unknown(),
                ..desired.clone()
            };
            return PlannedChange::new(ActionType::Replace, planned, vec!["name"]);
        }

        let mut changed = Vec::new();
        if desired.host != prior.host {
            changed.push("host");
        }
        if desired.ingress != prior.ingress {
            changed.push("ingress");
        }
        if desired.location != prior.location {
            changed.push("location");
        }

        if changed.is_empty() {
            return PlannedChange::new(ActionType::NoOp, prior.clone(), changed);
        }

        let planned = RegionModel {
            region_type: Attr::Unknown,
            connected: Attr::Unknown,
            join_token: prior.join_token.clone(),
            ..desired.clone()
        };
        PlannedChange::new(ActionType::Update, planned, changed)
    }

    async fn create(&self, ctx: &Context, planned: RegionModel) -> Result<RegionModel> {
        self.validate(&planned)?;
        let name = planned.name.clone();
        tracing::debug!("Creating region {}", name);

        let request = Region::new(&name, mapper::to_spec(&planned));
        let join_token = ctx
            .run(self.client.create_region(&request))
            .await
            .during("create", KIND, &name)?;

        let mut model = RegionModel {
            join_token: WriteOnce::unknown(),
            ..planned
        };
        model.join_token.capture(join_token);

        // The join token is never handed out again, so a failure from here
        // on carries the model with it.
        let settled = async {
            self.wait_for_ready(ctx, "create", &name).await?;
            self.fetch(ctx, "create", &name).await
        };
        let region = settled.await.map_err(|e| e.with_partial(&model))?;
        mapper::refresh(&mut model, &region);
        model.settle();

        tracing::info!("Region {} is ready", name);
        Ok(model)
    }

    async fn read(&self, ctx: &Context, state: RegionModel) -> Result<ReadOutcome<RegionModel>> {
        let name = state.name.clone();
        match self.fetch(ctx, "read", &name).await {
            Ok(region) => {
                let mut model = state;
                mapper::refresh(&mut model, &region);
                Ok(ReadOutcome::Present(model))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("Region {} no longer exists; removing it from state", name);
                Ok(ReadOutcome::Absent)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: RegionModel,
        prior: &RegionModel,
    ) -> Result<RegionModel> {
        self.validate(&planned)?;
        let name = planned.name.clone();
        tracing::debug!("Updating region {}", name);

        let mut current = self
            .fetch(ctx, "update", &name)
            .await
            .map_err(ProviderError::into_gone)?;
        mapper::apply_update(&mut current, &planned);
        ctx.run(self.client.update_region(&current))
            .await
            .during("update", KIND, &name)
            .map_err(ProviderError::into_gone)?;

        self.wait_for_ready(ctx, "update", &name).await?;
        let region = self.fetch(ctx, "update", &name).await?;

        let mut model = planned;
        if !model.join_token.is_known() {
            model.join_token = prior.join_token.clone();
        }
        mapper::refresh(&mut model, &region);
        model.settle();

        tracing::info!("Region {} updated", name);
        Ok(model)
    }

    async fn delete(&self, ctx: &Context, state: &RegionModel) -> Result<()> {
        let name = state.name.as_str();
        tracing::debug!("Deleting region {}", name);

        match ctx
            .run(self.client.delete_region(name))
            .await
            .during("delete", KIND, name)
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("Region {} already deleted", name);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        self.wait_for_deletion(ctx, name).await?;
        tracing::info!("Region {} deleted", name);
        Ok(())
    }

    async fn import(&self, ctx: &Context, id: &str) -> Result<ReadOutcome<RegionModel>> {
        if id.is_empty() {
            return Err(ProviderError::validation("id", "region name must not be empty"));
        }
        let model = RegionModel {
            name: id.to_string(),
            ..Default::default()
        };
        self.read(ctx, model).await
    }

    fn instance_name(model: &RegionModel) -> &str {
        &model.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_client::{Call, Fault, MockCatalyst, Op, RegionSpec};

    const INTERVAL: Duration = Duration::from_millis(10);

    fn resource(api: &Arc<MockCatalyst>) -> RegionResource<MockCatalyst> {
        RegionResource::new(api.clone()).with_poll_interval(INTERVAL)
    }

    fn desired() -> RegionModel {
        RegionModel::new("r1", "https://*.x.io:443")
            .with_host("h1")
            .with_location("us-west-1")
    }

    async fn created(api: &Arc<MockCatalyst>) -> RegionModel {
        let regions = resource(api);
        let change = regions.plan(&desired(), None);
        regions
            .create(&Context::background(), change.planned)
            .await
            .unwrap()
    }

    #[test]
    fn test_ingress_validation() {
        assert!(validate_ingress("https://*.x.io:443").is_ok());
        assert!(validate_ingress("http://*.local:8080").is_ok());

        for bad in [
            "https://x.io:443",
            "https://*.x.io",
            "ftp://*.x.io:21",
            "https://*.x.io:port",
        ] {
            let err = validate_ingress(bad).unwrap_err();
            assert!(err.to_string().contains(INGRESS_MESSAGE), "{}", bad);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_for_ready_then_reads() {
        let api = Arc::new(
            MockCatalyst::builder()
                .region_progression(["creating", "creating", "creating", "ready"])
                .build(),
        );

        let model = created(&api).await;

        assert_eq!(model.name, "r1");
        assert_eq!(model.ingress, Attr::Known("https://*.x.io:443".to_string()));
        assert_eq!(model.host, Attr::Known("h1".to_string()));
        assert_eq!(model.location, Attr::Known("us-west-1".to_string()));
        assert_eq!(model.connected, Attr::Known(false));
        assert_eq!(model.region_type, Attr::Known("private".to_string()));
        assert!(model.join_token.is_known());
        assert_eq!(api.count(Op::GetRegion), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_ingress_makes_no_remote_call() {
        let api = Arc::new(MockCatalyst::builder().build());
        let regions = resource(&api);
        let planned = regions
            .plan(&RegionModel::new("r1", "https://x.io"), None)
            .planned;

        let err = regions
            .create(&Context::background(), planned)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Validation { field: "ingress", .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_token_survives_read_and_update() {
        let api = Arc::new(MockCatalyst::builder().build());
        let regions = resource(&api);
        let ctx = Context::background();

        let state = created(&api).await;
        let token = state.join_token.get().cloned();
        assert!(token.is_some());

        let state = regions.read(&ctx, state).await.unwrap().into_option().unwrap();
        assert_eq!(state.join_token.get().cloned(), token);

        let desired = desired().with_host("h2");
        let change = regions.plan(&desired, Some(&state));
        assert_eq!(change.action, ActionType::Update);
        assert_eq!(change.changed, vec!["host"]);

        let state = regions.update(&ctx, change.planned, &state).await.unwrap();
        assert_eq!(state.join_token.get().cloned(), token);
        assert_eq!(state.host, Attr::Known("h2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_clears_clusters_and_type() {
        let mut existing = Region::new(
            "r1",
            RegionSpec {
                ingress: Some("https://*.x.io:443".to_string()),
                region_type: Some("shared".to_string()),
                clusters: Some(vec!["c1".to_string(), "c2".to_string()]),
                ..Default::default()
            },
        );
        existing.status = None;
        let api = Arc::new(MockCatalyst::builder().with_region(existing).build());
        let regions = resource(&api);

        let prior = RegionModel::new("r1", "https://*.x.io:443");
        let planned = regions.plan(&desired(), Some(&prior)).planned;
        regions
            .update(&Context::background(), planned, &prior)
            .await
            .unwrap();

        let sent = api
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::UpdateRegion(region) => Some(region),
                _ => None,
            })
            .unwrap();
        let spec = sent.spec.unwrap();
        assert_eq!(spec.clusters, None);
        assert_eq!(spec.region_type, None);
        assert_eq!(spec.host.as_deref(), Some("h1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_then_read_is_absent() {
        let api = Arc::new(MockCatalyst::builder().delete_after(3).build());
        let regions = resource(&api);
        let ctx = Context::background();

        let state = created(&api).await;
        regions.delete(&ctx, &state).await.unwrap();

        let outcome = regions.read(&ctx, state).await.unwrap();
        assert!(outcome.is_absent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_of_missing_region_is_success() {
        let api = Arc::new(MockCatalyst::builder().build());
        let regions = resource(&api);

        regions
            .delete(&Context::background(), &desired())
            .await
            .unwrap();
        assert_eq!(api.count(Op::GetRegion), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_is_propagated() {
        let api = Arc::new(
            MockCatalyst::builder()
                .region_progression(["creating", "ready"])
                .build(),
        );
        api.fail_next(Op::GetRegion, Fault::server_error());
        let regions = resource(&api);

        let planned = regions.plan(&desired(), None).planned;
        let err = regions
            .create(&Context::background(), planned)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("failed to create region r1"));
        assert_eq!(api.count(Op::GetRegion), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_times_out_when_never_ready() {
        let api = Arc::new(MockCatalyst::builder().region_progression(["creating"]).build());
        let regions = resource(&api);
        let ctx = Context::background().with_timeout(Duration::from_secs(1));

        let planned = regions.plan(&desired(), None).planned;
        let err = regions.create(&ctx, planned).await.unwrap_err();

        assert_eq!(
            err.context_error(),
            Some(crate::error::ContextError::DeadlineExceeded)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_create_keeps_join_token() {
        let api = Arc::new(MockCatalyst::builder().region_progression(["creating"]).build());
        let regions = resource(&api);
        let ctx = Context::background().with_timeout(Duration::from_secs(1));

        let planned = regions.plan(&desired(), None).planned;
        let err = regions.create(&ctx, planned).await.unwrap_err();

        assert_eq!(
            err.context_error(),
            Some(crate::error::ContextError::DeadlineExceeded)
        );
        let partial: RegionModel = err.partial_state().unwrap();
        assert_eq!(partial.name, "r1");
        assert!(partial.join_token.is_known());
        assert!(partial.region_type.is_unset());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_after_out_of_band_delete_is_absent() {
        let api = Arc::new(MockCatalyst::builder().build());
        let regions = resource(&api);
        let state = created(&api).await;

        api.drop_region("r1");

        let outcome = regions.read(&Context::background(), state).await.unwrap();
        assert!(outcome.is_absent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_of_vanished_region_is_gone() {
        let api = Arc::new(MockCatalyst::builder().build());
        let regions = resource(&api);
        let state = created(&api).await;
        api.drop_region("r1");

        let planned = regions.plan(&desired().with_host("h2"), Some(&state)).planned;
        let err = regions
            .update(&Context::background(), planned, &state)
            .await
            .unwrap_err();

        assert!(err.is_gone());
        assert_eq!(api.count(Op::UpdateRegion), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_excludes_join_token() {
        let api = Arc::new(MockCatalyst::builder().build());
        let original = created(&api).await;
        let regions = resource(&api);

        let imported = regions
            .import(&Context::background(), "r1")
            .await
            .unwrap()
            .into_option()
            .unwrap();

        assert!(!imported.join_token.is_known());
        let mut comparable = original.clone();
        comparable.join_token = WriteOnce::unset();
        assert_eq!(imported, comparable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_of_missing_region_is_absent() {
        let api = Arc::new(MockCatalyst::builder().build());
        let outcome = resource(&api)
            .import(&Context::background(), "nope")
            .await
            .unwrap();
        assert!(outcome.is_absent());
    }

    #[test]
    fn test_plan_without_changes_is_noop() {
        let api = Arc::new(MockCatalyst::builder().build());
        let regions = resource(&api);
        let mut prior = desired();
        prior.connected = Attr::Known(true);

        let change = regions.plan(&desired(), Some(&prior));
        assert_eq!(change.action, ActionType::NoOp);
        assert_eq!(change.planned, prior);
    }

    #[test]
    fn test_plan_create_marks_computed_unknown() {
        let api = Arc::new(MockCatalyst::builder().build());
        let change = resource(&api).plan(&desired(), None);

        assert_eq!(change.action, ActionType::Create);
        assert!(change.planned.region_type.is_unknown());
        assert!(change.planned.connected.is_unknown());
        assert!(change.planned.join_token.is_unknown());
    }
}
