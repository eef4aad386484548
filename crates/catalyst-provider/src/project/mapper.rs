//! Project wire object <-> declarative model

use super::model::ProjectModel;
use crate::attr::Attr;
use catalyst_client::{Project, ProjectSpec, ProjectStatus};

pub const READY: &str = "ready";
pub const PROCESSING: &str = "processing";

/// Whether `status` ends a wait.
///
/// Without `wait_for_ready`, `processing` is enough; a project that has
/// already moved on to `ready` also counts.
pub fn is_terminal(status: Option<&str>, wait_for_ready: bool) -> bool {
    match status {
        Some(READY) => true,
        Some(PROCESSING) => !wait_for_ready,
        _ => false,
    }
}

/// Refresh `model` from a server snapshot.
///
/// Feature toggles the server omits become `false`; endpoints are only set
/// once the server reports them. `organization_id` is carried as-is.
pub fn refresh(model: &mut ProjectModel, project: &Project) {
    if let Some(name) = project.name() {
        model.name = name.to_string();
    }

    let spec = project.spec.as_ref();
    if let Some(region) = spec.and_then(|s| s.region.as_deref()) {
        model.region = Attr::Known(region.to_string());
    }

    model.managed_pubsub = Attr::Known(
        spec.and_then(|s| s.default_pubsub_enabled)
            .unwrap_or(false),
    );
    model.managed_kvstore = Attr::Known(
        spec.and_then(|s| s.default_kv_store_enabled)
            .unwrap_or(false),
    );
    model.managed_workflow = Attr::Known(
        spec.and_then(|s| s.default_workflow_store_enabled)
            .unwrap_or(false),
    );

    if let Some(url) = project.grpc_url() {
        model.grpc_endpoint = Attr::Known(url.to_string());
    }
    if let Some(url) = project.http_url() {
        model.http_endpoint = Attr::Known(url.to_string());
    }
}

/// Spec for a create request; unknown toggles are left to the server.
pub fn to_spec(model: &ProjectModel) -> ProjectSpec {
    ProjectSpec {
        display_name: Some(model.name.clone()),
        region: model.region.cloned_known(),
        default_pubsub_enabled: model.managed_pubsub.cloned_known(),
        default_kv_store_enabled: model.managed_kvstore.cloned_known(),
        default_workflow_store_enabled: model.managed_workflow.cloned_known(),
    }
}

/// Overlay planned attributes on a freshly fetched project and clear status.
pub fn apply_update(current: &mut Project, planned: &ProjectModel) {
    let spec = current.spec.get_or_insert_with(ProjectSpec::default);
    spec.display_name = Some(planned.name.clone());
    if let Some(region) = planned.region.known() {
        spec.region = Some(region.clone());
    }
    if let Some(enabled) = planned.managed_pubsub.known() {
        spec.default_pubsub_enabled = Some(*enabled);
    }
    if let Some(enabled) = planned.managed_kvstore.known() {
        spec.default_kv_store_enabled = Some(*enabled);
    }
    if let Some(enabled) = planned.managed_workflow.known() {
        spec.default_workflow_store_enabled = Some(*enabled);
    }
    current.status = Some(ProjectStatus::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_client::{EndpointDetails, ProjectEndpoints};

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal(Some("ready"), true));
        assert!(!is_terminal(Some("processing"), true));
        assert!(is_terminal(Some("processing"), false));
        assert!(is_terminal(Some("ready"), false));
        assert!(!is_terminal(Some("pending"), false));
        assert!(!is_terminal(None, false));
    }

    #[test]
    fn test_each_omitted_toggle_defaults_to_false() {
        let toggles = [
            (Some(true), None, None),
            (None, Some(true), None),
            (None, None, Some(true)),
            (None, None, None),
        ];

        for (pubsub, kv, workflow) in toggles {
            let project = Project::new(
                "p1",
                ProjectSpec {
                    region: Some("r1".to_string()),
                    default_pubsub_enabled: pubsub,
                    default_kv_store_enabled: kv,
                    default_workflow_store_enabled: workflow,
                    ..Default::default()
                },
            );
            let mut model = ProjectModel::new("p1");
            refresh(&mut model, &project);

            assert_eq!(model.managed_pubsub, Attr::Known(pubsub.unwrap_or(false)));
            assert_eq!(model.managed_kvstore, Attr::Known(kv.unwrap_or(false)));
            assert_eq!(model.managed_workflow, Attr::Known(workflow.unwrap_or(false)));
        }
    }

    #[test]
    fn test_endpoints_only_when_present() {
        let mut project = Project::new("p1", ProjectSpec::default());
        let mut model = ProjectModel::new("p1");
        refresh(&mut model, &project);
        assert!(model.grpc_endpoint.is_unset());
        assert!(model.http_endpoint.is_unset());

        project.status = Some(ProjectStatus {
            status: Some("ready".to_string()),
            endpoints: Some(ProjectEndpoints {
                grpc: Some(EndpointDetails {
                    url: Some("grpc-p1.example.com:443".to_string()),
                }),
                http: None,
            }),
        });
        refresh(&mut model, &project);
        assert_eq!(
            model.grpc_endpoint,
            Attr::Known("grpc-p1.example.com:443".to_string())
        );
        assert!(model.http_endpoint.is_unset());
    }

    #[test]
    fn test_create_spec_omits_unknown_toggles() {
        let mut model = ProjectModel::new("p1").with_region("r1");
        model.managed_kvstore = Attr::Known(true);
        model.managed_pubsub = Attr::Unknown;

        let spec = to_spec(&model);
        assert_eq!(spec.display_name.as_deref(), Some("p1"));
        assert_eq!(spec.default_kv_store_enabled, Some(true));
        assert_eq!(spec.default_pubsub_enabled, None);
        assert_eq!(spec.default_workflow_store_enabled, None);
    }
}
