//! Region wire object <-> declarative model

use super::model::RegionModel;
use crate::attr::Attr;
use catalyst_client::{Region, RegionSpec};

/// Refresh `model` from a server snapshot.
///
/// Host and location are only taken when non-empty, `connected` falls back
/// to `false`, and the join token is never touched.
pub fn refresh(model: &mut RegionModel, region: &Region) {
    if let Some(name) = region.name() {
        model.name = name.to_string();
    }

    let spec = region.spec.as_ref();
    if let Some(ingress) = spec.and_then(|s| s.ingress.as_deref()) {
        model.ingress = Attr::Known(ingress.to_string());
    }
    if let Some(host) = spec.and_then(|s| non_empty(s.host.as_deref())) {
        model.host = Attr::Known(host.to_string());
    }
    if let Some(location) = spec.and_then(|s| non_empty(s.location.as_deref())) {
        model.location = Attr::Known(location.to_string());
    }
    if let Some(region_type) = spec.and_then(|s| non_empty(s.region_type.as_deref())) {
        model.region_type = Attr::Known(region_type.to_string());
    }

    let connected = region
        .status
        .as_ref()
        .and_then(|s| s.connected)
        .unwrap_or(false);
    model.connected = Attr::Known(connected);
}

/// Spec for a create request
pub fn to_spec(model: &RegionModel) -> RegionSpec {
    RegionSpec {
        host: model.host.cloned_known(),
        ingress: model.ingress.cloned_known(),
        location: model.location.cloned_known(),
        region_type: None,
        clusters: None,
    }
}

/// Overlay planned user attributes on a freshly fetched region.
///
/// Cluster list and type are server-managed and rejected on update, so they
/// are cleared. Unset host or location is sent as empty to clear it.
pub fn apply_update(current: &mut Region, planned: &RegionModel) {
    let spec = current.spec.get_or_insert_with(RegionSpec::default);
    spec.clusters = None;
    spec.region_type = None;
    spec.host = Some(planned.host.cloned_known().unwrap_or_default());
    spec.location = Some(planned.location.cloned_known().unwrap_or_default());
    if let Some(ingress) = planned.ingress.known() {
        spec.ingress = Some(ingress.clone());
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_client::{RegionStatus, SubResourceStatus};

    fn server_region() -> Region {
        let mut region = Region::new(
            "r1",
            RegionSpec {
                host: Some("h1".to_string()),
                ingress: Some("https://*.x.io:443".to_string()),
                location: Some("us-west-1".to_string()),
                region_type: Some("private".to_string()),
                clusters: Some(vec!["c1".to_string()]),
            },
        );
        region.status = Some(RegionStatus {
            status: Some(SubResourceStatus {
                status: Some("ready".to_string()),
                message: None,
            }),
            connected: None,
        });
        region
    }

    #[test]
    fn test_refresh_defaults_connected_to_false() {
        let mut model = RegionModel::default();
        refresh(&mut model, &server_region());

        assert_eq!(model.name, "r1");
        assert_eq!(model.host, Attr::Known("h1".to_string()));
        assert_eq!(model.region_type, Attr::Known("private".to_string()));
        assert_eq!(model.connected, Attr::Known(false));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let region = server_region();
        let mut once = RegionModel::default();
        refresh(&mut once, &region);
        let mut twice = once.clone();
        refresh(&mut twice, &region);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_refresh_tolerates_missing_spec_and_status() {
        let mut model = RegionModel::new("r1", "https://*.x.io:443");
        let region = Region {
            spec: None,
            status: None,
            ..Region::default()
        };
        refresh(&mut model, &region);

        assert_eq!(model.name, "r1");
        assert_eq!(model.ingress, Attr::Known("https://*.x.io:443".to_string()));
        assert_eq!(model.connected, Attr::Known(false));
    }

    #[test]
    fn test_refresh_keeps_join_token() {
        let mut model = RegionModel::new("r1", "https://*.x.io:443");
        model.join_token.capture("jt-1".to_string());
        refresh(&mut model, &server_region());

        assert_eq!(model.join_token.get().map(String::as_str), Some("jt-1"));
    }

    #[test]
    fn test_empty_host_is_ignored() {
        let mut region = server_region();
        if let Some(spec) = region.spec.as_mut() {
            spec.host = Some(String::new());
        }
        let mut model = RegionModel::default();
        refresh(&mut model, &region);

        assert!(model.host.is_unset());
    }

    #[test]
    fn test_apply_update_clears_server_managed_fields() {
        let mut current = server_region();
        let planned = RegionModel::new("r1", "https://*.y.io:8443").with_host("h2");
        apply_update(&mut current, &planned);

        let spec = current.spec.unwrap();
        assert_eq!(spec.clusters, None);
        assert_eq!(spec.region_type, None);
        assert_eq!(spec.host.as_deref(), Some("h2"));
        assert_eq!(spec.location.as_deref(), Some(""));
        assert_eq!(spec.ingress.as_deref(), Some("https://*.y.io:8443"));
    }
}
