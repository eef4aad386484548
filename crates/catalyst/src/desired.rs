//! Manifest entries to desired models

use catalyst_core::{LookupStrategy, Manifest, ProjectConfig, RegionConfig};
use catalyst_provider::{Attr, Lookup, ProjectModel, RegionModel};

pub fn region(config: &RegionConfig) -> RegionModel {
    let mut model = RegionModel::new(&config.name, &config.ingress);
    model.host = Attr::from_option(config.host.clone());
    model.location = Attr::from_option(config.location.clone());
    model
}

pub fn project(config: &ProjectConfig) -> ProjectModel {
    ProjectModel {
        organization_id: Attr::from_option(config.organization_id.clone()),
        region: Attr::from_option(config.region.clone()),
        managed_pubsub: Attr::from_option(config.managed_pubsub),
        managed_kvstore: Attr::from_option(config.managed_kvstore),
        managed_workflow: Attr::from_option(config.managed_workflow),
        wait_for_ready: config.wait_for_ready.unwrap_or(true),
        ..ProjectModel::new(&config.name)
    }
}

pub fn regions(manifest: &Manifest) -> Vec<RegionModel> {
    manifest.regions.iter().map(region).collect()
}

pub fn projects(manifest: &Manifest) -> Vec<ProjectModel> {
    manifest.projects.iter().map(project).collect()
}

pub fn lookup(strategy: LookupStrategy) -> Lookup {
    match strategy {
        LookupStrategy::Key => Lookup::ByName,
        LookupStrategy::Scan => Lookup::Scan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_optional_fields_stay_unset() {
        let model = region(&RegionConfig {
            name: "r1".to_string(),
            ingress: "https://*.x.io:443".to_string(),
            host: None,
            location: Some("us-west-1".to_string()),
        });

        assert_eq!(model.ingress, Attr::Known("https://*.x.io:443".to_string()));
        assert!(model.host.is_unset());
        assert_eq!(model.location, Attr::Known("us-west-1".to_string()));
        assert!(!model.join_token.is_known());
    }

    #[test]
    fn test_project_defaults() {
        let model = project(&ProjectConfig {
            name: "p1".to_string(),
            region: Some("r1".to_string()),
            managed_kvstore: Some(false),
            ..Default::default()
        });

        assert!(model.wait_for_ready);
        assert!(model.organization_id.is_unset());
        assert!(model.managed_pubsub.is_unset());
        assert_eq!(model.managed_kvstore, Attr::Known(false));
    }
}
