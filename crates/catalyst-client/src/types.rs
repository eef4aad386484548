//! Wire representations of Catalyst API objects
//!
//! Every nested field is optional: the server omits whatever it has not
//! populated yet, and callers must check before dereferencing.

use serde::{Deserialize, Serialize};

/// API group/version for cloud runtime objects
pub const CATALYST_V1BETA1: &str = "cra.diagrid.io/v1beta1";

/// Object kind for regions
pub const KIND_REGION: &str = "Region";

/// Object kind for projects
pub const KIND_PROJECT: &str = "Project";

/// Object metadata shared by all cloud runtime kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            uid: None,
        }
    }
}

/// Progress status of a sub resource (`creating`, `ready`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResourceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============ Region ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<RegionSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RegionStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Server-assigned; must not be sent on update
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub region_type: Option<String>,

    /// Server-managed; must not be sent on update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubResourceStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

impl Region {
    /// Build a region request object for the given name.
    pub fn new(name: impl Into<String>, spec: RegionSpec) -> Self {
        Self {
            api_version: Some(CATALYST_V1BETA1.to_string()),
            kind: Some(KIND_REGION.to_string()),
            metadata: Some(Metadata::named(name)),
            spec: Some(spec),
            status: Some(RegionStatus::default()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    /// Reported lifecycle status, if any
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref()?.status.as_ref()?.status.as_deref()
    }
}

/// Response body of a region creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionResponse {
    #[serde(default)]
    pub join_token: Option<String>,
}

// ============ Project ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ProjectSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pubsub_enabled: Option<bool>,

    #[serde(
        default,
        rename = "defaultKVStoreEnabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_kv_store_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workflow_store_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<ProjectEndpoints>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEndpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<EndpointDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<EndpointDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Project {
    /// Build a project request object for the given name.
    pub fn new(name: impl Into<String>, spec: ProjectSpec) -> Self {
        Self {
            api_version: Some(CATALYST_V1BETA1.to_string()),
            kind: Some(KIND_PROJECT.to_string()),
            metadata: Some(Metadata::named(name)),
            spec: Some(spec),
            status: Some(ProjectStatus::default()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref()?.status.as_deref()
    }

    pub fn grpc_url(&self) -> Option<&str> {
        self.endpoints()?.grpc.as_ref()?.url.as_deref()
    }

    pub fn http_url(&self) -> Option<&str> {
        self.endpoints()?.http.as_ref()?.url.as_deref()
    }

    fn endpoints(&self) -> Option<&ProjectEndpoints> {
        self.status.as_ref()?.endpoints.as_ref()
    }
}

// ============ Organization ============

/// The authenticated principal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub data: Option<UserData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub attributes: Option<UserAttributes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAttributes {
    #[serde(default)]
    pub organization: Option<OrganizationRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationRef {
    #[serde(default)]
    pub id: Option<String>,
}

impl User {
    pub fn organization_id(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .attributes
            .as_ref()?
            .organization
            .as_ref()?
            .id
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub data: OrganizationData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationData {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub attributes: Option<OrganizationAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAttributes {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub products: Option<Products>,
}

/// Per-product subscription attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Products {
    #[serde(default)]
    pub cra: Option<ProductAttributes>,

    #[serde(default)]
    pub mcp: Option<ProductAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    #[serde(default)]
    pub plan: Option<String>,
}

impl Organization {
    pub fn id(&self) -> Option<&str> {
        self.data.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.data.attributes.as_ref()?.name.as_deref()
    }

    /// Plan of the cloud runtime product, absent when not subscribed
    pub fn runtime_plan(&self) -> Option<&str> {
        self.data
            .attributes
            .as_ref()?
            .products
            .as_ref()?
            .cra
            .as_ref()?
            .plan
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_accessors_tolerate_missing_status() {
        let region = Region::new("r1", RegionSpec::default());
        assert_eq!(region.name(), Some("r1"));
        assert_eq!(region.status(), None);
    }

    #[test]
    fn test_region_type_is_renamed_on_the_wire() {
        let spec = RegionSpec {
            region_type: Some("private".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "private" }));
    }

    #[test]
    fn test_project_endpoints_from_json() {
        let project: Project = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "p1" },
            "spec": { "region": "r1", "defaultKVStoreEnabled": true },
            "status": {
                "status": "ready",
                "endpoints": { "grpc": { "url": "grpc://p1" } }
            }
        }))
        .unwrap();

        assert_eq!(project.status(), Some("ready"));
        assert_eq!(project.grpc_url(), Some("grpc://p1"));
        assert_eq!(project.http_url(), None);
        assert_eq!(
            project.spec.unwrap().default_kv_store_enabled,
            Some(true)
        );
    }

    #[test]
    fn test_organization_plan_without_products() {
        let org: Organization = serde_json::from_value(serde_json::json!({
            "data": { "id": "org-1", "attributes": { "name": "acme" } }
        }))
        .unwrap();

        assert_eq!(org.id(), Some("org-1"));
        assert_eq!(org.name(), Some("acme"));
        assert_eq!(org.runtime_plan(), None);
    }
}
