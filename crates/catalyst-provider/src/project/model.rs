use crate::attr::Attr;
use serde::{Deserialize, Serialize};

fn default_wait_for_ready() -> bool {
    true
}

/// Declarative model of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    /// Organization scope; part of the project identity
    #[serde(default)]
    pub organization_id: Attr<String>,

    pub name: String,

    /// Region the project runs in
    #[serde(default)]
    pub region: Attr<String>,

    #[serde(default)]
    pub managed_pubsub: Attr<bool>,

    #[serde(default)]
    pub managed_kvstore: Attr<bool>,

    #[serde(default)]
    pub managed_workflow: Attr<bool>,

    #[serde(default)]
    pub grpc_endpoint: Attr<String>,

    #[serde(default)]
    pub http_endpoint: Attr<String>,

    /// Wait for `ready` instead of accepting `processing`
    #[serde(default = "default_wait_for_ready")]
    pub wait_for_ready: bool,
}

impl Default for ProjectModel {
    fn default() -> Self {
        Self {
            organization_id: Attr::Unset,
            name: String::new(),
            region: Attr::Unset,
            managed_pubsub: Attr::Unset,
            managed_kvstore: Attr::Unset,
            managed_workflow: Attr::Unset,
            grpc_endpoint: Attr::Unset,
            http_endpoint: Attr::Unset,
            wait_for_ready: default_wait_for_ready(),
        }
    }
}

impl ProjectModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Attr::Known(region.into());
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Attr::Known(organization_id.into());
        self
    }

    pub(crate) fn settle(&mut self) {
        self.organization_id.settle();
        self.managed_pubsub.settle();
        self.managed_kvstore.settle();
        self.managed_workflow.settle();
        self.grpc_endpoint.settle();
        self.http_endpoint.settle();
    }
}
