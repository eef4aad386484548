//! Declarative configuration model

use catalyst_config::ProviderBlock;
use serde::{Deserialize, Serialize};

/// A parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// `provider "catalyst"` block (all values optional)
    #[serde(default)]
    pub provider: ProviderBlock,

    /// Regions in declaration order
    #[serde(default)]
    pub regions: Vec<RegionConfig>,

    /// Projects in declaration order
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,

    /// Data sources in declaration order
    #[serde(default)]
    pub data: Vec<DataConfig>,
}

impl Manifest {
    pub fn region(&self, name: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Whether the manifest declares no resources and no data sources
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.projects.is_empty() && self.data.is_empty()
    }
}

/// `region "<name>" { ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,

    pub ingress: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// `project "<name>" { ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_pubsub: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_kvstore: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_workflow: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_ready: Option<bool>,
}

/// How a region data source finds its region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// Fetch by name
    #[default]
    Key,
    /// List all regions and scan
    Scan,
}

/// `data "<type>" "<name>" { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataConfig {
    Organization {
        label: String,
    },
    Region {
        name: String,
        #[serde(default)]
        lookup: LookupStrategy,
    },
    Project {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_id: Option<String>,
    },
}

impl DataConfig {
    /// Data source type name (`organization`, `region`, `project`)
    pub fn kind(&self) -> &'static str {
        match self {
            DataConfig::Organization { .. } => "organization",
            DataConfig::Region { .. } => "region",
            DataConfig::Project { .. } => "project",
        }
    }

    /// Label used to address the data source
    pub fn label(&self) -> &str {
        match self {
            DataConfig::Organization { label } => label,
            DataConfig::Region { name, .. } | DataConfig::Project { name, .. } => name,
        }
    }
}
