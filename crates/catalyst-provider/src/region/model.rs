use crate::attr::{Attr, WriteOnce};
use serde::{Deserialize, Serialize};

/// Declarative model of a region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionModel {
    /// Immutable after creation
    pub name: String,

    #[serde(default)]
    pub host: Attr<String>,

    /// `http(s)://*.<hostname>:<port>`; canonicalised by the API
    #[serde(default)]
    pub ingress: Attr<String>,

    #[serde(default)]
    pub location: Attr<String>,

    /// Server-assigned
    #[serde(default, rename = "type")]
    pub region_type: Attr<String>,

    /// Returned once by create and never again
    #[serde(default)]
    pub join_token: WriteOnce<String>,

    /// Server-reported
    #[serde(default)]
    pub connected: Attr<bool>,
}

impl RegionModel {
    pub fn new(name: impl Into<String>, ingress: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingress: Attr::Known(ingress.into()),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Attr::Known(host.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Attr::Known(location.into());
        self
    }

    /// Resolve any computed attribute the server never reported.
    pub(crate) fn settle(&mut self) {
        self.region_type.settle();
        self.connected.settle();
        self.join_token.settle();
    }
}
