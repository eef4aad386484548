//! Catalyst manifest
//!
//! The declarative configuration surface: a KDL document with one optional
//! `provider` block plus `region`, `project` and `data` nodes.
//!
//! ```kdl
//! provider "catalyst" {
//!     endpoint "https://api.diagrid.io"
//! }
//!
//! region "r1" {
//!     ingress "https://*.example.com:443"
//!     location "us-west-1"
//! }
//!
//! project "p1" {
//!     region "r1"
//!     managed_pubsub #true
//! }
//!
//! data "organization" "current"
//! ```

pub mod error;
pub mod model;
pub mod parser;

pub use error::{ManifestError, Result};
pub use model::{DataConfig, LookupStrategy, Manifest, ProjectConfig, RegionConfig};
pub use parser::{parse_manifest, parse_manifest_file};
