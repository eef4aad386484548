//! Catalyst API client
//!
//! Remote API collaborator of the Catalyst provider: wire types for regions,
//! projects and organizations, one capability trait per resource family and
//! an HTTP implementation of all of them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │             catalyst-provider             │
//! │   reconcilers / data sources / poller     │
//! └─────────────────────┬─────────────────────┘
//!                       │  trait CatalystClient
//!        ┌──────────────┼───────────────┐
//!        │              │               │
//!   RegionApi      ProjectApi     OrganizationApi
//!        │              │               │
//!        └──────┬───────┴───────┬───────┘
//!               │               │
//!        ┌──────▼──────┐ ┌──────▼──────┐
//!        │ HttpClient  │ │MockCatalyst │
//!        │  (reqwest)  │ │ (feature    │
//!        │             │ │  "mock")    │
//!        └─────────────┘ └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use catalyst_client::{ClientConfig, HttpClient, RegionApi};
//!
//! let client = HttpClient::new(ClientConfig::new("https://api.diagrid.io", api_key))?;
//! match client.get_region("r1").await {
//!     Ok(region) => println!("{:?}", region.status()),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(e) => return Err(e),
//! }
//! ```

pub mod api;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;

// Re-exports
pub use api::{CatalystClient, OrganizationApi, ProjectApi, RegionApi};
pub use error::{ClientError, Result};
pub use http::{ClientConfig, HttpClient, RetryConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::{Call, Fault, MockCatalyst, MockCatalystBuilder, Op};
pub use types::{
    EndpointDetails, Metadata, Organization, Project, ProjectEndpoints, ProjectSpec,
    ProjectStatus, Region, RegionSpec, RegionStatus, SubResourceStatus, User,
};
