//! `catalyst_region` resource and data source

mod data_source;
pub mod mapper;
mod model;
mod resource;

pub use data_source::{Lookup, RegionDataSource, RegionQuery};
pub use model::RegionModel;
pub use resource::{RegionResource, validate_ingress, validate_region};
