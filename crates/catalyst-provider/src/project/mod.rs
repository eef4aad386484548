//! `catalyst_project` resource and data source

mod data_source;
pub mod mapper;
mod model;
mod resource;

pub use data_source::{ProjectDataSource, ProjectQuery};
pub use model::ProjectModel;
pub use resource::{ProjectResource, validate_project};
