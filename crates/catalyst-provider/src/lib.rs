//! Catalyst provider core
//!
//! Reconciles declared regions and projects against the Catalyst API and
//! projects remote objects into data sources.
//!
//! ```text
//!  desired model ──plan──▶ PlannedChange ──create/update/delete──▶ CatalystClient
//!        ▲                                        │
//!        └──────────── mapper::refresh ◀── wait_until(ctx, ..) ◀──┘
//! ```
//!
//! Every remote call is raced against a [`Context`], so cancelling the
//! context or passing its deadline stops an operation, including a poll in
//! progress.

pub mod action;
pub mod attr;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod organization;
pub mod project;
pub mod provider;
pub mod region;
pub mod resource;
pub mod state;
pub mod wait;

pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use attr::{Attr, WriteOnce};
pub use context::Context;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ContextError, ProviderError, Result};
pub use organization::{OrganizationDataSource, OrganizationModel};
pub use project::{
    ProjectDataSource, ProjectModel, ProjectQuery, ProjectResource, validate_project,
};
pub use provider::{CatalystProvider, ClientFactory, HttpClientFactory};
pub use region::{
    Lookup, RegionDataSource, RegionModel, RegionQuery, RegionResource, validate_ingress,
    validate_region,
};
pub use resource::{DataSource, PlannedChange, ReadOutcome, Resource};
pub use state::{GlobalState, ResourceState, StateLock, StateManager};
pub use wait::{DEFAULT_POLL_INTERVAL, WaitError, wait_until};
