//! Resource and data source contracts
//!
//! These traits are what an orchestration host drives. Each call owns its
//! model; nothing is shared between invocations.

use crate::action::ActionType;
use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Outcome of reading a remote object
///
/// `Absent` is drift, not failure: the host removes the instance from state.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<M> {
    Present(M),
    Absent,
}

impl<M> ReadOutcome<M> {
    pub fn into_option(self) -> Option<M> {
        match self {
            ReadOutcome::Present(m) => Some(m),
            ReadOutcome::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }
}

/// A planned change for one instance
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange<M> {
    pub action: ActionType,

    /// Model handed to create/update; computed attributes may be `Unknown`
    pub planned: M,

    /// User attributes that differ from prior state
    pub changed: Vec<&'static str>,
}

impl<M> PlannedChange<M> {
    pub fn new(action: ActionType, planned: M, changed: Vec<&'static str>) -> Self {
        Self {
            action,
            planned,
            changed,
        }
    }
}

/// A managed resource type
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Clone + Send + Sync + Serialize + DeserializeOwned;

    /// Type name used in state keys (`catalyst_region`)
    const TYPE_NAME: &'static str;

    /// Local validation; runs before any remote call.
    fn validate(&self, desired: &Self::Model) -> Result<()>;

    fn plan(&self, desired: &Self::Model, prior: Option<&Self::Model>)
    -> PlannedChange<Self::Model>;

    async fn create(&self, ctx: &Context, planned: Self::Model) -> Result<Self::Model>;

    async fn read(&self, ctx: &Context, state: Self::Model) -> Result<ReadOutcome<Self::Model>>;

    async fn update(
        &self,
        ctx: &Context,
        planned: Self::Model,
        prior: &Self::Model,
    ) -> Result<Self::Model>;

    async fn delete(&self, ctx: &Context, state: &Self::Model) -> Result<()>;

    /// Hydrate a model from a user-supplied identifier.
    async fn import(&self, ctx: &Context, id: &str) -> Result<ReadOutcome<Self::Model>>;

    /// Name of the instance, used as the state key suffix.
    fn instance_name(model: &Self::Model) -> &str;
}

/// A read-only data source type
#[async_trait]
pub trait DataSource: Send + Sync {
    type Config: Send + Sync;
    type Model: Send + Serialize;

    const TYPE_NAME: &'static str;

    /// `None` when the remote object does not exist.
    async fn read(&self, ctx: &Context, config: &Self::Config) -> Result<Option<Self::Model>>;
}
