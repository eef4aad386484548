//! Local state store
//!
//! Persists the last applied model of every managed instance in
//! `.catalyst/state.json`, keyed `<type>.<name>` (`catalyst_region.r1`).
//! The previous file is kept as `state.json.backup` and concurrent writers
//! are excluded with a lock file.

use crate::error::{ProviderError, Result};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
pub const STATE_DIR: &str = ".catalyst";
const STATE_FILE: &str = "state.json";
const BACKUP_SUFFIX: &str = "backup";
const LOCK_FILE: &str = "state.lock";
const STALE_LOCK_HOURS: i64 = 1;

/// State key for an instance
pub fn state_key(type_name: &str, name: &str) -> String {
    format!("{}.{}", type_name, name)
}

/// Every managed instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    pub version: u32,

    pub updated_at: DateTime<Utc>,

    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Store `model` under its type and name, keeping the creation time.
    pub fn put<R: Resource>(&mut self, model: &R::Model) -> Result<()> {
        let name = R::instance_name(model);
        let key = state_key(R::TYPE_NAME, name);
        let attributes = serde_json::to_value(model)?;
        let now = Utc::now();

        match self.resources.get_mut(&key) {
            Some(existing) => {
                existing.attributes = attributes;
                existing.updated_at = now;
            }
            None => {
                self.resources.insert(
                    key,
                    ResourceState {
                        resource_type: R::TYPE_NAME.to_string(),
                        name: name.to_string(),
                        attributes,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        self.updated_at = now;
        Ok(())
    }

    /// Stored model for `name`, if any.
    pub fn get<R: Resource>(&self, name: &str) -> Result<Option<R::Model>> {
        self.resources
            .get(&state_key(R::TYPE_NAME, name))
            .map(|entry| entry.model::<R>())
            .transpose()
    }

    /// Every stored model of type `R`, in name order.
    pub fn all<R: Resource>(&self) -> Result<Vec<R::Model>> {
        self.of_type(R::TYPE_NAME)
            .map(|entry| entry.model::<R>())
            .collect()
    }

    pub fn remove<R: Resource>(&mut self, name: &str) -> Option<ResourceState> {
        let removed = self.resources.remove(&state_key(R::TYPE_NAME, name));
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a ResourceState> {
        self.resources
            .values()
            .filter(move |entry| entry.resource_type == type_name)
    }
}

/// A single stored instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    pub resource_type: String,

    pub name: String,

    /// Serialized model; unknown values are never stored
    pub attributes: serde_json::Value,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn model<R: Resource>(&self) -> Result<R::Model> {
        serde_json::from_value(self.attributes.clone()).map_err(|e| {
            ProviderError::State(format!(
                "cannot decode {}: {}",
                state_key(&self.resource_type, &self.name),
                e
            ))
        })
    }
}

/// Reads and writes the state file
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// State file at `<root>/.catalyst/state.json`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::at(project_root.as_ref().join(STATE_DIR).join(STATE_FILE))
    }

    /// State file at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".");
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the state; a missing file is an empty state.
    pub async fn load(&self) -> Result<GlobalState> {
        if !self.path.exists() {
            tracing::debug!("State file not found, starting from empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(ProviderError::State(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let backup = self.backup_path();
        if self.path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&self.path, &backup).await?;
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Take the state lock, replacing one older than an hour.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < STALE_LOCK_HOURS {
                return Err(ProviderError::Lock(format!(
                    "State is locked by {} (pid {}) since {}",
                    lock_info.holder, lock_info.pid, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale state lock held by {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        fs::write(&lock_path, serde_json::to_string_pretty(&lock_info)?).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// Held state lock; removed on release or drop
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
