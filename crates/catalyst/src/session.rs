//! Manifest, state store and provider for one invocation

use anyhow::Context as _;
use catalyst_core::Manifest;
use catalyst_provider::{CatalystProvider, HttpClientFactory, StateManager};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub struct Session {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub store: StateManager,
}

impl Session {
    /// Load the manifest (explicit path or discovery) and locate the state
    /// file, next to the manifest unless `state` is given.
    pub fn load(manifest: Option<&Path>, state: Option<&Path>) -> anyhow::Result<Self> {
        let manifest_path = match manifest {
            Some(path) => path.to_path_buf(),
            None => catalyst_config::find_manifest()?,
        };
        tracing::debug!("Using manifest {}", manifest_path.display());

        let manifest = catalyst_core::parse_manifest_file(&manifest_path)
            .with_context(|| format!("failed to load {}", manifest_path.display()))?;

        let store = match state {
            Some(path) => StateManager::at(path),
            None => StateManager::new(manifest_path.parent().unwrap_or(Path::new("."))),
        };

        Ok(Self {
            manifest,
            manifest_path,
            store,
        })
    }

    pub fn provider(&self) -> anyhow::Result<CatalystProvider> {
        CatalystProvider::configure(&self.manifest.provider, &HttpClientFactory).map_err(|d| {
            anyhow::anyhow!("provider configuration failed\n{}", d)
        })
    }

    pub fn print_header(&self) {
        println!(
            "Manifest: {}",
            self.manifest_path.display().to_string().cyan()
        );
        println!("State:    {}", self.store.path().display().to_string().cyan());
    }
}
