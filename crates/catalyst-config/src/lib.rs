pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{
    API_KEY_ENV, ENDPOINT_ENV, PROD_API_ENDPOINT, ProviderBlock, ProviderSettings,
};

use std::path::{Path, PathBuf};

/// Environment variable naming a manifest directly
pub const CONFIG_PATH_ENV: &str = "CATALYST_CONFIG_PATH";

const MANIFEST_CANDIDATES: [&str; 2] = ["catalyst.local.kdl", "catalyst.kdl"];
const PROJECT_DIR: &str = ".catalyst";

/// Global Catalyst config directory (`~/.config/catalyst`)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("catalyst");

    Ok(config_dir)
}

/// Find the manifest for the current directory.
///
/// Search order:
/// 1. `CATALYST_CONFIG_PATH`
/// 2. current directory: `catalyst.local.kdl`, `catalyst.kdl`
/// 3. `./.catalyst/` with the same candidates
/// 4. `~/.config/catalyst/catalyst.kdl`
pub fn find_manifest() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::debug!(
            "{} points at a missing file: {}",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_manifest_in(&current_dir) {
        return Ok(path);
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join("catalyst.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ManifestNotFound)
}

/// Look for a manifest in `dir` and its `.catalyst/` subdirectory.
pub fn find_manifest_in(dir: &Path) -> Option<PathBuf> {
    let project_dir = dir.join(PROJECT_DIR);
    let search = [dir.to_path_buf(), project_dir];

    search
        .iter()
        .filter(|d| d.is_dir())
        .flat_map(|d| MANIFEST_CANDIDATES.iter().map(move |f| d.join(f)))
        .find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_manifest_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("catalyst.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("catalyst.local.kdl"), "// local").unwrap();

        let result = find_manifest_in(temp_dir.path()).unwrap();
        assert!(result.ends_with("catalyst.local.kdl"));
    }

    #[test]
    fn test_find_manifest_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join(".catalyst");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("catalyst.kdl"), "// nested").unwrap();

        let result = find_manifest_in(temp_dir.path()).unwrap();
        assert!(result.ends_with(".catalyst/catalyst.kdl"));
    }

    #[test]
    fn test_find_manifest_in_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(find_manifest_in(temp_dir.path()).is_none());
    }

    #[test]
    #[serial]
    fn test_find_manifest_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("catalyst.kdl"), "// test").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_manifest);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("catalyst.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_manifest_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        let result = temp_env::with_var(CONFIG_PATH_ENV, Some(&config_path), find_manifest);
        assert_eq!(result.unwrap(), config_path);
    }
}
