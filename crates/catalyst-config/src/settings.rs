//! Provider credential and endpoint resolution
//!
//! Values from the `provider "catalyst"` block take precedence over the
//! environment. The endpoint falls back to production only when
//! `CATALYST_API_ENDPOINT` is not set at all; an empty variable is an error.

use crate::error::{ConfigError, ConfigErrors};
use serde::{Deserialize, Serialize};

/// Production API endpoint
pub const PROD_API_ENDPOINT: &str = "https://api.diagrid.io";

pub const API_KEY_ENV: &str = "CATALYST_API_KEY";
pub const ENDPOINT_ENV: &str = "CATALYST_API_ENDPOINT";

/// Values written in the provider configuration block
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for ProviderBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderBlock")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Fully resolved provider settings
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderSettings {
    /// Resolve settings from the block and the process environment.
    ///
    /// Every missing value is reported, not just the first one.
    pub fn resolve(block: &ProviderBlock) -> std::result::Result<Self, ConfigErrors> {
        let mut api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let mut endpoint = match std::env::var_os(ENDPOINT_ENV) {
            Some(value) => value.to_string_lossy().into_owned(),
            None => PROD_API_ENDPOINT.to_string(),
        };

        if let Some(value) = block.api_key.as_deref().filter(|v| !v.is_empty()) {
            api_key = value.to_string();
        }
        if let Some(value) = block.endpoint.as_deref().filter(|v| !v.is_empty()) {
            endpoint = value.to_string();
        }

        let mut errors = Vec::new();
        if api_key.is_empty() {
            errors.push(ConfigError::MissingApiKey);
        }
        if endpoint.is_empty() {
            errors.push(ConfigError::MissingEndpoint);
        }
        if !errors.is_empty() {
            return Err(ConfigErrors(errors));
        }

        tracing::debug!("Resolved provider endpoint: {}", endpoint);
        Ok(Self { endpoint, api_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn block(api_key: Option<&str>, endpoint: Option<&str>) -> ProviderBlock {
        ProviderBlock {
            api_key: api_key.map(String::from),
            endpoint: endpoint.map(String::from),
        }
    }

    #[test]
    #[serial]
    fn test_env_fallback_with_prod_default() {
        temp_env::with_vars(
            [(API_KEY_ENV, Some("env-key")), (ENDPOINT_ENV, None)],
            || {
                let settings = ProviderSettings::resolve(&ProviderBlock::default()).unwrap();
                assert_eq!(settings.api_key, "env-key");
                assert_eq!(settings.endpoint, PROD_API_ENDPOINT);
            },
        );
    }

    #[test]
    #[serial]
    fn test_block_values_take_precedence() {
        temp_env::with_vars(
            [
                (API_KEY_ENV, Some("env-key")),
                (ENDPOINT_ENV, Some("https://env.example.com")),
            ],
            || {
                let settings = ProviderSettings::resolve(&block(
                    Some("block-key"),
                    Some("https://block.example.com"),
                ))
                .unwrap();
                assert_eq!(settings.api_key, "block-key");
                assert_eq!(settings.endpoint, "https://block.example.com");
            },
        );
    }

    #[test]
    #[serial]
    fn test_empty_block_values_fall_through_to_env() {
        temp_env::with_vars(
            [
                (API_KEY_ENV, Some("env-key")),
                (ENDPOINT_ENV, Some("https://env.example.com")),
            ],
            || {
                let settings = ProviderSettings::resolve(&block(Some(""), Some(""))).unwrap();
                assert_eq!(settings.api_key, "env-key");
                assert_eq!(settings.endpoint, "https://env.example.com");
            },
        );
    }

    #[test]
    #[serial]
    fn test_missing_values_are_collected() {
        temp_env::with_vars([(API_KEY_ENV, None), (ENDPOINT_ENV, Some(""))], || {
            let errors = ProviderSettings::resolve(&ProviderBlock::default()).unwrap_err();
            assert_eq!(errors.len(), 2);

            let summaries: Vec<_> = errors.iter().map(|e| e.summary()).collect();
            assert_eq!(
                summaries,
                vec![
                    "Missing API Key Configuration",
                    "Missing Endpoint Configuration"
                ]
            );
        });
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = ProviderSettings {
            endpoint: PROD_API_ENDPOINT.to_string(),
            api_key: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", settings).contains("super-secret"));
        assert!(!format!("{:?}", block(Some("super-secret"), None)).contains("super-secret"));
    }
}
