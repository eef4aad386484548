use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "While configuring the provider, the API key was not found in the \
        CATALYST_API_KEY environment variable or provider configuration block \
        api_key attribute."
    )]
    MissingApiKey,

    #[error(
        "While configuring the provider, the endpoint was not found in the \
        CATALYST_API_ENDPOINT environment variable or provider configuration \
        block endpoint attribute."
    )]
    MissingEndpoint,

    #[error("config directory not found")]
    ConfigDirNotFound,

    #[error(
        "manifest not found. Looked in:\n\
        - current directory: catalyst.local.kdl, catalyst.kdl\n\
        - ./.catalyst/ directory\n\
        - ~/.config/catalyst/catalyst.kdl\n\
        Set CATALYST_CONFIG_PATH to point at a manifest directly"
    )]
    ManifestNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Short user-facing title for diagnostics
    pub fn summary(&self) -> &'static str {
        match self {
            ConfigError::MissingApiKey => "Missing API Key Configuration",
            ConfigError::MissingEndpoint => "Missing Endpoint Configuration",
            ConfigError::ConfigDirNotFound | ConfigError::ManifestNotFound => {
                "Missing Manifest"
            }
            ConfigError::Io(_) => "Configuration IO Error",
        }
    }
}

/// All problems found while resolving a configuration
#[derive(Error, Debug)]
#[error("{}", render(.0))]
pub struct ConfigErrors(pub Vec<ConfigError>);

fn render(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.summary(), e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
