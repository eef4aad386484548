use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} requires a name")]
    MissingName(&'static str),

    #[error("{kind} \"{name}\" is missing required attribute `{attribute}`")]
    MissingAttribute {
        kind: &'static str,
        name: String,
        attribute: &'static str,
    },

    #[error("{kind} \"{name}\": unsupported attribute `{attribute}`")]
    UnknownAttribute {
        kind: &'static str,
        name: String,
        attribute: String,
    },

    #[error("{kind} \"{name}\": `{attribute}` must be {expected}")]
    InvalidValue {
        kind: &'static str,
        name: String,
        attribute: String,
        expected: &'static str,
    },

    #[error("duplicate {kind} \"{name}\"")]
    Duplicate { kind: &'static str, name: String },

    #[error("unsupported provider: {0} (expected \"catalyst\")")]
    UnsupportedProvider(String),

    #[error("unknown data source type: {0}")]
    UnknownDataSource(String),

    #[error("unknown top-level node: {0}")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, ManifestError>;
