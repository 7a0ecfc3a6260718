use thiserror::Error;

/// Result type alias for document generation
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for document generation.
///
/// Every variant is fatal: a build that hits one of them aborts without
/// producing a partial document. Non-fatal conditions are reported as
/// [`crate::routes::RecoveryWarning`] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Structural misuse of the declaration API (missing parameter location,
    /// missing body example, unknown route shape, invalid route pattern).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed security declaration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A raw schema could not be normalized.
    #[error("schema error at '{reference}': {reason}")]
    Schema { reference: String, reason: String },

    /// Handler source could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] syn::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Whether this error belongs to the configuration family (structural
    /// misuse, including unusable schemas).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Schema { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
