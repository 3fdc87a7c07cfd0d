//! Failure classification shared by the deployer and the invoker.

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote resource does not exist. Deletes treat this as success.
    #[error("{resource} {name} does not exist")]
    NotFound { resource: &'static str, name: String },

    #[error("{operation} failed: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("publishing a version of {function} failed after {attempts} attempts")]
    PublishExhausted {
        function: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("function {function} failed to activate: {reason}")]
    ActivationFailed { function: String, reason: String },

    #[error("runtimes {first} and {second} both resolve to function name {name}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn remote<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Remote {
            operation,
            source: source.into(),
        }
    }

    pub fn not_found(resource: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            resource,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Folds an expected absence into success. `Ok(false)` means there was
/// nothing to delete.
pub fn deleted(result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}
