use thiserror::Error;

/// Coarse error category, stable across backend variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// General/unspecified error
    General = 1,
    /// Configuration invariant violated before encoding started
    Configuration = 2,
    /// Temp-file create/write/read failure
    Io = 3,
    /// Failure reported by the encoder engine itself
    Backend = 4,
    /// Memory or buffer allocation failure inside the encode loop
    ResourceAllocation = 5,
    /// Engine reported success but the output staging file is absent or empty
    EmptyResult = 6,
}

/// Trait for errors that can provide an error category
pub trait CategorizedError: std::error::Error {
    fn category(&self) -> ErrorCategory;
}

/// Uniform error surfaced by the adapter. Backend-specific error types
/// convert into this, preserving engine codes and messages verbatim.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("backend error {code}: {message}")]
    Backend { code: i32, message: String },

    #[error("allocation failed: {0}")]
    Resource(String),

    #[error("backend produced no output")]
    EmptyResult,

    #[error("{0}")]
    Other(String),
}

impl CategorizedError for BridgeError {
    fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::Configuration(_) => ErrorCategory::Configuration,
            BridgeError::Io(_) => ErrorCategory::Io,
            BridgeError::Backend { .. } => ErrorCategory::Backend,
            BridgeError::Resource(_) => ErrorCategory::ResourceAllocation,
            BridgeError::EmptyResult => ErrorCategory::EmptyResult,
            BridgeError::Other(_) => ErrorCategory::General,
        }
    }
}

/// Result type alias for vvcbridge_common
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Extension trait for adding context to Results (similar to anyhow::Context)
pub trait ResultExt<T> {
    /// Wrap the error with additional context
    fn context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Wrap the error with lazily-evaluated context
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| BridgeError::Other(format!("{}: {}", context.into(), e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| BridgeError::Other(format!("{}: {}", f().into(), e)))
    }
}

/// Extension trait for Option types
pub trait OptionExt<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.ok_or_else(|| BridgeError::Other(context.into()))
    }
}
