use thiserror::Error;
use vvcbridge_common::{BridgeError, CategorizedError, ErrorCategory};

/// Failure to construct the engine's encoder object, which the library
/// reports as an allocation failure. Every later engine failure carries a
/// status code and is surfaced directly as [`BridgeError::Backend`] /
/// [`BridgeError::Resource`].
#[derive(Error, Debug)]
pub enum VvencError {
    #[error("cannot create encoder")]
    CreateFailed,
}

impl CategorizedError for VvencError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::ResourceAllocation
    }
}

impl From<VvencError> for BridgeError {
    fn from(err: VvencError) -> Self {
        BridgeError::Resource(err.to_string())
    }
}
