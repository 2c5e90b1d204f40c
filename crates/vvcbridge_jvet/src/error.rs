use thiserror::Error;
use vvcbridge_common::{BridgeError, CategorizedError, ErrorCategory};

/// Configuration-stage failures of this backend. Faults raised by the engine
/// itself during the encode loop are surfaced directly as
/// [`BridgeError::Backend`] / [`BridgeError::Resource`] with their code and
/// message preserved.
#[derive(Error, Debug)]
pub enum JvetError {
    #[error("error parsing option \"{arg}\" with argument \"{value}\"")]
    OptionParse { arg: String, value: String },

    #[error("missing parameter after layer selector {0}")]
    MissingLayerParameter(String),

    #[error("layer {layer} and reference layer {reference} have different chroma formats")]
    RefLayerChromaMismatch { layer: usize, reference: usize },

    #[error("layer {layer} and reference layer {reference} have different bit depths")]
    RefLayerBitDepthMismatch { layer: usize, reference: usize },
}

pub type Result<T> = std::result::Result<T, JvetError>;

impl CategorizedError for JvetError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl From<JvetError> for BridgeError {
    fn from(err: JvetError) -> Self {
        BridgeError::Configuration(err.to_string())
    }
}
