//! Interface the external reference encoder library must expose. The library
//! itself is an opaque collaborator; everything here mirrors the surface its
//! application objects present to a driving loop.

use thiserror::Error;

/// Failure raised by the engine while configuring or encoding. Allocation
/// failures are kept apart so the adapter can classify them as resource
/// exhaustion instead of a generic engine fault.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("{message}")]
    Fault { code: i32, message: String },

    #[error("memory allocation failed: {0}")]
    OutOfMemory(String),
}

/// Argument rejected by the engine's option parser.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub arg: String,
    pub value: String,
}

/// One per-layer encoder application object.
pub trait LayerEncoder {
    /// Parses the argument list partitioned for this layer.
    fn parse_args(&mut self, args: &[String]) -> Result<(), ParseFailure>;

    /// Allocates the layer's encoder library objects.
    fn create_lib(&mut self, layer_idx: usize) -> Result<(), EngineError>;

    /// Maximum layer count. Only meaningful after [`parse_args`] succeeded on
    /// the first layer; the construction loop re-partitions against it.
    ///
    /// [`parse_args`]: LayerEncoder::parse_args
    fn max_layers(&self) -> usize;

    fn chroma_format_idc(&self) -> u32;
    fn bit_depth(&self) -> u32;

    /// Whether layer `cur` uses layer `reference` as a direct prediction
    /// reference. Queried on the first layer, which owns the shared
    /// parameter set.
    fn direct_ref_layer(&self, cur: usize, reference: usize) -> bool;

    /// Pulls one frame into the group-of-pictures buffer. Returns `true`
    /// while more pulling is needed; flips `eos` once the input file is
    /// exhausted.
    fn encode_prep(&mut self, eos: &mut bool) -> Result<bool, EngineError>;

    /// Compresses the buffered group. Returns `true` while the group still
    /// has work left.
    fn encode(&mut self) -> Result<bool, EngineError>;

    fn destroy_lib(&mut self);
}

/// Entry points of the engine library as a whole.
pub trait JvetEngine: Send + Sync + 'static {
    type Layer: LayerEncoder;

    /// Initializes the process-wide lookup tables (ROM, block-size hash
    /// indices). Guarded by [`crate::rom::RomGuard`]; never called while a
    /// session is live.
    fn init_rom(&self);
    fn destroy_rom(&self);

    fn new_layer(&self) -> Result<Self::Layer, EngineError>;
}
