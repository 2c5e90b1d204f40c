pub mod error;
pub mod params;
pub mod staging;

pub use error::{BridgeError, CategorizedError, ErrorCategory, OptionExt, Result};
pub use params::{ChromaFormat, ColorSpace, EncodeParams};
pub use staging::StagingChannel;

/// One raw input picture. Planes are stored already packed at the source bit
/// depth (little-endian sample order above 8 bit) and are written to the
/// staging file in plane order, without any framing.
#[derive(Clone)]
pub struct Frame {
    pub planes: Vec<Vec<u8>>,
}

impl Frame {
    pub fn byte_len(&self) -> usize {
        self.planes.iter().map(Vec::len).sum()
    }
}

/// Code and message of a failure reported by an encoder engine, preserved
/// verbatim for the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendFault {
    pub code: i32,
    pub message: String,
}

impl std::fmt::Display for BackendFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "backend error {}: {}", self.code, self.message)
    }
}

/// One backend variant. Translates `EncodeParams` into its own option surface
/// and produces a session that drives the engine over the staged input.
pub trait EncodingBackend {
    type SessionType: BackendSession;

    /// Builds the backend option set for `params` and binds it to the staged
    /// input/output files. Translation is pure; the only failure mode is a
    /// configuration invariant violation, reported before any engine object
    /// exists.
    fn new_session(&self, params: &EncodeParams, staging: StagingChannel)
    -> Result<Self::SessionType>;
}

/// Lifecycle of one encode run against one backend engine.
///
/// `configure` constructs and configures the engine, `drive_to_completion`
/// runs its encode loop until end-of-stream, `drain` collects the produced
/// bitstream and releases every engine and staging resource. All three are
/// blocking; there is no mid-encode abort.
pub trait BackendSession: Sized {
    fn configure(&mut self) -> Result<()>;
    fn drive_to_completion(&mut self) -> Result<()>;
    fn drain(self) -> Result<Vec<u8>>;
    /// Last engine-reported failure, if any.
    fn error_info(&self) -> Option<&BackendFault>;
}

/// The staged frame rate is expressed in eighth-frame units by the backends;
/// the nominal caller rate is scaled by this factor on the way in and paired
/// with the matching temporal subsample option where the backend has one.
pub const TEMPORAL_SUBSAMPLE_RATIO: u32 = 8;
