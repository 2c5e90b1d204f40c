//! Interface the external production encoder library must expose: an explicit
//! create/open/init-pass/encode/close lifecycle plus diagnostic accessors.

use thiserror::Error;

use crate::config::VvencConfig;

/// Well-known engine status codes.
pub mod codes {
    pub const OK: i32 = 0;
    pub const ERR_UNSPECIFIED: i32 = -1;
    pub const ERR_INITIALIZE: i32 = -2;
    pub const ERR_ALLOCATE: i32 = -3;
    pub const NOT_ENOUGH_MEM: i32 = -5;
    pub const ERR_PARAMETER: i32 = -7;
    pub const ERR_NOT_SUPPORTED: i32 = -10;
    pub const ERR_CPU: i32 = -30;
}

/// Human-readable gloss for an engine status code, used when composing the
/// diagnostic message around the engine's own last-error string.
pub fn describe_code(code: i32) -> &'static str {
    match code {
        codes::ERR_CPU => "SSE 4.1 cpu support required",
        codes::ERR_PARAMETER => "invalid parameter",
        codes::ERR_NOT_SUPPORTED => "unsupported request",
        codes::ERR_ALLOCATE | codes::NOT_ENOUGH_MEM => "out of memory",
        _ => "error",
    }
}

/// Nonzero status returned by an engine call. The accompanying text is
/// fetched separately via [`VvencEncoder::last_error`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("engine status {code}")]
pub struct EngineStatus {
    pub code: i32,
}

/// One staged picture on its way into the engine.
#[derive(Clone, Debug)]
pub struct YuvFrame {
    /// Packed sample planes, plane order, no framing.
    pub data: Vec<u8>,
    pub sequence_number: i64,
    /// Composition timestamp in [`ticks_per_second`](VvencConfig::ticks_per_second) units.
    pub cts: i64,
    pub cts_valid: bool,
}

/// Reusable output buffer for one compressed access unit.
#[derive(Default)]
pub struct AccessUnit {
    pub payload: Vec<u8>,
}

impl AccessUnit {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { payload: Vec::with_capacity(capacity) }
    }
}

pub trait VvencEngine: Send + Sync + 'static {
    type Encoder: VvencEncoder;

    /// Constructs an encoder instance. `None` models the engine's
    /// out-of-memory construction failure.
    fn create(&self) -> Option<Self::Encoder>;
}

pub trait VvencEncoder {
    fn open(&mut self, config: &VvencConfig) -> Result<(), EngineStatus>;

    /// Configuration as adapted by the engine during `open`; the drive loop
    /// reads staged frames with the adapted geometry.
    fn adapted_config(&self) -> VvencConfig;

    fn init_pass(&mut self, pass: u32) -> Result<(), EngineStatus>;

    /// Submits one frame, or `None` once the input is exhausted. Any produced
    /// access-unit bytes are appended to `au.payload`. Returns `true` once
    /// the engine has flushed everything it will ever produce.
    fn encode(&mut self, frame: Option<&YuvFrame>, au: &mut AccessUnit)
    -> Result<bool, EngineStatus>;

    fn close(&mut self) -> Result<(), EngineStatus>;

    /// Frames the engine consumes before / keeps after the nominal range.
    fn num_lead_frames(&self) -> u64;
    fn num_trail_frames(&self) -> u64;

    fn version(&self) -> String;
    fn encoder_info(&self) -> String;
    /// Text of the most recent failure, preserved verbatim for the caller.
    fn last_error(&self) -> String;
}
