//! Frame-in, bitstream-out facade over the VVC encoder backends.
//!
//! A [`Session`] is opened against one backend, fed raw frames one at a time,
//! and closed. Frames are staged to a temp file as they arrive; the whole
//! encode runs inside [`close`](Session::close), which hands the staged clip
//! to the backend, drives its engine to end-of-stream and returns the
//! elementary stream bytes.

use tracing::debug;

pub use vvcbridge_common::{
    BackendFault, BackendSession, BridgeError, CategorizedError, ChromaFormat, ColorSpace,
    EncodeParams, EncodingBackend, ErrorCategory, Frame, Result,
};
pub use vvcbridge_jvet::JvetBackend;
pub use vvcbridge_vvenc::VvencBackend;

use vvcbridge_common::StagingChannel;

/// One encode run. Sessions are single-use and independent; any number may be
/// open concurrently, each owning its own staging files.
pub struct Session<B: EncodingBackend> {
    backend: B,
    params: EncodeParams,
    staging: StagingChannel,
}

impl<B: EncodingBackend> Session<B> {
    /// Opens a session and its staging files. Parameter validation is
    /// deliberately left to the backend translator in [`close`]: an open
    /// session with unencodable parameters costs nothing but two empty temp
    /// files.
    pub fn open(backend: B, params: EncodeParams) -> Result<Self> {
        let staging = StagingChannel::create()?;
        Ok(Self { backend, params, staging })
    }

    /// Stages one frame. The planes are taken as-is; geometry mismatches
    /// against the session parameters are the backend's to detect.
    pub fn encode(&mut self, frame: &Frame) -> Result<()> {
        self.staging.write_frame(frame)
    }

    /// Runs the backend over everything staged so far and returns the
    /// produced bitstream. Consumes the session; staging files are removed on
    /// every path out of here, success or not.
    pub fn close(self) -> Result<Vec<u8>> {
        let Session { backend, params, mut staging } = self;
        staging.finalize()?;
        debug!(frames = staging.frame_count(), "handing staged input to backend");

        let mut session = backend.new_session(&params, staging)?;
        session.configure()?;
        session.drive_to_completion()?;
        session.drain()
    }

    /// Frames staged so far.
    pub fn frame_count(&self) -> u64 {
        self.staging.frame_count()
    }
}
