//! Adapter for the reference-software style encoder: configuration is a flat
//! ordered `--Key=Value` argument list, partitioned across one or more coding
//! layers, and the encode loop alternates a GOP prepare phase with a compress
//! phase until every layer reports end-of-stream.

use std::sync::Arc;

use tracing::debug;
use vvcbridge_common::{EncodeParams, EncodingBackend, Result, StagingChannel};

pub mod engine;
pub mod error;
pub mod layers;
pub mod options;
pub mod rom;
pub mod session;

use engine::JvetEngine;
use session::JvetSession;

pub use error::JvetError;

pub struct JvetBackend<E: JvetEngine> {
    engine: Arc<E>,
}

impl<E: JvetEngine> JvetBackend<E> {
    pub fn new(engine: E) -> Self {
        Self { engine: Arc::new(engine) }
    }
}

impl<E: JvetEngine> EncodingBackend for JvetBackend<E> {
    type SessionType = JvetSession<E>;

    fn new_session(
        &self,
        params: &EncodeParams,
        staging: StagingChannel,
    ) -> Result<Self::SessionType> {
        let args = options::build_option_set(
            params,
            staging.input_path(),
            staging.output_path(),
            staging.frame_count(),
        )?;
        if params.verbosity >= 2 {
            debug!(options = ?args, "encode options");
        }
        Ok(JvetSession::new(self.engine.clone(), args, staging))
    }
}
