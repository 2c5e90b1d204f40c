//! Adapter for the production encoder library: configuration is a typed
//! struct, the lifecycle is explicit (create, open, per-pass init, per-frame
//! encode, close) and the encode loop runs once per rate-control pass,
//! submitting staged frames one at a time and a null frame at end of input.

use std::sync::Arc;

use tracing::debug;
use vvcbridge_common::{EncodeParams, EncodingBackend, Result, StagingChannel};

pub mod config;
pub mod engine;
pub mod error;
pub mod session;

use engine::VvencEngine;
use session::VvencSession;

pub use config::VvencConfig;
pub use error::VvencError;

pub struct VvencBackend<E: VvencEngine> {
    engine: Arc<E>,
}

impl<E: VvencEngine> VvencBackend<E> {
    pub fn new(engine: E) -> Self {
        Self { engine: Arc::new(engine) }
    }
}

impl<E: VvencEngine> EncodingBackend for VvencBackend<E> {
    type SessionType = VvencSession<E>;

    fn new_session(
        &self,
        params: &EncodeParams,
        staging: StagingChannel,
    ) -> Result<Self::SessionType> {
        let config = config::build_config(
            params,
            staging.input_path(),
            staging.output_path(),
            staging.frame_count(),
        )?;
        if params.verbosity >= 2 {
            debug!(?config, "encoder configuration");
        }
        Ok(VvencSession::new(self.engine.clone(), config, staging))
    }
}
