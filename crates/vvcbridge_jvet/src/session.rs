//! Drives one encode run of the reference engine: layer construction with
//! re-partitioning, the prepare/encode loop, cross-layer validation and
//! teardown.

use std::sync::Arc;

use tracing::debug;
use vvcbridge_common::{BackendFault, BackendSession, BridgeError, Result, StagingChannel};

use crate::engine::{EngineError, JvetEngine, LayerEncoder};
use crate::error::JvetError;
use crate::layers::partition_layer_args;
use crate::rom::RomGuard;

pub struct JvetSession<E: JvetEngine> {
    engine: Arc<E>,
    args: Vec<String>,
    staging: StagingChannel,
    rom: Option<RomGuard<E>>,
    layers: Vec<E::Layer>,
    fault: Option<BackendFault>,
}

impl<E: JvetEngine> JvetSession<E> {
    pub(crate) fn new(engine: Arc<E>, args: Vec<String>, staging: StagingChannel) -> Self {
        Self {
            engine,
            args,
            staging,
            rom: None,
            layers: Vec::new(),
            fault: None,
        }
    }

    /// Chroma format and bit depth must agree between a layer and any layer
    /// it references for prediction. Only checkable once every layer exists.
    fn cross_validate_layers(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Ok(());
        }
        for cur in 0..self.layers.len() {
            for reference in 0..self.layers.len() {
                if !self.layers[0].direct_ref_layer(cur, reference) {
                    continue;
                }
                if self.layers[cur].chroma_format_idc() != self.layers[reference].chroma_format_idc()
                {
                    return Err(JvetError::RefLayerChromaMismatch { layer: cur, reference }.into());
                }
                if self.layers[cur].bit_depth() != self.layers[reference].bit_depth() {
                    return Err(
                        JvetError::RefLayerBitDepthMismatch { layer: cur, reference }.into(),
                    );
                }
            }
        }
        Ok(())
    }
}

fn engine_failure(fault: &mut Option<BackendFault>, err: EngineError) -> BridgeError {
    match err {
        EngineError::Fault { code, message } => {
            *fault = Some(BackendFault { code, message: message.clone() });
            BridgeError::Backend { code, message }
        }
        EngineError::OutOfMemory(msg) => BridgeError::Resource(msg),
    }
}

impl<E: JvetEngine> BackendSession for JvetSession<E> {
    fn configure(&mut self) -> Result<()> {
        self.rom = Some(RomGuard::acquire(self.engine.clone()));

        // The layer count is only known once the first layer has parsed its
        // arguments, so the construction loop re-partitions per layer index
        // instead of running a single fixed-size pass.
        let mut wanted = 1;
        let mut layer_idx = 0;
        while layer_idx < wanted {
            let created = self.engine.new_layer();
            let mut layer = created.map_err(|e| engine_failure(&mut self.fault, e))?;

            let layer_args = partition_layer_args(&self.args, layer_idx)?;
            layer
                .parse_args(&layer_args)
                .map_err(|p| JvetError::OptionParse { arg: p.arg, value: p.value })?;
            layer
                .create_lib(layer_idx)
                .map_err(|e| engine_failure(&mut self.fault, e))?;

            if layer_idx == 0 {
                wanted = layer.max_layers().max(1);
                debug!(layers = wanted, "layer count reported");
            }
            self.layers.push(layer);
            layer_idx += 1;
        }

        self.cross_validate_layers()
    }

    fn drive_to_completion(&mut self) -> Result<()> {
        let mut eos = false;
        while !eos {
            // pull frames into the GOP buffer until every layer is ready
            let mut keep = true;
            while keep {
                for layer in &mut self.layers {
                    keep = layer
                        .encode_prep(&mut eos)
                        .map_err(|e| engine_failure(&mut self.fault, e))?;
                }
            }

            // compress the buffered group
            let mut keep = true;
            while keep {
                for layer in &mut self.layers {
                    keep = layer
                        .encode()
                        .map_err(|e| engine_failure(&mut self.fault, e))?;
                }
            }
        }
        Ok(())
    }

    fn drain(mut self) -> Result<Vec<u8>> {
        for layer in &mut self.layers {
            layer.destroy_lib();
        }
        self.layers.clear();
        // release the shared tables before collecting the output
        self.rom.take();
        self.staging.drain()
    }

    fn error_info(&self) -> Option<&BackendFault> {
        self.fault.as_ref()
    }
}
