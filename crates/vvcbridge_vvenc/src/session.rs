//! Drives one encode run of the production engine: per-pass initialization,
//! frame submission with sequence numbers and composition timestamps, and
//! collection of the produced access units.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use vvcbridge_common::{
    BackendFault, BackendSession, BridgeError, OptionExt, Result, StagingChannel,
};

use crate::config::{VvencConfig, temporal_rate};
use crate::engine::{AccessUnit, EngineStatus, VvencEncoder, VvencEngine, YuvFrame, codes,
    describe_code};
use crate::error::VvencError;

pub struct VvencSession<E: VvencEngine> {
    engine: Arc<E>,
    config: VvencConfig,
    staging: StagingChannel,
    encoder: Option<E::Encoder>,
    adapted: Option<VvencConfig>,
    fault: Option<BackendFault>,
}

impl<E: VvencEngine> VvencSession<E> {
    pub(crate) fn new(engine: Arc<E>, config: VvencConfig, staging: StagingChannel) -> Self {
        Self {
            engine,
            config,
            staging,
            encoder: None,
            adapted: None,
            fault: None,
        }
    }
}

fn engine_failure(
    fault: &mut Option<BackendFault>,
    context: &'static str,
    status: EngineStatus,
    message: String,
) -> BridgeError {
    warn!("{context}, {}: {message}", describe_code(status.code));
    if status.code == codes::NOT_ENOUGH_MEM || status.code == codes::ERR_ALLOCATE {
        return BridgeError::Resource(message);
    }
    *fault = Some(BackendFault { code: status.code, message: message.clone() });
    BridgeError::Backend { code: status.code, message }
}

impl<E: VvencEngine> BackendSession for VvencSession<E> {
    fn configure(&mut self) -> Result<()> {
        let mut encoder = self.engine.create().ok_or(VvencError::CreateFailed)?;

        if let Err(status) = encoder.open(&self.config) {
            let message = encoder.last_error();
            return Err(engine_failure(
                &mut self.fault,
                "cannot create encoder",
                status,
                message,
            ));
        }

        if self.config.verbosity > 0 {
            info!(
                version = %encoder.version(),
                info = %encoder.encoder_info(),
                "encoder opened"
            );
        }

        // the engine may have adjusted the configuration during open; frames
        // are read back with the adapted geometry
        self.adapted = Some(encoder.adapted_config());
        self.encoder = Some(encoder);
        Ok(())
    }

    fn drive_to_completion(&mut self) -> Result<()> {
        let cfg = self.adapted.clone().unwrap_or_else(|| self.config.clone());
        let encoder = self.encoder.as_mut().context("session not configured")?;

        let frame_len = cfg.format.frame_byte_len(cfg.width, cfg.height);
        let (rate, scale) = temporal_rate(cfg.frame_rate);
        let mut out = File::create(&cfg.output_path)?;
        let mut au = AccessUnit::with_capacity(cfg.width as usize * cfg.height as usize);

        let started = Instant::now();
        let mut frames_emitted: u64 = 0;

        for pass in 0..cfg.num_passes.max(1) {
            if let Err(status) = encoder.init_pass(pass) {
                let message = encoder.last_error();
                return Err(engine_failure(
                    &mut self.fault,
                    "cannot init encoder",
                    status,
                    message,
                ));
            }

            let frame_skip = cfg.frame_skip.saturating_sub(encoder.num_lead_frames());
            let max_frames = if cfg.frames_to_encode > 0 {
                cfg.frames_to_encode + encoder.num_lead_frames() + encoder.num_trail_frames()
            } else {
                0
            };

            let mut reader = YuvReader::open(&cfg.input_path, frame_len)?;
            if frame_skip > 0 {
                reader.skip_frames(frame_skip)?;
            }
            let mut seq = frame_skip as i64;
            let mut eof = false;
            let mut encode_done = false;

            while !eof || !encode_done {
                let mut submitted: Option<YuvFrame> = None;
                if !eof {
                    match reader.read_frame()? {
                        Some(data) => {
                            submitted = Some(YuvFrame {
                                data,
                                sequence_number: seq,
                                cts: seq * cfg.ticks_per_second * scale as i64 / rate as i64,
                                cts_valid: true,
                            });
                            seq += 1;
                        }
                        None => {
                            eof = true;
                            debug!(pass, "end of staged input reached");
                        }
                    }
                }

                match encoder.encode(submitted.as_ref(), &mut au) {
                    Ok(done) => encode_done = done,
                    Err(status) => {
                        let message = encoder.last_error();
                        return Err(engine_failure(
                            &mut self.fault,
                            "encoding failed",
                            status,
                            message,
                        ));
                    }
                }

                if !au.payload.is_empty() {
                    out.write_all(&au.payload)?;
                    au.payload.clear();
                    frames_emitted += 1;
                }

                if max_frames > 0 && seq as u64 >= frame_skip + max_frames {
                    eof = true;
                }
            }
        }

        out.flush()?;
        drop(out);

        if let Err(status) = encoder.close() {
            let message = encoder.last_error();
            return Err(engine_failure(
                &mut self.fault,
                "destroy encoder failed",
                status,
                message,
            ));
        }

        if frames_emitted == 0 {
            info!("no frames encoded");
        } else if cfg.verbosity > 0 {
            let seconds = started.elapsed().as_secs_f64();
            info!(frames = frames_emitted, seconds, "encode finished");
        }
        Ok(())
    }

    fn drain(self) -> Result<Vec<u8>> {
        self.staging.drain()
    }

    fn error_info(&self) -> Option<&BackendFault> {
        self.fault.as_ref()
    }
}

/// Frame-by-frame reader over the headerless staged input file.
struct YuvReader {
    file: BufReader<File>,
    frame_len: usize,
}

impl YuvReader {
    fn open(path: &Path, frame_len: usize) -> Result<Self> {
        Ok(Self { file: BufReader::new(File::open(path)?), frame_len })
    }

    fn skip_frames(&mut self, count: u64) -> Result<()> {
        self.file
            .seek_relative(count as i64 * self.frame_len as i64)?;
        Ok(())
    }

    /// `None` at a clean end of input; a partial trailing frame is an I/O
    /// error, not silence.
    fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "staged input ends inside a frame",
            )));
        }
        Ok(Some(buf))
    }
}
