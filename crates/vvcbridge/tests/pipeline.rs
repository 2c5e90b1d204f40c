//! End-to-end runs of the open/encode/close lifecycle against mock engines
//! for both backends.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use vvcbridge::{
    BridgeError, ChromaFormat, ColorSpace, EncodeParams, Frame, JvetBackend, Session,
    VvencBackend,
};
use vvcbridge_jvet::engine::{EngineError, JvetEngine, LayerEncoder, ParseFailure};
use vvcbridge_vvenc::VvencConfig;
use vvcbridge_vvenc::engine::{AccessUnit, EngineStatus, VvencEncoder, VvencEngine, YuvFrame};

fn qcif() -> EncodeParams {
    EncodeParams {
        width: 176,
        height: 144,
        bit_depth: 8,
        chroma_format: ChromaFormat::C420,
        color_space: ColorSpace::YCbCr,
        qp: 32,
        lossless: false,
        limited_range: false,
        compress_level: 5,
        frame_rate: 25,
        verbosity: 0,
        decoded_picture_hash: false,
        intra_only: true,
    }
}

fn frame(params: &EncodeParams, fill: u8) -> Frame {
    Frame { planes: vec![vec![fill; params.frame_byte_len()]] }
}

// Mock of the typed-config engine. Each submitted frame is echoed back as a
// two-byte access unit carrying the frame's first sample, so tests can check
// ordering through the whole staging round trip.
#[derive(Clone, Default)]
struct EchoEngine {
    state: Arc<EchoState>,
}

#[derive(Default)]
struct EchoState {
    opens: AtomicUsize,
    seen_config: Mutex<Option<VvencConfig>>,
}

struct EchoEncoder {
    config: Option<VvencConfig>,
    state: Arc<EchoState>,
}

impl VvencEngine for EchoEngine {
    type Encoder = EchoEncoder;

    fn create(&self) -> Option<Self::Encoder> {
        Some(EchoEncoder { config: None, state: self.state.clone() })
    }
}

impl VvencEncoder for EchoEncoder {
    fn open(&mut self, config: &VvencConfig) -> Result<(), EngineStatus> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        *self.state.seen_config.lock() = Some(config.clone());
        self.config = Some(config.clone());
        Ok(())
    }

    fn adapted_config(&self) -> VvencConfig {
        self.config.clone().expect("opened")
    }

    fn init_pass(&mut self, _pass: u32) -> Result<(), EngineStatus> {
        Ok(())
    }

    fn encode(
        &mut self,
        frame: Option<&YuvFrame>,
        au: &mut AccessUnit,
    ) -> Result<bool, EngineStatus> {
        match frame {
            Some(frame) => {
                au.payload.extend_from_slice(&[0xAA, frame.data[0]]);
                Ok(false)
            }
            None => Ok(true),
        }
    }

    fn close(&mut self) -> Result<(), EngineStatus> {
        Ok(())
    }

    fn num_lead_frames(&self) -> u64 {
        0
    }

    fn num_trail_frames(&self) -> u64 {
        0
    }

    fn version(&self) -> String {
        "echo-1.0".into()
    }

    fn encoder_info(&self) -> String {
        "echo encoder".into()
    }

    fn last_error(&self) -> String {
        String::new()
    }
}

fn echo_session(params: EncodeParams) -> (Session<VvencBackend<EchoEngine>>, Arc<EchoState>) {
    let engine = EchoEngine::default();
    let state = engine.state.clone();
    (Session::open(VvencBackend::new(engine), params).unwrap(), state)
}

#[test]
fn one_frame_clip_produces_a_bitstream() {
    let params = qcif();
    let (mut session, _) = echo_session(params);
    session.encode(&frame(&params, 7)).unwrap();
    assert_eq!(session.frame_count(), 1);

    let bytes = session.close().unwrap();
    assert_eq!(bytes, vec![0xAA, 7]);
}

#[test]
fn frames_come_back_in_submission_order() {
    let params = qcif();
    let (mut session, _) = echo_session(params);
    for fill in [3u8, 1, 4, 1, 5] {
        session.encode(&frame(&params, fill)).unwrap();
    }

    let bytes = session.close().unwrap();
    assert_eq!(bytes, vec![0xAA, 3, 0xAA, 1, 0xAA, 4, 0xAA, 1, 0xAA, 5]);
}

#[test]
fn zero_frame_session_reports_empty_result() {
    let (session, _) = echo_session(qcif());
    assert!(matches!(session.close(), Err(BridgeError::EmptyResult)));
}

#[test]
fn mis_sized_frame_surfaces_as_a_backend_side_failure() {
    let params = qcif();
    let (mut session, _) = echo_session(params);
    // staging takes the bytes as-is; the truncated frame is only noticed when
    // the backend reads the clip back
    session.encode(&Frame { planes: vec![vec![0u8; 16]] }).unwrap();
    assert_eq!(session.frame_count(), 1);
    assert!(matches!(session.close(), Err(BridgeError::Io(_))));
}

#[test]
fn lossless_without_rgb_fails_before_the_engine_exists() {
    let mut params = qcif();
    params.lossless = true; // still YCbCr
    let (mut session, engine) = echo_session(params);

    // staging accepts frames; the invariant only surfaces at close
    session.encode(&frame(&params, 0)).unwrap();
    let err = session.close().unwrap_err();
    assert!(matches!(err, BridgeError::Configuration(_)), "{err}");
    assert_eq!(engine.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn limited_range_conflicts_with_full_range_spaces() {
    let mut params = qcif();
    params.color_space = ColorSpace::Rgb;
    params.limited_range = true;
    let (mut session, _) = echo_session(params);
    session.encode(&frame(&params, 0)).unwrap();
    assert!(matches!(session.close(), Err(BridgeError::Configuration(_))));
}

#[test]
fn lossless_rgb_full_range_is_accepted() {
    let mut params = qcif();
    params.lossless = true;
    params.color_space = ColorSpace::Rgb;
    params.chroma_format = ChromaFormat::C444;
    let (mut session, engine) = echo_session(params);
    session.encode(&frame(&params, 9)).unwrap();

    let bytes = session.close().unwrap();
    assert_eq!(bytes, vec![0xAA, 9]);
    assert_eq!(engine.opens.load(Ordering::SeqCst), 1);
}

#[test]
fn staging_files_are_gone_after_close() {
    let params = qcif();
    let (mut session, engine) = echo_session(params);
    session.encode(&frame(&params, 1)).unwrap();
    session.close().unwrap();

    let config = engine.seen_config.lock().clone().expect("engine opened");
    assert!(!config.input_path.exists());
    assert!(!config.output_path.exists());
}

#[test]
fn engine_failure_keeps_code_and_message() {
    struct FailingEngine;
    struct FailingEncoder;

    impl VvencEngine for FailingEngine {
        type Encoder = FailingEncoder;

        fn create(&self) -> Option<Self::Encoder> {
            Some(FailingEncoder)
        }
    }

    impl VvencEncoder for FailingEncoder {
        fn open(&mut self, _config: &VvencConfig) -> Result<(), EngineStatus> {
            Err(EngineStatus { code: -7 })
        }

        fn adapted_config(&self) -> VvencConfig {
            unreachable!("open never succeeds")
        }

        fn init_pass(&mut self, _pass: u32) -> Result<(), EngineStatus> {
            Ok(())
        }

        fn encode(
            &mut self,
            _frame: Option<&YuvFrame>,
            _au: &mut AccessUnit,
        ) -> Result<bool, EngineStatus> {
            Ok(true)
        }

        fn close(&mut self) -> Result<(), EngineStatus> {
            Ok(())
        }

        fn num_lead_frames(&self) -> u64 {
            0
        }

        fn num_trail_frames(&self) -> u64 {
            0
        }

        fn version(&self) -> String {
            String::new()
        }

        fn encoder_info(&self) -> String {
            String::new()
        }

        fn last_error(&self) -> String {
            "qp out of range".into()
        }
    }

    let params = qcif();
    let mut session = Session::open(VvencBackend::new(FailingEngine), params).unwrap();
    session.encode(&frame(&params, 0)).unwrap();

    match session.close().unwrap_err() {
        BridgeError::Backend { code, message } => {
            assert_eq!(code, -7);
            assert_eq!(message, "qp out of range");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

// Mock of the argument-list engine: enough of the reference loop shape to run
// the facade end to end on the other backend.
struct ListEngine;

struct ListLayer {
    output: Option<PathBuf>,
    remaining: u64,
    buffered: u64,
}

impl JvetEngine for ListEngine {
    type Layer = ListLayer;

    fn init_rom(&self) {}
    fn destroy_rom(&self) {}

    fn new_layer(&self) -> Result<Self::Layer, EngineError> {
        Ok(ListLayer { output: None, remaining: 0, buffered: 0 })
    }
}

fn arg_value(args: &[String], key: &str) -> Option<String> {
    let prefix = format!("--{key}=");
    args.iter()
        .find(|a| a.starts_with(&prefix))
        .map(|a| a[prefix.len()..].to_string())
}

impl LayerEncoder for ListLayer {
    fn parse_args(&mut self, args: &[String]) -> Result<(), ParseFailure> {
        self.remaining = arg_value(args, "FramesToBeEncoded")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ParseFailure {
                arg: "FramesToBeEncoded".into(),
                value: String::new(),
            })?;
        self.output = arg_value(args, "BitstreamFile").map(PathBuf::from);
        Ok(())
    }

    fn create_lib(&mut self, _layer_idx: usize) -> Result<(), EngineError> {
        Ok(())
    }

    fn max_layers(&self) -> usize {
        1
    }

    fn chroma_format_idc(&self) -> u32 {
        420
    }

    fn bit_depth(&self) -> u32 {
        8
    }

    fn direct_ref_layer(&self, _cur: usize, _reference: usize) -> bool {
        false
    }

    fn encode_prep(&mut self, eos: &mut bool) -> Result<bool, EngineError> {
        if self.remaining == 0 {
            *eos = true;
        } else {
            self.remaining -= 1;
            self.buffered += 1;
        }
        Ok(false)
    }

    fn encode(&mut self) -> Result<bool, EngineError> {
        if self.buffered > 0 {
            self.buffered -= 1;
            let path = self.output.as_ref().expect("output path parsed");
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .unwrap();
            file.write_all(b"\x00\x00\x00\x01AU").unwrap();
        }
        Ok(false)
    }

    fn destroy_lib(&mut self) {}
}

#[test]
fn argument_list_backend_runs_the_same_lifecycle() {
    let params = qcif();
    let mut session = Session::open(JvetBackend::new(ListEngine), params).unwrap();
    session.encode(&frame(&params, 0)).unwrap();
    session.encode(&frame(&params, 1)).unwrap();

    let bytes = session.close().unwrap();
    assert_eq!(bytes, b"\x00\x00\x00\x01AU\x00\x00\x00\x01AU");
}

#[test]
fn argument_list_backend_rejects_lossless_without_rgb_too() {
    let mut params = qcif();
    params.lossless = true;
    let session = Session::open(JvetBackend::new(ListEngine), params).unwrap();
    assert!(matches!(session.close(), Err(BridgeError::Configuration(_))));
}
