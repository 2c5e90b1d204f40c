use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::Frame;
use crate::error::{BridgeError, OptionExt, Result};

// Per-process counter; combined with the pid it keeps concurrent sessions on
// distinct temp paths without any locking.
static TMP_INDEX: AtomicU64 = AtomicU64::new(1);

/// File-backed byte channel between the frame-by-frame caller and a
/// file-consuming encoder engine.
///
/// Raw planes are appended to the input file as they arrive; the engine later
/// reads that file and writes its elementary stream to the output file, which
/// [`drain`](StagingChannel::drain) collects into memory. Both files live in
/// the platform temp directory and are exclusively owned by one channel.
/// Cleanup of the input file is unconditional; the output file survives only
/// until its bytes have been read back.
pub struct StagingChannel {
    input_path: PathBuf,
    output_path: PathBuf,
    writer: Option<BufWriter<File>>,
    frame_count: u64,
    drained: bool,
}

impl StagingChannel {
    pub fn create() -> Result<Self> {
        let dir = std::env::temp_dir();
        let idx = TMP_INDEX.fetch_add(1, Ordering::Relaxed);
        let stem = format!("vvb{}-{}", std::process::id(), idx);
        let input_path = dir.join(format!("{stem}.yuv"));
        let output_path = dir.join(format!("{stem}.vvc"));

        let writer = BufWriter::new(File::create(&input_path)?);
        debug!(input = %input_path.display(), output = %output_path.display(), "staging channel created");

        Ok(Self {
            input_path,
            output_path,
            writer: Some(writer),
            frame_count: 0,
            drained: false,
        })
    }

    /// Appends the frame's sample planes, in plane order, and bumps the frame
    /// counter. Any write failure is fatal for the session; there is no retry.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .context("staging input already finalized")?;
        for plane in &frame.planes {
            writer.write_all(plane)?;
        }
        self.frame_count += 1;
        Ok(())
    }

    /// Closes the write handle so the engine can open the input file.
    pub fn finalize(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads the engine-written output file into memory and deletes both
    /// temp files. An absent or empty output file is reported as
    /// [`BridgeError::EmptyResult`]: the engine claimed success but produced
    /// nothing, which is distinct from an engine-reported failure.
    pub fn drain(mut self) -> Result<Vec<u8>> {
        self.finalize()?;

        let mut file = match File::open(&self.output_path) {
            Ok(f) => f,
            Err(_) => return Err(BridgeError::EmptyResult),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        drop(file);

        if buf.is_empty() {
            return Err(BridgeError::EmptyResult);
        }

        fs::remove_file(&self.output_path)?;
        self.drained = true;
        Ok(buf)
    }
}

impl Drop for StagingChannel {
    fn drop(&mut self) {
        self.writer.take();
        // best effort; both paths may already be gone
        let _ = fs::remove_file(&self.input_path);
        if !self.drained {
            let _ = fs::remove_file(&self.output_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bytes: &[u8]) -> Frame {
        Frame { planes: vec![bytes.to_vec()] }
    }

    #[test]
    fn frames_are_concatenated_in_order() {
        let mut ch = StagingChannel::create().unwrap();
        ch.write_frame(&frame(b"one")).unwrap();
        ch.write_frame(&frame(b"two")).unwrap();
        ch.write_frame(&Frame { planes: vec![b"th".to_vec(), b"ree".to_vec()] })
            .unwrap();
        ch.finalize().unwrap();
        assert_eq!(ch.frame_count(), 3);
        assert_eq!(fs::read(ch.input_path()).unwrap(), b"onetwothree");
    }

    #[test]
    fn drain_returns_backend_output_and_removes_files() {
        let mut ch = StagingChannel::create().unwrap();
        ch.write_frame(&frame(b"raw")).unwrap();
        ch.finalize().unwrap();

        fs::write(ch.output_path(), b"\x00\x00\x00\x01bitstream").unwrap();
        let input = ch.input_path().to_path_buf();
        let output = ch.output_path().to_path_buf();

        let bytes = ch.drain().unwrap();
        assert_eq!(bytes, b"\x00\x00\x00\x01bitstream");
        assert!(!input.exists());
        assert!(!output.exists());
    }

    #[test]
    fn drain_without_output_is_empty_result() {
        let ch = StagingChannel::create().unwrap();
        let input = ch.input_path().to_path_buf();
        match ch.drain() {
            Err(BridgeError::EmptyResult) => {}
            other => panic!("expected EmptyResult, got {other:?}"),
        }
        assert!(!input.exists());
    }

    #[test]
    fn drain_with_empty_output_is_empty_result() {
        let ch = StagingChannel::create().unwrap();
        fs::write(ch.output_path(), b"").unwrap();
        let output = ch.output_path().to_path_buf();
        assert!(matches!(ch.drain(), Err(BridgeError::EmptyResult)));
        assert!(!output.exists());
    }

    #[test]
    fn dropping_an_unfinished_channel_removes_the_input_file() {
        let mut ch = StagingChannel::create().unwrap();
        ch.write_frame(&frame(b"partial")).unwrap();
        let input = ch.input_path().to_path_buf();
        drop(ch);
        assert!(!input.exists());
    }

    #[test]
    fn concurrent_channels_use_distinct_paths() {
        let a = StagingChannel::create().unwrap();
        let b = StagingChannel::create().unwrap();
        assert_ne!(a.input_path(), b.input_path());
        assert_ne!(a.output_path(), b.output_path());
    }
}
