//! Typed encoder configuration and its translation from the codec-agnostic
//! parameter set.

use std::path::{Path, PathBuf};

use vvcbridge_common::{
    BridgeError, ChromaFormat, ColorSpace, EncodeParams, Result, TEMPORAL_SUBSAMPLE_RATIO,
};

/// Clock used for composition timestamps.
pub const TICKS_PER_SECOND: i64 = 90_000;

/// Coarse speed/quality preset. The caller's 0..=9 effort level is bucketed
/// onto these five.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
}

impl Preset {
    pub fn from_compress_level(level: u32) -> Self {
        match level {
            0 | 1 => Preset::Faster,
            2 | 3 => Preset::Fast,
            4 | 5 => Preset::Medium,
            6 | 7 => Preset::Slow,
            _ => Preset::Slower,
        }
    }
}

/// Input pixel layout as the engine names it: chroma format plus bit depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    Yuv400,
    Yuv420,
    Yuv422,
    Yuv444,
    Yuv400_10,
    Yuv420_10,
    Yuv422_10,
    Yuv444_10,
}

impl PixelFormat {
    /// Bytes of one staged frame at this layout.
    pub fn frame_byte_len(self, width: u32, height: u32) -> usize {
        let luma = width as usize * height as usize;
        let (chroma_x16, bytes) = match self {
            PixelFormat::Yuv400 => (16, 1),
            PixelFormat::Yuv420 => (24, 1),
            PixelFormat::Yuv422 => (32, 1),
            PixelFormat::Yuv444 => (48, 1),
            PixelFormat::Yuv400_10 => (16, 2),
            PixelFormat::Yuv420_10 => (24, 2),
            PixelFormat::Yuv422_10 => (32, 2),
            PixelFormat::Yuv444_10 => (48, 2),
        };
        luma * chroma_x16 / 16 * bytes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostMode {
    Lossy,
    Lossless,
}

/// Hypothetical-reference-decoder signaling selected by the color space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HrdSignal {
    Off,
    Hlg2020,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Main,
    High,
}

/// Complete configuration handed to the engine's `open` call. Rebuilt fresh
/// for every encode; never persisted.
#[derive(Clone, Debug)]
pub struct VvencConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Frame rate in the engine's unit, already scaled from the nominal rate.
    pub frame_rate: u32,
    pub ticks_per_second: i64,
    pub qp: i32,
    pub internal_bit_depth: u32,
    pub format: PixelFormat,
    pub cost_mode: CostMode,
    /// Perceptual QP adaptation mode, 0 = off.
    pub qpa: u32,
    pub hrd: HrdSignal,
    pub hrd_parameters_present: bool,
    pub preset: Preset,
    pub decoded_picture_hash: bool,
    pub verbosity: u32,
    /// Frames the encode loop is expected to consume; 0 means until EOF.
    pub frames_to_encode: u64,
    /// Leading frames to drop from the staged input before encoding.
    pub frame_skip: u64,
    pub threads: u32,
    pub gop_size: u32,
    pub intra_period: u32,
    pub level: &'static str,
    pub tier: Tier,
    /// Rate-control passes, 1 or 2.
    pub num_passes: u32,
}

/// Maps the abstract parameters onto the typed surface. Pure; the failure
/// modes are the shared invariants plus bit depths this engine has no input
/// layout for.
pub fn build_config(
    params: &EncodeParams,
    input: &Path,
    output: &Path,
    frame_count: u64,
) -> Result<VvencConfig> {
    params.validate()?;

    let format = pixel_format(params.bit_depth, params.chroma_format)?;

    let (qpa, hrd, hrd_parameters_present) = match params.color_space {
        ColorSpace::YCbCrBt709 => (1, HrdSignal::Off, false),
        ColorSpace::YCbCrBt2020 => (3, HrdSignal::Hlg2020, true),
        _ => (0, HrdSignal::Off, false),
    };

    Ok(VvencConfig {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        width: params.width,
        height: params.height,
        frame_rate: TEMPORAL_SUBSAMPLE_RATIO * params.frame_rate,
        ticks_per_second: TICKS_PER_SECOND,
        qp: params.qp,
        internal_bit_depth: params.bit_depth,
        format,
        cost_mode: if params.lossless { CostMode::Lossless } else { CostMode::Lossy },
        qpa,
        hrd,
        hrd_parameters_present,
        preset: Preset::from_compress_level(params.compress_level),
        decoded_picture_hash: params.decoded_picture_hash,
        verbosity: params.verbosity,
        frames_to_encode: frame_count,
        frame_skip: 0,
        threads: 4,
        gop_size: 32,
        intra_period: 32,
        level: "6.3",
        tier: Tier::Main,
        num_passes: 1,
    })
}

fn pixel_format(bit_depth: u32, chroma: ChromaFormat) -> Result<PixelFormat> {
    let format = match (bit_depth, chroma) {
        (8, ChromaFormat::Monochrome) => PixelFormat::Yuv400,
        (8, ChromaFormat::C420) => PixelFormat::Yuv420,
        (8, ChromaFormat::C422) => PixelFormat::Yuv422,
        (8, ChromaFormat::C444) => PixelFormat::Yuv444,
        (10, ChromaFormat::Monochrome) => PixelFormat::Yuv400_10,
        (10, ChromaFormat::C420) => PixelFormat::Yuv420_10,
        (10, ChromaFormat::C422) => PixelFormat::Yuv422_10,
        (10, ChromaFormat::C444) => PixelFormat::Yuv444_10,
        (depth, _) => {
            return Err(BridgeError::Configuration(format!(
                "no input layout for {depth}-bit samples on this backend"
            )));
        }
    };
    Ok(format)
}

/// Rational frame rate actually signaled to the engine. Integer rates that
/// conventionally stand for NTSC rates are substituted with their precise
/// rational equivalents.
pub fn temporal_rate(frame_rate: u32) -> (u32, u32) {
    match frame_rate {
        23 => (24_000, 1001),
        29 => (30_000, 1001),
        59 => (60_000, 1001),
        rate => (rate, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn base() -> EncodeParams {
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

    fn build(params: &EncodeParams) -> Result<VvencConfig> {
        build_config(
            params,
            &PathBuf::from("/tmp/in.yuv"),
            &PathBuf::from("/tmp/out.vvc"),
            1,
        )
    }

    #[test]
    fn effort_levels_bucket_onto_presets() {
        let cases = [
            (0, Preset::Faster),
            (1, Preset::Faster),
            (2, Preset::Fast),
            (3, Preset::Fast),
            (4, Preset::Medium),
            (5, Preset::Medium),
            (6, Preset::Slow),
            (7, Preset::Slow),
            (8, Preset::Slower),
            (9, Preset::Slower),
        ];
        for (level, preset) in cases {
            assert_eq!(Preset::from_compress_level(level), preset, "level {level}");
        }
    }

    #[test]
    fn pixel_format_table_covers_8_and_10_bit_only() {
        let mut p = base();
        assert_eq!(build(&p).unwrap().format, PixelFormat::Yuv420);

        p.bit_depth = 10;
        p.chroma_format = ChromaFormat::C444;
        assert_eq!(build(&p).unwrap().format, PixelFormat::Yuv444_10);

        p.bit_depth = 12;
        assert!(matches!(build(&p), Err(BridgeError::Configuration(_))));
    }

    #[test]
    fn color_space_selects_qpa_and_hrd() {
        let mut p = base();
        let cfg = build(&p).unwrap();
        assert_eq!(cfg.qpa, 0);
        assert_eq!(cfg.hrd, HrdSignal::Off);
        assert!(!cfg.hrd_parameters_present);

        p.color_space = ColorSpace::YCbCrBt709;
        let cfg = build(&p).unwrap();
        assert_eq!(cfg.qpa, 1);
        assert_eq!(cfg.hrd, HrdSignal::Off);

        p.color_space = ColorSpace::YCbCrBt2020;
        let cfg = build(&p).unwrap();
        assert_eq!(cfg.qpa, 3);
        assert_eq!(cfg.hrd, HrdSignal::Hlg2020);
        assert!(cfg.hrd_parameters_present);
    }

    #[test]
    fn frame_rate_is_scaled_into_engine_units() {
        let cfg = build(&base()).unwrap();
        assert_eq!(cfg.frame_rate, 200);
    }

    #[test]
    fn lossless_flag_selects_cost_mode() {
        let mut p = base();
        p.lossless = true;
        p.color_space = ColorSpace::Rgb;
        assert_eq!(build(&p).unwrap().cost_mode, CostMode::Lossless);
    }

    #[test]
    fn shared_invariants_are_enforced_here_too() {
        let mut p = base();
        p.lossless = true; // still YCbCr
        assert!(matches!(build(&p), Err(BridgeError::Configuration(_))));
    }

    #[test]
    fn ntsc_rates_get_rational_substitutes() {
        assert_eq!(temporal_rate(23), (24_000, 1001));
        assert_eq!(temporal_rate(29), (30_000, 1001));
        assert_eq!(temporal_rate(59), (60_000, 1001));
        assert_eq!(temporal_rate(25), (25, 1));
        assert_eq!(temporal_rate(200), (200, 1));
    }

    #[test]
    fn frame_byte_len_matches_layout() {
        assert_eq!(PixelFormat::Yuv420.frame_byte_len(176, 144), 176 * 144 * 3 / 2);
        assert_eq!(PixelFormat::Yuv444_10.frame_byte_len(8, 8), 8 * 8 * 3 * 2);
        assert_eq!(PixelFormat::Yuv400.frame_byte_len(8, 8), 64);
    }
}
