use crate::error::{BridgeError, Result};

/// Chroma subsampling layout of the staged input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromaFormat {
    Monochrome,
    C420,
    C422,
    C444,
}

impl ChromaFormat {
    /// The three-digit IDC string both backends use ("400", "420", ...).
    pub fn idc(self) -> &'static str {
        match self {
            ChromaFormat::Monochrome => "400",
            ChromaFormat::C420 => "420",
            ChromaFormat::C422 => "422",
            ChromaFormat::C444 => "444",
        }
    }

    /// Chroma samples per luma sample, times 16. Used to size one staged
    /// frame without floating point.
    pub fn samples_per_luma_x16(self) -> usize {
        match self {
            ChromaFormat::Monochrome => 16,
            ChromaFormat::C420 => 24,
            ChromaFormat::C422 => 32,
            ChromaFormat::C444 => 48,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    YCbCr,
    Rgb,
    YCgCo,
    YCbCrBt709,
    YCbCrBt2020,
}

/// Codec-agnostic parameter set supplied by the caller. Immutable for the
/// duration of one encode.
#[derive(Clone, Copy, Debug)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u32,
    pub chroma_format: ChromaFormat,
    pub color_space: ColorSpace,
    pub qp: i32,
    pub lossless: bool,
    pub limited_range: bool,
    /// Coarse 0..=9 effort level, bucketed onto backend presets.
    pub compress_level: u32,
    pub frame_rate: u32,
    pub verbosity: u32,
    pub decoded_picture_hash: bool,
    pub intra_only: bool,
}

impl EncodeParams {
    /// Checks the cross-field invariants shared by both backends. Violations
    /// are fatal configuration errors; no encode is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BridgeError::Configuration(format!(
                "picture size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.lossless {
            if self.color_space != ColorSpace::Rgb {
                return Err(BridgeError::Configuration(
                    "lossless mode requires the RGB color space".into(),
                ));
            }
            if self.limited_range {
                return Err(BridgeError::Configuration(
                    "lossless mode requires full sample range".into(),
                ));
            }
        }
        if self.limited_range {
            match self.color_space {
                ColorSpace::Rgb | ColorSpace::YCgCo => {
                    return Err(BridgeError::Configuration(
                        "limited sample range is not valid for RGB/YCgCo".into(),
                    ));
                }
                ColorSpace::YCbCrBt2020 => {
                    return Err(BridgeError::Configuration(
                        "BT.2020 input must use full sample range".into(),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Size in bytes of one staged frame: luma plus chroma planes at the
    /// source bit depth.
    pub fn frame_byte_len(&self) -> usize {
        let luma = self.width as usize * self.height as usize;
        let samples = luma * self.chroma_format.samples_per_luma_x16() / 16;
        let bytes_per_sample = if self.bit_depth > 8 { 2 } else { 1 };
        samples * bytes_per_sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn qcif_defaults_are_valid() {
        base().validate().unwrap();
    }

    #[test]
    fn lossless_requires_rgb_full_range() {
        let mut p = base();
        p.lossless = true;
        assert!(p.validate().is_err());

        p.color_space = ColorSpace::Rgb;
        p.validate().unwrap();

        p.limited_range = true;
        assert!(p.validate().is_err());
    }

    #[test]
    fn limited_range_rejected_for_rgb_ycgco_bt2020() {
        for cs in [ColorSpace::Rgb, ColorSpace::YCgCo, ColorSpace::YCbCrBt2020] {
            let mut p = base();
            p.color_space = cs;
            p.limited_range = true;
            assert!(p.validate().is_err(), "{cs:?} must reject limited range");
        }
        let mut p = base();
        p.color_space = ColorSpace::YCbCrBt709;
        p.limited_range = true;
        p.validate().unwrap();
    }

    #[test]
    fn zero_dimensions_rejected() {
        let mut p = base();
        p.width = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn frame_byte_len_follows_chroma_and_depth() {
        let mut p = base();
        assert_eq!(p.frame_byte_len(), 176 * 144 * 3 / 2);
        p.chroma_format = ChromaFormat::C444;
        assert_eq!(p.frame_byte_len(), 176 * 144 * 3);
        p.bit_depth = 10;
        assert_eq!(p.frame_byte_len(), 176 * 144 * 6);
        p.chroma_format = ChromaFormat::Monochrome;
        assert_eq!(p.frame_byte_len(), 176 * 144 * 2);
    }
}
