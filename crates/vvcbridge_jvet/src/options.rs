//! Translation from the codec-agnostic parameter set into the engine's flat
//! `--Key=Value` argument list. Pure policy table, no I/O; the only failure
//! mode is a configuration invariant violation.

use std::path::Path;

use vvcbridge_common::{
    ChromaFormat, ColorSpace, EncodeParams, Result, TEMPORAL_SUBSAMPLE_RATIO,
};

#[derive(Default)]
struct OptionSet(Vec<String>);

impl OptionSet {
    fn push(&mut self, s: impl Into<String>) {
        self.0.push(s.into());
    }
}

/// Builds the complete argument list for one encode call. Rebuilt fresh every
/// time; entries never contradict (each key is emitted by exactly one branch).
pub fn build_option_set(
    params: &EncodeParams,
    input: &Path,
    output: &Path,
    frame_count: u64,
) -> Result<Vec<String>> {
    params.validate()?;

    let mut o = OptionSet::default();
    // dummy program name, expected by the engine's argv parser
    o.push("vvcbridge_jvet");

    o.push(format!("--InputFile={}", input.display()));
    o.push(format!("--BitstreamFile={}", output.display()));
    o.push(format!("--SourceWidth={}", params.width));
    o.push(format!("--SourceHeight={}", params.height));
    o.push(format!("--InputBitDepth={}", params.bit_depth));
    o.push(format!("--MSBExtendedBitDepth={}", params.bit_depth));
    o.push(format!(
        "--FrameRate={}",
        TEMPORAL_SUBSAMPLE_RATIO * params.frame_rate
    ));

    chroma_options(&mut o, params.chroma_format);
    color_space_options(&mut o, params.color_space, params.limited_range);

    o.push(format!(
        "--decodedpicturehash={}",
        params.decoded_picture_hash as u8
    ));
    o.push("--MaxLayers=1");
    o.push("--CbQpOffset=0");
    o.push("--CrQpOffset=0");
    o.push(format!("--TemporalSubsampleRatio={TEMPORAL_SUBSAMPLE_RATIO}"));
    o.push("--SameCQPTablesForAllChroma=1");
    o.push("--ReWriteParamSets=1");

    if params.verbosity == 0 {
        o.push("--Verbosity=6");
    }

    o.push(format!("--FramesToBeEncoded={frame_count}"));

    // padding is the caller's job, only the conformance window is signaled
    o.push("--ConformanceWindowMode=1");

    o.push("--Log2MaxTbSize=5");
    o.push("--CTUSize=32");
    o.push("--MaxCUWidth=16");
    o.push("--MaxCUHeight=16");
    o.push("--MaxBTLumaISlice=32");
    o.push("--MaxBTChromaISlice=32");
    o.push("--MaxBTNonISlice=32");
    o.push("--MaxTTLumaISlice=32");
    o.push("--MaxTTChromaISlice=32");
    o.push("--MaxTTNonISlice=32");
    o.push("--LCTUFast=1");

    o.push("--InputColorPrimaries=-1");
    o.push("--DecodingRefreshType=1");
    o.push("--TemporalFilter=0");

    cost_mode_options(&mut o, params);
    profile_options(&mut o, params.bit_depth);

    if params.intra_only {
        intra_only_options(&mut o);
    } else {
        animation_options(&mut o);
    }

    o.push("--MinQTLumaISlice=8");
    o.push("--MinQTChromaISliceInChromaSamples=4");
    o.push("--MinQTNonISlice=8");
    o.push("--MaxMTTHierarchyDepth=3");
    o.push("--MaxMTTHierarchyDepthISliceL=3");
    o.push("--MaxMTTHierarchyDepthISliceC=3");

    o.push("--SbTMVP=1");
    o.push("--MaxNumMergeCand=6");
    o.push("--LMChroma=1");
    o.push("--IMV=1");
    o.push("--MRL=1");
    o.push("--MIP=1");
    o.push("--PBIntraFast=1");
    o.push("--FastMrg=1");
    o.push("--AMaxBT=1");
    o.push("--HadamardME=1");
    o.push("--FEN=1");
    o.push("--FDM=1");
    o.push("--TransformSkip=1");
    o.push("--TransformSkipFast=1");
    o.push("--TransformSkipLog2MaxSize=5");
    o.push("--SAOLcuBoundary=0");

    Ok(o.0)
}

fn chroma_options(o: &mut OptionSet, format: ChromaFormat) {
    o.push(format!("--InputChromaFormat={}", format.idc()));
    o.push(format!("--ChromaFormatIDC={}", format.idc()));
    match format {
        ChromaFormat::Monochrome | ChromaFormat::C420 => o.push("--VerCollocatedChroma=0"),
        ChromaFormat::C422 => o.push("--VerCollocatedChroma=1"),
        ChromaFormat::C444 => {
            o.push("--VerCollocatedChroma=1");
            o.push("--BDPCM=1");
        }
    }
}

/// Colorimetry bundle: matrix coefficients, chroma QP mapping tables, color
/// transform, dual tree and the LMCS mapping controls all travel together.
fn color_space_options(o: &mut OptionSet, cs: ColorSpace, limited_range: bool) {
    o.push("--LumaLevelToDeltaQPMode=0");
    o.push("--WCGPPSEnable=0");

    match cs {
        ColorSpace::YCbCr => {
            o.push("--MatrixCoefficients=2");
            o.push("--QpInValCb=17 27 32 44");
            o.push("--QpOutValCb=17 29 34 41");
            o.push("--ColorTransform=0");
            o.push("--DualITree=1");
            o.push("--LMCSEnable=0");
            sample_range(o, limited_range);
        }
        ColorSpace::Rgb => {
            o.push("--MatrixCoefficients=0");
            o.push("--QpInValCb=17 27 32 44");
            o.push("--QpOutValCb=17 29 34 41");
            o.push("--ColorTransform=1");
            o.push("--DualITree=0");
            o.push("--LMCSEnable=0");
            sample_range(o, false);
        }
        ColorSpace::YCgCo => {
            o.push("--MatrixCoefficients=8");
            o.push("--QpInValCb=17 27 32 44");
            o.push("--QpOutValCb=17 29 34 41");
            o.push("--ColorTransform=1");
            o.push("--DualITree=0");
            o.push("--LMCSEnable=0");
            sample_range(o, false);
        }
        ColorSpace::YCbCrBt709 => {
            o.push("--MatrixCoefficients=1");
            o.push("--QpInValCb=17 27 32 44");
            o.push("--QpOutValCb=17 29 34 41");
            o.push("--ColorTransform=0");
            o.push("--DualITree=1");
            if limited_range {
                o.push("--LMCSEnable=1");
                o.push("--LMCSSignalType=0");
                o.push("--LMCSOffset=0");
            }
            sample_range(o, limited_range);
        }
        ColorSpace::YCbCrBt2020 => {
            o.push("--MatrixCoefficients=9");
            o.push("--QpInValCb=9 23 33 42");
            o.push("--QpOutValCb=9 24 33 37");
            o.push("--ColorTransform=0");
            o.push("--DualITree=1");
            o.push("--LMCSEnable=1");
            o.push("--LMCSSignalType=2");
            o.push("--LMCSOffset=0");
            o.push("--InputSampleRange=1");
            o.push("--VideoFullRange=0");
        }
    }
}

fn sample_range(o: &mut OptionSet, limited: bool) {
    if limited {
        o.push("--InputSampleRange=0");
        o.push("--VideoFullRange=0");
    } else {
        o.push("--InputSampleRange=1");
        o.push("--VideoFullRange=1");
    }
}

/// Lossless mode force-disables the transform, filtering and RDO tools and
/// force-enables the screen-content tools; lossy mode enables the regular
/// tool set and pins the internal bit depth to the source depth.
fn cost_mode_options(o: &mut OptionSet, params: &EncodeParams) {
    if params.lossless {
        o.push("--CostMode=lossless");
        o.push("--QP=0");
        o.push("--ChromaTS=1");
        o.push("--DepQuant=0");
        o.push("--RDOQ=0");
        o.push("--RDOQTS=0");
        o.push("--SBT=0");
        o.push("--ISP=0");
        o.push("--MTS=0");
        o.push("--LFNST=0");
        o.push("--JointCbCr=0");
        o.push("--DeblockingFilterDisable=1");
        o.push("--SAO=0");
        o.push("--ALF=0");
        o.push("--CCALF=0");
        o.push("--DMVR=0");
        o.push("--BIO=0");
        o.push("--PROF=0");
        o.push("--InternalBitDepth=0");
        o.push("--TSRCdisableLL=1");
        // params.validate() already pinned lossless to RGB + full range
        o.push("--IBC=1");
        o.push("--HashME=1");
        o.push("--PLT=1");
    } else {
        o.push("--CostMode=lossy");
        o.push(format!("--QP={}", params.qp));
        o.push("--ChromaTS=1");
        o.push("--DepQuant=1");
        o.push("--RDOQ=1");
        o.push("--RDOQTS=1");
        o.push("--SBT=1");
        o.push("--ISP=1");
        o.push("--MTS=1");
        o.push("--MTSIntraMaxCand=4");
        o.push("--MTSInterMaxCand=4");
        o.push("--LFNST=1");
        o.push("--JointCbCr=1");
        o.push("--DeblockingFilterDisable=0");
        o.push("--SAO=1");
        o.push("--ALF=1");
        o.push("--PROF=1");
        o.push(format!("--InternalBitDepth={}", params.bit_depth));
        o.push(format!("--MaxBitDepthConstraint={}", params.bit_depth));
    }
}

/// Bit depths of 12 and above need the extended-precision profile, which is
/// incompatible with the motion refinement tools.
fn profile_options(o: &mut OptionSet, bit_depth: u32) {
    if bit_depth >= 12 {
        o.push("--Profile=none");
        o.push("--TSRCRicePresent=1");
        o.push("--MMVD=0");
        o.push("--SMVD=0");
        o.push("--DMVR=0");
        o.push("--Affine=0");
        o.push("--ExtendedPrecision=1");
    } else {
        o.push("--Profile=auto");
        o.push("--Affine=1");
    }
}

/// Tool bundle tuned for single-picture encoding. The LMCS controls,
/// including the mapping offset, belong to the color-space bundle and are not
/// emitted here.
fn intra_only_options(o: &mut OptionSet) {
    o.push("--GOPSize=1");
    o.push("--IntraPeriod=1");
    o.push("--OnePictureOnlyConstraintFlag=1");
    o.push("--GciPresentFlag=1");
    o.push("--Level=15.5");
    o.push("--Tier=high");

    o.push("--SearchRange=64");
    o.push("--CIIP=0");
    o.push("--AffineAmvr=0");
    o.push("--LMCSUpdateCtrl=1");

    o.push("--ISPFast=1");
    o.push("--FastMIP=1");
    o.push("--FastLFNST=1");
    o.push("--FastLocalDualTreeMode=0");

    o.push("--AffineAmvrEncOpt=0");
    o.push("--MmvdDisNum=8");
}

/// Tool bundle tuned for multi-frame encoding. Only a single-frame GOP is
/// exercised per call; frame-count-driven GOP structuring is deliberately
/// not active. As in the intra bundle, the LMCS mapping offset stays with
/// the color-space bundle so each key keeps a single owner.
fn animation_options(o: &mut OptionSet) {
    const GOP_SIZE: usize = 1;

    o.push(format!("--GOPSize={GOP_SIZE}"));
    o.push("--IntraPeriod=-1");
    o.push("--SearchRange=64");
    o.push("--MinSearchWindow=96");
    o.push("--BipredSearchRange=4");

    o.push("--IntraQPOffset=-3");
    o.push("--LambdaFromQpEnable=1");

    o.push("--CIIP=1");
    o.push("--AffineAmvr=0");
    o.push("--LMCSUpdateCtrl=2");
    o.push("--AllowDisFracMMVD=1");
    o.push("--ISPFast=0");
    o.push("--FastMIP=0");
    o.push("--FastLFNST=0");
    o.push("--FastLocalDualTreeMode=2");

    o.push("--AffineAmvrEncOpt=0");
    o.push("--MmvdDisNum=6");

    for i in 0..GOP_SIZE {
        o.push(format!(
            "--Frame{}=P 1 5 -6.5 0.2590 0 0 1.0 0 0 0 4 4 1 5 9 13 0",
            i + 1
        ));
    }
}
