//! Request records: which operator to run, and with what parameters.
//!
//! Requests are built once per call from caller configuration (JSON on the
//! native side, a plain JS object through `serde-wasm-bindgen` in the browser)
//! and are never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::dsp::downmix::DownmixParams;
use crate::dsp::oscillator::ToneParams;
use crate::dsp::overdrive::OverdriveParams;
use crate::dsp::pan::PanParams;
use crate::dsp::resample::ResampleParams;
use crate::dsp::reverse::ReverseParams;
use crate::dsp::tuner::PitchSearch;
use crate::error::Result;

/// A buffer-to-buffer transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum TransformRequest {
    Reverse(ReverseParams),
    Resample(ResampleParams),
    Pan(PanParams),
    Downmix(DownmixParams),
    Overdrive(OverdriveParams),
}

impl TransformRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Short operator name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TransformRequest::Reverse(_) => "reverse",
            TransformRequest::Resample(_) => "resample",
            TransformRequest::Pan(_) => "pan",
            TransformRequest::Downmix(_) => "downmix",
            TransformRequest::Overdrive(_) => "overdrive",
        }
    }
}

/// A buffer-to-estimate analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum AnalysisRequest {
    Pitch(PitchSearch),
    Key,
}

impl AnalysisRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration for the tone generator, which has no input buffer.
pub type ToneRequest = ToneParams;

pub fn tone_from_json(json: &str) -> Result<ToneRequest> {
    Ok(serde_json::from_str(json)?)
}
