//! decode → operator → encode.

use serde::Serialize;

use crate::buffer::{EncodedAudio, SampleBuffer};
use crate::decode::DecodeAdapter;
use crate::dsp::{downmix, key, oscillator, overdrive, pan, resample, reverse, tuner};
use crate::error::{Result, Warning};
use crate::request::{AnalysisRequest, ToneRequest, TransformRequest};
use crate::wav;

/// Run one transform on a buffer.
pub fn apply(buffer: &SampleBuffer, request: &TransformRequest) -> Result<SampleBuffer> {
    log::debug!(
        "{} on {} frames x {} channels",
        request.name(),
        buffer.frame_count(),
        buffer.channel_count()
    );
    match request {
        TransformRequest::Reverse(params) => reverse::apply(buffer, params),
        TransformRequest::Resample(params) => resample::resample(buffer, params.target_rate),
        TransformRequest::Pan(params) => pan::pan(buffer, params),
        TransformRequest::Downmix(params) => downmix::downmix(buffer, params),
        TransformRequest::Overdrive(params) => overdrive::overdrive(buffer, params),
    }
}

/// Estimator output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Analysis {
    Pitch(tuner::PitchEstimate),
    Key(key::KeyEstimate),
}

pub fn analyze_buffer(buffer: &SampleBuffer, request: &AnalysisRequest) -> Result<Analysis> {
    Ok(match request {
        AnalysisRequest::Pitch(search) => {
            Analysis::Pitch(tuner::estimate_pitch(buffer, search)?)
        }
        AnalysisRequest::Key => Analysis::Key(key::detect_key(buffer)),
    })
}

/// Render a tone. The synthesizer has no input buffer.
pub fn generate(request: &ToneRequest) -> Result<SampleBuffer> {
    oscillator::generate(request)
}

/// Encoded result plus any non-fatal conditions met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub encoded: EncodedAudio,
    pub warnings: Vec<Warning>,
}

/// Transform a decoded buffer and encode the result.
pub fn transform_and_encode(
    buffer: &SampleBuffer,
    request: &TransformRequest,
) -> Result<PipelineOutput> {
    let mut warnings = Vec::new();
    if buffer.is_empty() {
        log::debug!("empty input to {}", request.name());
        warnings.push(Warning::EmptyInput);
    }
    let transformed = apply(buffer, request)?;
    Ok(PipelineOutput {
        encoded: wav::encode(&transformed)?,
        warnings,
    })
}

/// A decoder bound to the decode → operator → encode flow.
#[derive(Debug, Clone, Default)]
pub struct Pipeline<D> {
    decoder: D,
}

impl<D: DecodeAdapter> Pipeline<D> {
    pub fn new(decoder: D) -> Self {
        Pipeline { decoder }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer> {
        Ok(self.decoder.decode(bytes)?)
    }

    pub fn process(&self, bytes: &[u8], request: &TransformRequest) -> Result<PipelineOutput> {
        let buffer = self.decode(bytes)?;
        transform_and_encode(&buffer, request)
    }

    pub fn analyze(&self, bytes: &[u8], request: &AnalysisRequest) -> Result<Analysis> {
        let buffer = self.decode(bytes)?;
        analyze_buffer(&buffer, request)
    }
}
