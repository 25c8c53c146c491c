//! Tone generator: closed-form waveforms sampled at `t = i / sample_rate`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result, require_in_range};

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Unit-amplitude value of a `freq` Hz wave at time `t` seconds.
    pub fn value_at(self, freq: f64, t: f64) -> f64 {
        let cycles = freq * t;
        match self {
            Waveform::Sine => (2.0 * PI * cycles).sin(),
            Waveform::Square => {
                let s = (2.0 * PI * cycles).sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Waveform::Sawtooth => 2.0 * (cycles - (0.5 + cycles).floor()),
            Waveform::Triangle => 2.0 * (2.0 * (cycles - (cycles + 0.5).floor())).abs() - 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToneParams {
    pub waveform: Waveform,
    /// Hz, greater than zero.
    pub frequency: f64,
    /// Peak level in `[0, 1]`.
    pub amplitude: f64,
    /// Seconds, greater than zero.
    pub duration: f64,
    pub sample_rate: u32,
}

impl Default for ToneParams {
    fn default() -> Self {
        ToneParams {
            waveform: Waveform::Sine,
            frequency: 440.0,
            amplitude: 0.5,
            duration: 2.0,
            sample_rate: 44100,
        }
    }
}

impl ToneParams {
    fn validate(&self) -> Result<()> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(AudioError::invalid(
                "frequency",
                format!("must be a positive number of Hz, got {}", self.frequency),
            ));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(AudioError::invalid(
                "duration",
                format!("must be a positive number of seconds, got {}", self.duration),
            ));
        }
        if self.sample_rate == 0 {
            return Err(AudioError::invalid("sample_rate", "must be positive"));
        }
        require_in_range("amplitude", self.amplitude, 1.0)?;
        Ok(())
    }

    /// `round(duration * sample_rate)`.
    pub fn frame_count(&self) -> usize {
        (self.duration * self.sample_rate as f64).round() as usize
    }
}

/// Render a mono tone.
pub fn generate(params: &ToneParams) -> Result<SampleBuffer> {
    params.validate()?;
    let sr = params.sample_rate as f64;
    let samples = (0..params.frame_count())
        .map(|i| {
            let t = i as f64 / sr;
            (params.waveform.value_at(params.frequency, t) * params.amplitude) as f32
        })
        .collect();
    Ok(SampleBuffer::from_parts(vec![samples], params.sample_rate))
}
