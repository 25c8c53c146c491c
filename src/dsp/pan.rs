//! Stereo placement of a mono-summed signal.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};

/// Gain distribution as a function of pan position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanLaw {
    Linear,
    /// Equal power: `left² + right² = 1` across the whole range.
    #[default]
    ConstantPower,
    /// Attenuate only the channel opposite the pan direction.
    Balance,
}

impl PanLaw {
    /// `(left, right)` gains for `position`, clamped to `[-1, 1]`.
    pub fn gains(self, position: f64) -> (f64, f64) {
        let p = position.clamp(-1.0, 1.0);
        match self {
            PanLaw::Linear => ((1.0 - p) / 2.0, (1.0 + p) / 2.0),
            PanLaw::ConstantPower => {
                let angle = (p + 1.0) * PI / 4.0;
                (angle.cos(), angle.sin())
            }
            PanLaw::Balance => {
                if p <= 0.0 {
                    (1.0, 1.0 + p)
                } else {
                    (1.0 - p, 1.0)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanParams {
    /// -1 is hard left, 0 centre, 1 hard right.
    pub position: f64,
    pub law: PanLaw,
}

/// Sum to mono, then place the result in a two-channel field.
///
/// Out-of-range positions are clamped rather than rejected. NaN is rejected.
pub fn pan(buffer: &SampleBuffer, params: &PanParams) -> Result<SampleBuffer> {
    if params.position.is_nan() {
        return Err(AudioError::invalid("position", "must be a number"));
    }
    let (left_gain, right_gain) = params.law.gains(params.position);

    let mono = mono_sum(buffer);
    let left = mono.iter().map(|&m| (m as f64 * left_gain) as f32).collect();
    let right = mono.iter().map(|&m| (m as f64 * right_gain) as f32).collect();
    Ok(SampleBuffer::from_parts(vec![left, right], buffer.sample_rate()))
}

/// `(left + right) / 2` for multi-channel input, the channel itself for mono.
fn mono_sum(buffer: &SampleBuffer) -> Vec<f32> {
    if buffer.channel_count() == 1 {
        return buffer.channels()[0].clone();
    }
    let (left, right) = buffer.stereo_pair();
    left.iter().zip(right).map(|(&l, &r)| (l + r) / 2.0).collect()
}
