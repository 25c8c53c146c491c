//! Tube-style overdrive: asymmetric tanh saturation, a one-pole tone filter
//! and a dry/wet mix.

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{Result, require_in_range, require_non_negative};

/// Negative half-waves are driven this much less than positive ones, which
/// adds even harmonics.
pub const NEGATIVE_DRIVE_RATIO: f64 = 0.9;

/// Tone filter coefficient at `tone = 0`. It rises linearly to 1 at `tone = 1`.
pub const MIN_TONE_COEFFICIENT: f64 = 0.05;

pub const MAX_OUTPUT_LEVEL: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverdriveParams {
    /// Saturation gain `k` in `tanh(k·x)`. Zero is silence on the wet path.
    pub drive: f64,
    /// 0 is fully low-passed, 1 bypasses the tone filter.
    pub tone: f64,
    /// Wet path level, in `[0, 2]`.
    pub output_level: f64,
    /// Dry/wet balance, in `[0, 1]`.
    pub mix: f64,
}

impl Default for OverdriveParams {
    fn default() -> Self {
        OverdriveParams {
            drive: 3.0,
            tone: 0.5,
            output_level: 0.7,
            mix: 1.0,
        }
    }
}

impl OverdriveParams {
    fn validated(&self) -> Result<OverdriveParams> {
        Ok(OverdriveParams {
            drive: require_non_negative("drive", self.drive)?,
            tone: require_in_range("tone", self.tone, 1.0)?,
            output_level: require_in_range("output_level", self.output_level, MAX_OUTPUT_LEVEL)?,
            mix: require_in_range("mix", self.mix, 1.0)?,
        })
    }

    fn tone_coefficient(&self) -> f64 {
        MIN_TONE_COEFFICIENT + self.tone * (1.0 - MIN_TONE_COEFFICIENT)
    }
}

/// The memoryless part: `tanh(k·x)` above zero, `tanh(0.9·k·x)` below.
pub fn saturate(x: f64, drive: f64) -> f64 {
    if x >= 0.0 {
        (drive * x).tanh()
    } else {
        (NEGATIVE_DRIVE_RATIO * drive * x).tanh()
    }
}

/// Apply the overdrive to every channel.
///
/// The tone filter carries state from one sample to the next, so each
/// channel is processed strictly in order.
pub fn overdrive(buffer: &SampleBuffer, params: &OverdriveParams) -> Result<SampleBuffer> {
    let p = params.validated()?;
    let alpha = p.tone_coefficient();

    Ok(buffer.map_channels(|input| {
        let mut filtered = 0.0f64;
        input
            .iter()
            .map(|&x| {
                let x = x as f64;
                let driven = saturate(x, p.drive);
                filtered += alpha * (driven - filtered);
                let toned = driven * p.tone + filtered * (1.0 - p.tone);
                (x * (1.0 - p.mix) + toned * p.output_level * p.mix) as f32
            })
            .collect()
    }))
}
