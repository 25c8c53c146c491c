//! Multi-channel to mono conversion.

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownmixMode {
    /// `(left + right) / 2`
    #[default]
    Average,
    LeftOnly,
    RightOnly,
    /// `(left - right) / 2`: keeps only out-of-phase content.
    Side,
    /// Whichever of left/right has the larger magnitude.
    Peak,
}

impl DownmixMode {
    fn mix(self, left: f32, right: f32) -> f32 {
        match self {
            DownmixMode::Average => (left + right) / 2.0,
            DownmixMode::LeftOnly => left,
            DownmixMode::RightOnly => right,
            DownmixMode::Side => (left - right) / 2.0,
            DownmixMode::Peak => {
                if left.abs() > right.abs() {
                    left
                } else {
                    right
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownmixParams {
    pub mode: DownmixMode,
    /// Write the mono signal to two identical channels.
    pub dual_mono: bool,
    /// Output gain in decibels.
    pub gain_db: f64,
    /// Scale the result down when its peak exceeds full scale.
    pub normalize: bool,
}

/// Collapse the first two channels to one. A mono source counts as left == right.
pub fn downmix(buffer: &SampleBuffer, params: &DownmixParams) -> Result<SampleBuffer> {
    if !params.gain_db.is_finite() {
        return Err(AudioError::invalid(
            "gain_db",
            format!("must be finite, got {}", params.gain_db),
        ));
    }
    let (left, right) = buffer.stereo_pair();
    let mut mono: Vec<f32> = left
        .iter()
        .zip(right)
        .map(|(&l, &r)| params.mode.mix(l, r))
        .collect();

    if params.gain_db != 0.0 {
        let gain = 10f64.powf(params.gain_db / 20.0);
        for s in &mut mono {
            *s = (*s as f64 * gain) as f32;
        }
    }

    if params.normalize {
        let peak = mono.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        if peak > 1.0 {
            for s in &mut mono {
                *s /= peak;
            }
        }
    }

    let channels = if params.dual_mono {
        vec![mono.clone(), mono]
    } else {
        vec![mono]
    };
    Ok(SampleBuffer::from_parts(channels, buffer.sample_rate()))
}
