//! Fundamental pitch estimation by bounded autocorrelation.
//!
//! Searches lags between `sample_rate / max_freq` and `sample_rate / min_freq`
//! for the one that maximizes `Σ x[i]·x[i+lag]` over a fixed window, then
//! reports the nearest equal-tempered note for tuner-style readouts.

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};

pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const A4_FREQ: f64 = 440.0;

/// Search band and fallbacks. The defaults (60-400 Hz over 2048 samples,
/// 150 Hz when nothing correlates) are tunable, not load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PitchSearch {
    pub min_freq: f64,
    pub max_freq: f64,
    /// Number of leading samples correlated at each lag.
    pub window: usize,
    /// Reported when no lag correlates positively.
    pub fallback_freq: f64,
}

impl Default for PitchSearch {
    fn default() -> Self {
        PitchSearch {
            min_freq: 60.0,
            max_freq: 400.0,
            window: 2048,
            fallback_freq: 150.0,
        }
    }
}

impl PitchSearch {
    /// Requires `0 < min_freq < max_freq`, a non-empty window and a
    /// positive fallback, all finite.
    pub fn validated(&self) -> Result<PitchSearch> {
        for (name, v) in [
            ("min_freq", self.min_freq),
            ("max_freq", self.max_freq),
            ("fallback_freq", self.fallback_freq),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(AudioError::invalid(
                    name,
                    format!("must be a positive number of Hz, got {v}"),
                ));
            }
        }
        if self.min_freq >= self.max_freq {
            return Err(AudioError::invalid(
                "min_freq",
                format!("{} Hz is not below max_freq {} Hz", self.min_freq, self.max_freq),
            ));
        }
        if self.window == 0 {
            return Err(AudioError::invalid("window", "must hold at least one sample"));
        }
        Ok(*self)
    }
}

/// Result of pitch detection on a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchEstimate {
    /// Estimated fundamental in Hz.
    pub frequency: f64,
    /// Winning lag in samples, `None` when the fallback was used.
    pub period: Option<usize>,
    /// Nearest MIDI note number.
    pub midi_note: u8,
    /// Note name with octave, e.g. `A4`.
    pub note_name: String,
    /// Offset from the nearest note in cents.
    pub cents: f64,
}

/// Detect the fundamental of the first channel.
pub fn estimate_pitch(buffer: &SampleBuffer, search: &PitchSearch) -> Result<PitchEstimate> {
    let search = search.validated()?;
    let data = buffer.channel(0).unwrap_or(&[]);
    let sr = buffer.sample_rate() as f64;

    // Lags at or past the data length have an empty window.
    let min_lag = (sr / search.max_freq).floor() as usize;
    let max_lag = ((sr / search.min_freq).floor() as usize).min(data.len());

    let mut best_corr = 0.0f64;
    let mut best_lag = 0usize;
    for lag in min_lag.max(1)..max_lag {
        let end = search.window.min(data.len().saturating_sub(lag));
        let corr: f64 = (0..end)
            .map(|i| data[i] as f64 * data[i + lag] as f64)
            .sum();
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    let (frequency, period) = if best_lag > 0 {
        (sr / best_lag as f64, Some(best_lag))
    } else {
        log::debug!("no positive autocorrelation peak, using {} Hz", search.fallback_freq);
        (search.fallback_freq, None)
    };

    let (midi_note, cents) = freq_to_midi_cents(frequency, A4_FREQ);
    Ok(PitchEstimate {
        frequency,
        period,
        midi_note,
        note_name: note_name(midi_note),
        cents,
    })
}

/// Convert a frequency to the nearest MIDI note + fine-tune cents.
pub fn freq_to_midi_cents(freq: f64, a4_freq: f64) -> (u8, f64) {
    if freq <= 0.0 {
        return (0, 0.0);
    }
    let midi_float = 69.0 + 12.0 * (freq / a4_freq).log2();
    let midi_note = midi_float.round() as i32;
    let cents = (midi_float - midi_note as f64) * 100.0;

    let clamped = midi_note.clamp(0, 127) as u8;
    (clamped, cents)
}

/// `60` becomes `C4`.
pub fn note_name(midi_note: u8) -> String {
    let octave = midi_note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[midi_note as usize % 12], octave)
}
