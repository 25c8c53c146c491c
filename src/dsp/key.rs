//! Musical key estimation by chromagram/profile correlation.
//!
//! Each Hann-windowed frame is measured with a single-bin DFT at every note of
//! octaves 2 to 6. Magnitudes fold into a 12-bin chromagram, which is
//! normalized and then correlated against the Krumhansl-Schmuckler major and
//! minor profiles at all 12 rotations.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::dsp::tuner::NOTE_NAMES;

pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
pub const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

pub const FRAME_SIZE: usize = 4096;
pub const HOP_SIZE: usize = FRAME_SIZE / 2;
const OCTAVES: std::ops::RangeInclusive<i32> = 2..=6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEstimate {
    /// Pitch class of the tonic, 0 = C through 11 = B.
    pub tonic: u8,
    pub mode: Mode,
    /// Dot product of the rotated chromagram with the winning profile.
    pub score: f64,
    /// Per pitch class energy, normalized so the largest bin is 1.
    pub chromagram: [f64; 12],
}

impl KeyEstimate {
    /// e.g. `"F# minor"`.
    pub fn name(&self) -> String {
        let mode = match self.mode {
            Mode::Major => "major",
            Mode::Minor => "minor",
        };
        format!("{} {}", NOTE_NAMES[self.tonic as usize % 12], mode)
    }
}

/// Estimate the key of the first channel.
///
/// Buffers shorter than one frame yield an all-zero chromagram, which
/// resolves to C major.
pub fn detect_key(buffer: &SampleBuffer) -> KeyEstimate {
    let data = buffer.channel(0).unwrap_or(&[]);
    let chromagram = chromagram(data, buffer.sample_rate());
    let (tonic, mode, score) = best_key(&chromagram);
    KeyEstimate {
        tonic,
        mode,
        score,
        chromagram,
    }
}

/// Normalized 12-bin chromagram of `data`.
pub fn chromagram(data: &[f32], sample_rate: u32) -> [f64; 12] {
    let window: Vec<f64> = (0..FRAME_SIZE)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / FRAME_SIZE as f64).cos())
        .collect();
    let bins = note_bins(sample_rate);

    let mut chroma = [0.0f64; 12];
    let mut frame = vec![0.0f64; FRAME_SIZE];
    let mut start = 0;
    let mut frames = 0usize;
    while start + FRAME_SIZE < data.len() {
        for (i, slot) in frame.iter_mut().enumerate() {
            *slot = data[start + i] as f64 * window[i];
        }
        for &(note, bin) in &bins {
            chroma[note] += bin_magnitude(&frame, bin);
        }
        start += HOP_SIZE;
        frames += 1;
    }
    log::trace!("chromagram over {frames} frames");

    let max = chroma.iter().copied().fold(0.0f64, f64::max);
    if max > 0.0 {
        for c in &mut chroma {
            *c /= max;
        }
    }
    chroma
}

/// `(pitch class, DFT bin)` for every note in the analysed octaves.
fn note_bins(sample_rate: u32) -> Vec<(usize, usize)> {
    let mut bins = Vec::new();
    for note in 0..12 {
        for octave in OCTAVES {
            let semitones_from_a4 = (note as i32 - 9 + (octave - 4) * 12) as f64;
            let freq = 440.0 * 2f64.powf(semitones_from_a4 / 12.0);
            let bin = (freq * FRAME_SIZE as f64 / sample_rate as f64).round() as usize;
            if bin > 0 && bin < FRAME_SIZE / 2 {
                bins.push((note, bin));
            }
        }
    }
    bins
}

/// Magnitude of a single DFT bin (Goertzel-style).
fn bin_magnitude(frame: &[f64], bin: usize) -> f64 {
    let omega = 2.0 * PI * bin as f64 / frame.len() as f64;
    let (mut re, mut im) = (0.0f64, 0.0f64);
    for (i, &x) in frame.iter().enumerate() {
        let phase = omega * i as f64;
        re += x * phase.cos();
        im += x * phase.sin();
    }
    (re * re + im * im).sqrt()
}

/// Highest-scoring rotation and mode. For each tonic the major profile is
/// tried before the minor one, and only a strictly better score replaces the
/// current best, so exact ties go to the earlier candidate.
fn best_key(chroma: &[f64; 12]) -> (u8, Mode, f64) {
    let mut best = (0u8, Mode::Major, f64::NEG_INFINITY);
    for tonic in 0..12 {
        let rotated: [f64; 12] = std::array::from_fn(|i| chroma[(i + tonic) % 12]);
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            let score: f64 = rotated.iter().zip(profile).map(|(c, p)| c * p).sum();
            if score > best.2 {
                best = (tonic as u8, mode, score);
            }
        }
    }
    best
}
