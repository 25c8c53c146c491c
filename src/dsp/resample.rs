//! Sample-rate conversion with a Kaiser-windowed sinc kernel.
//!
//! When downsampling, the kernel is stretched so its cutoff sits at the
//! target Nyquist frequency, which keeps content above it from folding back.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};

/// Zero crossings of the sinc on each side of the centre tap (at unity cutoff).
pub const DEFAULT_LOBES: usize = 8;

/// Kaiser beta: roughly 60 dB stopband attenuation.
const KAISER_BETA: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResampleParams {
    pub target_rate: u32,
}

impl Default for ResampleParams {
    fn default() -> Self {
        ResampleParams { target_rate: 44100 }
    }
}

/// `round(frames * to / from)`, half away from zero.
pub fn output_frames(frames: usize, from: u32, to: u32) -> usize {
    let num = frames as u128 * to as u128 * 2 + from as u128;
    (num / (2 * from as u128)) as usize
}

/// Convert every channel to `target_rate`.
///
/// A target equal to the source rate returns an exact copy.
pub fn resample(buffer: &SampleBuffer, target_rate: u32) -> Result<SampleBuffer> {
    resample_with_lobes(buffer, target_rate, DEFAULT_LOBES)
}

pub fn resample_with_lobes(
    buffer: &SampleBuffer,
    target_rate: u32,
    lobes: usize,
) -> Result<SampleBuffer> {
    if target_rate == 0 {
        return Err(AudioError::invalid("target_rate", "must be positive"));
    }
    let from = buffer.sample_rate();
    if target_rate == from {
        return Ok(buffer.clone());
    }

    let out_len = output_frames(buffer.frame_count(), from, target_rate);
    let kernel = SincKernel::new(from, target_rate, lobes.max(1));
    let channels = buffer
        .channels()
        .iter()
        .map(|ch| kernel.run(ch, out_len))
        .collect();
    Ok(SampleBuffer::from_parts(channels, target_rate))
}

struct SincKernel {
    /// Input samples advanced per output sample.
    step: f64,
    /// Normalized cutoff relative to the input Nyquist, at most 1.
    cutoff: f64,
    /// Taps on each side of the interpolation point, in input samples.
    half_width: isize,
    bessel_beta: f64,
}

impl SincKernel {
    fn new(from: u32, to: u32, lobes: usize) -> Self {
        let cutoff = (to as f64 / from as f64).min(1.0);
        SincKernel {
            step: from as f64 / to as f64,
            cutoff,
            half_width: (lobes as f64 / cutoff).ceil() as isize,
            bessel_beta: bessel_i0(KAISER_BETA),
        }
    }

    fn tap(&self, x: f64) -> f64 {
        let t = x / self.half_width as f64;
        if t.abs() > 1.0 {
            return 0.0;
        }
        let window = bessel_i0(KAISER_BETA * (1.0 - t * t).max(0.0).sqrt()) / self.bessel_beta;
        let arg = self.cutoff * x;
        let sinc = if arg.abs() < 1e-10 {
            1.0
        } else {
            (PI * arg).sin() / (PI * arg)
        };
        self.cutoff * sinc * window
    }

    fn run(&self, input: &[f32], out_len: usize) -> Vec<f32> {
        if input.is_empty() {
            return vec![0.0; out_len];
        }
        let last = input.len() as isize - 1;
        (0..out_len)
            .map(|i| {
                let pos = i as f64 * self.step;
                let center = pos.floor() as isize;
                let lo = (center - self.half_width + 1).max(0);
                let hi = (center + self.half_width).min(last);

                let mut acc = 0.0f64;
                let mut weight = 0.0f64;
                for j in lo..=hi {
                    let w = self.tap(pos - j as f64);
                    acc += input[j as usize] as f64 * w;
                    weight += w;
                }
                // Normalize to unity DC gain, which also compensates truncated edges.
                if weight.abs() > 1e-10 {
                    acc /= weight;
                }
                acc as f32
            })
            .collect()
    }
}

/// Modified Bessel function of the first kind, order zero (power series).
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0f64;
    let mut term = 1.0f64;
    let half_x = x * 0.5;

    for k in 1..=25 {
        term *= (half_x / k as f64) * (half_x / k as f64);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }

    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin() as f32)
            .collect()
    }

    fn rms(x: &[f32]) -> f64 {
        (x.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn same_rate_is_identity() {
        let buf = SampleBuffer::new(vec![sine(440.0, 44100, 512), sine(220.0, 44100, 512)], 44100)
            .unwrap();
        assert_eq!(resample(&buf, 44100).unwrap(), buf);
    }

    #[test]
    fn zero_target_rejected() {
        let buf = SampleBuffer::mono(vec![0.0; 16], 8000).unwrap();
        assert!(matches!(
            resample(&buf, 0),
            Err(AudioError::InvalidParameter { name: "target_rate", .. })
        ));
    }

    #[test]
    fn frame_count_rounds() {
        assert_eq!(output_frames(44100, 44100, 22050), 22050);
        assert_eq!(output_frames(1001, 44100, 48000), 1090);
        assert_eq!(output_frames(3, 8000, 12000), 5); // 4.5 rounds up
        assert_eq!(output_frames(0, 8000, 48000), 0);

        let buf = SampleBuffer::new(vec![vec![0.0; 1001]; 2], 44100).unwrap();
        let out = resample(&buf, 48000).unwrap();
        assert_eq!(out.frame_count(), 1090);
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.sample_rate(), 48000);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let buf = SampleBuffer::silence(2, 0, 44100).unwrap();
        let out = resample(&buf, 16000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 16000);
    }

    #[test]
    fn dc_is_preserved() {
        let buf = SampleBuffer::mono(vec![0.5; 400], 16000).unwrap();
        for target in [8000, 22050, 48000] {
            let out = resample(&buf, target).unwrap();
            for &s in out.channel(0).unwrap() {
                assert!((s - 0.5).abs() < 1e-4, "{target} Hz: {s}");
            }
        }
    }

    #[test]
    fn upsampled_sine_tracks_analytic_sine() {
        let buf = SampleBuffer::mono(sine(200.0, 8000, 800), 8000).unwrap();
        let out = resample(&buf, 16000).unwrap();
        let expected = sine(200.0, 16000, 1600);
        let got = out.channel(0).unwrap();
        for i in 64..1536 {
            assert!(
                (got[i] - expected[i]).abs() < 0.01,
                "sample {i}: {} vs {}",
                got[i],
                expected[i]
            );
        }
    }

    #[test]
    fn downsampling_suppresses_content_above_new_nyquist() {
        // 6 kHz cannot be represented at 8 kHz and must not alias down to 2 kHz.
        let buf = SampleBuffer::mono(sine(6000.0, 48000, 4800), 48000).unwrap();
        let out = resample(&buf, 8000).unwrap();
        let interior = &out.channel(0).unwrap()[40..760];
        assert!(rms(interior) < 0.02, "aliased energy {}", rms(interior));

        // In-band content survives.
        let buf = SampleBuffer::mono(sine(1000.0, 48000, 4800), 48000).unwrap();
        let out = resample(&buf, 8000).unwrap();
        let interior = &out.channel(0).unwrap()[40..760];
        assert!((rms(interior) - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.02);
    }
}
