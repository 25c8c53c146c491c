//! Time reversal, whole-buffer or over a fractional range.

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};

/// A span of the buffer given as fractions of its length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverseRange {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseParams {
    /// Reverse only this span; `None` reverses everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ReverseRange>,
}

/// Output sample `i` is input sample `frame_count - 1 - i`, per channel.
pub fn reverse(buffer: &SampleBuffer) -> SampleBuffer {
    buffer.map_channels(|ch| ch.iter().rev().copied().collect())
}

/// Reverse frames `[floor(start * n), floor(end * n))`, copying the rest unchanged.
pub fn reverse_range(buffer: &SampleBuffer, start: f64, end: f64) -> Result<SampleBuffer> {
    for (name, v) in [("start", start), ("end", end)] {
        if !(0.0..=1.0).contains(&v) {
            return Err(AudioError::invalid(name, format!("must be a fraction in [0, 1], got {v}")));
        }
    }
    if start > end {
        return Err(AudioError::invalid("start", format!("{start} is after end {end}")));
    }

    let n = buffer.frame_count();
    let lo = (n as f64 * start).floor() as usize;
    let hi = ((n as f64 * end).floor() as usize).min(n);

    Ok(buffer.map_channels(|ch| {
        let mut out = ch.to_vec();
        out[lo..hi].reverse();
        out
    }))
}

pub fn apply(buffer: &SampleBuffer, params: &ReverseParams) -> Result<SampleBuffer> {
    match params.range {
        Some(r) => reverse_range(buffer, r.start, r.end),
        None => Ok(reverse(buffer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo() -> SampleBuffer {
        SampleBuffer::new(
            vec![vec![0.1, 0.2, 0.3, 0.4, 0.5], vec![-1.0, -0.5, 0.0, 0.5, 1.0]],
            44100,
        )
        .unwrap()
    }

    #[test]
    fn reverses_each_channel() {
        let out = reverse(&stereo());
        assert_eq!(out.channel(0).unwrap(), &[0.5, 0.4, 0.3, 0.2, 0.1]);
        assert_eq!(out.channel(1).unwrap(), &[1.0, 0.5, 0.0, -0.5, -1.0]);
        assert_eq!(out.sample_rate(), 44100);
    }

    #[test]
    fn reversal_is_an_involution() {
        let buf = stereo();
        assert_eq!(reverse(&reverse(&buf)), buf);
    }

    #[test]
    fn empty_stays_empty() {
        let buf = SampleBuffer::silence(2, 0, 8000).unwrap();
        let out = reverse(&buf);
        assert!(out.is_empty());
        assert_eq!(out.channel_count(), 2);
    }

    #[test]
    fn partial_range() {
        let buf = SampleBuffer::mono(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 8000)
            .unwrap();
        let out = reverse_range(&buf, 0.2, 0.6).unwrap();
        assert_eq!(
            out.channel(0).unwrap(),
            &[0.0, 1.0, 5.0, 4.0, 3.0, 2.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn full_range_matches_reverse() {
        let buf = stereo();
        assert_eq!(reverse_range(&buf, 0.0, 1.0).unwrap(), reverse(&buf));
    }

    #[test]
    fn bad_ranges_rejected() {
        let buf = stereo();
        assert!(reverse_range(&buf, 0.7, 0.3).is_err());
        assert!(reverse_range(&buf, -0.1, 0.5).is_err());
        assert!(reverse_range(&buf, 0.0, 1.5).is_err());
        assert!(reverse_range(&buf, f64::NAN, 0.5).is_err());
    }
}
