//! Planar PCM sample buffers and encoded output.

use crate::error::{AudioError, Result};

/// Linear PCM audio held as one `Vec<f32>` per channel.
///
/// Every channel holds exactly `frame_count()` samples and all channels share
/// one sample rate. Samples are nominally in `[-1.0, 1.0]` but are only
/// clamped when encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Build a buffer from planar channel data.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::MalformedBuffer("sample rate must be positive".into()));
        }
        let Some(first) = channels.first() else {
            return Err(AudioError::MalformedBuffer("at least one channel is required".into()));
        };
        let frames = first.len();
        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != frames) {
            return Err(AudioError::MalformedBuffer(format!(
                "channel {idx} has {} frames, expected {frames}",
                ch.len()
            )));
        }
        Ok(SampleBuffer { sample_rate, channels })
    }

    /// Single-channel buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Zero-filled buffer.
    pub fn silence(channel_count: usize, frame_count: usize, sample_rate: u32) -> Result<Self> {
        Self::new(vec![vec![0.0; frame_count]; channel_count], sample_rate)
    }

    /// Split interleaved samples (`L0 R0 L1 R1 ...`) into channels.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(AudioError::MalformedBuffer("at least one channel is required".into()));
        }
        if samples.len() % channel_count != 0 {
            return Err(AudioError::MalformedBuffer(format!(
                "{} interleaved samples do not divide into {channel_count} channels",
                samples.len()
            )));
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::new(channels, sample_rate)
    }

    /// Split channel-after-channel data (`L0 L1 ... R0 R1 ...`) into channels.
    ///
    /// This is the layout the WASM entry points receive from JavaScript.
    pub fn from_planar(samples: &[f32], channel_count: usize, sample_rate: u32) -> Result<Self> {
        if channel_count == 0 {
            return Err(AudioError::MalformedBuffer("at least one channel is required".into()));
        }
        if samples.len() % channel_count != 0 {
            return Err(AudioError::MalformedBuffer(format!(
                "{} planar samples do not divide into {channel_count} channels",
                samples.len()
            )));
        }
        let frames = samples.len() / channel_count;
        let channels = if frames == 0 {
            vec![Vec::new(); channel_count]
        } else {
            samples.chunks_exact(frames).map(<[f32]>::to_vec).collect()
        };
        Self::new(channels, sample_rate)
    }

    /// Operators produce channels that satisfy the invariant by construction.
    pub(crate) fn from_parts(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0 && !channels.is_empty());
        debug_assert!(channels.windows(2).all(|w| w[0].len() == w[1].len()));
        SampleBuffer { sample_rate, channels }
    }

    /// New buffer at the same rate with every channel run through `f`.
    pub fn map_channels<F>(&self, mut f: F) -> SampleBuffer
    where
        F: FnMut(&[f32]) -> Vec<f32>,
    {
        let channels = self.channels.iter().map(|ch| f(ch)).collect();
        Self::from_parts(channels, self.sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// First two channels as (left, right). Mono sources return the same slice twice.
    pub fn stereo_pair(&self) -> (&[f32], &[f32]) {
        let left = self.channels[0].as_slice();
        let right = self.channels.get(1).map_or(left, Vec::as_slice);
        (left, right)
    }

    /// Frame-major copy of all samples.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channel_count());
        for i in 0..self.frame_count() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

/// An encoded byte stream together with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl EncodedAudio {
    pub const WAV_MIME: &'static str = "audio/wav";

    pub fn wav(bytes: Vec<u8>) -> Self {
        EncodedAudio {
            bytes,
            mime_type: Self::WAV_MIME,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_channels() {
        let err = SampleBuffer::new(vec![vec![0.0; 4], vec![0.0; 3]], 44100).unwrap_err();
        assert!(matches!(err, AudioError::MalformedBuffer(_)));
    }

    #[test]
    fn rejects_zero_rate_and_no_channels() {
        assert!(SampleBuffer::new(vec![vec![0.0]], 0).is_err());
        assert!(SampleBuffer::new(vec![], 44100).is_err());
    }

    #[test]
    fn interleaved_round_trip() {
        let data = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buf = SampleBuffer::from_interleaved(&data, 2, 48000).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frame_count(), 3);
        assert_eq!(buf.channel(0).unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(buf.channel(1).unwrap(), &[-0.1, -0.2, -0.3]);
        assert_eq!(buf.to_interleaved(), data.to_vec());
    }

    #[test]
    fn planar_layout() {
        let buf = SampleBuffer::from_planar(&[1.0, 2.0, 3.0, 4.0], 2, 8000).unwrap();
        assert_eq!(buf.channel(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(buf.channel(1).unwrap(), &[3.0, 4.0]);
        assert!(SampleBuffer::from_planar(&[1.0, 2.0, 3.0], 2, 8000).is_err());
    }

    #[test]
    fn empty_planar_keeps_channel_count() {
        let buf = SampleBuffer::from_planar(&[], 2, 8000).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn mono_stereo_pair_aliases_left() {
        let buf = SampleBuffer::mono(vec![0.5, -0.25], 8000).unwrap();
        let (l, r) = buf.stereo_pair();
        assert_eq!(l, r);
        assert_eq!(buf.peak(), 0.5);
        assert!((buf.duration_secs() - 0.00025).abs() < 1e-12);
    }
}
