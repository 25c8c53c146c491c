//! Canonical 16-bit PCM WAV writer.
//!
//! A 44-byte RIFF/WAVE header followed by interleaved little-endian `i16`
//! samples. This is the only output container.

use crate::buffer::{EncodedAudio, SampleBuffer};
use crate::error::{AudioError, Result};

pub const HEADER_LEN: usize = 44;
pub const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;

/// Float sample to `i16`: clamp to `[-1, 1]`, scale by 32767, truncate toward zero.
///
/// NaN encodes as silence.
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Encode a sample buffer as a canonical WAV byte stream.
///
/// Zero-frame buffers produce a valid header with an empty data chunk.
/// Buffers whose channel count, byte rate or data size do not fit the
/// header's fixed-width fields are rejected.
pub fn encode(buffer: &SampleBuffer) -> Result<EncodedAudio> {
    let sample_rate = buffer.sample_rate();
    let frames = buffer.frame_count();

    let (channels, block_align) = u16::try_from(buffer.channel_count())
        .ok()
        .and_then(|c| Some((c, c.checked_mul(BITS_PER_SAMPLE / 8)?)))
        .ok_or_else(|| {
            AudioError::invalid(
                "channels",
                format!("{} channels do not fit a WAV header", buffer.channel_count()),
            )
        })?;
    let byte_rate = sample_rate.checked_mul(block_align as u32).ok_or_else(|| {
        AudioError::invalid(
            "sample_rate",
            format!("{sample_rate} Hz overflows the WAV byte rate field"),
        )
    })?;
    let data_size = data_chunk_len(frames, block_align)?;
    let riff_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&riff_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    let planes = buffer.channels();
    for i in 0..frames {
        for plane in planes {
            buf.extend_from_slice(&quantize(plane[i]).to_le_bytes());
        }
    }

    log::trace!(
        "encoded {frames} frames x {channels} channels at {sample_rate} Hz ({} bytes)",
        buf.len()
    );
    Ok(EncodedAudio::wav(buf))
}

/// Byte length of the data chunk, leaving room for the RIFF size field.
fn data_chunk_len(frames: usize, block_align: u16) -> Result<u32> {
    u32::try_from(frames)
        .ok()
        .and_then(|f| f.checked_mul(block_align as u32))
        .filter(|&size| size <= u32::MAX - 36)
        .ok_or_else(|| {
            AudioError::invalid(
                "frame_count",
                format!("{frames} frames exceed the 4 GiB WAV data limit"),
            )
        })
}
