//! Decode adapter: compressed bytes in, one [`SampleBuffer`] out.
//!
//! The core does not parse containers itself. A [`DecodeAdapter`] wraps
//! whatever codec the host offers: `decodeAudioData` in the browser (where
//! the JS side hands over planar PCM), or [`NativeDecoder`] backed by
//! `hound` and `minimp3` when the `codecs` feature is on.

use crate::buffer::SampleBuffer;
use crate::error::DecodeError;

/// Turns one complete compressed byte stream into PCM.
pub trait DecodeAdapter {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError>;
}

impl<F> DecodeAdapter for F
where
    F: Fn(&[u8]) -> Result<SampleBuffer, DecodeError>,
{
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        self(bytes)
    }
}

/// Container formats recognized by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Flac,
    Mp4,
}

impl AudioFormat {
    /// Identify a container from its magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<AudioFormat> {
        match bytes {
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => {
                Some(AudioFormat::Wav)
            }
            [b'I', b'D', b'3', ..] => Some(AudioFormat::Mp3),
            [0xFF, b, ..] if b & 0xE0 == 0xE0 => Some(AudioFormat::Mp3),
            [b'O', b'g', b'g', b'S', ..] => Some(AudioFormat::Ogg),
            [b'f', b'L', b'a', b'C', ..] => Some(AudioFormat::Flac),
            [_, _, _, _, b'f', b't', b'y', b'p', ..] => Some(AudioFormat::Mp4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Mp4 => "mp4",
        }
    }
}

/// Which formats the host can decode right now.
pub trait CapabilityProvider {
    fn supports(&self, format: AudioFormat) -> bool;
}

impl<F> CapabilityProvider for F
where
    F: Fn(AudioFormat) -> bool,
{
    fn supports(&self, format: AudioFormat) -> bool {
        self(format)
    }
}

/// Formats the built-in codecs handle: WAV and MP3.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCapabilities;

impl CapabilityProvider for NativeCapabilities {
    fn supports(&self, format: AudioFormat) -> bool {
        matches!(format, AudioFormat::Wav | AudioFormat::Mp3)
    }
}

#[cfg(feature = "codecs")]
pub use native::NativeDecoder;

#[cfg(feature = "codecs")]
mod native {
    use std::io::Cursor;

    use super::{AudioFormat, CapabilityProvider, DecodeAdapter, NativeCapabilities};
    use crate::buffer::SampleBuffer;
    use crate::error::DecodeError;

    /// Decoder for WAV (`hound`) and MP3 (`minimp3`), gated by a capability
    /// provider so a host can narrow what it accepts.
    #[derive(Debug, Clone, Default)]
    pub struct NativeDecoder<C = NativeCapabilities> {
        capabilities: C,
    }

    impl NativeDecoder {
        pub fn new() -> Self {
            NativeDecoder {
                capabilities: NativeCapabilities,
            }
        }
    }

    impl<C: CapabilityProvider> NativeDecoder<C> {
        pub fn with_capabilities(capabilities: C) -> Self {
            NativeDecoder { capabilities }
        }
    }

    impl<C: CapabilityProvider> DecodeAdapter for NativeDecoder<C> {
        fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
            if bytes.is_empty() {
                return Err(DecodeError::new("no input bytes"));
            }
            let format = AudioFormat::sniff(bytes)
                .ok_or_else(|| DecodeError::new("unrecognized audio format"))?;
            log::debug!("sniffed {} input ({} bytes)", format.name(), bytes.len());

            if !self.capabilities.supports(format) {
                return Err(DecodeError::new(format!(
                    "{} decoding is not available on this host",
                    format.name()
                )));
            }

            let buffer = match format {
                AudioFormat::Wav => decode_wav(bytes)?,
                AudioFormat::Mp3 => decode_mp3(bytes)?,
                other => {
                    return Err(DecodeError::new(format!(
                        "no built-in codec for {}",
                        other.name()
                    )));
                }
            };
            log::debug!(
                "decoded {} frames x {} channels at {} Hz",
                buffer.frame_count(),
                buffer.channel_count(),
                buffer.sample_rate()
            );
            Ok(buffer)
        }
    }

    fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| DecodeError::new(format!("wav: {e}")))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::new(format!("wav: {e}")))?,
            hound::SampleFormat::Int => {
                let scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| DecodeError::new(format!("wav: {e}")))?
            }
        };

        SampleBuffer::from_interleaved(&samples, spec.channels as usize, spec.sample_rate)
            .map_err(|e| DecodeError::new(e.to_string()))
    }

    fn decode_mp3(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
        let mut interleaved: Vec<f32> = Vec::new();
        let mut layout: Option<(usize, u32)> = None;

        loop {
            let frame = match decoder.next_frame() {
                Ok(frame) => frame,
                Err(minimp3::Error::Eof) => break,
                Err(minimp3::Error::SkippedData) => continue,
                Err(e) => return Err(DecodeError::new(format!("mp3: {e:?}"))),
            };
            let frame_layout = (frame.channels, frame.sample_rate as u32);
            match layout {
                None => layout = Some(frame_layout),
                Some(expected) if expected != frame_layout => {
                    return Err(DecodeError::new(format!(
                        "mp3: stream changes from {} ch @ {} Hz to {} ch @ {} Hz",
                        expected.0, expected.1, frame_layout.0, frame_layout.1
                    )));
                }
                Some(_) => {}
            }
            interleaved.extend(frame.data.iter().map(|&s| s as f32 / 32767.0));
        }

        let Some((channels, sample_rate)) = layout else {
            return Err(DecodeError::new("mp3: no audio frames found"));
        };
        SampleBuffer::from_interleaved(&interleaved, channels, sample_rate)
            .map_err(|e| DecodeError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(AudioFormat::sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::sniff(b"ID3\x04\x00"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::sniff(&[0xFF, 0xFB, 0x90, 0x64]), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::sniff(b"OggS\x00\x02"), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::sniff(b"fLaC\x00\x00"), Some(AudioFormat::Flac));
        assert_eq!(AudioFormat::sniff(b"\x00\x00\x00\x20ftypM4A "), Some(AudioFormat::Mp4));
    }

    #[test]
    fn rejects_unknown_and_short_input() {
        assert_eq!(AudioFormat::sniff(b""), None);
        assert_eq!(AudioFormat::sniff(b"RIFF"), None);
        assert_eq!(AudioFormat::sniff(b"RIFF\x24\x00\x00\x00AVI "), None);
        assert_eq!(AudioFormat::sniff(&[0xFF, 0x10]), None);
        assert_eq!(AudioFormat::sniff(b"hello world"), None);
    }

    #[test]
    fn native_capabilities() {
        assert!(NativeCapabilities.supports(AudioFormat::Wav));
        assert!(NativeCapabilities.supports(AudioFormat::Mp3));
        assert!(!NativeCapabilities.supports(AudioFormat::Ogg));
        assert!(!NativeCapabilities.supports(AudioFormat::Mp4));
    }

    #[test]
    fn closures_are_adapters() {
        let adapter = |bytes: &[u8]| SampleBuffer::mono(vec![0.0; bytes.len()], 8000)
            .map_err(|e| DecodeError::new(e.to_string()));
        let buf = adapter.decode(&[1, 2, 3]).unwrap();
        assert_eq!(buf.frame_count(), 3);

        let failing = |_: &[u8]| -> Result<SampleBuffer, DecodeError> {
            Err(DecodeError::new("corrupt"))
        };
        assert_eq!(failing.decode(&[]).unwrap_err().reason, "corrupt");
    }

    #[cfg(feature = "codecs")]
    mod native_decoder {
        use super::*;
        use crate::wav;

        fn stereo_fixture() -> SampleBuffer {
            SampleBuffer::new(
                vec![vec![0.0, 0.5, -0.5, 1.0], vec![-1.0, 0.25, 0.0, -0.25]],
                22050,
            )
            .unwrap()
        }

        #[test]
        fn decodes_own_wav_output() {
            let original = stereo_fixture();
            let bytes = wav::encode(&original).unwrap().bytes;
            let decoded = NativeDecoder::new().decode(&bytes).unwrap();

            assert_eq!(decoded.sample_rate(), 22050);
            assert_eq!(decoded.channel_count(), 2);
            assert_eq!(decoded.frame_count(), 4);
            let pairs = original
                .channels()
                .iter()
                .flatten()
                .zip(decoded.channels().iter().flatten());
            for (a, b) in pairs {
                assert!((a - b).abs() <= 1.0 / 32767.0 + 1e-7, "{a} vs {b}");
            }
            assert_eq!(decoded.channel(0).unwrap()[3], 1.0);
            assert_eq!(decoded.channel(1).unwrap()[0], -1.0);
        }

        #[test]
        fn decodes_float_and_wide_integer_wav() {
            use std::io::Cursor;

            let mut float_bytes = Vec::new();
            {
                let spec = hound::WavSpec {
                    channels: 1,
                    sample_rate: 8000,
                    bits_per_sample: 32,
                    sample_format: hound::SampleFormat::Float,
                };
                let mut writer =
                    hound::WavWriter::new(Cursor::new(&mut float_bytes), spec).unwrap();
                for s in [0.125f32, -0.75, 0.0] {
                    writer.write_sample(s).unwrap();
                }
                writer.finalize().unwrap();
            }
            let decoded = NativeDecoder::new().decode(&float_bytes).unwrap();
            assert_eq!(decoded.channel(0).unwrap(), &[0.125, -0.75, 0.0]);

            let mut int24_bytes = Vec::new();
            {
                let spec = hound::WavSpec {
                    channels: 1,
                    sample_rate: 8000,
                    bits_per_sample: 24,
                    sample_format: hound::SampleFormat::Int,
                };
                let mut writer =
                    hound::WavWriter::new(Cursor::new(&mut int24_bytes), spec).unwrap();
                for s in [8_388_607i32, -8_388_607, 0] {
                    writer.write_sample(s).unwrap();
                }
                writer.finalize().unwrap();
            }
            let decoded = NativeDecoder::new().decode(&int24_bytes).unwrap();
            assert_eq!(decoded.channel(0).unwrap(), &[1.0, -1.0, 0.0]);
        }

        #[test]
        fn truncated_wav_is_a_decode_error() {
            let bytes = wav::encode(&stereo_fixture()).unwrap().bytes;
            assert!(NativeDecoder::new().decode(&bytes[..20]).is_err());
            assert!(NativeDecoder::new().decode(&bytes[..bytes.len() - 6]).is_err());
        }

        #[test]
        fn mp3_without_frames_is_a_decode_error() {
            let mut bytes = b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec();
            bytes.extend_from_slice(&[0u8; 64]);
            let err = NativeDecoder::new().decode(&bytes).unwrap_err();
            assert!(err.reason.starts_with("mp3"), "{}", err.reason);
        }

        #[test]
        fn unsupported_and_unknown_formats() {
            let err = NativeDecoder::new().decode(b"OggS\x00\x02\x00\x00").unwrap_err();
            assert_eq!(err.reason, "ogg decoding is not available on this host");
            let err = NativeDecoder::new().decode(b"not audio").unwrap_err();
            assert_eq!(err.reason, "unrecognized audio format");
            assert!(NativeDecoder::new().decode(&[]).is_err());
        }

        #[test]
        fn capability_provider_narrows_formats() {
            let bytes = wav::encode(&stereo_fixture()).unwrap().bytes;
            let mp3_only = NativeDecoder::with_capabilities(|f: AudioFormat| f == AudioFormat::Mp3);
            let err = mp3_only.decode(&bytes).unwrap_err();
            assert_eq!(err.reason, "wav decoding is not available on this host");
        }
    }
}
