pub mod buffer;
pub mod decode;
pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod wav;

pub use buffer::{EncodedAudio, SampleBuffer};
pub use decode::{AudioFormat, CapabilityProvider, DecodeAdapter};
#[cfg(feature = "codecs")]
pub use decode::NativeDecoder;
pub use error::{AudioError, DecodeError, Warning};
pub use pipeline::{Analysis, Pipeline, PipelineOutput, analyze_buffer, apply, generate};
pub use request::{AnalysisRequest, ToneRequest, TransformRequest};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn planar_buffer(
    planar: &[f32],
    channel_count: u32,
    sample_rate: u32,
) -> Result<SampleBuffer, JsValue> {
    SampleBuffer::from_planar(planar, channel_count as usize, sample_rate).map_err(js_err)
}

/// WASM-exposed: return the pcm_toolkit version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: encode planar f32 PCM (as produced by `decodeAudioData`,
/// channel after channel) into a 16-bit WAV byte array.
#[wasm_bindgen]
pub fn encode_wav(
    planar: &[f32],
    channel_count: u32,
    sample_rate: u32,
) -> Result<Vec<u8>, JsValue> {
    let buffer = planar_buffer(planar, channel_count, sample_rate)?;
    Ok(wav::encode(&buffer).map_err(js_err)?.bytes)
}

/// WASM-exposed: run one transform over planar PCM and return WAV bytes.
/// `request` is a JS object such as `{ op: "pan", position: -0.5 }`.
#[wasm_bindgen]
pub fn transform_to_wav(
    planar: &[f32],
    channel_count: u32,
    sample_rate: u32,
    request: JsValue,
) -> Result<Vec<u8>, JsValue> {
    let request: TransformRequest = serde_wasm_bindgen::from_value(request).map_err(js_err)?;
    let buffer = planar_buffer(planar, channel_count, sample_rate)?;
    let output = pipeline::transform_and_encode(&buffer, &request).map_err(js_err)?;
    Ok(output.encoded.bytes)
}

/// WASM-exposed: synthesize a tone and return WAV bytes.
#[wasm_bindgen]
pub fn generate_tone_wav(request: JsValue) -> Result<Vec<u8>, JsValue> {
    let request: ToneRequest = serde_wasm_bindgen::from_value(request).map_err(js_err)?;
    let buffer = generate(&request).map_err(js_err)?;
    Ok(wav::encode(&buffer).map_err(js_err)?.bytes)
}

/// WASM-exposed: pitch or key estimate for planar PCM, returned as a JS object.
#[wasm_bindgen]
pub fn analyze(
    planar: &[f32],
    channel_count: u32,
    sample_rate: u32,
    request: JsValue,
) -> Result<JsValue, JsValue> {
    let request: AnalysisRequest = serde_wasm_bindgen::from_value(request).map_err(js_err)?;
    let buffer = planar_buffer(planar, channel_count, sample_rate)?;
    let analysis = analyze_buffer(&buffer, &request).map_err(js_err)?;
    serde_wasm_bindgen::to_value(&analysis).map_err(js_err)
}
