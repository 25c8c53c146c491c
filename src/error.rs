use thiserror::Error;

/// The decode adapter could not turn the input bytes into PCM.
///
/// Decoding is deterministic, so callers should surface this rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode error: {reason}")]
pub struct DecodeError {
    pub reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        DecodeError { reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// An operator was handed an out-of-domain value.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// Channel data that breaks the sample buffer invariant.
    #[error("malformed sample buffer: {0}")]
    MalformedBuffer(String),
    /// A request record that could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AudioError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        AudioError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AudioError {
    fn from(e: serde_json::Error) -> Self {
        AudioError::InvalidRequest(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;

/// Non-fatal conditions reported next to a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The input had zero frames; the output is empty but well-formed.
    EmptyInput,
}

/// Reject NaN, infinities and negative values.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(AudioError::invalid(name, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(AudioError::invalid(name, format!("must not be negative, got {value}")));
    }
    Ok(value)
}

/// Like [`require_non_negative`], with an upper bound.
pub(crate) fn require_in_range(name: &'static str, value: f64, max: f64) -> Result<f64> {
    let value = require_non_negative(name, value)?;
    if value > max {
        return Err(AudioError::invalid(name, format!("must be at most {max}, got {value}")));
    }
    Ok(value)
}
