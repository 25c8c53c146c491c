//! Sample-buffer operators.
//!
//! Every operator is a pure function: it borrows the input buffer and
//! returns a newly allocated one (or an analysis result), never writing
//! through to the input.

pub mod downmix;
pub mod key;
pub mod oscillator;
pub mod overdrive;
pub mod pan;
pub mod resample;
pub mod reverse;
pub mod tuner;
