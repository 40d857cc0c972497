//! Imagery analysis algorithms
//!
//! - Normalized difference and NDVI, with degenerate cells forced to 0
//! - Threshold classification into a two-valued mask

mod indices;
mod threshold;

pub use indices::{ndvi, normalized_difference};
pub use threshold::{threshold, ThresholdParams, CLASS_HIGH, CLASS_LOW, DEFAULT_THRESHOLD};
