//! Binary thresholding of index rasters
//!
//! Splits a continuous index (typically NDVI) into two classes.

use verdant_core::raster::Raster;
use verdant_core::{Error, Result};

/// Threshold applied when none is given
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Class value for cells below the threshold
pub const CLASS_LOW: u8 = 0;

/// Class value for cells at or above the threshold
pub const CLASS_HIGH: u8 = 255;

/// Parameters for [`threshold`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdParams {
    /// Cut-off value. Cells `>= threshold` become [`CLASS_HIGH`].
    pub threshold: f64,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Classify every cell against a single cut-off.
///
/// Each output cell is [`CLASS_HIGH`] when the input is greater than or
/// equal to `params.threshold`, and [`CLASS_LOW`] otherwise. NaN cells
/// compare false and end up low. Infinite thresholds are accepted:
/// `-inf` makes every finite cell high, `+inf` makes every finite cell low.
///
/// The output keeps the georeferencing of `raster`.
///
/// # Errors
/// [`Error::InvalidParameter`] if the threshold is NaN.
///
/// # Example
/// ```ignore
/// let mask = threshold(&ndvi_raster, ThresholdParams { threshold: 0.3 })?;
/// ```
pub fn threshold(raster: &Raster<f64>, params: ThresholdParams) -> Result<Raster<u8>> {
    let t = params.threshold;
    if t.is_nan() {
        return Err(Error::InvalidParameter {
            name: "threshold",
            value: t.to_string(),
            reason: "must be a number".into(),
        });
    }

    let (rows, cols) = raster.shape();
    let mut output = raster.with_same_meta::<u8>(rows, cols);
    *output.data_mut() = raster
        .data()
        .mapv(|v| if v >= t { CLASS_HIGH } else { CLASS_LOW });

    Ok(output)
}
