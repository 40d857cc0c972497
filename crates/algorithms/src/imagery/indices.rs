//! Normalized-difference vegetation index
//!
//! Operates on single-band rasters (one band per raster) of equal shape.

use crate::maybe_rayon::*;
use ndarray::Array2;
use verdant_core::raster::Raster;
use verdant_core::{Error, Result};

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Cells whose quotient is not finite (both bands zero, opposite values
/// summing to zero, overflow) are set to `0`. That is the only correction
/// applied: finite results are not clamped to [-1, 1].
///
/// The output carries the georeferencing of `band_a`.
///
/// # Arguments
/// * `band_a` - Numerator positive band
/// * `band_b` - Numerator negative band
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0; cols];
            for col in 0..cols {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                row_data[col] = finite_or_zero((a - b) / (a + b));
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

// ---------------------------------------------------------------------------
// NDVI
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Values range from -1 to 1 for non-negative reflectances:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
///
/// # Arguments
/// * `nir` - Near-infrared band
/// * `red` - Red band
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace NaN and ±Inf with 0.
#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    let (er, ec) = a.shape();
    let (ar, ac) = b.shape();
    if (er, ec) != (ar, ac) {
        return Err(Error::ShapeMismatch { er, ec, ar, ac });
    }
    Ok(())
}

fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    *output.data_mut() = Array2::from_shape_vec((rows, cols), data).map_err(|_| {
        Error::InvalidDimensions {
            width: cols,
            height: rows,
        }
    })?;
    Ok(output)
}
