//! End-to-end NDVI classification
//!
//! Reads the source image, derives NDVI from the near-infrared and red
//! bands, thresholds it, and writes a single-band classified GeoTIFF with
//! the source georeferencing.

use crate::imagery::{ndvi, threshold, ThresholdParams, CLASS_HIGH, CLASS_LOW, DEFAULT_THRESHOLD};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};
use verdant_core::io::{write_geotiff, GeoTiffOptions};
use verdant_core::raster::{RasterDataset, SensorBand};
use verdant_core::Result;

/// Parameters for [`compute_ndvi`]
#[derive(Debug, Clone)]
pub struct NdviParams {
    /// Cells with NDVI `>=` this value are classified high
    pub threshold: f64,
    /// Band used as near-infrared
    pub nir_band: SensorBand,
    /// Band used as red
    pub red_band: SensorBand,
    /// Output sample type and compression
    pub output: GeoTiffOptions,
}

impl Default for NdviParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            nir_band: SensorBand::Nir,
            red_band: SensorBand::Red,
            output: GeoTiffOptions::default(),
        }
    }
}

/// What a classification run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdviSummary {
    pub rows: usize,
    pub cols: usize,
    pub threshold: f64,
    /// Cells classified [`CLASS_HIGH`]
    pub high_count: usize,
    /// Cells classified [`CLASS_LOW`]
    pub low_count: usize,
}

/// Classify a multi-band image by NDVI and write the result.
///
/// The output raster has one band with values in {0, 255}, the same shape
/// as the input, and the input's geotransform and projection copied
/// verbatim. It is written atomically: on any error nothing appears at
/// `output`, and an existing file there is left untouched.
///
/// # Errors
/// * [`verdant_core::Error::Io`] if the input cannot be read or the output
///   cannot be written
/// * [`verdant_core::Error::Format`] if the input is not a raster with at
///   least 8 bands
/// * [`verdant_core::Error::InvalidParameter`] if the threshold is NaN or
///   the classes do not fit the output pixel type
pub fn compute_ndvi<P, Q>(input: P, output: Q, params: &NdviParams) -> Result<NdviSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();

    let dataset = RasterDataset::open(input)?;
    let (rows, cols) = dataset.shape();
    debug!(
        "Opened {}: {} x {}, {} bands, {}",
        input.display(),
        cols,
        rows,
        dataset.band_count(),
        dataset.pixel_type()
    );

    let transform = dataset.geo_transform();
    let projection = dataset.projection();

    // Source samples are released once both bands are widened
    let index = {
        let nir = dataset.sensor_band(params.nir_band)?;
        let red = dataset.sensor_band(params.red_band)?;
        drop(dataset);
        debug!(
            "NIR = band {} ({}), red = band {} ({})",
            params.nir_band.position(),
            params.nir_band,
            params.red_band.position(),
            params.red_band
        );
        ndvi(&nir, &red)?
    };

    let mut classes = threshold(
        &index,
        ThresholdParams {
            threshold: params.threshold,
        },
    )?;
    drop(index);
    classes.set_transform(transform);
    classes.set_projection(projection);

    write_geotiff(&classes, output, Some(params.output.clone()))?;

    let summary = NdviSummary {
        rows,
        cols,
        threshold: params.threshold,
        high_count: classes.count_eq(CLASS_HIGH),
        low_count: classes.count_eq(CLASS_LOW),
    };
    info!(
        "Wrote {}: {} high / {} low at threshold {}",
        output.display(),
        summary.high_count,
        summary.low_count,
        summary.threshold
    );

    Ok(summary)
}

/// [`compute_ndvi`] with default band selection and output options.
pub fn compute_ndvi_with_threshold<P, Q>(input: P, output: Q, threshold: f64) -> Result<NdviSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    compute_ndvi(
        input,
        output,
        &NdviParams {
            threshold,
            ..NdviParams::default()
        },
    )
}
