//! Multi-band source image

use crate::error::{Error, Result};
use crate::projection::Projection;
use crate::raster::{BandSamples, GeoTransform, Interleave, PixelType, Raster, SensorBand};
use ndarray::Array2;
use std::path::Path;

/// A multi-band georeferenced image, as read from disk.
///
/// All bands share one shape, one geotransform and one projection. Samples
/// stay in their on-disk type; [`RasterDataset::band`] widens a single band
/// to `f64` when it is asked for. A dataset is never mutated after it has
/// been read, and every accessor hands out copies.
#[derive(Debug, Clone)]
pub struct RasterDataset {
    samples: BandSamples,
    interleave: Interleave,
    band_count: usize,
    rows: usize,
    cols: usize,
    transform: GeoTransform,
    projection: Projection,
}

impl RasterDataset {
    /// Assemble a dataset from the samples of `band_count` bands of
    /// `rows` x `cols` pixels.
    ///
    /// Fails with [`Error::Format`] if the buffer does not hold exactly
    /// that many samples.
    pub fn new(
        samples: BandSamples,
        interleave: Interleave,
        band_count: usize,
        (rows, cols): (usize, usize),
        transform: GeoTransform,
        projection: Projection,
    ) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(band_count));
        if expected != Some(samples.len()) {
            return Err(Error::Format(format!(
                "expected {} band(s) of {} x {} samples, found {} samples",
                band_count,
                cols,
                rows,
                samples.len()
            )));
        }

        Ok(Self {
            samples,
            interleave,
            band_count,
            rows,
            cols,
            transform,
            projection,
        })
    }

    /// Open a source image of the 8-band sensor.
    ///
    /// Same as [`crate::io::read_dataset`], but fails with [`Error::Format`]
    /// when the image has fewer than [`SensorBand::REQUIRED_BANDS`] bands.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = crate::io::read_dataset(path)?;
        dataset.require_sensor_bands()?;
        Ok(dataset)
    }

    fn require_sensor_bands(&self) -> Result<()> {
        if self.band_count() < SensorBand::REQUIRED_BANDS {
            return Err(Error::Format(format!(
                "expected at least {} bands, found {}",
                SensorBand::REQUIRED_BANDS,
                self.band_count()
            )));
        }
        Ok(())
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.cols
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.rows
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// On-disk sample type of the source bands
    pub fn pixel_type(&self) -> PixelType {
        self.samples.pixel_type()
    }

    pub fn interleave(&self) -> Interleave {
        self.interleave
    }

    /// Band `index` (1-based) widened to `f64`, carrying the dataset's
    /// georeferencing.
    pub fn band(&self, index: usize) -> Result<Raster<f64>> {
        let band = index
            .checked_sub(1)
            .filter(|&i| i < self.band_count)
            .ok_or(Error::Band {
                index,
                count: self.band_count,
            })?;

        let cells = self.rows * self.cols;
        let data = match self.interleave {
            Interleave::Pixel => self.samples.widen(band, self.band_count, cells),
            Interleave::Band => self.samples.widen(band * cells, 1, cells),
        };
        let data = Array2::from_shape_vec((self.rows, self.cols), data).map_err(|_| {
            Error::InvalidDimensions {
                width: self.cols,
                height: self.rows,
            }
        })?;

        let mut raster = Raster::from_array(data);
        raster.set_transform(self.transform);
        raster.set_projection(self.projection.clone());
        Ok(raster)
    }

    /// Copy of a named sensor band.
    ///
    /// Fails with [`Error::Format`] if the dataset does not carry the full
    /// 8-band layout the position table assumes.
    pub fn sensor_band(&self, band: SensorBand) -> Result<Raster<f64>> {
        self.require_sensor_bands()?;
        self.band(band.position())
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.transform
    }

    pub fn projection(&self) -> Projection {
        self.projection.clone()
    }
}
