//! # Verdant Core
//!
//! Core types and I/O for the Verdant vegetation-index toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced grid type
//! - `RasterDataset`: Multi-band source image with its georeferencing
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `Projection`: Spatial reference descriptor, carried verbatim
//! - `SensorBand`: Fixed band-position table of the 8-band sensor
//! - GeoTIFF reading and writing (native `tiff` backend, or GDAL with the `gdal` feature)

pub mod error;
pub mod io;
pub mod projection;
pub mod raster;

pub use error::{Error, Result};
pub use projection::{CrsKind, Projection};
pub use raster::{GeoTransform, PixelType, Raster, RasterDataset, RasterElement, SensorBand};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::projection::{CrsKind, Projection};
    pub use crate::raster::{
        GeoTransform, PixelType, Raster, RasterDataset, RasterElement, SensorBand,
    };
}
