//! Raster data structures

mod band;
mod dataset;
mod element;
mod geotransform;
mod grid;
mod pixel;
mod samples;

pub use band::SensorBand;
pub use dataset::RasterDataset;
pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use pixel::PixelType;
pub use samples::{BandSamples, Interleave};
