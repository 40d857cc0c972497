//! GeoTIFF reading and writing using GDAL

use crate::error::{Error, Result};
use crate::io::{cast_pixels, write_atomically, Compression, GeoTiffOptions};
use crate::projection::Projection;
use crate::raster::{
    BandSamples, GeoTransform, Interleave, PixelType, Raster, RasterDataset, RasterElement,
};
use gdal::raster::{Buffer, GdalDataType, GdalType};
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Read every band of a raster file into a [`RasterDataset`]
///
/// # Example
/// ```ignore
/// let ds = read_dataset("scene.tif")?;
/// let nir = ds.band(8)?;
/// ```
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<RasterDataset> {
    let dataset = Dataset::open(path.as_ref())?;
    let (cols, rows) = dataset.raster_size();
    let count = dataset.raster_count() as usize;
    if count == 0 {
        return Err(Error::Format("raster has no bands".into()));
    }

    // Bands are read one plane after another, in the first band's type
    let pixel_type = pixel_type_of(dataset.rasterband(1)?.band_type())?;

    macro_rules! read_planes {
        ($t:ty, $variant:ident) => {{
            let mut samples: Vec<$t> = Vec::with_capacity(rows * cols * count);
            for index in 1..=count {
                let band = dataset.rasterband(index)?;
                let buffer = band.read_as::<$t>((0, 0), (cols, rows), (cols, rows), None)?;
                samples.extend_from_slice(buffer.data());
            }
            BandSamples::$variant(samples)
        }};
    }

    let samples = match pixel_type {
        PixelType::UInt8 => read_planes!(u8, UInt8),
        PixelType::UInt16 => read_planes!(u16, UInt16),
        PixelType::UInt32 => read_planes!(u32, UInt32),
        PixelType::Int16 => read_planes!(i16, Int16),
        PixelType::Int32 => read_planes!(i32, Int32),
        PixelType::Float32 => read_planes!(f32, Float32),
        _ => read_planes!(f64, Float64),
    };

    let transform = dataset
        .geo_transform()
        .map(GeoTransform::from_gdal)
        .unwrap_or_default();
    let projection = Projection::new(dataset.projection());

    RasterDataset::new(
        samples,
        Interleave::Band,
        count,
        (rows, cols),
        transform,
        projection,
    )
}

fn pixel_type_of(data_type: GdalDataType) -> Result<PixelType> {
    match data_type {
        GdalDataType::UInt8 => Ok(PixelType::UInt8),
        GdalDataType::UInt16 => Ok(PixelType::UInt16),
        GdalDataType::UInt32 => Ok(PixelType::UInt32),
        GdalDataType::Int16 => Ok(PixelType::Int16),
        GdalDataType::Int32 => Ok(PixelType::Int32),
        GdalDataType::Float32 => Ok(PixelType::Float32),
        GdalDataType::Float64 => Ok(PixelType::Float64),
        other => Err(Error::Format(format!("unsupported sample type {:?}", other))),
    }
}

/// Write a Raster to a single-band GeoTIFF file
///
/// Values are converted to `options.pixel_type`; the transform and
/// projection are written verbatim, and the dataset cache is flushed
/// before the file is moved into place.
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let opts = options.unwrap_or_default();
    let px = opts.pixel_type;

    write_atomically(path.as_ref(), |tmp_path, _| match px {
        PixelType::UInt8 => create_band::<u8, _>(raster, tmp_path, &opts),
        PixelType::UInt16 => create_band::<u16, _>(raster, tmp_path, &opts),
        PixelType::UInt32 => create_band::<u32, _>(raster, tmp_path, &opts),
        PixelType::Int16 => create_band::<i16, _>(raster, tmp_path, &opts),
        PixelType::Int32 => create_band::<i32, _>(raster, tmp_path, &opts),
        PixelType::Float32 => create_band::<f32, _>(raster, tmp_path, &opts),
        PixelType::Float64 => create_band::<f64, _>(raster, tmp_path, &opts),
        PixelType::UInt64 | PixelType::Int8 | PixelType::Int64 => Err(
            Error::UnsupportedDataType(format!("{} output through GDAL", px)),
        ),
    })
}

fn create_band<U, T>(raster: &Raster<T>, path: &Path, opts: &GeoTiffOptions) -> Result<()>
where
    U: GdalType + num_traits::NumCast + Copy,
    T: RasterElement,
{
    let data: Vec<U> = cast_pixels(raster, opts.pixel_type)?;
    let (rows, cols) = raster.shape();

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut dataset = if opts.compression == Compression::None {
        driver.create_with_band_type::<U, _>(path, cols, rows, 1)?
    } else {
        let mut options = gdal::cpl::CslStringList::new();
        options.set_name_value("COMPRESS", &opts.compression.to_string())?;
        driver.create_with_band_type_with_options::<U, _>(path, cols, rows, 1, &options)?
    };

    dataset.set_geo_transform(&raster.transform().to_gdal())?;
    dataset.set_projection(raster.projection().as_str())?;

    {
        let mut band = dataset.rasterband(1)?;
        let mut buffer = Buffer::new((cols, rows), data);
        band.write((0, 0), (cols, rows), &mut buffer)?;
    }
    dataset.flush_cache()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let mut raster = Raster::from_vec(vec![0u8, 255, 255, 0], 2, 2).unwrap();
        raster.set_transform(GeoTransform::new(0.0, 100.0, 1.0, -1.0));
        raster.set_projection(Projection::new(
            gdal::spatial_ref::SpatialRef::from_epsg(4326)
                .unwrap()
                .to_wkt()
                .unwrap(),
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        write_geotiff(&raster, &path, None).unwrap();

        let ds = read_dataset(&path).unwrap();
        assert_eq!(ds.band_count(), 1);
        assert_eq!(ds.pixel_type(), PixelType::UInt16);
        assert_eq!(ds.geo_transform(), *raster.transform());
        assert_eq!(ds.projection(), *raster.projection());
        assert_eq!(ds.band(1).unwrap().get(0, 1).unwrap(), 255.0);
    }
}
