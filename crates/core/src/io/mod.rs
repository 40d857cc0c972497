//! Reading and writing GeoTIFF rasters
//!
//! The native backend (default) uses the `tiff` crate and understands the
//! GeoTIFF tags Verdant needs: the affine transform and the projection
//! descriptor. Enable the `gdal` feature to go through GDAL instead.
//!
//! Writes are atomic: the raster goes to a temporary file next to the
//! destination, is synced to disk, then renamed into place. A failed
//! write never leaves a partial file at the destination.

#[cfg(feature = "gdal")]
mod gdal_io;
mod native;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_dataset, write_geotiff};

#[cfg(not(feature = "gdal"))]
pub use native::{read_dataset, write_geotiff};

use crate::error::{Error, Result};
use crate::raster::{PixelType, Raster, RasterElement};
use num_traits::NumCast;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Compression applied to written rasters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Lzw,
    Deflate,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::None => "NONE",
            Compression::Lzw => "LZW",
            Compression::Deflate => "DEFLATE",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(Compression::None),
            "LZW" => Ok(Compression::Lzw),
            "DEFLATE" | "ZIP" => Ok(Compression::Deflate),
            _ => Err(Error::InvalidParameter {
                name: "compression",
                value: s.to_string(),
                reason: "expected none, lzw or deflate".to_string(),
            }),
        }
    }
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    /// On-disk sample type; raster values are converted to it
    pub pixel_type: PixelType,
    pub compression: Compression,
}

/// Convert raster values to the on-disk sample type.
///
/// Fails if a value cannot be represented (NaN or out of range for an
/// integer type).
pub(crate) fn cast_pixels<T, U>(raster: &Raster<T>, pixel_type: PixelType) -> Result<Vec<U>>
where
    T: RasterElement,
    U: NumCast,
{
    raster
        .data()
        .iter()
        .map(|&v| {
            num_traits::cast::<T, U>(v).ok_or_else(|| Error::InvalidParameter {
                name: "pixel_type",
                value: pixel_type.to_string(),
                reason: format!("value {:?} does not fit", v),
            })
        })
        .collect()
}

/// Run `write` against a temporary file in the destination directory and
/// rename it onto `path` once it is complete and synced.
///
/// The closure gets the temporary path and an open handle to it.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path, &File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping `tmp` on any early return removes the temporary file
    let tmp = tempfile::Builder::new()
        .prefix(".verdant-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write(tmp.path(), tmp.as_file())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    // Makes the rename itself durable; not all filesystems support it
    #[cfg(unix)]
    {
        if let Ok(d) = File::open(dir) {
            let _ = d.sync_all();
        }
    }

    Ok(())
}
