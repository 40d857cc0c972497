//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate for TIFF I/O plus the handful of GeoTIFF tags
//! needed to carry georeferencing:
//!
//! - `ModelTransformationTag`, or `ModelPixelScaleTag` + `ModelTiepointTag`
//!   for the affine transform
//! - `GeoKeyDirectoryTag` + `GeoAsciiParamsTag` for the projection
//!
//! Multi-band images may be pixel-interleaved or band-interleaved
//! (`PlanarConfiguration` 1 or 2). Samples stay in their on-disk type.

use crate::error::{Error, Result};
use crate::io::{cast_pixels, write_atomically, Compression, GeoTiffOptions};
use crate::projection::{CrsKind, Projection};
use crate::raster::{
    BandSamples, GeoTransform, Interleave, PixelType, Raster, RasterDataset, RasterElement,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;

const PLANAR_CONFIGURATION: u16 = 284;
const PLANAR_SEPARATE: u16 = 2;

// GeoTIFF tags
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GEO_ASCII_PARAMS: u16 = 34737;

// GeoKeys
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GT_CITATION: u16 = 1026;
const GEOGRAPHIC_TYPE: u16 = 2048;
const GEOG_CITATION: u16 = 2049;
const PROJECTED_CS_TYPE: u16 = 3072;
const PCS_CITATION: u16 = 3073;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const USER_DEFINED: u16 = 32767;

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Read every band of a GeoTIFF file into a [`RasterDataset`]
///
/// Fails with [`Error::Io`] if the file cannot be opened and with
/// [`Error::Format`] if it is not a TIFF or uses an unsupported layout.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<RasterDataset> {
    let file = File::open(path.as_ref())?;
    decode_dataset(BufReader::new(file))
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
fn decode_dataset<R: Read + Seek>(reader: R) -> Result<RasterDataset> {
    // The whole image is held in memory by design; lift the default cap
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;
    let bands = samples_per_pixel(decoder.colortype()?)?;

    let transform = read_geotransform(&mut decoder).unwrap_or_default();
    let projection = read_projection(&mut decoder);

    let planar = tag_value(&mut decoder, PLANAR_CONFIGURATION).and_then(|v| v.into_u16().ok())
        == Some(PLANAR_SEPARATE);

    let (samples, interleave) = if planar && bands > 1 {
        (read_planes(&mut decoder, rows, cols, bands)?, Interleave::Band)
    } else {
        (into_samples(decoder.read_image()?)?, Interleave::Pixel)
    };

    RasterDataset::new(samples, interleave, bands, (rows, cols), transform, projection)
}

fn samples_per_pixel(color: tiff::ColorType) -> Result<usize> {
    match color {
        tiff::ColorType::Gray(_) => Ok(1),
        tiff::ColorType::RGB(_) => Ok(3),
        tiff::ColorType::RGBA(_) | tiff::ColorType::CMYK(_) => Ok(4),
        tiff::ColorType::Multiband { num_samples, .. } if num_samples > 0 => {
            Ok(num_samples as usize)
        }
        other => Err(Error::Format(format!(
            "unsupported pixel layout: {:?}",
            other
        ))),
    }
}

/// Band-interleaved image: every band is its own run of strips or tiles.
///
/// Chunk `k` of band `b` has index `b * chunks_per_band + k`; each chunk is
/// copied into its place in the band's plane.
fn read_planes<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    rows: usize,
    cols: usize,
    bands: usize,
) -> Result<BandSamples> {
    let (chunk_w, chunk_h) = decoder.chunk_dimensions();
    let (chunk_w, chunk_h) = (chunk_w as usize, chunk_h as usize);
    if chunk_w == 0 || chunk_h == 0 {
        return Err(Error::Format("band-interleaved image without chunk size".into()));
    }

    let across = cols.div_ceil(chunk_w);
    let down = rows.div_ceil(chunk_h);
    let plane = rows * cols;
    let mut samples: Option<BandSamples> = None;
    let mut index = 0u32;

    for band in 0..bands {
        for chunk_row in 0..down {
            for chunk_col in 0..across {
                let chunk = into_samples(decoder.read_chunk(index)?)?;
                index += 1;

                let (x0, y0) = (chunk_col * chunk_w, chunk_row * chunk_h);
                let width = chunk_w.min(cols - x0);
                let height = chunk_h.min(rows - y0);
                // Tiles come back padded to the full tile width
                let stride = if chunk.len() >= chunk_w * height { chunk_w } else { width };

                let dst = samples
                    .get_or_insert_with(|| BandSamples::zeros(chunk.pixel_type(), plane * bands));
                if !dst.copy_block(&chunk, stride, band * plane + y0 * cols + x0, cols, width, height) {
                    return Err(Error::Format(format!(
                        "chunk {} of band {} does not match the image layout",
                        index - 1,
                        band + 1
                    )));
                }
            }
        }
    }

    samples.ok_or_else(|| Error::Format("image has no samples".into()))
}

/// Keep decoded samples in their on-disk type
fn into_samples(result: DecodingResult) -> Result<BandSamples> {
    Ok(match result {
        DecodingResult::U8(buf) => BandSamples::UInt8(buf),
        DecodingResult::U16(buf) => BandSamples::UInt16(buf),
        DecodingResult::U32(buf) => BandSamples::UInt32(buf),
        DecodingResult::U64(buf) => BandSamples::UInt64(buf),
        DecodingResult::I8(buf) => BandSamples::Int8(buf),
        DecodingResult::I16(buf) => BandSamples::Int16(buf),
        DecodingResult::I32(buf) => BandSamples::Int32(buf),
        DecodingResult::I64(buf) => BandSamples::Int64(buf),
        DecodingResult::F32(buf) => BandSamples::Float32(buf),
        DecodingResult::F64(buf) => BandSamples::Float64(buf),
        #[allow(unreachable_patterns)]
        _ => return Err(Error::Format("unsupported TIFF sample format".into())),
    })
}

fn tag_value<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Option<tiff::decoder::ifd::Value> {
    decoder.find_tag(tag(code)).ok().flatten()
}

/// Read the affine transform, preferring the full transformation matrix
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    if let Some(t) = tag_value(decoder, MODEL_TRANSFORMATION).and_then(|v| v.into_f64_vec().ok()) {
        if t.len() >= 16 {
            // Row-major 4x4:
            // x = t[3] + col * t[0] + row * t[1]
            // y = t[7] + col * t[4] + row * t[5]
            return Some(GeoTransform {
                origin_x: t[3],
                origin_y: t[7],
                pixel_width: t[0],
                pixel_height: t[5],
                row_rotation: t[1],
                col_rotation: t[4],
            });
        }
    }

    let scale = tag_value(decoder, MODEL_PIXEL_SCALE)?.into_f64_vec().ok()?;
    let tiepoint = tag_value(decoder, MODEL_TIEPOINT)?.into_f64_vec().ok()?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]
        // scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    None
}

fn read_projection<R: Read + Seek>(decoder: &mut Decoder<R>) -> Projection {
    let Some(keys) = tag_value(decoder, GEO_KEY_DIRECTORY).and_then(|v| v.into_u16_vec().ok())
    else {
        return Projection::default();
    };
    let ascii = tag_value(decoder, GEO_ASCII_PARAMS)
        .and_then(|v| v.into_string().ok())
        .unwrap_or_default();

    projection_from_geokeys(&keys, &ascii)
}

/// Resolve the projection from a GeoKey directory.
///
/// An EPSG code key wins; otherwise the first citation string is the
/// descriptor. No usable key gives an empty projection. The CRS kind comes
/// from the code key, or from `GTModelTypeGeoKey`.
fn projection_from_geokeys(keys: &[u16], ascii: &str) -> Projection {
    // Header: version, revision, minor revision, number of keys
    let count = keys.get(3).copied().unwrap_or(0) as usize;
    let entries: Vec<&[u16]> = keys
        .get(4..)
        .unwrap_or_default()
        .chunks_exact(4)
        .take(count)
        .collect();
    let short = |key: u16| {
        entries
            .iter()
            .find(|e| e[0] == key && e[1] == 0)
            .map(|e| e[3])
    };

    for (code_key, kind) in [
        (PROJECTED_CS_TYPE, CrsKind::Projected),
        (GEOGRAPHIC_TYPE, CrsKind::Geographic),
    ] {
        if let Some(code) = short(code_key).filter(|&c| c != 0 && c != USER_DEFINED) {
            return Projection::from_epsg(code as u32).with_kind(kind);
        }
    }

    let model_kind = match short(GT_MODEL_TYPE) {
        Some(MODEL_TYPE_PROJECTED) => Some(CrsKind::Projected),
        Some(MODEL_TYPE_GEOGRAPHIC) => Some(CrsKind::Geographic),
        _ => None,
    };

    for citation_key in [GT_CITATION, PCS_CITATION, GEOG_CITATION] {
        if let Some(e) = entries
            .iter()
            .find(|e| e[0] == citation_key && e[1] == GEO_ASCII_PARAMS)
        {
            let (count, offset) = (e[2] as usize, e[3] as usize);
            if let Some(text) = ascii.get(offset..offset + count) {
                // Citations are '|'-terminated
                let projection = Projection::new(text.strip_suffix('|').unwrap_or(text));
                return match model_kind {
                    Some(kind) => projection.with_kind(kind),
                    None => projection,
                };
            }
        }
    }

    Projection::default()
}

/// GeoKey directory and its ASCII parameters, ready to be written
struct GeoKeys {
    directory: Vec<u16>,
    ascii: Option<String>,
}

impl GeoKeys {
    /// Keys are emitted in ascending key id order:
    /// model type, raster type, citation, then the EPSG code key.
    fn build(projection: &Projection) -> Result<Self> {
        let kind = projection.kind();
        let mut directory: Vec<u16> = vec![1, 1, 0, 0]; // Version 1.1.0, key count patched below
        let mut ascii = None;

        if let Some(kind) = kind {
            let model_type = match kind {
                CrsKind::Projected => MODEL_TYPE_PROJECTED,
                CrsKind::Geographic => MODEL_TYPE_GEOGRAPHIC,
            };
            directory.extend_from_slice(&[GT_MODEL_TYPE, 0, 1, model_type]);
        }
        directory.extend_from_slice(&[GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);

        if !projection.is_empty() {
            let text = projection.as_str();
            let invalid = |reason: &str| Error::InvalidParameter {
                name: "projection",
                value: projection.identifier(),
                reason: reason.to_string(),
            };
            if !text.is_ascii() || text.contains('\0') {
                return Err(invalid("GeoTIFF citations must be ASCII without NUL"));
            }
            let count = u16::try_from(text.len() + 1).map_err(|_| invalid("descriptor too long"))?;

            directory.extend_from_slice(&[GT_CITATION, GEO_ASCII_PARAMS, count, 0]);
            ascii = Some(format!("{}|", text));
        }

        let code = projection.epsg().and_then(|c| u16::try_from(c).ok());
        if let (Some(code), Some(kind)) = (code, kind) {
            let code_key = match kind {
                CrsKind::Projected => PROJECTED_CS_TYPE,
                CrsKind::Geographic => GEOGRAPHIC_TYPE,
            };
            directory.extend_from_slice(&[code_key, 0, 1, code]);
        }

        directory[3] = (directory.len() / 4 - 1) as u16;
        Ok(Self { directory, ascii })
    }
}

/// Georeferencing tags of one image
struct GeoTags<'a> {
    transform: &'a GeoTransform,
    keys: &'a GeoKeys,
}

impl GeoTags<'_> {
    fn write<W: Write + Seek, K: TiffKind>(&self, dir: &mut DirectoryEncoder<'_, W, K>) -> Result<()> {
        let gt = self.transform;

        if gt.is_north_up() {
            let scale = [gt.pixel_width, -gt.pixel_height, 0.0];
            let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
            dir.write_tag(tag(MODEL_PIXEL_SCALE), &scale[..])?;
            dir.write_tag(tag(MODEL_TIEPOINT), &tiepoint[..])?;
        } else {
            // Rotated or south-up: scale/tiepoint cannot express it
            let matrix = [
                gt.pixel_width, gt.row_rotation, 0.0, gt.origin_x,
                gt.col_rotation, gt.pixel_height, 0.0, gt.origin_y,
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ];
            dir.write_tag(tag(MODEL_TRANSFORMATION), &matrix[..])?;
        }

        dir.write_tag(tag(GEO_KEY_DIRECTORY), self.keys.directory.as_slice())?;
        if let Some(ascii) = &self.keys.ascii {
            dir.write_tag(tag(GEO_ASCII_PARAMS), ascii.as_str())?;
        }
        Ok(())
    }
}

/// Write a Raster to a single-band GeoTIFF file
///
/// Values are converted to `options.pixel_type`; the transform and
/// projection are written verbatim. The file appears at `path` only once
/// it is complete and synced to disk.
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
    let keys = GeoKeys::build(raster.projection())?;

    write_atomically(path.as_ref(), |_, file| {
        let mut writer = BufWriter::new(file);
        encode_geotiff(raster, &opts, &keys, &mut writer)?;
        writer.flush()?;
        Ok(())
    })
}

/// Internal: encode a Raster as GeoTIFF into any `Write + Seek` sink
fn encode_geotiff<T, W>(raster: &Raster<T>, opts: &GeoTiffOptions, keys: &GeoKeys, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let (rows, cols) = raster.shape();
    let dims_err = || Error::InvalidDimensions {
        width: cols,
        height: rows,
    };
    if raster.is_empty() {
        return Err(dims_err());
    }
    let width = u32::try_from(cols).map_err(|_| dims_err())?;
    let height = u32::try_from(rows).map_err(|_| dims_err())?;

    let tags = GeoTags {
        transform: raster.transform(),
        keys,
    };
    let px = opts.pixel_type;
    let c = opts.compression;

    match px {
        PixelType::UInt8 => {
            let data = cast_pixels::<T, u8>(raster, px)?;
            encode_band::<colortype::Gray8, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::UInt16 => {
            let data = cast_pixels::<T, u16>(raster, px)?;
            encode_band::<colortype::Gray16, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::UInt32 => {
            let data = cast_pixels::<T, u32>(raster, px)?;
            encode_band::<colortype::Gray32, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::UInt64 => {
            let data = cast_pixels::<T, u64>(raster, px)?;
            encode_band::<colortype::Gray64, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::Int8 => {
            let data = cast_pixels::<T, i8>(raster, px)?;
            encode_band::<colortype::GrayI8, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::Int16 => {
            let data = cast_pixels::<T, i16>(raster, px)?;
            encode_band::<colortype::GrayI16, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::Int32 => {
            let data = cast_pixels::<T, i32>(raster, px)?;
            encode_band::<colortype::GrayI32, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::Int64 => {
            let data = cast_pixels::<T, i64>(raster, px)?;
            encode_band::<colortype::GrayI64, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::Float32 => {
            let data = cast_pixels::<T, f32>(raster, px)?;
            encode_band::<colortype::Gray32Float, _>(writer, width, height, c, &tags, &data)
        }
        PixelType::Float64 => {
            let data = cast_pixels::<T, f64>(raster, px)?;
            encode_band::<colortype::Gray64Float, _>(writer, width, height, c, &tags, &data)
        }
    }
}

fn encode_band<C, W>(
    writer: W,
    width: u32,
    height: u32,
    compression: Compression,
    tags: &GeoTags<'_>,
    data: &[C::Inner],
) -> Result<()>
where
    C: ColorType,
    [C::Inner]: TiffValue,
    W: Write + Seek,
{
    let encoder = TiffEncoder::new(writer)?;

    match compression {
        Compression::None => {
            let mut encoder = encoder;
            let mut image = encoder.new_image::<C>(width, height)?;
            tags.write(image.encoder())?;
            image.write_data(data)?;
        }
        Compression::Lzw => {
            let mut encoder = encoder.with_compression(tiff::encoder::Compression::Lzw);
            let mut image = encoder.new_image::<C>(width, height)?;
            tags.write(image.encoder())?;
            image.write_data(data)?;
        }
        Compression::Deflate => {
            let mut encoder = encoder
                .with_compression(tiff::encoder::Compression::Deflate(DeflateLevel::default()));
            let mut image = encoder.new_image::<C>(width, height)?;
            tags.write(image.encoder())?;
            image.write_data(data)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiff::tags::{PhotometricInterpretation, SampleFormat};

    /// Pixel-interleaved 8 x u16 layout of the multispectral sensor
    struct Gray16x8;

    impl ColorType for Gray16x8 {
        type Inner = u16;
        const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::BlackIsZero;
        const BITS_PER_SAMPLE: &'static [u16] = &[16; 8];
        const SAMPLE_FORMAT: &'static [SampleFormat] = &[SampleFormat::Uint; 8];

        fn horizontal_predict(row: &[u16], result: &mut Vec<u16>) {
            let sample_size = Self::SAMPLE_FORMAT.len();
            if row.len() < sample_size {
                return;
            }
            let (start, rest) = row.split_at(sample_size);
            result.extend_from_slice(start);
            result.extend(row.iter().zip(rest).map(|(prev, current)| current.wrapping_sub(*prev)));
        }
    }

    const WKT: &str = r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["central_meridian",15],UNIT["metre",1]]"#;

    fn classified(transform: GeoTransform, projection: Projection) -> Raster<u8> {
        let mut r = Raster::from_vec(vec![255, 255, 0, 255, 0, 0], 2, 3).unwrap();
        r.set_transform(transform);
        r.set_projection(projection);
        r
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        let gt = GeoTransform::new(499980.0, 4600020.0, 10.0, -10.0);
        let raster = classified(gt, Projection::new(WKT));

        write_geotiff(&raster, &path, None).unwrap();
        let ds = read_dataset(&path).unwrap();

        assert_eq!(ds.band_count(), 1);
        assert_eq!(ds.shape(), (2, 3));
        assert_eq!(ds.pixel_type(), PixelType::UInt16);
        assert_eq!(ds.geo_transform(), gt);
        assert_eq!(ds.projection().as_str(), WKT);

        let band = ds.band(1).unwrap();
        assert_eq!(band.get(0, 0).unwrap(), 255.0);
        assert_eq!(band.get(0, 2).unwrap(), 0.0);
        assert_eq!(band.get(1, 0).unwrap(), 255.0);
    }

    #[test]
    fn test_rotated_transform_roundtrip() {
        let gt = GeoTransform::from_gdal([1000.5, 2.0, 0.125, 5000.25, -0.375, -2.0]);
        let raster = classified(gt, Projection::from_epsg(3857));
        let keys = GeoKeys::build(raster.projection()).unwrap();

        let mut buf = Cursor::new(Vec::new());
        encode_geotiff(&raster, &GeoTiffOptions::default(), &keys, &mut buf).unwrap();
        let ds = decode_dataset(Cursor::new(buf.into_inner())).unwrap();

        assert_eq!(ds.geo_transform().to_gdal(), gt.to_gdal());
        assert_eq!(ds.projection().as_str(), "EPSG:3857");
    }

    #[test]
    fn test_south_up_transform_roundtrip() {
        let gt = GeoTransform::new(-180.0, -90.0, 0.25, 0.25);
        let raster = classified(gt, Projection::default());
        let keys = GeoKeys::build(raster.projection()).unwrap();

        let mut buf = Cursor::new(Vec::new());
        encode_geotiff(&raster, &GeoTiffOptions::default(), &keys, &mut buf).unwrap();
        let ds = decode_dataset(Cursor::new(buf.into_inner())).unwrap();

        assert_eq!(ds.geo_transform(), gt);
        assert!(ds.projection().is_empty());
    }

    #[test]
    fn test_pixel_types_and_compression() {
        let raster = classified(GeoTransform::default(), Projection::default());
        let keys = GeoKeys::build(raster.projection()).unwrap();

        for (pixel_type, compression) in [
            (PixelType::UInt8, Compression::None),
            (PixelType::UInt16, Compression::Lzw),
            (PixelType::Int32, Compression::None),
            (PixelType::Float32, Compression::Deflate),
            (PixelType::Float64, Compression::None),
        ] {
            let opts = GeoTiffOptions {
                pixel_type,
                compression,
            };
            let mut buf = Cursor::new(Vec::new());
            encode_geotiff(&raster, &opts, &keys, &mut buf).unwrap();
            let ds = decode_dataset(Cursor::new(buf.into_inner())).unwrap();

            assert_eq!(ds.pixel_type(), pixel_type);
            let band = ds.band(1).unwrap();
            assert_eq!(band.data(), &raster.data().mapv(f64::from));
        }
    }

    #[test]
    fn test_value_out_of_range_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        let raster = classified(GeoTransform::default(), Projection::default());

        let opts = GeoTiffOptions {
            pixel_type: PixelType::Int8,
            ..Default::default()
        };
        let result = write_geotiff(&raster, &path, Some(opts));

        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_non_ascii_projection_rejected() {
        let raster = classified(GeoTransform::default(), Projection::new("Réseau géodésique"));
        let dir = tempfile::tempdir().unwrap();
        let result = write_geotiff(&raster, dir.path().join("x.tif"), None);
        assert!(matches!(result, Err(Error::InvalidParameter { name: "projection", .. })));
    }

    #[test]
    fn test_read_multiband_interleaved() {
        let (rows, cols) = (2usize, 3usize);
        // Band b of pixel i holds i * 10 + b
        let data: Vec<u16> = (0..rows * cols)
            .flat_map(|i| (0..8).map(move |b| (i * 10 + b) as u16))
            .collect();

        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            let image = encoder.new_image::<Gray16x8>(cols as u32, rows as u32).unwrap();
            image.write_data(&data).unwrap();
        }
        let ds = decode_dataset(Cursor::new(buf.into_inner())).unwrap();

        assert_eq!(ds.band_count(), 8);
        assert_eq!(ds.pixel_type(), PixelType::UInt16);
        assert_eq!(ds.interleave(), Interleave::Pixel);
        assert_eq!(ds.geo_transform(), GeoTransform::default());
        assert!(ds.projection().is_empty());

        let nir = ds.band(8).unwrap();
        let red = ds.band(6).unwrap();
        assert_eq!(nir.get(0, 0).unwrap(), 7.0);
        assert_eq!(red.get(1, 2).unwrap(), 55.0);
    }

    #[test]
    fn test_projection_prefers_epsg_key() {
        let ascii = "WGS 84 / UTM zone 33N|";
        let keys = [
            1, 1, 0, 3,
            GT_MODEL_TYPE, 0, 1, 1,
            GT_CITATION, GEO_ASCII_PARAMS, 22, 0,
            PROJECTED_CS_TYPE, 0, 1, 32633,
        ];
        let projection = projection_from_geokeys(&keys, ascii);
        assert_eq!(projection.as_str(), "EPSG:32633");
        assert_eq!(projection.kind(), Some(CrsKind::Projected));
    }

    #[test]
    fn test_projection_kind_from_model_type() {
        let ascii = "Local survey grid|";
        let keys = [
            1, 1, 0, 2,
            GT_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC,
            GT_CITATION, GEO_ASCII_PARAMS, 18, 0,
        ];
        let projection = projection_from_geokeys(&keys, ascii);
        assert_eq!(projection.as_str(), "Local survey grid");
        assert_eq!(projection.kind(), Some(CrsKind::Geographic));
    }

    fn written_geokeys(projection: Projection) -> (Vec<u16>, Option<String>) {
        let raster = classified(GeoTransform::default(), projection);
        let keys = GeoKeys::build(raster.projection()).unwrap();
        let mut buf = Cursor::new(Vec::new());
        encode_geotiff(&raster, &GeoTiffOptions::default(), &keys, &mut buf).unwrap();

        let mut decoder = Decoder::new(Cursor::new(buf.into_inner())).unwrap();
        let directory = tag_value(&mut decoder, GEO_KEY_DIRECTORY)
            .unwrap()
            .into_u16_vec()
            .unwrap();
        let ascii = tag_value(&mut decoder, GEO_ASCII_PARAMS).and_then(|v| v.into_string().ok());
        (directory, ascii)
    }

    #[test]
    fn test_writes_projected_epsg_key() {
        let (directory, ascii) = written_geokeys(Projection::from_epsg(32633));
        assert_eq!(
            directory,
            vec![
                1, 1, 0, 4,
                GT_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED,
                GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
                GT_CITATION, GEO_ASCII_PARAMS, 11, 0,
                PROJECTED_CS_TYPE, 0, 1, 32633,
            ]
        );
        assert_eq!(ascii.as_deref(), Some("EPSG:32633|"));
    }

    #[test]
    fn test_writes_geographic_epsg_key() {
        let (directory, _) = written_geokeys(Projection::from_epsg(4326));
        assert_eq!(
            directory,
            vec![
                1, 1, 0, 4,
                GT_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC,
                GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
                GT_CITATION, GEO_ASCII_PARAMS, 10, 0,
                GEOGRAPHIC_TYPE, 0, 1, 4326,
            ]
        );
    }

    #[test]
    fn test_wkt_keeps_citation_only() {
        let (directory, ascii) = written_geokeys(Projection::new(WKT));
        assert_eq!(directory[3], 3);
        assert_eq!(&directory[4..8], &[GT_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED]);
        assert!(!directory.chunks(4).any(|e| e[0] == PROJECTED_CS_TYPE));
        assert_eq!(ascii, Some(format!("{}|", WKT)));
    }

    #[test]
    fn test_epsg_key_survives_rewrite() {
        let raster = classified(GeoTransform::default(), Projection::from_epsg(32633));
        let keys = GeoKeys::build(raster.projection()).unwrap();
        let mut buf = Cursor::new(Vec::new());
        encode_geotiff(&raster, &GeoTiffOptions::default(), &keys, &mut buf).unwrap();
        let ds = decode_dataset(Cursor::new(buf.into_inner())).unwrap();

        assert_eq!(ds.projection().epsg(), Some(32633));
        assert_eq!(ds.projection().kind(), Some(CrsKind::Projected));
        let (directory, _) = written_geokeys(ds.projection());
        assert!(directory.chunks(4).any(|e| e == [PROJECTED_CS_TYPE, 0, 1, 32633]));
    }

    /// Little-endian TIFF with one strip per band and
    /// `PlanarConfiguration = 2`. `planes[b]` holds band `b + 1`.
    fn band_interleaved_tiff(width: u16, height: u16, planes: &[Vec<u16>]) -> Vec<u8> {
        let bands = planes.len() as u32;
        let entry_count = 10u16;
        let arrays_at = 8 + 2 + 12 * entry_count as u32 + 4;
        let bits_at = arrays_at;
        let offsets_at = bits_at + 2 * bands;
        let counts_at = offsets_at + 4 * bands;
        let data_at = counts_at + 4 * bands;
        let plane_bytes = 2 * width as u32 * height as u32;

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());

        let entry = |out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32| {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&kind.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&value.to_le_bytes());
        };
        const SHORT: u16 = 3;
        const LONG: u16 = 4;

        out.extend_from_slice(&entry_count.to_le_bytes());
        entry(&mut out, 256, SHORT, 1, width as u32);
        entry(&mut out, 257, SHORT, 1, height as u32);
        entry(&mut out, 258, SHORT, bands, bits_at);
        entry(&mut out, 259, SHORT, 1, 1);
        entry(&mut out, 262, SHORT, 1, 1);
        entry(&mut out, 273, LONG, bands, offsets_at);
        entry(&mut out, 277, SHORT, 1, bands);
        entry(&mut out, 278, SHORT, 1, height as u32);
        entry(&mut out, 279, LONG, bands, counts_at);
        entry(&mut out, PLANAR_CONFIGURATION, SHORT, 1, PLANAR_SEPARATE as u32);
        out.extend_from_slice(&0u32.to_le_bytes());

        for _ in 0..bands {
            out.extend_from_slice(&16u16.to_le_bytes());
        }
        for b in 0..bands {
            out.extend_from_slice(&(data_at + b * plane_bytes).to_le_bytes());
        }
        for _ in 0..bands {
            out.extend_from_slice(&plane_bytes.to_le_bytes());
        }
        for plane in planes {
            for v in plane {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    #[test]
    fn test_read_multiband_band_interleaved() {
        // 2x1 image; band b holds [b * 100 + 1, b * 100 + 2]
        let planes: Vec<Vec<u16>> = (0..8u16).map(|b| vec![b * 100 + 1, b * 100 + 2]).collect();
        let bytes = band_interleaved_tiff(2, 1, &planes);

        let ds = decode_dataset(Cursor::new(bytes)).unwrap();

        assert_eq!(ds.band_count(), 8);
        assert_eq!(ds.shape(), (1, 2));
        assert_eq!(ds.pixel_type(), PixelType::UInt16);
        assert_eq!(ds.interleave(), Interleave::Band);
        assert_eq!(ds.band(1).unwrap().data().iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert_eq!(ds.band(6).unwrap().data().iter().copied().collect::<Vec<_>>(), vec![501.0, 502.0]);
        assert_eq!(ds.band(8).unwrap().data().iter().copied().collect::<Vec<_>>(), vec![701.0, 702.0]);
    }

    #[test]
    fn test_projection_from_citation() {
        let ascii = "WGS 84|";
        let keys = [
            1, 1, 0, 2,
            GEOGRAPHIC_TYPE, 0, 1, USER_DEFINED,
            GEOG_CITATION, GEO_ASCII_PARAMS, 7, 0,
        ];
        assert_eq!(projection_from_geokeys(&keys, ascii).as_str(), "WGS 84");
        assert!(projection_from_geokeys(&keys[..8], "").is_empty());
    }

    #[test]
    fn test_not_a_tiff() {
        let result = decode_dataset(Cursor::new(b"definitely not a tiff".to_vec()));
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_dataset(dir.path().join("nope.tif"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
