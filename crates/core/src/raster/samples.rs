//! Band samples in their on-disk type

use crate::raster::PixelType;

/// How the bands of a multi-band image are ordered in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interleave {
    /// All samples of a pixel are adjacent (`PlanarConfiguration = 1`)
    #[default]
    Pixel,
    /// Each band is one contiguous plane (`PlanarConfiguration = 2`)
    Band,
}

/// Samples of every band of an image, kept in the type they were stored
/// with. Bands are widened to `f64` one at a time, on request.
#[derive(Debug, Clone, PartialEq)]
pub enum BandSamples {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! each_variant {
    ($value:expr, $buf:ident => $body:expr) => {
        match $value {
            BandSamples::UInt8($buf) => $body,
            BandSamples::UInt16($buf) => $body,
            BandSamples::UInt32($buf) => $body,
            BandSamples::UInt64($buf) => $body,
            BandSamples::Int8($buf) => $body,
            BandSamples::Int16($buf) => $body,
            BandSamples::Int32($buf) => $body,
            BandSamples::Int64($buf) => $body,
            BandSamples::Float32($buf) => $body,
            BandSamples::Float64($buf) => $body,
        }
    };
}

impl BandSamples {
    /// A zero-filled buffer of `len` samples
    pub fn zeros(pixel_type: PixelType, len: usize) -> Self {
        match pixel_type {
            PixelType::UInt8 => BandSamples::UInt8(vec![0; len]),
            PixelType::UInt16 => BandSamples::UInt16(vec![0; len]),
            PixelType::UInt32 => BandSamples::UInt32(vec![0; len]),
            PixelType::UInt64 => BandSamples::UInt64(vec![0; len]),
            PixelType::Int8 => BandSamples::Int8(vec![0; len]),
            PixelType::Int16 => BandSamples::Int16(vec![0; len]),
            PixelType::Int32 => BandSamples::Int32(vec![0; len]),
            PixelType::Int64 => BandSamples::Int64(vec![0; len]),
            PixelType::Float32 => BandSamples::Float32(vec![0.0; len]),
            PixelType::Float64 => BandSamples::Float64(vec![0.0; len]),
        }
    }

    pub fn pixel_type(&self) -> PixelType {
        match self {
            BandSamples::UInt8(_) => PixelType::UInt8,
            BandSamples::UInt16(_) => PixelType::UInt16,
            BandSamples::UInt32(_) => PixelType::UInt32,
            BandSamples::UInt64(_) => PixelType::UInt64,
            BandSamples::Int8(_) => PixelType::Int8,
            BandSamples::Int16(_) => PixelType::Int16,
            BandSamples::Int32(_) => PixelType::Int32,
            BandSamples::Int64(_) => PixelType::Int64,
            BandSamples::Float32(_) => PixelType::Float32,
            BandSamples::Float64(_) => PixelType::Float64,
        }
    }

    /// Total number of samples across all bands
    pub fn len(&self) -> usize {
        each_variant!(self, buf => buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen `count` samples starting at `start`, `step` apart.
    ///
    /// Out-of-range positions are simply not produced; callers check the
    /// buffer length up front.
    pub fn widen(&self, start: usize, step: usize, count: usize) -> Vec<f64> {
        each_variant!(self, buf => buf
            .iter()
            .skip(start)
            .step_by(step.max(1))
            .take(count)
            .map(|&v| v as f64)
            .collect())
    }

    /// Copy a `width` x `height` block of `src` into `self`.
    ///
    /// Rows of the block start `src_stride` samples apart in `src`; row `r`
    /// lands at `offset + r * row_stride`. Returns `false`, leaving `self`
    /// untouched, when the sample types differ or the block does not fit.
    pub fn copy_block(
        &mut self,
        src: &BandSamples,
        src_stride: usize,
        offset: usize,
        row_stride: usize,
        width: usize,
        height: usize,
    ) -> bool {
        macro_rules! copy {
            ($dst:expr, $src:expr) => {{
                let (dst, src) = ($dst, $src);
                if height == 0 || width == 0 {
                    return true;
                }
                let fits = src_stride >= width
                    && (height - 1) * src_stride + width <= src.len()
                    && offset + (height - 1) * row_stride + width <= dst.len();
                if !fits {
                    return false;
                }
                for r in 0..height {
                    let from = r * src_stride;
                    let at = offset + r * row_stride;
                    dst[at..at + width].copy_from_slice(&src[from..from + width]);
                }
                true
            }};
        }

        match (self, src) {
            (BandSamples::UInt8(d), BandSamples::UInt8(s)) => copy!(d, s),
            (BandSamples::UInt16(d), BandSamples::UInt16(s)) => copy!(d, s),
            (BandSamples::UInt32(d), BandSamples::UInt32(s)) => copy!(d, s),
            (BandSamples::UInt64(d), BandSamples::UInt64(s)) => copy!(d, s),
            (BandSamples::Int8(d), BandSamples::Int8(s)) => copy!(d, s),
            (BandSamples::Int16(d), BandSamples::Int16(s)) => copy!(d, s),
            (BandSamples::Int32(d), BandSamples::Int32(s)) => copy!(d, s),
            (BandSamples::Int64(d), BandSamples::Int64(s)) => copy!(d, s),
            (BandSamples::Float32(d), BandSamples::Float32(s)) => copy!(d, s),
            (BandSamples::Float64(d), BandSamples::Float64(s)) => copy!(d, s),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_interleaved_band() {
        // Two bands, three pixels, pixel-interleaved
        let samples = BandSamples::UInt16(vec![1, 10, 2, 20, 3, 30]);
        assert_eq!(samples.widen(1, 2, 3), vec![10.0, 20.0, 30.0]);
        assert_eq!(samples.pixel_type(), PixelType::UInt16);
    }

    #[test]
    fn test_widen_keeps_full_u16_range() {
        let samples = BandSamples::UInt16(vec![u16::MAX, 0]);
        assert_eq!(samples.widen(0, 1, 2), vec![65535.0, 0.0]);
    }

    #[test]
    fn test_copy_block() {
        let mut plane = BandSamples::zeros(PixelType::Int16, 12);
        let block = BandSamples::Int16(vec![1, 2, 3, 4]);

        // 2x2 block at row 1, col 1 of a 4-wide plane
        assert!(plane.copy_block(&block, 2, 5, 4, 2, 2));
        assert_eq!(
            plane,
            BandSamples::Int16(vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0])
        );
    }

    #[test]
    fn test_copy_block_skips_tile_padding() {
        // 3x2 tile padded to 4 columns
        let tile = BandSamples::UInt8(vec![1, 2, 3, 9, 4, 5, 6, 9]);
        let mut plane = BandSamples::zeros(PixelType::UInt8, 6);

        assert!(plane.copy_block(&tile, 4, 0, 3, 3, 2));
        assert_eq!(plane, BandSamples::UInt8(vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_copy_block_rejects_mismatch() {
        let mut plane = BandSamples::zeros(PixelType::UInt8, 4);
        assert!(!plane.copy_block(&BandSamples::UInt16(vec![1; 4]), 2, 0, 2, 2, 2));
        assert!(!plane.copy_block(&BandSamples::UInt8(vec![1; 4]), 2, 2, 2, 2, 2));
        assert_eq!(plane, BandSamples::UInt8(vec![0; 4]));
    }
}
