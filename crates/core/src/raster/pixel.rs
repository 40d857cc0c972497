//! Pixel sample types

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Sample type of a raster band, as stored on disk.
///
/// Source images report the type they were decoded from. For output
/// rasters it selects the on-disk type the values are converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelType {
    UInt8,
    #[default]
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl PixelType {
    pub const ALL: [PixelType; 10] = [
        PixelType::UInt8,
        PixelType::UInt16,
        PixelType::UInt32,
        PixelType::UInt64,
        PixelType::Int8,
        PixelType::Int16,
        PixelType::Int32,
        PixelType::Int64,
        PixelType::Float32,
        PixelType::Float64,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PixelType::UInt8 => "uint8",
            PixelType::UInt16 => "uint16",
            PixelType::UInt32 => "uint32",
            PixelType::UInt64 => "uint64",
            PixelType::Int8 => "int8",
            PixelType::Int16 => "int16",
            PixelType::Int32 => "int32",
            PixelType::Int64 => "int64",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        }
    }

    /// Bits per sample
    pub const fn bits(self) -> u16 {
        match self {
            PixelType::UInt8 | PixelType::Int8 => 8,
            PixelType::UInt16 | PixelType::Int16 => 16,
            PixelType::UInt32 | PixelType::Int32 | PixelType::Float32 => 32,
            PixelType::UInt64 | PixelType::Int64 | PixelType::Float64 => 64,
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uint8" | "u8" | "byte" => Ok(PixelType::UInt8),
            "uint16" | "u16" => Ok(PixelType::UInt16),
            "uint32" | "u32" => Ok(PixelType::UInt32),
            "uint64" | "u64" => Ok(PixelType::UInt64),
            "int8" | "i8" => Ok(PixelType::Int8),
            "int16" | "i16" => Ok(PixelType::Int16),
            "int32" | "i32" => Ok(PixelType::Int32),
            "int64" | "i64" => Ok(PixelType::Int64),
            "float32" | "f32" => Ok(PixelType::Float32),
            "float64" | "f64" => Ok(PixelType::Float64),
            _ => Err(Error::InvalidParameter {
                name: "pixel_type",
                value: s.to_string(),
                reason: format!(
                    "expected one of {}",
                    PixelType::ALL.map(PixelType::name).join(", ")
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uint16() {
        assert_eq!(PixelType::default(), PixelType::UInt16);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("byte".parse::<PixelType>().unwrap(), PixelType::UInt8);
        assert_eq!("Float32".parse::<PixelType>().unwrap(), PixelType::Float32);
        assert!("complex64".parse::<PixelType>().is_err());
    }

    #[test]
    fn test_error_lists_every_type() {
        let Err(Error::InvalidParameter { reason, .. }) = "complex64".parse::<PixelType>() else {
            panic!("expected InvalidParameter");
        };
        for pixel_type in PixelType::ALL {
            assert_eq!(pixel_type.name().parse::<PixelType>().unwrap(), pixel_type);
            assert!(reason.contains(pixel_type.name()), "{} missing from {:?}", pixel_type, reason);
        }
    }
}
