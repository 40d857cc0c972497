//! Band positions of the 8-band multispectral sensor

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Semantic band names of the 8-band sensor and their 1-based positions
/// in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorBand {
    CoastalBlue,
    Blue,
    Green1,
    Green,
    Yellow,
    Red,
    RedEdge,
    Nir,
}

impl SensorBand {
    /// Number of bands a source image must carry for the table to apply
    pub const REQUIRED_BANDS: usize = 8;

    /// All bands, in position order
    pub const ALL: [SensorBand; 8] = [
        SensorBand::CoastalBlue,
        SensorBand::Blue,
        SensorBand::Green1,
        SensorBand::Green,
        SensorBand::Yellow,
        SensorBand::Red,
        SensorBand::RedEdge,
        SensorBand::Nir,
    ];

    /// 1-based band position in the source image
    pub const fn position(self) -> usize {
        match self {
            SensorBand::CoastalBlue => 1,
            SensorBand::Blue => 2,
            SensorBand::Green1 => 3,
            SensorBand::Green => 4,
            SensorBand::Yellow => 5,
            SensorBand::Red => 6,
            SensorBand::RedEdge => 7,
            SensorBand::Nir => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SensorBand::CoastalBlue => "coastal-blue",
            SensorBand::Blue => "blue",
            SensorBand::Green1 => "green-1",
            SensorBand::Green => "green",
            SensorBand::Yellow => "yellow",
            SensorBand::Red => "red",
            SensorBand::RedEdge => "red-edge",
            SensorBand::Nir => "nir",
        }
    }
}

impl fmt::Display for SensorBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensorBand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        SensorBand::ALL
            .into_iter()
            .find(|band| band.name() == key)
            .ok_or_else(|| Error::InvalidParameter {
                name: "band",
                value: s.to_string(),
                reason: "expected one of coastal-blue, blue, green-1, green, yellow, red, red-edge, nir"
                    .to_string(),
            })
    }
}
