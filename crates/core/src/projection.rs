//! Spatial reference descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Whether a spatial reference is projected or geographic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsKind {
    Projected,
    Geographic,
}

/// Spatial reference descriptor of a raster.
///
/// The descriptor is kept as the exact string read from the source (WKT,
/// `EPSG:<code>`, a PROJ string, ...) so it can be written back verbatim.
/// An empty descriptor means the raster carries no spatial reference.
///
/// Readers may also record the [`CrsKind`] the source declared. It only
/// steers how the descriptor is encoded on write; two projections with the
/// same descriptor compare equal whatever their kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projection {
    descriptor: String,
    #[serde(default)]
    kind: Option<CrsKind>,
}

impl Projection {
    /// Create a projection from any descriptor string
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            kind: None,
        }
    }

    /// Create an `EPSG:<code>` descriptor
    pub fn from_epsg(code: u32) -> Self {
        Self::new(format!("EPSG:{}", code))
    }

    /// Record the declared kind of this reference
    pub fn with_kind(mut self, kind: CrsKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// The descriptor, exactly as stored
    pub fn as_str(&self) -> &str {
        &self.descriptor
    }

    /// Whether no spatial reference is set
    pub fn is_empty(&self) -> bool {
        self.descriptor.is_empty()
    }

    /// EPSG code for `EPSG:<code>` descriptors
    pub fn epsg(&self) -> Option<u32> {
        let code = self.descriptor.trim().strip_prefix("EPSG:")?;
        code.parse().ok()
    }

    /// Projected or geographic.
    ///
    /// The declared kind wins. Otherwise it is taken from the WKT root
    /// keyword, or from the EPSG code (geographic 2D CRS codes are 4000-4999).
    pub fn kind(&self) -> Option<CrsKind> {
        if self.kind.is_some() {
            return self.kind;
        }
        let text = self.descriptor.trim_start();
        if ["PROJCS[", "PROJCRS[", "PROJECTEDCRS["]
            .iter()
            .any(|root| text.starts_with(root))
        {
            return Some(CrsKind::Projected);
        }
        if ["GEOGCS[", "GEOGCRS[", "GEOGRAPHICCRS["]
            .iter()
            .any(|root| text.starts_with(root))
        {
            return Some(CrsKind::Geographic);
        }
        match self.epsg()? {
            4000..=4999 => Some(CrsKind::Geographic),
            _ => Some(CrsKind::Projected),
        }
    }

    /// Short identifier for display
    pub fn identifier(&self) -> String {
        if self.descriptor.is_empty() {
            return "Unknown".to_string();
        }
        if let Some(code) = self.epsg() {
            return format!("EPSG:{}", code);
        }
        // First 50 chars of longer descriptors such as WKT
        let short: String = self.descriptor.chars().take(50).collect();
        if short.len() < self.descriptor.len() {
            format!("{}...", short)
        } else {
            short
        }
    }
}

impl PartialEq for Projection {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl Eq for Projection {}

impl Hash for Projection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
    }
}

impl From<String> for Projection {
    fn from(descriptor: String) -> Self {
        Self::new(descriptor)
    }
}

impl From<&str> for Projection {
    fn from(descriptor: &str) -> Self {
        Self::new(descriptor)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
