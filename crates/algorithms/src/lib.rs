//! # Verdant Algorithms
//!
//! Vegetation-index algorithms for Verdant.
//!
//! - **imagery**: normalized difference / NDVI, threshold classification
//! - **pipeline**: read an 8-band image, classify its NDVI, write the mask

pub mod imagery;
pub mod pipeline;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        ndvi, normalized_difference, threshold, ThresholdParams, CLASS_HIGH, CLASS_LOW,
        DEFAULT_THRESHOLD,
    };
    pub use crate::pipeline::{compute_ndvi, compute_ndvi_with_threshold, NdviParams, NdviSummary};
    pub use verdant_core::prelude::*;
}
