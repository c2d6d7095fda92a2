//! Multi-pass recognition fusion.
//!
//! Recognition runs several times over differently transformed copies of
//! the same crop. This module brings every pass back into the canonical
//! region frame, normalizes text, and folds duplicates across passes.

mod aggregate;
mod normalize;
mod orientation;
mod plan;

pub use aggregate::PassAggregator;
pub use normalize::{ConfusableTable, TokenNormalizer};
pub use orientation::{remap_quad, Rotation};
pub use plan::{default_pass_plan, ImageTransform, PassVariant};

use serde::{Deserialize, Serialize};

use crate::models::detection::Detection;

/// Which image variant and orientation a detection came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassOrigin {
    /// Variant name, matched against the pass priority list.
    pub variant: String,

    /// Clockwise rotation applied to the working image, in degrees.
    #[serde(default)]
    pub rotation: i32,
}

impl PassOrigin {
    pub fn new(variant: impl Into<String>, rotation: i32) -> Self {
        Self {
            variant: variant.into(),
            rotation,
        }
    }
}

/// Detections from one recognition run over one image variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionPass {
    #[serde(flatten)]
    pub origin: PassOrigin,

    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl RecognitionPass {
    pub fn new(origin: PassOrigin, detections: Vec<Detection>) -> Self {
        Self { origin, detections }
    }
}

/// Canonical (unrotated) region dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionSize {
    pub width: f32,
    pub height: f32,
}

impl RegionSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
