//! Image-variant pass plan.
//!
//! The core never transforms images. A plan describes what each pass must
//! be run over so the recognition collaborator and the fusion step agree on
//! pass names and rotations.

use serde::{Deserialize, Serialize};

use super::PassOrigin;

/// One image transform applied before recognition, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageTransform {
    /// 3x3 sharpen kernel (center 9, neighbours -1).
    Sharpen,
    /// Gaussian adaptive threshold to a binary image.
    AdaptiveThreshold { block_size: u32, offset: i32 },
    /// Dilate dark strokes with a square kernel.
    Dilate { kernel: u32, iterations: u32 },
}

/// A recognition pass to run: which transforms, then which rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassVariant {
    /// Variant name, used for priority ordering.
    pub name: String,

    /// Clockwise rotation applied after the transforms, in degrees.
    #[serde(default)]
    pub rotation: i32,

    /// Transforms applied to the grayscale crop.
    #[serde(default)]
    pub transforms: Vec<ImageTransform>,
}

impl PassVariant {
    pub fn new(name: impl Into<String>, rotation: i32, transforms: Vec<ImageTransform>) -> Self {
        Self {
            name: name.into(),
            rotation,
            transforms,
        }
    }

    /// Origin tag for detections produced by this variant.
    pub fn origin(&self) -> PassOrigin {
        PassOrigin::new(self.name.clone(), self.rotation)
    }
}

/// The standard five-pass plan: sharpened, binarized, dilated, then the
/// dilated image rotated both ways for vertical callouts.
pub fn default_pass_plan() -> Vec<PassVariant> {
    let threshold = ImageTransform::AdaptiveThreshold {
        block_size: 21,
        offset: 4,
    };
    let dilate = ImageTransform::Dilate {
        kernel: 2,
        iterations: 1,
    };
    let dilated = vec![ImageTransform::Sharpen, threshold.clone(), dilate];

    vec![
        PassVariant::new("sharpened", 0, vec![ImageTransform::Sharpen]),
        PassVariant::new("binarized", 0, vec![ImageTransform::Sharpen, threshold]),
        PassVariant::new("dilated", 0, dilated.clone()),
        PassVariant::new("rotated_90", 90, dilated.clone()),
        PassVariant::new("rotated_270", 270, dilated),
    ]
}
