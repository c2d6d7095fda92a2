//! Detection records produced by recognition passes.

use serde::{Deserialize, Serialize};

use crate::fusion::PassOrigin;

/// A planar point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Quadrilateral bounding box, four corners in recognition order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    /// Build a quad from an axis-aligned rectangle.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    /// Arithmetic mean of the four corners.
    pub fn centroid(&self) -> Point {
        let x = self.0.iter().map(|p| p.x).sum::<f32>() / 4.0;
        let y = self.0.iter().map(|p| p.y).sum::<f32>() / 4.0;
        Point::new(x, y)
    }

    /// Apply a point map to every corner.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self(self.0.map(f))
    }
}

/// One raw observation from one recognition pass.
///
/// Geometry is expressed in the frame of the image variant the pass ran on;
/// the owning [`RecognitionPass`](crate::fusion::RecognitionPass) says which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding quadrilateral in the working frame.
    pub geometry: Quad,

    /// Recognized text, unmodified.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(geometry: Quad, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            geometry,
            text: text.into(),
            confidence,
        }
    }
}

/// A detection after remapping, normalization and de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDetection {
    /// Original recognized text, kept for traceability.
    pub raw_text: String,

    /// Text after confusable-character substitution.
    pub normalized_text: String,

    /// `normalized_text` with all whitespace removed.
    pub dedupe_key: String,

    /// Centroid in the canonical region frame.
    pub centroid: Point,

    /// Recognition confidence carried from the raw detection.
    pub confidence: f32,

    /// Pass that produced this detection.
    pub origin: PassOrigin,
}
