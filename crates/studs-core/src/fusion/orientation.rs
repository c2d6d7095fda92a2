//! Rotated-pass geometry remapping.

use crate::error::GeometryError;
use crate::models::detection::{Point, Quad};

use super::RegionSize;

/// Rotation applied to a working image before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Unrotated.
    Identity,
    /// 90 degrees clockwise.
    Clockwise90,
    /// 270 degrees clockwise (90 counter-clockwise).
    Clockwise270,
}

impl Rotation {
    /// Parse a clockwise rotation in degrees.
    pub fn from_degrees(degrees: i32) -> Result<Self, GeometryError> {
        match degrees {
            0 => Ok(Rotation::Identity),
            90 => Ok(Rotation::Clockwise90),
            270 => Ok(Rotation::Clockwise270),
            other => Err(GeometryError::UnsupportedRotation(other)),
        }
    }

    /// Map a point from the rotated working frame into the canonical frame.
    pub fn to_canonical(&self, p: Point, size: RegionSize) -> Point {
        match self {
            Rotation::Identity => p,
            Rotation::Clockwise90 => Point::new(p.y, size.height - p.x),
            Rotation::Clockwise270 => Point::new(size.width - p.y, p.x),
        }
    }

    /// Map every corner of a quad into the canonical frame.
    pub fn remap(&self, quad: &Quad, size: RegionSize) -> Quad {
        quad.map(|p| self.to_canonical(p, size))
    }
}

/// Remap a quad produced under `degrees` rotation into the canonical frame.
pub fn remap_quad(quad: &Quad, degrees: i32, size: RegionSize) -> Result<Quad, GeometryError> {
    let rotation = Rotation::from_degrees(degrees)?;
    Ok(rotation.remap(quad, size))
}
