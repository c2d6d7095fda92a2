//! Cross-pass aggregation and de-duplication.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::GeometryError;
use crate::models::detection::{NormalizedDetection, Point};

use super::normalize::TokenNormalizer;
use super::orientation::Rotation;
use super::{RecognitionPass, RegionSize};

/// Merges recognition passes into one de-duplicated detection list.
///
/// Passes are visited in priority order and, within a pass, in emission
/// order. The first detection seen for a key/position cluster wins; later
/// duplicates are dropped, not merged.
#[derive(Debug, Clone)]
pub struct PassAggregator {
    normalizer: TokenNormalizer,
    dedupe_distance: f32,
    pass_priority: Vec<String>,
    min_confidence: f32,
}

impl PassAggregator {
    /// Create an aggregator with default settings.
    pub fn new(normalizer: TokenNormalizer) -> Self {
        Self {
            normalizer,
            dedupe_distance: 20.0,
            pass_priority: Vec::new(),
            min_confidence: 0.0,
        }
    }

    /// Set the de-duplication distance.
    pub fn with_dedupe_distance(mut self, distance: f32) -> Self {
        self.dedupe_distance = distance;
        self
    }

    /// Set the pass priority list (variant names, highest first).
    pub fn with_pass_priority(mut self, priority: Vec<String>) -> Self {
        self.pass_priority = priority;
        self
    }

    /// Set the minimum confidence threshold.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Remap, normalize and de-duplicate all passes.
    pub fn aggregate(
        &self,
        passes: &[RecognitionPass],
        size: RegionSize,
    ) -> Result<Vec<NormalizedDetection>, GeometryError> {
        let mut seen: HashMap<String, Vec<Point>> = HashMap::new();
        let mut kept = Vec::new();

        for pass in self.ordered(passes) {
            let origin = &pass.origin;
            let rotation = Rotation::from_degrees(origin.rotation)?;
            trace!(
                "Pass '{}' ({} deg): {} detections",
                origin.variant,
                origin.rotation,
                pass.detections.len()
            );

            for detection in &pass.detections {
                if detection.confidence < self.min_confidence {
                    trace!("Below confidence: '{}' ({:.2})", detection.text, detection.confidence);
                    continue;
                }

                let mut canonical = detection.clone();
                canonical.geometry = rotation.remap(&detection.geometry, size);

                let Some(normalized) = self.normalizer.normalize(&canonical, origin) else {
                    continue;
                };

                let positions = seen.entry(normalized.dedupe_key.clone()).or_default();
                if positions
                    .iter()
                    .any(|p| p.distance(&normalized.centroid) < self.dedupe_distance)
                {
                    trace!(
                        "Duplicate '{}' from '{}' at ({:.1}, {:.1})",
                        normalized.dedupe_key,
                        origin.variant,
                        normalized.centroid.x,
                        normalized.centroid.y
                    );
                    continue;
                }

                debug!(
                    "New OCR result: '{}' -> '{}' at ({:.1}, {:.1}) [{}]",
                    normalized.raw_text.trim(),
                    normalized.normalized_text,
                    normalized.centroid.x,
                    normalized.centroid.y,
                    origin.variant
                );
                positions.push(normalized.centroid);
                kept.push(normalized);
            }
        }

        Ok(kept)
    }

    /// Passes sorted by priority; unlisted passes keep input order after listed ones.
    fn ordered<'a>(&self, passes: &'a [RecognitionPass]) -> Vec<&'a RecognitionPass> {
        let rank = |pass: &RecognitionPass| {
            self.pass_priority
                .iter()
                .position(|name| *name == pass.origin.variant)
                .unwrap_or(self.pass_priority.len())
        };

        let mut ordered: Vec<&RecognitionPass> = passes.iter().collect();
        ordered.sort_by_key(|pass| rank(*pass));
        ordered
    }
}

impl Default for PassAggregator {
    fn default() -> Self {
        Self::new(TokenNormalizer::default())
    }
}
