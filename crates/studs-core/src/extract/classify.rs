//! Partition detections into beam labels and count candidates.

use tracing::debug;

use crate::models::detection::NormalizedDetection;

use super::patterns::BEAM_LABEL;
use super::{parse_count, BeamLabel, CountCandidate, CountRange, DelimiterPolicy};

/// Detections sorted into entity sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Beam labels, in detection order.
    pub labels: Vec<BeamLabel>,
    /// In-range count candidates, in detection order.
    pub candidates: Vec<CountCandidate>,
    /// Bracketed values dropped for range or overflow.
    pub rejected: usize,
}

/// Two-stage classifier: beam labels first, counts over what is left.
#[derive(Debug, Clone)]
pub struct EntityClassifier {
    range: CountRange,
    delimiters: DelimiterPolicy,
}

impl EntityClassifier {
    /// Create a classifier with the default range and square-bracket counts.
    pub fn new() -> Self {
        Self {
            range: CountRange::default(),
            delimiters: DelimiterPolicy::Square,
        }
    }

    /// Set the accepted count range.
    pub fn with_range(mut self, range: CountRange) -> Self {
        self.range = range;
        self
    }

    /// Set the count delimiter policy.
    pub fn with_delimiters(mut self, delimiters: DelimiterPolicy) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn classify(&self, detections: &[NormalizedDetection]) -> Classification {
        let mut result = Classification::default();

        // Stage 1: beam labels consume their detections.
        let mut remaining = Vec::with_capacity(detections.len());
        for detection in detections {
            match self.beam_label(detection) {
                Some(label) => result.labels.push(label),
                None => remaining.push(detection),
            }
        }

        // Stage 2: counts, only over unconsumed detections.
        for detection in remaining {
            let Some(caps) = self.delimiters.count_pattern().captures(&detection.normalized_text)
            else {
                continue;
            };

            let value = match parse_count(&caps[1]) {
                Ok(value) => value,
                Err(e) => {
                    debug!("Dropping '{}': {}", detection.normalized_text, e);
                    result.rejected += 1;
                    continue;
                }
            };

            if !self.range.contains(value) {
                debug!(
                    "Reject [{}] out of range {}-{}",
                    value, self.range.min, self.range.max
                );
                result.rejected += 1;
                continue;
            }

            result.candidates.push(CountCandidate {
                value,
                position: detection.centroid,
            });
        }

        result
    }

    /// Match the whitespace-free key against the beam pattern.
    pub fn beam_label(&self, detection: &NormalizedDetection) -> Option<BeamLabel> {
        BEAM_LABEL.captures(&detection.dedupe_key).map(|caps| BeamLabel {
            label: caps[1].to_uppercase(),
            position: detection.centroid,
        })
    }
}

impl Default for EntityClassifier {
    fn default() -> Self {
        Self::new()
    }
}
