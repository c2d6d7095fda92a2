//! Nearest-label spatial linking.

use tracing::debug;

use super::{BeamLabel, CountCandidate, Linkage};

/// Attaches each count candidate to the nearest beam label.
#[derive(Debug, Clone)]
pub struct SpatialLinker {
    max_distance: f32,
}

impl SpatialLinker {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Link candidates to labels.
    ///
    /// A candidate links when its nearest label is within `max_distance`
    /// (inclusive); otherwise it is isolated and contributes nothing to the
    /// report. Equal distances resolve to the earlier label.
    pub fn link(&self, labels: &[BeamLabel], candidates: &[CountCandidate]) -> Linkage {
        let mut linkage = Linkage::default();

        for candidate in candidates {
            match self.nearest(labels, candidate) {
                Some((beam, dist)) if dist <= self.max_distance => {
                    debug!("Linked [{}] to {} (dist: {:.1})", candidate.value, beam.label, dist);
                    linkage.report.record(&beam.label, candidate.value);
                }
                Some((_, dist)) => {
                    debug!(
                        "Ignored isolated [{}] - nearest beam dist: {:.1}",
                        candidate.value, dist
                    );
                    linkage.isolated.push(*candidate);
                }
                None => {
                    debug!("Ignored isolated [{}] - no beam labels", candidate.value);
                    linkage.isolated.push(*candidate);
                }
            }
        }

        linkage
    }

    fn nearest<'a>(
        &self,
        labels: &'a [BeamLabel],
        candidate: &CountCandidate,
    ) -> Option<(&'a BeamLabel, f32)> {
        let mut best: Option<(&BeamLabel, f32)> = None;
        for label in labels {
            let dist = label.position.distance(&candidate.position);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((label, dist));
            }
        }
        best
    }
}

impl Default for SpatialLinker {
    fn default() -> Self {
        Self::new(1500.0)
    }
}
