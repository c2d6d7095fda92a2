//! Text-adjacency linking over the combined detection text.
//!
//! Detections are joined into one line. A beam label followed directly by a
//! bracketed count links that count to the label and consumes the span.
//! The unconsumed gaps are then scanned for isolated counts.

use tracing::debug;

use crate::models::detection::{NormalizedDetection, Point};

use super::patterns::WHITESPACE_RUN;
use super::{parse_count, CountCandidate, CountRange, DelimiterPolicy, Linkage};

/// Combined text with the centroid of the detection each byte came from.
struct CombinedText {
    text: String,
    starts: Vec<(usize, Point)>,
}

impl CombinedText {
    fn build(detections: &[NormalizedDetection]) -> Self {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(detections.len());

        for detection in detections {
            let collapsed = WHITESPACE_RUN.replace_all(detection.normalized_text.trim(), " ");
            if collapsed.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            starts.push((text.len(), detection.centroid));
            text.push_str(&collapsed);
        }

        Self { text, starts }
    }

    fn position_at(&self, offset: usize) -> Point {
        self.starts
            .iter()
            .take_while(|(start, _)| *start <= offset)
            .last()
            .map(|(_, p)| *p)
            .unwrap_or_default()
    }
}

/// Links counts written directly after their beam label.
#[derive(Debug, Clone)]
pub struct AdjacencyLinker {
    range: CountRange,
    delimiters: DelimiterPolicy,
    isolated_label: Option<String>,
}

impl AdjacencyLinker {
    /// Create a linker accepting parentheses or square brackets.
    pub fn new() -> Self {
        Self {
            range: CountRange::default(),
            delimiters: DelimiterPolicy::Any,
            isolated_label: None,
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

    /// Attribute isolated counts to this profile key instead of dropping them.
    pub fn with_isolated_label(mut self, label: Option<String>) -> Self {
        self.isolated_label = label;
        self
    }

    pub fn link(&self, detections: &[NormalizedDetection]) -> Linkage {
        let combined = CombinedText::build(detections);
        let text = combined.text.as_str();
        let mut linkage = Linkage::default();

        // Stage 1: labeled pairs, collecting consumed spans.
        let mut consumed = Vec::new();
        for caps in self.delimiters.labeled_pattern().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            consumed.push(whole.range());

            let beam = caps[1].to_uppercase();
            match parse_count(&caps[2]) {
                Ok(value) if self.range.contains(value) => {
                    debug!("Match (label): {}({})", beam, value);
                    linkage.report.record(&beam, value);
                }
                Ok(value) => debug!("Reject (label value out of range): {}({})", beam, value),
                Err(e) => debug!("Reject (label value): {}: {}", beam, e),
            }
        }

        // Stage 2: isolated counts in the gaps between consumed spans.
        let mut gap_start = 0;
        let gap_ends = consumed
            .iter()
            .map(|span| (span.start, span.end))
            .chain(std::iter::once((text.len(), text.len())));

        for (gap_end, next_start) in gap_ends {
            let gap = &text[gap_start..gap_end];
            for caps in self.delimiters.count_pattern().captures_iter(gap) {
                let value = match parse_count(&caps[1]) {
                    Ok(value) if self.range.contains(value) => value,
                    Ok(value) => {
                        debug!("Reject (isolated out of range): ({})", value);
                        continue;
                    }
                    Err(e) => {
                        debug!("Reject (isolated): {}", e);
                        continue;
                    }
                };

                let offset = gap_start + caps.get(0).map(|m| m.start()).unwrap_or(0);
                match &self.isolated_label {
                    Some(label) => {
                        debug!("Match (isolated): ({}) -> {}", value, label);
                        linkage.report.record(label, value);
                    }
                    None => {
                        debug!("Ignored isolated ({})", value);
                        linkage.isolated.push(CountCandidate {
                            value,
                            position: combined.position_at(offset),
                        });
                    }
                }
            }
            gap_start = next_start;
        }

        linkage
    }
}

impl Default for AdjacencyLinker {
    fn default() -> Self {
        Self::new()
    }
}
