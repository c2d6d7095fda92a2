//! Beam label / stud count extraction.

mod adjacency;
mod classify;
mod link;
pub mod patterns;

pub use adjacency::AdjacencyLinker;
pub use classify::{Classification, EntityClassifier};
pub use link::SpatialLinker;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::detection::Point;
use crate::models::report::StudReport;

use patterns::{COUNT_ANY, COUNT_SQUARE, LABELED_ANY, LABELED_SQUARE};

/// A beam designation such as `W12X26`, upper-cased, at its centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamLabel {
    pub label: String,
    pub position: Point,
}

/// An in-range bracketed stud count at its centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountCandidate {
    pub value: u32,
    pub position: Point,
}

/// Inclusive range of plausible stud counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for CountRange {
    fn default() -> Self {
        Self::new(6, 60)
    }
}

/// Which delimiters may enclose a count value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterPolicy {
    /// Square brackets only: `[12]`.
    Square,
    /// Parentheses or square brackets: `(12)`, `[12]`.
    Any,
}

impl DelimiterPolicy {
    /// Pattern for a bare bracketed count.
    pub fn count_pattern(&self) -> &'static Regex {
        match self {
            DelimiterPolicy::Square => &COUNT_SQUARE,
            DelimiterPolicy::Any => &COUNT_ANY,
        }
    }

    /// Pattern for a beam label immediately followed by a bracketed count.
    pub fn labeled_pattern(&self) -> &'static Regex {
        match self {
            DelimiterPolicy::Square => &LABELED_SQUARE,
            DelimiterPolicy::Any => &LABELED_ANY,
        }
    }
}

/// How counts are attached to beam labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Nearest beam label by centroid distance.
    Spatial,
    /// Label directly followed by a count in the combined text.
    Adjacency,
}

/// Output of a linking pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Linkage {
    /// Linked values and totals.
    pub report: StudReport,
    /// In-range counts that found no label.
    pub isolated: Vec<CountCandidate>,
}

/// Parse a captured digit run into a count.
pub fn parse_count(digits: &str) -> Result<u32, ExtractionError> {
    digits
        .parse::<u32>()
        .map_err(|_| ExtractionError::CountOverflow(digits.to_string()))
}
