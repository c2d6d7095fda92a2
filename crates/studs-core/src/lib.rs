//! Core library for structural drawing stud extraction.
//!
//! This crate provides:
//! - Orientation remapping of rotated recognition passes into the region frame
//! - Confusable-character normalization and cross-pass de-duplication
//! - Beam label / stud count classification
//! - Spatial (and text-adjacency) linking of counts to beam labels
//!
//! The crate never renders images or runs a recognition engine. Callers hand
//! it recorded detections, or a [`RegionRecognizer`] that produces them.

pub mod error;
pub mod models;
pub mod fusion;
pub mod extract;
pub mod pipeline;

pub use error::{StudsError, Result};
pub use models::config::StudsConfig;
pub use models::detection::{Detection, NormalizedDetection, Point, Quad};
pub use models::report::{ProfileMap, StudReport};
pub use fusion::{
    default_pass_plan, ImageTransform, PassAggregator, PassOrigin, PassVariant, RecognitionPass,
    RegionSize, TokenNormalizer,
};
pub use extract::{
    AdjacencyLinker, BeamLabel, CountCandidate, CountRange, DelimiterPolicy, EntityClassifier, LinkMode,
    SpatialLinker,
};
pub use pipeline::{ExtractionResult, RecordedRecognizer, RegionInput, RegionRecognizer, StudExtractor};
