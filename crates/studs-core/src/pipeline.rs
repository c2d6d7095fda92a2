//! End-to-end extraction: passes in, stud report out.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, StudsError};
use crate::extract::{AdjacencyLinker, CountCandidate, EntityClassifier, LinkMode, SpatialLinker};
use crate::fusion::{PassAggregator, PassVariant, RecognitionPass, RegionSize, TokenNormalizer};
use crate::models::config::StudsConfig;
use crate::models::detection::{Detection, NormalizedDetection};
use crate::models::report::StudReport;

/// Recognition output for one cropped region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionInput {
    /// Canonical (unrotated) region width in pixels.
    pub width: f32,

    /// Canonical (unrotated) region height in pixels.
    pub height: f32,

    /// Recognition passes, in run order.
    #[serde(default)]
    pub passes: Vec<RecognitionPass>,
}

impl RegionInput {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            passes: Vec::new(),
        }
    }

    pub fn size(&self) -> RegionSize {
        RegionSize::new(self.width, self.height)
    }

    /// Load a recorded region from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// The recognition service that turns a pass variant into detections.
///
/// Implementations own whatever engine they wrap; the pipeline only calls
/// through this trait and never holds engine state of its own.
pub trait RegionRecognizer {
    /// Run recognition over the crop transformed per `variant`.
    fn recognize(&self, variant: &PassVariant) -> Result<Vec<Detection>>;
}

/// Replays previously recorded passes by variant name.
pub struct RecordedRecognizer {
    region: RegionInput,
}

impl RecordedRecognizer {
    pub fn new(region: RegionInput) -> Self {
        Self { region }
    }

    pub fn size(&self) -> RegionSize {
        self.region.size()
    }
}

impl RegionRecognizer for RecordedRecognizer {
    fn recognize(&self, variant: &PassVariant) -> Result<Vec<Detection>> {
        self.region
            .passes
            .iter()
            .find(|p| p.origin.variant == variant.name)
            .map(|p| p.detections.clone())
            .ok_or_else(|| StudsError::Recognition(format!("no recorded pass '{}'", variant.name)))
    }
}

/// Result of running the pipeline over one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Linked stud counts.
    pub report: StudReport,
    /// De-duplicated detections, for tracing results back to passes.
    pub detections: Vec<NormalizedDetection>,
    /// In-range counts that found no beam label.
    pub isolated: Vec<CountCandidate>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Multi-pass fusion and beam/count linking.
///
/// Holds no per-request state; one extractor may serve any number of
/// regions, concurrently from different threads.
#[derive(Debug, Clone)]
pub struct StudExtractor {
    aggregator: PassAggregator,
    classifier: EntityClassifier,
    linker: SpatialLinker,
    adjacency: AdjacencyLinker,
    mode: LinkMode,
    plan: Vec<PassVariant>,
}

impl StudExtractor {
    /// Build an extractor from a validated configuration.
    pub fn new(config: &StudsConfig) -> Result<Self> {
        config.validate()?;

        let aggregator = PassAggregator::new(TokenNormalizer::new(config.fusion.substitutions.clone()))
            .with_dedupe_distance(config.fusion.dedupe_distance)
            .with_pass_priority(config.fusion.pass_priority.clone())
            .with_min_confidence(config.fusion.min_confidence);

        let range = config.extraction.count_range();
        let classifier = EntityClassifier::new()
            .with_range(range)
            .with_delimiters(config.extraction.spatial_delimiters);
        let adjacency = AdjacencyLinker::new()
            .with_range(range)
            .with_delimiters(config.extraction.adjacency_delimiters)
            .with_isolated_label(config.extraction.isolated_label.clone());

        Ok(Self {
            aggregator,
            classifier,
            linker: SpatialLinker::new(config.linking.max_distance),
            adjacency,
            mode: config.extraction.mode,
            plan: config.recognition.passes.clone(),
        })
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// The pass plan recognizers are asked to run.
    pub fn plan(&self) -> &[PassVariant] {
        &self.plan
    }

    /// Extract stud counts from recorded passes.
    pub fn extract(&self, input: &RegionInput) -> Result<ExtractionResult> {
        self.extract_passes(&input.passes, input.size())
    }

    /// Run every planned pass through `recognizer`, then extract.
    ///
    /// A pass that fails is logged and skipped; the remaining passes are
    /// still fused.
    pub fn extract_with<R: RegionRecognizer + ?Sized>(
        &self,
        recognizer: &R,
        size: RegionSize,
    ) -> Result<ExtractionResult> {
        let mut passes = Vec::with_capacity(self.plan.len());
        for variant in &self.plan {
            match recognizer.recognize(variant) {
                Ok(detections) => passes.push(RecognitionPass::new(variant.origin(), detections)),
                Err(e) => warn!("Skipping pass '{}': {}", variant.name, e),
            }
        }
        self.extract_passes(&passes, size)
    }

    fn extract_passes(&self, passes: &[RecognitionPass], size: RegionSize) -> Result<ExtractionResult> {
        let elapsed_ms = stopwatch();

        let detections = self.aggregator.aggregate(passes, size)?;

        let linkage = match self.mode {
            LinkMode::Spatial => {
                let classified = self.classifier.classify(&detections);
                if classified.rejected > 0 {
                    debug!("Dropped {} bracketed values (range or overflow)", classified.rejected);
                }
                self.linker.link(&classified.labels, &classified.candidates)
            }
            LinkMode::Adjacency => self.adjacency.link(&detections),
        };

        let processing_time_ms = elapsed_ms();
        info!(
            "Extracted {} studs (total {}) across {} profiles from {} detections in {}ms",
            linkage.report.studs_count,
            linkage.report.studs_total,
            linkage.report.profiles.len(),
            detections.len(),
            processing_time_ms
        );

        Ok(ExtractionResult {
            report: linkage.report,
            detections,
            isolated: linkage.isolated,
            processing_time_ms,
        })
    }
}

/// Millisecond timer; wasm32 has no std clock, so it reads 0 there.
#[cfg(not(target_arch = "wasm32"))]
fn stopwatch() -> impl Fn() -> u64 {
    let start = std::time::Instant::now();
    move || start.elapsed().as_millis() as u64
}

#[cfg(target_arch = "wasm32")]
fn stopwatch() -> impl Fn() -> u64 {
    || 0
}

impl Default for StudExtractor {
    fn default() -> Self {
        let config = StudsConfig::default();
        Self {
            aggregator: PassAggregator::default()
                .with_pass_priority(config.fusion.pass_priority.clone()),
            classifier: EntityClassifier::default(),
            linker: SpatialLinker::default(),
            adjacency: AdjacencyLinker::default(),
            mode: LinkMode::Spatial,
            plan: config.recognition.passes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::fusion::PassOrigin;
    use crate::models::detection::{Point, Quad};
    use pretty_assertions::assert_eq;

    fn det(text: &str, cx: f32, cy: f32) -> Detection {
        Detection::new(Quad::from_rect(cx - 10.0, cy - 5.0, 20.0, 10.0), text, 0.9)
    }

    fn region(passes: Vec<(&str, i32, Vec<Detection>)>) -> RegionInput {
        RegionInput {
            width: 2000.0,
            height: 2000.0,
            passes: passes
                .into_iter()
                .map(|(name, rotation, dets)| RecognitionPass::new(PassOrigin::new(name, rotation), dets))
                .collect(),
        }
    }

    #[test]
    fn test_label_and_count_link() {
        let input = region(vec![("sharpened", 0, vec![det("W12X26", 100.0, 100.0), det("[18]", 105.0, 260.0)])]);

        let result = StudExtractor::default().extract(&input).unwrap();
        assert_eq!(result.report.profiles.get("W12X26"), Some(&[18][..]));
        assert_eq!(result.report.profiles.len(), 1);
        assert_eq!(result.report.studs, vec![18]);
        assert_eq!(result.report.studs_count, 1);
        assert_eq!(result.report.studs_total, 18);
    }

    #[test]
    fn test_below_range_count_is_rejected() {
        let input = region(vec![("sharpened", 0, vec![det("W12X26", 100.0, 100.0), det("[4]", 105.0, 260.0)])]);

        let result = StudExtractor::default().extract(&input).unwrap();
        assert!(result.report.profiles.is_empty());
        assert_eq!(result.report.studs_count, 0);
        assert_eq!(result.report.studs_total, 0);
    }

    #[test]
    fn test_case_variants_collapse_to_one_label() {
        let input = region(vec![
            ("sharpened", 0, vec![det("w16x40", 300.0, 300.0)]),
            ("binarized", 0, vec![det("W16X40", 300.0, 300.0)]),
            ("dilated", 0, vec![det("[24]", 300.0, 340.0)]),
        ]);

        let result = StudExtractor::default().extract(&input).unwrap();
        let labels: Vec<_> = result.report.profiles.labels().collect();
        assert_eq!(labels, vec!["W16X40"]);
        assert_eq!(result.report.profiles.get("W16X40"), Some(&[24][..]));
    }

    #[test]
    fn test_count_without_label_is_dropped() {
        let input = region(vec![("sharpened", 0, vec![det("[18]", 105.0, 260.0), det("S-201", 0.0, 0.0)])]);

        let result = StudExtractor::default().extract(&input).unwrap();
        assert!(result.report.studs.is_empty());
        assert!(result.report.profiles.is_empty());
        assert_eq!(result.isolated.len(), 1);
        assert_eq!(result.isolated[0].value, 18);
    }

    #[test]
    fn test_cross_pass_duplicate_keeps_earlier_pass() {
        let input = region(vec![
            ("sharpened", 0, vec![det("(l2)", 50.0, 50.0)]),
            ("binarized", 0, vec![det("(12)", 52.0, 51.0)]),
        ]);

        let result = StudExtractor::default().extract(&input).unwrap();
        assert_eq!(result.detections.len(), 1);
        assert_eq!(result.detections[0].raw_text, "(l2)");
        assert_eq!(result.detections[0].origin.variant, "sharpened");
    }

    #[test]
    fn test_rotated_pass_geometry_in_canonical_frame() {
        // 300 wide, 200 tall: (10, 20) in the 90 cw working image is (20, 190).
        let input = RegionInput {
            width: 300.0,
            height: 200.0,
            passes: vec![RecognitionPass::new(
                PassOrigin::new("rotated_90", 90),
                vec![Detection::new(
                    Quad([Point::new(10.0, 20.0); 4]),
                    "W8X10",
                    0.9,
                )],
            )],
        };

        let result = StudExtractor::default().extract(&input).unwrap();
        assert_eq!(result.detections[0].centroid, Point::new(20.0, 190.0));
    }

    #[test]
    fn test_rotated_count_links_to_upright_label() {
        // Vertical callout read only by the 270 pass.
        let input = RegionInput {
            width: 400.0,
            height: 300.0,
            passes: vec![
                RecognitionPass::new(PassOrigin::new("sharpened", 0), vec![det("W18X35", 100.0, 100.0)]),
                // canonical (120, 200) appears at (200, 400 - 120) after 90 ccw
                RecognitionPass::new(PassOrigin::new("rotated_270", 270), vec![det("[29]", 200.0, 280.0)]),
            ],
        };

        let result = StudExtractor::default().extract(&input).unwrap();
        assert_eq!(result.report.profiles.get("W18X35"), Some(&[29][..]));
    }

    #[test]
    fn test_unsupported_rotation_is_an_error() {
        let input = region(vec![("flipped", 180, vec![det("[18]", 0.0, 0.0)])]);
        let err = StudExtractor::default().extract(&input).unwrap_err();
        assert!(matches!(
            err,
            StudsError::Geometry(GeometryError::UnsupportedRotation(180))
        ));
    }

    #[test]
    fn test_empty_region() {
        let result = StudExtractor::default().extract(&RegionInput::new(100.0, 100.0)).unwrap();
        assert_eq!(result.report, StudReport::empty());
        assert!(result.detections.is_empty());
    }

    #[test]
    fn test_adjacency_mode_from_config() {
        let mut config = StudsConfig::default();
        config.extraction.mode = LinkMode::Adjacency;
        config.extraction.isolated_label = Some("UNLABELED".to_string());
        let extractor = StudExtractor::new(&config).unwrap();

        let input = region(vec![(
            "sharpened",
            0,
            vec![det("W24X68 (26)", 100.0, 100.0), det("[18]", 1900.0, 1900.0)],
        )]);

        let result = extractor.extract(&input).unwrap();
        assert_eq!(result.report.profiles.get("W24X68"), Some(&[26][..]));
        assert_eq!(result.report.profiles.get("UNLABELED"), Some(&[18][..]));
        assert_eq!(result.report.studs_total, 44);
    }

    #[test]
    fn test_link_distance_from_config() {
        let mut config = StudsConfig::default();
        config.linking.max_distance = 100.0;
        let extractor = StudExtractor::new(&config).unwrap();

        let input = region(vec![("sharpened", 0, vec![det("W12X26", 100.0, 100.0), det("[18]", 105.0, 260.0)])]);
        let result = extractor.extract(&input).unwrap();
        assert_eq!(result.report.studs_count, 0);
        assert_eq!(result.isolated.len(), 1);
    }

    #[test]
    fn test_extractor_carries_mode_and_plan() {
        let mut config = StudsConfig::default();
        config.extraction.mode = LinkMode::Adjacency;
        config.recognition.passes.truncate(2);
        let extractor = StudExtractor::new(&config).unwrap();

        assert_eq!(extractor.mode(), LinkMode::Adjacency);
        let names: Vec<_> = extractor.plan().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sharpened", "binarized"]);
    }

    #[test]
    fn test_processing_time_is_reported() {
        let input = region(vec![("sharpened", 0, vec![det("W12X26", 100.0, 100.0)])]);
        let result = StudExtractor::default().extract(&input).unwrap();
        assert!(result.processing_time_ms < 60_000);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = StudsConfig::default();
        config.extraction.count_min = 100;
        assert!(StudExtractor::new(&config).is_err());
    }

    struct FlakyRecognizer;

    impl RegionRecognizer for FlakyRecognizer {
        fn recognize(&self, variant: &PassVariant) -> Result<Vec<Detection>> {
            match variant.name.as_str() {
                "sharpened" => Ok(vec![det("W10X12", 500.0, 500.0)]),
                "dilated" => Ok(vec![det("[ 14 ]", 520.0, 600.0)]),
                other => Err(StudsError::Recognition(format!("{} unavailable", other))),
            }
        }
    }

    #[test]
    fn test_failed_passes_degrade() {
        let result = StudExtractor::default()
            .extract_with(&FlakyRecognizer, RegionSize::new(1000.0, 1000.0))
            .unwrap();
        assert_eq!(result.report.profiles.get("W10X12"), Some(&[14][..]));
    }

    #[test]
    fn test_recorded_recognizer_replays_by_name() {
        let input = region(vec![
            ("binarized", 0, vec![det("[20]", 10.0, 60.0)]),
            ("sharpened", 0, vec![det("W8X10", 10.0, 10.0)]),
        ]);
        let recognizer = RecordedRecognizer::new(input.clone());

        let replayed = StudExtractor::default()
            .extract_with(&recognizer, recognizer.size())
            .unwrap();
        let direct = StudExtractor::default().extract(&input).unwrap();

        assert_eq!(replayed.report, direct.report);
        assert_eq!(replayed.report.profiles.get("W8X10"), Some(&[20][..]));
    }

    #[test]
    fn test_region_input_json() {
        let json = r#"{
            "width": 300, "height": 200,
            "passes": [
                {"variant": "sharpened", "rotation": 0, "detections": [
                    {"geometry": [[90,95],[110,95],[110,105],[90,105]], "text": "W12x26", "confidence": 0.93}
                ]},
                {"variant": "binarized", "detections": [
                    {"geometry": [[95,255],[115,255],[115,265],[95,265]], "text": "[ l8 ]"}
                ]}
            ]
        }"#;

        let input: RegionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.passes[1].origin.rotation, 0);

        let result = StudExtractor::default().extract(&input).unwrap();
        let report = serde_json::to_value(&result.report).unwrap();
        assert_eq!(
            report,
            serde_json::json!({
                "studs": [18],
                "profiles": {"W12X26": [18]},
                "studs_count": 1,
                "studs_total": 18
            })
        );
    }
}
