//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result, StudsError};
use crate::extract::{CountRange, DelimiterPolicy, LinkMode};
use crate::fusion::{default_pass_plan, ConfusableTable, PassVariant};

/// Main configuration for the studs pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudsConfig {
    /// Cross-pass fusion configuration.
    pub fusion: FusionConfig,

    /// Entity classification configuration.
    pub extraction: ExtractionConfig,

    /// Label/count linking configuration.
    pub linking: LinkingConfig,

    /// Pass plan published to the recognition collaborator.
    pub recognition: RecognitionConfig,
}

/// Pass fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Two detections with the same key closer than this are one token (pixels).
    pub dedupe_distance: f32,

    /// Pass variant names, highest priority first. Unlisted passes follow in input order.
    pub pass_priority: Vec<String>,

    /// Detections below this confidence are dropped (0.0 - 1.0).
    pub min_confidence: f32,

    /// Confusable-character substitution table.
    pub substitutions: ConfusableTable,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            dedupe_distance: 20.0,
            pass_priority: default_pass_plan().into_iter().map(|p| p.name).collect(),
            min_confidence: 0.0, // Disabled - confidence is carried, not filtered
            substitutions: ConfusableTable::default(),
        }
    }
}

/// Entity classification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How count values are attached to beam labels.
    pub mode: LinkMode,

    /// Smallest accepted stud count (inclusive).
    pub count_min: u32,

    /// Largest accepted stud count (inclusive).
    pub count_max: u32,

    /// Delimiters accepted around counts in spatial mode.
    pub spatial_delimiters: DelimiterPolicy,

    /// Delimiters accepted around counts in adjacency mode.
    pub adjacency_delimiters: DelimiterPolicy,

    /// Profile key for unlabeled counts in adjacency mode (None drops them).
    pub isolated_label: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: LinkMode::Spatial,
            count_min: 6,
            count_max: 60,
            spatial_delimiters: DelimiterPolicy::Square,
            adjacency_delimiters: DelimiterPolicy::Any,
            isolated_label: None,
        }
    }
}

impl ExtractionConfig {
    pub fn count_range(&self) -> CountRange {
        CountRange::new(self.count_min, self.count_max)
    }
}

/// Spatial linking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Farthest a count may sit from its beam label (pixels).
    pub max_distance: f32,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self { max_distance: 1500.0 }
    }
}

/// Recognition pass plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Render zoom applied to the crop before recognition.
    pub render_scale: f32,

    /// Characters the recognition engine may emit.
    pub allowlist: String,

    /// Image variants to recognize, in run order.
    pub passes: Vec<PassVariant>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            render_scale: 6.0,
            allowlist: "0123456789()[]{}-\"' .kKlIOoSsZzBWwxX|".to_string(),
            passes: default_pass_plan(),
        }
    }
}

impl StudsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges and table consistency.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.count_min > self.extraction.count_max {
            return Err(ExtractionError::InvalidRange {
                min: self.extraction.count_min,
                max: self.extraction.count_max,
            }
            .into());
        }

        check_distance("dedupe_distance", self.fusion.dedupe_distance)?;
        check_distance("max_distance", self.linking.max_distance)?;

        self.fusion
            .substitutions
            .check_idempotent()
            .map_err(StudsError::Config)?;

        Ok(())
    }
}

fn check_distance(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ExtractionError::InvalidDistance { name, value }.into())
    }
}
