//! Confusable-character normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::detection::{Detection, NormalizedDetection};

use super::PassOrigin;

/// Character substitution table for common recognition confusions.
///
/// Square brackets are deliberately absent: they stay distinct from
/// parentheses so bracket-delimited counts are not merged with other text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusableTable {
    map: BTreeMap<char, char>,
}

impl Default for ConfusableTable {
    fn default() -> Self {
        Self::from_pairs([
            ('k', '1'), ('K', '1'), ('l', '1'), ('I', '1'), ('|', '1'),
            ('O', '0'), ('o', '0'), ('D', '0'), ('Q', '0'),
            ('S', '5'), ('s', '5'),
            ('Z', '2'), ('z', '2'),
            ('B', '8'),
            ('{', '('), ('}', ')'),
        ])
    }
}

impl ConfusableTable {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, c: char) -> char {
        self.map.get(&c).copied().unwrap_or(c)
    }

    /// Substitute character by character, left to right.
    pub fn apply(&self, text: &str) -> String {
        text.chars().map(|c| self.get(c)).collect()
    }

    /// Reject tables whose outputs are themselves substituted, so that
    /// applying the table twice equals applying it once.
    pub fn check_idempotent(&self) -> Result<(), String> {
        for (from, to) in &self.map {
            if from != to && self.map.contains_key(to) {
                return Err(format!(
                    "substitution '{}' -> '{}' produces a character that is itself substituted",
                    from, to
                ));
            }
        }
        Ok(())
    }
}

/// Turns raw detections into normalized, canonical-frame tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenNormalizer {
    table: ConfusableTable,
}

impl TokenNormalizer {
    pub fn new(table: ConfusableTable) -> Self {
        Self { table }
    }

    /// Normalize text, returning `(normalized_text, dedupe_key)`.
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn normalize_text(&self, raw: &str) -> Option<(String, String)> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = self.table.apply(trimmed);
        let key: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();
        Some((normalized, key))
    }

    /// Normalize a detection whose geometry is already in the canonical frame.
    pub fn normalize(&self, detection: &Detection, origin: &PassOrigin) -> Option<NormalizedDetection> {
        let (normalized_text, dedupe_key) = self.normalize_text(&detection.text)?;

        Some(NormalizedDetection {
            raw_text: detection.text.clone(),
            normalized_text,
            dedupe_key,
            centroid: detection.geometry.centroid(),
            confidence: detection.confidence,
            origin: origin.clone(),
        })
    }
}
