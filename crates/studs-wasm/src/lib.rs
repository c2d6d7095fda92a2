//! WASM bindings for structural drawing stud extraction.
//!
//! Browser-side recognition (e.g. a JS OCR engine) records its passes here
//! and gets back the stud report.

use wasm_bindgen::prelude::*;

use studs_core::{
    Detection, LinkMode, PassOrigin, Point, Quad, RecognitionPass, RegionInput, StudExtractor,
    StudsConfig, TokenNormalizer,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// Plain objects rather than JS `Map`s, so profiles read like the JSON report.
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

/// Extract stud counts from a recorded region object with default settings.
///
/// The region has the shape `{width, height, passes: [{variant, rotation, detections}]}`.
#[wasm_bindgen]
pub fn extract_studs(region: JsValue) -> Result<JsValue, JsValue> {
    let region: RegionInput = serde_wasm_bindgen::from_value(region).map_err(to_js_error)?;
    let result = StudExtractor::default().extract(&region).map_err(to_js_error)?;

    to_js(&result.report)
}

/// Apply confusable-character repair to a recognized token.
///
/// Returns an empty string for blank input.
#[wasm_bindgen]
pub fn normalize_text(raw: &str) -> String {
    TokenNormalizer::default()
        .normalize_text(raw)
        .map(|(normalized, _)| normalized)
        .unwrap_or_default()
}

/// Configurable extractor for browser use.
#[wasm_bindgen]
pub struct StudsExtractor {
    config: StudsConfig,
    extractor: StudExtractor,
}

#[wasm_bindgen]
impl StudsExtractor {
    /// Create an extractor, optionally from a JSON configuration string.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<StudsExtractor, JsValue> {
        let config = match config_json {
            Some(json) => serde_json::from_str(&json).map_err(to_js_error)?,
            None => StudsConfig::default(),
        };
        Self::from_config(config)
    }

    /// Set the maximum label-to-count distance in pixels.
    #[wasm_bindgen]
    pub fn set_max_distance(&mut self, distance: f32) -> Result<(), JsValue> {
        let mut config = self.config.clone();
        config.linking.max_distance = distance;
        *self = Self::from_config(config)?;
        Ok(())
    }

    /// Set the linking mode: "spatial" or "adjacency".
    #[wasm_bindgen]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "spatial" => LinkMode::Spatial,
            "adjacency" => LinkMode::Adjacency,
            other => return Err(JsValue::from_str(&format!("unknown mode: {}", other))),
        };
        let mut config = self.config.clone();
        config.extraction.mode = mode;
        *self = Self::from_config(config)?;
        Ok(())
    }

    /// Current configuration as JSON.
    #[wasm_bindgen]
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.config).map_err(to_js_error)
    }

    /// Extract stud counts from a recorded region object.
    #[wasm_bindgen]
    pub fn extract(&self, region: JsValue) -> Result<JsValue, JsValue> {
        let region: RegionInput = serde_wasm_bindgen::from_value(region).map_err(to_js_error)?;
        let result = self.extractor.extract(&region).map_err(to_js_error)?;

        to_js(&result)
    }

    /// Extract from a region assembled with [`RegionBuilder`]; returns the report as JSON.
    #[wasm_bindgen]
    pub fn extract_region(&self, region: &RegionBuilder) -> Result<String, JsValue> {
        let result = self.extractor.extract(&region.region).map_err(to_js_error)?;
        serde_json::to_string(&result.report).map_err(to_js_error)
    }
}

impl StudsExtractor {
    fn from_config(config: StudsConfig) -> Result<StudsExtractor, JsValue> {
        let extractor = StudExtractor::new(&config).map_err(to_js_error)?;
        Ok(Self { config, extractor })
    }
}

/// Incrementally records recognition passes for one region.
#[wasm_bindgen]
pub struct RegionBuilder {
    region: RegionInput,
}

#[wasm_bindgen]
impl RegionBuilder {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            region: RegionInput::new(width, height),
        }
    }

    /// Add a detection to the named pass, creating the pass on first use.
    #[wasm_bindgen]
    pub fn add_detection(
        &mut self,
        pass: &str,
        rotation: i32,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        let geometry = Quad([
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x3, y3),
            Point::new(x4, y4),
        ]);
        let detection = Detection::new(geometry, text, confidence);

        let origin = PassOrigin::new(pass, rotation);
        match self.region.passes.iter_mut().find(|p| p.origin == origin) {
            Some(existing) => existing.detections.push(detection),
            None => self
                .region
                .passes
                .push(RecognitionPass::new(origin, vec![detection])),
        }
    }

    /// Number of distinct passes recorded so far.
    #[wasm_bindgen]
    pub fn pass_count(&self) -> usize {
        self.region.passes.len()
    }

    /// Serialize the recorded region as JSON.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.region).map_err(to_js_error)
    }

    /// Extract with default settings; returns the report as JSON.
    #[wasm_bindgen]
    pub fn extract(&self) -> Result<String, JsValue> {
        let result = StudExtractor::default()
            .extract(&self.region)
            .map_err(to_js_error)?;
        serde_json::to_string(&result.report).map_err(to_js_error)
    }
}
