//! Serde-backed pipeline configuration.
//!
//! Every section defaults field-by-field, so an embedding application can ship a partial JSON
//! document (or none at all). Parsing is the only I/O-free entry point; reading the document
//! from disk is the caller's job.

use std::time::Duration;

use crate::foundation::core::{FrameSize, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};

/// Default vision endpoint (OpenAI-compatible chat completions).
pub const DEFAULT_VISION_URL: &str = "https://router.huggingface.co/v1/chat/completions";
/// Default vision model.
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/Llama-3.2-11B-Vision-Instruct";
/// Default summarization endpoint; the model is named by the URL path.
pub const DEFAULT_SUMMARY_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";
/// Instruction sent alongside the captured image.
pub const DEFAULT_DESCRIBE_PROMPT: &str = "Describe what is drawn or written on this whiteboard. \
     Be specific and concise.";
/// Summarization prompt; `{caption}` is replaced with the describe-stage output.
pub const DEFAULT_SUMMARY_TEMPLATE: &str =
    "Summarize these whiteboard notes in one or two sentences: {caption}";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture frame and stroke rendering.
    pub capture: CaptureConfig,
    /// Stroke recording.
    pub strokes: StrokeConfig,
    /// Remote inference endpoints and limits.
    pub inference: InferenceConfig,
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> SketchResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| SketchError::config(format!("parse pipeline config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> SketchResult<()> {
        self.capture.validate()?;
        self.strokes.validate()?;
        self.inference.validate()
    }
}

/// Capture settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Output frame size.
    pub size: FrameSize,
    /// Background fill.
    pub background: Rgba8,
    /// Ink color for strokes begun without an explicit style.
    pub default_color: Rgba8,
    /// Stroke width in pixels for strokes begun without an explicit style.
    pub default_width_px: f32,
    /// Whether a stroke still being drawn is part of a capture.
    pub include_in_progress: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            size: FrameSize::default(),
            background: Rgba8::WHITE,
            default_color: Rgba8::BLACK,
            default_width_px: 6.0,
            include_in_progress: true,
        }
    }
}

impl CaptureConfig {
    fn validate(&self) -> SketchResult<()> {
        self.size
            .validate()
            .map_err(|e| SketchError::config(format!("capture.size: {e}")))?;
        if !self.default_width_px.is_finite() || self.default_width_px <= 0.0 {
            return Err(SketchError::config(
                "capture.default_width_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Stroke recording settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Points closer than this to the previous point (world units) are dropped.
    pub min_point_distance: f32,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            min_point_distance: 0.002,
        }
    }
}

impl StrokeConfig {
    fn validate(&self) -> SketchResult<()> {
        if !self.min_point_distance.is_finite() || self.min_point_distance < 0.0 {
            return Err(SketchError::config(
                "strokes.min_point_distance must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Remote inference settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Vision (describe) endpoint.
    pub vision_url: String,
    /// Vision model id placed in the request body.
    pub vision_model: String,
    /// Fixed instruction accompanying the image.
    pub describe_prompt: String,
    /// Output token cap for the describe stage.
    pub describe_max_tokens: u32,
    /// Summarization endpoint.
    pub summary_url: String,
    /// Prompt template; must contain `{caption}`.
    pub summary_template: String,
    /// Minimum summary length in tokens.
    pub summary_min_length: u32,
    /// Maximum summary length in tokens.
    pub summary_max_length: u32,
    /// Per-request timeout. Bounds how long the single-flight guard can be held.
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            vision_url: DEFAULT_VISION_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            describe_prompt: DEFAULT_DESCRIBE_PROMPT.to_string(),
            describe_max_tokens: 200,
            summary_url: DEFAULT_SUMMARY_URL.to_string(),
            summary_template: DEFAULT_SUMMARY_TEMPLATE.to_string(),
            summary_min_length: 30,
            summary_max_length: 120,
            timeout_secs: 30,
        }
    }
}

impl InferenceConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> SketchResult<()> {
        for (name, value) in [
            ("vision_url", &self.vision_url),
            ("vision_model", &self.vision_model),
            ("summary_url", &self.summary_url),
        ] {
            if value.trim().is_empty() {
                return Err(SketchError::config(format!(
                    "inference.{name} must not be empty"
                )));
            }
        }
        if !self.summary_template.contains("{caption}") {
            return Err(SketchError::config(
                "inference.summary_template must contain {caption}",
            ));
        }
        if self.describe_max_tokens == 0 {
            return Err(SketchError::config(
                "inference.describe_max_tokens must be > 0",
            ));
        }
        if self.summary_min_length > self.summary_max_length {
            return Err(SketchError::config(
                "inference.summary_min_length must be <= summary_max_length",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(SketchError::config("inference.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
