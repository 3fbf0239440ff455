use serde_json::json;

use crate::foundation::config::InferenceConfig;
use crate::foundation::core::Credential;
use crate::foundation::error::SketchResult;
use crate::inference::extract::extract_text_field;
use crate::inference::failure::{Stage, StageFailure};
use crate::inference::transport::{HttpReply, HttpTransport, ReqwestTransport};
use crate::render::raster::png_data_uri;

/// Field holding the caption in vision responses.
pub const CAPTION_FIELD: &str = "content";
/// Field holding the summary in summarization responses.
pub const SUMMARY_FIELD: &str = "summary_text";

/// Longest provider error detail kept in a failure reason.
const MAX_REASON_CHARS: usize = 200;

/// Describe-stage output.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Caption(pub String);

impl Caption {
    /// Caption text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Summarize-stage output. Always usable, even when the remote call failed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    /// Text to display.
    pub text: String,
    /// Cause of the fallback, when the text was synthesized locally.
    pub degraded: Option<StageFailure>,
}

impl Summary {
    /// Return `true` if the text came from a fallback rather than the model.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Text shown when the summarization call fails outright.
pub fn fallback_summary(caption: &str) -> String {
    format!("Whiteboard shows: {caption}")
}

/// Multimodal chat body for the vision model.
pub fn build_describe_request(cfg: &InferenceConfig, image_data_uri: &str) -> serde_json::Value {
    json!({
        "model": cfg.vision_model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "image_url", "image_url": { "url": image_data_uri } },
                { "type": "text", "text": cfg.describe_prompt },
            ],
        }],
        "max_tokens": cfg.describe_max_tokens,
    })
}

/// Summarization body; the caption is embedded in the prompt template.
pub fn build_summarize_request(cfg: &InferenceConfig, caption: &str) -> serde_json::Value {
    let prompt = cfg.summary_template.replace("{caption}", caption);
    json!({
        "inputs": prompt,
        "parameters": {
            "max_length": cfg.summary_max_length,
            "min_length": cfg.summary_min_length,
        },
    })
}

/// Two-stage inference client: vision captioning, then summarization.
///
/// Describe failures are hard; summarize failures degrade to locally synthesized text.
#[derive(Clone, Debug)]
pub struct InferenceClient<T> {
    transport: T,
    config: InferenceConfig,
}

impl InferenceClient<ReqwestTransport> {
    /// Client over `reqwest` using the configured timeout.
    pub fn with_reqwest(config: InferenceConfig) -> SketchResult<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::new(transport, config))
    }
}

impl<T: HttpTransport> InferenceClient<T> {
    /// Client over an arbitrary transport.
    pub fn new(transport: T, config: InferenceConfig) -> Self {
        Self { transport, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Caption a PNG image with the vision model.
    ///
    /// No retry is attempted; retrying is up to the caller.
    pub async fn describe(
        &self,
        credential: &Credential,
        png: &[u8],
    ) -> Result<Caption, StageFailure> {
        let body = build_describe_request(&self.config, &png_data_uri(png));
        tracing::debug!(
            url = %self.config.vision_url,
            image_bytes = png.len(),
            "describe request"
        );

        let reply = self
            .transport
            .post_json(&self.config.vision_url, credential, &body)
            .await
            .map_err(|e| StageFailure::transport(Stage::Describe, e.message, e.timed_out))?;
        tracing::debug!(status = reply.status, "describe response");

        if !reply.is_success() {
            return Err(status_failure(Stage::Describe, &reply));
        }
        extract_text_field(&reply.body, CAPTION_FIELD)
            .map(Caption)
            .ok_or_else(|| StageFailure::empty(Stage::Describe, "no caption returned"))
    }

    /// Summarize a caption. Never fails: every path yields displayable text.
    pub async fn summarize(&self, credential: &Credential, caption: &str) -> Summary {
        let body = build_summarize_request(&self.config, caption);
        tracing::debug!(url = %self.config.summary_url, "summarize request");

        let reply = match self
            .transport
            .post_json(&self.config.summary_url, credential, &body)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                let failure = StageFailure::transport(Stage::Summarize, e.message, e.timed_out);
                return degraded(fallback_summary(caption), failure);
            }
        };
        tracing::debug!(status = reply.status, "summarize response");

        if !reply.is_success() {
            return degraded(
                fallback_summary(caption),
                status_failure(Stage::Summarize, &reply),
            );
        }
        match extract_text_field(&reply.body, SUMMARY_FIELD) {
            Some(text) => Summary {
                text,
                degraded: None,
            },
            None => degraded(
                caption.to_string(),
                StageFailure::empty(Stage::Summarize, "no summary returned"),
            ),
        }
    }
}

fn degraded(text: String, failure: StageFailure) -> Summary {
    tracing::warn!(
        kind = ?failure.kind,
        status = ?failure.http_status,
        reason = %failure.reason,
        "summarize degraded; using fallback text"
    );
    Summary {
        text,
        degraded: Some(failure),
    }
}

fn status_failure(stage: Stage, reply: &HttpReply) -> StageFailure {
    let detail = extract_text_field(&reply.body, "error")
        .unwrap_or_else(|| reply.body.trim().to_string());
    let mut reason: String = detail.chars().take(MAX_REASON_CHARS).collect();
    if reason.is_empty() {
        reason = format!("HTTP {}", reply.status);
    }
    StageFailure::status(stage, reply.status, reason)
}

#[cfg(test)]
#[path = "../../tests/unit/inference/client.rs"]
mod tests;
