use std::fmt;

/// Pipeline stage a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Stage {
    /// Rasterizing the strokes.
    Capture,
    /// Vision captioning call.
    Describe,
    /// Summarization call.
    Summarize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Capture => "capture",
            Stage::Describe => "describe",
            Stage::Summarize => "summarize",
        })
    }
}

/// What went wrong inside a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    /// Connection, TLS, or body read failure.
    Transport,
    /// The request exceeded the configured timeout.
    Timeout,
    /// The provider answered with a non-success status.
    HttpStatus,
    /// The response parsed but held no usable text.
    EmptyExtraction,
    /// Rasterization or PNG encoding failed.
    Capture,
}

/// A stage failure, carried as a value rather than an error so it can be relayed to observers.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StageFailure {
    /// Stage that failed.
    pub stage: Stage,
    /// Failure category.
    pub kind: FailureKind,
    /// Provider or transport detail.
    pub reason: String,
    /// HTTP status, when the provider answered.
    pub http_status: Option<u16>,
}

impl StageFailure {
    /// Transport-level failure.
    pub fn transport(stage: Stage, reason: impl Into<String>, timed_out: bool) -> Self {
        Self {
            stage,
            kind: if timed_out {
                FailureKind::Timeout
            } else {
                FailureKind::Transport
            },
            reason: reason.into(),
            http_status: None,
        }
    }

    /// Non-success HTTP status.
    pub fn status(stage: Stage, status: u16, reason: impl Into<String>) -> Self {
        Self {
            stage,
            kind: FailureKind::HttpStatus,
            reason: reason.into(),
            http_status: Some(status),
        }
    }

    /// Successful response without usable text.
    pub fn empty(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            kind: FailureKind::EmptyExtraction,
            reason: reason.into(),
            http_status: None,
        }
    }

    /// Capture failure.
    pub fn capture(reason: impl Into<String>) -> Self {
        Self {
            stage: Stage::Capture,
            kind: FailureKind::Capture,
            reason: reason.into(),
            http_status: None,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            FailureKind::Transport | FailureKind::Timeout => true,
            FailureKind::HttpStatus => matches!(
                self.http_status,
                Some(408 | 425 | 429) | Some(500..=599)
            ),
            FailureKind::EmptyExtraction | FailureKind::Capture => false,
        }
    }

    /// Whether the provider reported the model as still loading (HTTP 503).
    pub fn is_model_loading(&self) -> bool {
        self.http_status == Some(503)
    }

    /// Short, actionable hint for the UI.
    pub fn hint(&self) -> &'static str {
        match (self.kind, self.http_status) {
            (FailureKind::HttpStatus, Some(503)) => {
                "the model is still loading; try again in a few seconds"
            }
            (FailureKind::HttpStatus, Some(401 | 403)) => "the API token was rejected",
            (FailureKind::HttpStatus, Some(429)) => "rate limited; wait a moment and retry",
            (FailureKind::HttpStatus, Some(500..=599)) => {
                "the inference service had a temporary error; try again"
            }
            (FailureKind::HttpStatus, _) => "the inference service rejected the request",
            (FailureKind::Timeout, _) => "the request timed out; try again",
            (FailureKind::Transport, _) => "could not reach the inference service; check the network",
            (FailureKind::EmptyExtraction, _) => "the model returned no text",
            (FailureKind::Capture, _) => "the drawing could not be captured",
        }
    }

    /// Human-readable message for status displays.
    pub fn user_message(&self) -> String {
        match self.http_status {
            Some(code) => format!(
                "{} failed (HTTP {code}): {}. {}",
                self.stage,
                self.hint(),
                self.reason
            ),
            None => format!("{} failed: {}. {}", self.stage, self.hint(), self.reason),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/inference/failure.rs"]
mod tests;
