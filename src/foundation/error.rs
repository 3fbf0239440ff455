/// Result alias used across the crate.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors surfaced by capture, configuration, and pipeline preconditions.
///
/// Stage-level inference problems are not errors: they travel as
/// [`StageFailure`](crate::StageFailure) values so the orchestrator can relay them to observers.
#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    /// No bearer credential was supplied; the pipeline never starts.
    #[error("missing credential: an inference API token is required")]
    CredentialMissing,

    /// Another pipeline run is already in flight.
    #[error("pipeline busy: a run is already in progress")]
    Busy,

    /// An argument or value violated a documented constraint.
    #[error("validation error: {0}")]
    Validation(String),

    /// PNG encoding of a capture failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SketchError {
    /// Build a [`SketchError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SketchError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SketchError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Return `true` for rejections that mean "the run never started".
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::CredentialMissing | Self::Busy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
