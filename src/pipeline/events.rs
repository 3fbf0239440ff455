use std::fmt;

use crate::foundation::core::RequestId;
use crate::inference::client::Summary;
use crate::inference::failure::StageFailure;

/// Lifecycle phase of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Ready to accept a run.
    Idle = 0,
    /// Rasterizing strokes.
    Capturing = 1,
    /// Waiting on the vision model.
    Describing = 2,
    /// Waiting on the summarization model.
    Summarizing = 3,
    /// Terminal: summary available.
    Done = 4,
    /// Terminal: the run stopped at capture or describe.
    Failed = 5,
}

impl Phase {
    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Capturing,
            2 => Self::Describing,
            3 => Self::Summarizing,
            4 => Self::Done,
            5 => Self::Failed,
            _ => Self::Idle,
        }
    }

    /// Return `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Return `true` while a run is between `Capturing` and a terminal phase.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Capturing | Self::Describing | Self::Summarizing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Describing => "describing",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Why a run was refused before it started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Rejection {
    /// No credential was configured.
    CredentialMissing,
    /// Another run is in flight.
    Busy,
}

/// Terminal result of one run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RunOutcome {
    /// All stages completed; `summary` may be degraded.
    Done {
        /// Run id.
        request: RequestId,
        /// Describe-stage caption.
        caption: String,
        /// Final text.
        summary: Summary,
    },
    /// The run stopped early.
    Failed {
        /// Run id.
        request: RequestId,
        /// What stopped it.
        failure: StageFailure,
    },
}

impl RunOutcome {
    /// Run id.
    pub fn request(&self) -> RequestId {
        match self {
            Self::Done { request, .. } | Self::Failed { request, .. } => *request,
        }
    }

    /// Terminal phase this outcome corresponds to.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Done { .. } => Phase::Done,
            Self::Failed { .. } => Phase::Failed,
        }
    }

    /// Text to show the user.
    pub fn display_text(&self) -> String {
        match self {
            Self::Done { summary, .. } => summary.text.clone(),
            Self::Failed { failure, .. } => failure.user_message(),
        }
    }
}

/// Notification pushed to observers.
///
/// Each phase transition of a run produces exactly one event; rejected runs produce a single
/// [`StatusEvent::Rejected`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusEvent {
    /// Run entered `Capturing`.
    Capturing {
        /// Run id.
        request: RequestId,
    },
    /// Run entered `Describing`.
    Describing {
        /// Run id.
        request: RequestId,
        /// Size of the captured PNG in bytes.
        image_bytes: usize,
    },
    /// Run entered `Summarizing`.
    Summarizing {
        /// Run id.
        request: RequestId,
        /// Caption being summarized.
        caption: String,
    },
    /// Run reached `Done`.
    Done {
        /// Run id.
        request: RequestId,
        /// Final text.
        summary: Summary,
    },
    /// Run reached `Failed`.
    Failed {
        /// Run id.
        request: RequestId,
        /// What stopped it.
        failure: StageFailure,
    },
    /// A run was refused; no state changed.
    Rejected {
        /// Why.
        reason: Rejection,
    },
}

impl StatusEvent {
    /// Phase announced by this event; `None` for rejections.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Capturing { .. } => Some(Phase::Capturing),
            Self::Describing { .. } => Some(Phase::Describing),
            Self::Summarizing { .. } => Some(Phase::Summarizing),
            Self::Done { .. } => Some(Phase::Done),
            Self::Failed { .. } => Some(Phase::Failed),
            Self::Rejected { .. } => None,
        }
    }

    /// Run id; `None` for rejections.
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Self::Capturing { request }
            | Self::Describing { request, .. }
            | Self::Summarizing { request, .. }
            | Self::Done { request, .. }
            | Self::Failed { request, .. } => Some(*request),
            Self::Rejected { .. } => None,
        }
    }

    /// Status line for the UI.
    pub fn message(&self) -> String {
        match self {
            Self::Capturing { .. } => "Capturing drawing...".to_string(),
            Self::Describing { .. } => "Analyzing drawing...".to_string(),
            Self::Summarizing { .. } => "Summarizing...".to_string(),
            Self::Done { summary, .. } => summary.text.clone(),
            Self::Failed { failure, .. } => failure.user_message(),
            Self::Rejected {
                reason: Rejection::Busy,
            } => "Still working on the previous drawing.".to_string(),
            Self::Rejected {
                reason: Rejection::CredentialMissing,
            } => "No API token configured.".to_string(),
        }
    }
}
