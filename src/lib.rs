//! Sketchcast turns freehand whiteboard strokes into a short text summary.
//!
//! The crate is the orchestration core of a mixed reality drawing app:
//!
//! - Record strokes in a [`StrokeStore`]
//! - Rasterize a point-in-time snapshot to PNG with a [`Rasterizer`], framed by the live
//!   [`ViewTransform`]
//! - Caption the image and summarize the caption with an [`InferenceClient`]
//! - Sequence all of it, one run at a time, with a [`PipelineOrchestrator`] that pushes
//!   [`StatusEvent`]s to any subscribed UI
//!
//! Rendering engines, input devices, widgets, and token storage live outside this crate.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Remote inference: HTTP seam, request builders, extraction, and failure values.
pub mod inference;
/// Run sequencing and observer notifications.
pub mod pipeline;
/// Capture rasterization and framing.
pub mod render;
/// Stroke recording.
pub mod strokes;

pub use crate::foundation::config::{
    CaptureConfig, InferenceConfig, PipelineConfig, StrokeConfig,
};
pub use crate::foundation::core::{
    BezPath, Credential, FrameSize, PixelPoint, Point, Quat, RequestId, Rgba8, Vec3,
};
pub use crate::foundation::error::{SketchError, SketchResult};

pub use crate::inference::client::{Caption, InferenceClient, Summary, fallback_summary};
pub use crate::inference::failure::{FailureKind, Stage, StageFailure};
pub use crate::inference::transport::{
    HttpReply, HttpTransport, RecordedRequest, ReqwestTransport, ScriptedTransport,
    TransportError,
};
pub use crate::pipeline::events::{Phase, Rejection, RunOutcome, StatusEvent};
pub use crate::pipeline::orchestrator::PipelineOrchestrator;
pub use crate::render::raster::{CaptureResult, Rasterizer};
pub use crate::render::view::{Projection, ViewTransform};
pub use crate::strokes::store::{CanvasSnapshot, Stroke, StrokeStore, StrokeStyle};
