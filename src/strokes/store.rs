//! Stroke recording.
//!
//! The drawing-input collaborator is the only writer. Captures read an owned
//! [`CanvasSnapshot`], so a capture never observes a half-appended point.

use crate::foundation::config::{CaptureConfig, PipelineConfig, StrokeConfig};
use crate::foundation::core::{Point, Rgba8};

/// Line appearance recorded when a stroke begins.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// Ink color.
    pub color: Rgba8,
    /// Line width in capture pixels.
    pub width_px: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::BLACK,
            width_px: 6.0,
        }
    }
}

impl StrokeStyle {
    /// Default style derived from capture settings.
    pub fn from_capture(cfg: &CaptureConfig) -> Self {
        Self {
            color: cfg.default_color,
            width_px: cfg.default_width_px,
        }
    }
}

/// One pen-down to pen-up motion.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    style: StrokeStyle,
}

impl Stroke {
    fn new(style: StrokeStyle) -> Self {
        Self {
            points: Vec::new(),
            style,
        }
    }

    /// Recorded points in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Appearance captured at `begin_stroke`.
    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` if no point has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline arc length in world units.
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }
}

/// Owned, point-in-time copy of the strokes a capture should draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanvasSnapshot {
    strokes: Vec<Stroke>,
}

impl CanvasSnapshot {
    /// Build a snapshot from explicit strokes.
    pub fn from_strokes(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    /// Strokes in insertion order; an included in-progress stroke comes last.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Return `true` if nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(Stroke::is_empty)
    }
}

/// Ordered finalized strokes plus at most one stroke in progress.
#[derive(Clone, Debug)]
pub struct StrokeStore {
    finalized: Vec<Stroke>,
    current: Option<Stroke>,
    min_point_distance: f32,
    default_style: StrokeStyle,
}

impl Default for StrokeStore {
    fn default() -> Self {
        Self::new(&StrokeConfig::default(), StrokeStyle::default())
    }
}

impl StrokeStore {
    /// Minimum number of points a stroke needs to survive `end_stroke`.
    pub const MIN_POINTS: usize = 2;

    /// Create an empty store.
    pub fn new(cfg: &StrokeConfig, default_style: StrokeStyle) -> Self {
        Self {
            finalized: Vec::new(),
            current: None,
            min_point_distance: cfg.min_point_distance,
            default_style,
        }
    }

    /// Create an empty store using the stroke and default-ink settings of `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(&cfg.strokes, StrokeStyle::from_capture(&cfg.capture))
    }

    /// Start a stroke with the default style.
    ///
    /// Returns `false` (and changes nothing) if a stroke is already in progress.
    pub fn begin_stroke(&mut self) -> bool {
        self.begin_stroke_with(self.default_style)
    }

    /// Start a stroke with an explicit style.
    pub fn begin_stroke_with(&mut self, style: StrokeStyle) -> bool {
        if self.current.is_some() {
            tracing::debug!("begin_stroke ignored: stroke already in progress");
            return false;
        }
        self.current = Some(Stroke::new(style));
        true
    }

    /// Append a point to the stroke in progress.
    ///
    /// Points within `min_point_distance` of the last recorded point are dropped. Returns
    /// `true` if the point was recorded.
    pub fn append_point(&mut self, p: Point) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        if !p.is_finite() {
            return false;
        }
        if let Some(last) = stroke.points.last()
            && last.distance(p) < self.min_point_distance
        {
            return false;
        }
        stroke.points.push(p);
        true
    }

    /// Finalize the stroke in progress.
    ///
    /// Strokes with fewer than [`Self::MIN_POINTS`] points are discarded. Always leaves the
    /// store with no stroke in progress. Returns `true` if a stroke was kept.
    pub fn end_stroke(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) if stroke.len() >= Self::MIN_POINTS => {
                self.finalized.push(stroke);
                true
            }
            Some(stroke) => {
                tracing::debug!(points = stroke.len(), "discarding degenerate stroke");
                false
            }
            None => false,
        }
    }

    /// Discard every finalized and in-progress stroke.
    ///
    /// Returns how many strokes were dropped so the rendering collaborator can release the
    /// line objects it created for them.
    pub fn clear_all(&mut self) -> usize {
        let dropped = self.finalized.len() + usize::from(self.current.is_some());
        self.finalized.clear();
        self.current = None;
        dropped
    }

    /// Finalized strokes in insertion order.
    pub fn finalized(&self) -> &[Stroke] {
        &self.finalized
    }

    /// The stroke being drawn, if any.
    pub fn in_progress(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    /// Return `true` while a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// Number of finalized strokes.
    pub fn stroke_count(&self) -> usize {
        self.finalized.len()
    }

    /// Return `true` if there are no finalized strokes and none in progress.
    pub fn is_empty(&self) -> bool {
        self.finalized.is_empty() && self.current.is_none()
    }

    /// Copy the strokes a capture should draw.
    pub fn snapshot(&self, include_in_progress: bool) -> CanvasSnapshot {
        let mut strokes = self.finalized.clone();
        if include_in_progress && let Some(current) = &self.current {
            strokes.push(current.clone());
        }
        CanvasSnapshot { strokes }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/strokes/store.rs"]
mod tests;
