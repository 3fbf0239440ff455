//! Capture framing.
//!
//! A capture is framed by the live primary view at the moment it is taken. The view is an
//! explicit input rather than a global lookup, so the same strokes and view always produce
//! the same image.

use glam::{Mat3, Quat, Vec3};

use crate::foundation::core::{FrameSize, PixelPoint, Point};
use crate::foundation::error::{SketchError, SketchResult};

/// Lens model of the capture camera.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Projection {
    /// Pinhole camera.
    Perspective {
        /// Vertical field of view in degrees, in `(0, 180)`.
        vertical_fov_deg: f32,
        /// Points at or closer than this depth are not drawn.
        near: f32,
    },
    /// Parallel projection; useful for flat 2D canvases.
    Orthographic {
        /// World units spanned by the frame's height.
        view_height: f32,
    },
}

/// Position, orientation, and lens of the capture camera.
///
/// The camera looks down its local `-Z` axis with `+Y` up.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    /// Camera position in world units.
    pub position: Vec3,
    /// Camera orientation.
    pub orientation: Quat,
    /// Lens model.
    pub projection: Projection,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            projection: Projection::Perspective {
                vertical_fov_deg: 60.0,
                near: 0.01,
            },
        }
    }
}

impl ViewTransform {
    /// Camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Projection) -> SketchResult<Self> {
        let forward = (target - eye).normalize_or_zero();
        if forward == Vec3::ZERO {
            return Err(SketchError::validation("look_at target equals eye"));
        }
        let right = forward.cross(up).normalize_or_zero();
        if right == Vec3::ZERO {
            return Err(SketchError::validation("look_at up is parallel to view direction"));
        }
        let true_up = right.cross(forward);
        let orientation = Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward));
        Ok(Self {
            position: eye,
            orientation: orientation.normalize(),
            projection,
        })
    }

    /// Orthographic view of the `z = 0` plane centered on `(center_x, center_y)`.
    pub fn planar(center_x: f32, center_y: f32, view_height: f32) -> Self {
        Self {
            position: Vec3::new(center_x, center_y, 1.0),
            orientation: Quat::IDENTITY,
            projection: Projection::Orthographic { view_height },
        }
    }

    /// Reject degenerate lenses and non-finite poses.
    pub fn validate(&self) -> SketchResult<()> {
        if !self.position.is_finite() || !self.orientation.is_finite() {
            return Err(SketchError::validation("view transform must be finite"));
        }
        match self.projection {
            Projection::Perspective {
                vertical_fov_deg,
                near,
            } => {
                if !(vertical_fov_deg > 0.0 && vertical_fov_deg < 180.0) {
                    return Err(SketchError::validation(
                        "perspective fov must be in (0, 180) degrees",
                    ));
                }
                if !(near.is_finite() && near > 0.0) {
                    return Err(SketchError::validation("perspective near must be > 0"));
                }
            }
            Projection::Orthographic { view_height } => {
                if !(view_height.is_finite() && view_height > 0.0) {
                    return Err(SketchError::validation(
                        "orthographic view_height must be > 0",
                    ));
                }
            }
        }
        Ok(())
    }

    /// World point in camera space (camera at origin, looking down `-Z`).
    pub fn to_camera(&self, p: Point) -> Vec3 {
        self.orientation.inverse() * (p - self.position)
    }

    /// Project a world point into pixel coordinates of a frame of `size`.
    ///
    /// Returns `None` for points a perspective camera cannot see (at or behind the near
    /// plane). Points outside the frame still project; the rasterizer clips them.
    pub fn project(&self, p: Point, size: FrameSize) -> Option<PixelPoint> {
        let c = self.to_camera(p);
        let aspect = size.aspect();
        let (ndc_x, ndc_y) = match self.projection {
            Projection::Perspective {
                vertical_fov_deg,
                near,
            } => {
                let depth = -c.z;
                if depth <= near {
                    return None;
                }
                let f = 1.0 / (vertical_fov_deg.to_radians() * 0.5).tan();
                (c.x / depth * f / aspect, c.y / depth * f)
            }
            Projection::Orthographic { view_height } => {
                let half = view_height * 0.5;
                (c.x / (half * aspect), c.y / half)
            }
        };
        let x = (f64::from(ndc_x) + 1.0) * 0.5 * f64::from(size.width);
        let y = (1.0 - f64::from(ndc_y)) * 0.5 * f64::from(size.height);
        Some(PixelPoint::new(x, y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/view.rs"]
mod tests;
