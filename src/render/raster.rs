//! CPU rasterization of stroke snapshots into PNG captures.

use std::io::Cursor;

use base64::Engine as _;

use crate::foundation::config::CaptureConfig;
use crate::foundation::core::{BezPath, FrameSize, PixelPoint, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::render::view::ViewTransform;
use crate::strokes::store::{CanvasSnapshot, Stroke, StrokeStore, StrokeStyle};

/// Tolerance used when flattening dot circles.
const DOT_TOLERANCE: f64 = 0.1;

/// One encoded capture. Never cached: each call produces a fresh buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureResult {
    /// PNG-encoded image bytes.
    pub png: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl CaptureResult {
    /// `data:image/png;base64,...` URI embedding the PNG bytes.
    pub fn to_data_uri(&self) -> String {
        png_data_uri(&self.png)
    }
}

/// Wrap PNG bytes in a base64 `data:` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!("data:image/png;base64,{encoded}")
}

/// A stroke projected into capture pixel space.
#[derive(Clone, Debug)]
pub(crate) struct ProjectedStroke {
    /// Polylines; a new subpath starts wherever a point could not be projected.
    pub(crate) path: BezPath,
    /// Isolated visible points drawn as round dots.
    pub(crate) dots: Vec<PixelPoint>,
    pub(crate) style: StrokeStyle,
}

/// Renders stroke snapshots to fixed-size PNG images.
///
/// Holds configuration only; no pixel buffers survive a call.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    background: Rgba8,
    include_in_progress: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(&CaptureConfig::default())
    }
}

impl Rasterizer {
    /// Create a rasterizer from capture settings.
    pub fn new(cfg: &CaptureConfig) -> Self {
        Self {
            background: cfg.background,
            include_in_progress: cfg.include_in_progress,
        }
    }

    /// Whether captures taken from a [`StrokeStore`] include the stroke being drawn.
    pub fn includes_in_progress(&self) -> bool {
        self.include_in_progress
    }

    /// Snapshot `store` and capture it.
    pub fn capture(
        &self,
        store: &StrokeStore,
        view: &ViewTransform,
        size: FrameSize,
    ) -> SketchResult<CaptureResult> {
        let snapshot = store.snapshot(self.include_in_progress);
        self.capture_snapshot(&snapshot, view, size)
    }

    /// Render `snapshot` as seen from `view` into a `size` frame and encode it as PNG.
    ///
    /// An empty snapshot yields a background-only image.
    #[tracing::instrument(level = "debug", skip(self, snapshot, view), fields(strokes = snapshot.strokes().len()))]
    pub fn capture_snapshot(
        &self,
        snapshot: &CanvasSnapshot,
        view: &ViewTransform,
        size: FrameSize,
    ) -> SketchResult<CaptureResult> {
        size.validate()?;
        view.validate()?;

        let projected: Vec<ProjectedStroke> = snapshot
            .strokes()
            .iter()
            .map(|s| project_stroke(s, view, size))
            .collect();

        let mut rgba = self.render_rgba8(&projected, size)?;
        unpremultiply_in_place(&mut rgba);
        let png = encode_png(rgba, size)?;
        tracing::debug!(bytes = png.len(), "capture encoded");

        Ok(CaptureResult {
            png,
            width: size.width,
            height: size.height,
        })
    }

    /// Premultiplied RGBA8 pixels, row-major.
    fn render_rgba8(&self, strokes: &[ProjectedStroke], size: FrameSize) -> SketchResult<Vec<u8>> {
        use vello_cpu::kurbo::Shape as _;

        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| SketchError::validation("capture width exceeds u16"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| SketchError::validation("capture height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(self.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        for stroke in strokes {
            let style = stroke.style;
            ctx.set_paint(color_to_cpu(style.color));
            ctx.set_stroke(
                vello_cpu::kurbo::Stroke::new(f64::from(style.width_px))
                    .with_caps(vello_cpu::kurbo::Cap::Round)
                    .with_join(vello_cpu::kurbo::Join::Round),
            );
            if !stroke.path.is_empty() {
                ctx.stroke_path(&bezpath_to_cpu(&stroke.path));
            }
            let radius = f64::from(style.width_px) * 0.5;
            for dot in &stroke.dots {
                let circle = vello_cpu::kurbo::Circle::new(point_to_cpu(*dot), radius);
                ctx.fill_path(&circle.to_path(DOT_TOLERANCE));
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }
}

/// Project one stroke, splitting it wherever a point is not visible.
pub(crate) fn project_stroke(stroke: &Stroke, view: &ViewTransform, size: FrameSize) -> ProjectedStroke {
    let mut out = ProjectedStroke {
        path: BezPath::new(),
        dots: Vec::new(),
        style: stroke.style(),
    };
    let mut run: Vec<PixelPoint> = Vec::new();
    for &p in stroke.points() {
        match view.project(p, size) {
            Some(px) => run.push(px),
            None => flush_run(&mut out, &mut run),
        }
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut ProjectedStroke, run: &mut Vec<PixelPoint>) {
    match run.as_slice() {
        [] => {}
        [single] => out.dots.push(*single),
        [first, rest @ ..] => {
            out.path.move_to(*first);
            for p in rest {
                out.path.line_to(*p);
            }
        }
    }
    run.clear();
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: PixelPoint) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn encode_png(rgba: Vec<u8>, size: FrameSize) -> SketchResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(size.width, size.height, rgba)
        .ok_or_else(|| SketchError::encode("rgba buffer does not match capture size"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| SketchError::encode(format!("png encode: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
