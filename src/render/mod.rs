/// Stroke snapshot rasterization and PNG encoding.
pub mod raster;
/// Capture framing.
pub mod view;
