//! Frame evaluation: the compositor turns a layout plus scheduler state into a paint-ordered
//! node list, and the rasterizer turns that into pixels.

/// Layout composition.
pub mod compositor;
/// Frame and node types.
pub mod frame;
/// CPU rasterization to RGBA images.
pub mod raster;
