//! Freehand Render Library
//!
//! The render bridge between the element model and pixels: renderer and
//! painter contracts, per-kind outline geometry, a backend-agnostic display
//! list and a software rasterizer used for raster export.

pub mod color;
pub mod display_list;
pub mod outline;
pub mod raster;
mod renderer;
pub mod stroke;

pub use color::{parse_color, parse_color_or};
pub use display_list::{DisplayListRenderer, DrawCommand, Primitive};
pub use raster::{Raster, rasterize};
pub use renderer::{
    DEFAULT_BACKGROUND_COLOR, ElementPainter, MARQUEE_COLOR, RenderContext, RenderResult, Renderer,
    RendererError, SELECTION_COLOR,
};
pub use stroke::{SimpleOutliner, StrokeOptions, StrokeOutliner};
