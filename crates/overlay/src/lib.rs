//! Detection overlay rendering.
//!
//! - `surface`: the drawing abstraction and the 1920×1080 virtual canvas.
//! - `draw_list`: a surface that records operations.
//! - `raster`: a surface backed by an RGBA image, exportable as PNG.
//! - `renderer`: projects detections onto a surface.

mod glyphs;

pub mod draw_list;
pub mod raster;
pub mod renderer;
pub mod surface;

pub use draw_list::{DrawList, DrawOp};
pub use raster::{RasterError, RasterSurface};
pub use renderer::{BoxStyle, CORNER_LENGTH, DisplayFlags, OverlayRenderer};
pub use surface::{Color, Rect, Surface, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};
