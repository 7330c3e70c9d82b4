//! Geometry shared by the compositor canvas and the widget layer.
//!
//! Coordinates are logical pixels, origin top-left, +X right, +Y down.
//! The compositor multiplies by its scale factor when rasterizing.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
