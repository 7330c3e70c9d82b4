//! Font loading, measuring and glyph rasterization (fontdue).

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem, GlyphBitmap};
