use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("font load error: {0}")]
pub struct FontLoadError(pub String);

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// 8-bit coverage mask of one rasterized glyph.
#[derive(Debug)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// Owns the loaded fonts and a cache of rasterized glyphs.
///
/// The first font loaded is the primary font used by the canvas and the
/// widgets. Rasterized glyphs are cached by font, glyph index and pixel size
/// for the lifetime of the system.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
    glyphs: RefCell<HashMap<GlyphRasterConfig, Rc<GlyphBitmap>>>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            glyphs: RefCell::new(HashMap::new()),
        }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    /// The font text is drawn with, if any font was loaded.
    pub fn primary(&self) -> Option<FontId> {
        (!self.fonts.is_empty()).then_some(FontId(0))
    }

    fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Size of `text` laid out in the primary font at `size` logical pixels.
    ///
    /// Without a font the height is still reported so layout stays stable.
    #[must_use]
    pub fn measure(&self, text: &str, size: f32) -> Vec2 {
        let Some(font) = self.primary().and_then(|id| self.get(id)) else {
            return Vec2::new(0.0, size * 1.2);
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let line_height = font
            .horizontal_line_metrics(size)
            .map_or(size * 1.2, |m| m.new_line_size);

        // Pen position after each glyph, not its bitmap edge.
        let w = layout
            .glyphs()
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);

        Vec2::new(w, line_height.max(layout.height()))
    }

    /// Lays out `text` at `px_size` physical pixels with its top-left corner
    /// at `origin` (physical pixels) and calls `emit(x, y, glyph)` for every
    /// visible glyph.
    pub fn for_each_glyph(
        &self,
        text: &str,
        px_size: f32,
        origin: (f32, f32),
        mut emit: impl FnMut(i32, i32, &GlyphBitmap),
    ) {
        let Some(font) = self.primary().and_then(|id| self.get(id)) else {
            log::trace!("no font loaded; skipping text {text:?}");
            return;
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: origin.0,
            y: origin.1,
            ..LayoutSettings::default()
        });
        layout.append(&[font], &TextStyle::new(text, px_size, 0));

        for g in layout.glyphs() {
            if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                continue;
            }
            let bitmap = self.glyph(font, g.key);
            emit(g.x.round() as i32, g.y.round() as i32, &bitmap);
        }
    }

    fn glyph(&self, font: &fontdue::Font, key: GlyphRasterConfig) -> Rc<GlyphBitmap> {
        if let Some(hit) = self.glyphs.borrow().get(&key) {
            return Rc::clone(hit);
        }

        let (metrics, coverage) = font.rasterize_config(key);
        let bitmap = Rc::new(GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            coverage,
        });
        self.glyphs.borrow_mut().insert(key, Rc::clone(&bitmap));
        bitmap
    }

    /// Number of cached glyph bitmaps.
    pub fn cached_glyphs(&self) -> usize {
        self.glyphs.borrow().len()
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_without_font_keeps_line_height() {
        let fonts = FontSystem::new();
        let size = fonts.measure("Loading", 20.0);
        assert_eq!(size.x, 0.0);
        assert_eq!(size.y, 24.0);
    }

    #[test]
    fn glyphs_without_font_emit_nothing() {
        let fonts = FontSystem::new();
        let mut count = 0;
        fonts.for_each_glyph("abc", 16.0, (0.0, 0.0), |_, _, _| count += 1);
        assert_eq!(count, 0);
        assert!(fonts.primary().is_none());
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let mut fonts = FontSystem::new();
        assert!(fonts.load_font(b"not a font").is_err());
    }
}
