use resvg::tiny_skia::{
    FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect as SkRect, Stroke, Transform,
};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::FontSystem;

/// Drawing surface handed to a present callback.
///
/// Coordinates are logical pixels; the canvas scales them by the surface's
/// scale factor. Every drawing call marks the surface changed.
pub struct Canvas<'a> {
    pixmap: &'a mut Pixmap,
    fonts: &'a FontSystem,
    size: Vec2,
    scale: f32,
    drew: bool,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(pixmap: &'a mut Pixmap, fonts: &'a FontSystem, size: Vec2, scale: f32) -> Self {
        Self {
            pixmap,
            fonts,
            size,
            scale,
            drew: false,
        }
    }

    /// Logical size of the drawable area.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size.x, self.size.y)
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn fonts(&self) -> &'a FontSystem {
        self.fonts
    }

    /// Whether anything was drawn through this canvas.
    #[inline]
    pub fn has_drawn(&self) -> bool {
        self.drew
    }

    fn transform(&self) -> Transform {
        Transform::from_scale(self.scale, self.scale)
    }

    fn paint(color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        paint
    }

    // ── shapes ────────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.drew = true;
        let Some(r) = to_sk_rect(rect) else { return };
        self.pixmap.fill_rect(r, &Self::paint(color), self.transform(), None);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.drew = true;
        let Some(path) = rounded_rect_path(rect, radius) else { return };
        self.pixmap.fill_path(
            &path,
            &Self::paint(color),
            FillRule::Winding,
            self.transform(),
            None,
        );
    }

    /// Outlines `rect` with a stroke centered on its edge.
    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        self.drew = true;
        let Some(r) = to_sk_rect(rect) else { return };
        let path = PathBuilder::from_rect(r);
        let stroke = Stroke {
            width: width.max(0.0),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &Self::paint(color), &stroke, self.transform(), None);
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Draws `text` with its top-left corner at `origin`, `size` logical
    /// pixels tall, in the primary font.
    pub fn fill_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        self.drew = true;
        if text.is_empty() {
            return;
        }

        let [r, g, b, a] = color.premultiplied();
        let scale = self.scale;
        let pixmap = &mut *self.pixmap;

        self.fonts.for_each_glyph(
            text,
            size * scale,
            (origin.x * scale, origin.y * scale),
            |x, y, glyph| {
                let Some(mut tile) = Pixmap::new(glyph.width as u32, glyph.height as u32) else {
                    return;
                };
                for (px, &cov) in tile.data_mut().chunks_exact_mut(4).zip(&glyph.coverage) {
                    let k = cov as f32 / 255.0;
                    px[0] = (r * k * 255.0).round() as u8;
                    px[1] = (g * k * 255.0).round() as u8;
                    px[2] = (b * k * 255.0).round() as u8;
                    px[3] = (a * k * 255.0).round() as u8;
                }
                pixmap.draw_pixmap(
                    x,
                    y,
                    tile.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            },
        );
    }

    /// Size of `text` at `size` logical pixels.
    pub fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        self.fonts.measure(text, size)
    }
}

fn to_sk_rect(rect: Rect) -> Option<SkRect> {
    SkRect::from_xywh(rect.origin.x, rect.origin.y, rect.size.x, rect.size.y)
}

fn rounded_rect_path(rect: Rect, radius: f32) -> Option<resvg::tiny_skia::Path> {
    let r = radius.min(rect.size.x / 2.0).min(rect.size.y / 2.0).max(0.0);
    if r == 0.0 {
        return Some(PathBuilder::from_rect(to_sk_rect(rect)?));
    }

    let (x0, y0) = (rect.origin.x, rect.origin.y);
    let (x1, y1) = (x0 + rect.size.x, y0 + rect.size.y);

    let mut pb = PathBuilder::new();
    pb.move_to(x0 + r, y0);
    pb.line_to(x1 - r, y0);
    pb.quad_to(x1, y0, x1, y0 + r);
    pb.line_to(x1, y1 - r);
    pb.quad_to(x1, y1, x1 - r, y1);
    pb.line_to(x0 + r, y1);
    pb.quad_to(x0, y1, x0, y1 - r);
    pb.line_to(x0, y0 + r);
    pb.quad_to(x0, y0, x0 + r, y0);
    pb.close();
    pb.finish()
}
