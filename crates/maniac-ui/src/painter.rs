use maniac_engine::compositor::Canvas;
use maniac_engine::coords::{Rect, Vec2};
use maniac_engine::paint::Color;

use crate::constraints::LayoutCtx;

/// Drawing surface passed to [`Widget::paint`](crate::widget::Widget::paint).
///
/// Wraps the compositor canvas and carries the pointer position so widgets can
/// express hover visuals in `paint`.
pub struct Painter<'c, 'a> {
    canvas: &'c mut Canvas<'a>,
    /// Pointer position in logical pixels, if over the window.
    pub mouse_pos: Option<Vec2>,
    /// Whether the primary button is held.
    pub mouse_pressed: bool,
}

impl<'c, 'a> Painter<'c, 'a> {
    pub fn new(canvas: &'c mut Canvas<'a>, mouse_pos: Option<Vec2>, mouse_pressed: bool) -> Self {
        Self { canvas, mouse_pos, mouse_pressed }
    }

    #[inline]
    pub fn is_hovered(&self, rect: Rect) -> bool {
        self.mouse_pos.is_some_and(|p| rect.contains(p))
    }

    #[inline]
    pub fn is_pressed(&self, rect: Rect) -> bool {
        self.mouse_pressed && self.is_hovered(rect)
    }

    /// Layout context borrowing the canvas's fonts, for containers that
    /// re-measure children while painting.
    #[inline]
    pub fn layout_ctx(&self) -> LayoutCtx<'a> {
        LayoutCtx::new(self.canvas.fonts())
    }

    #[inline]
    pub fn canvas(&mut self) -> &mut Canvas<'a> {
        self.canvas
    }

    // ── drawing ───────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.canvas.fill_rect(rect, color);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.canvas.fill_rounded_rect(rect, radius, color);
    }

    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        self.canvas.stroke_rect(rect, width, color);
    }

    pub fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        self.canvas.measure_text(text, size)
    }

    pub fn text(&mut self, text: &str, size: f32, color: Color, origin: Vec2) {
        self.canvas.fill_text(text, origin, size, color);
    }
}
