use std::cell::RefCell;
use std::rc::Rc;

use maniac_engine::coords::{Rect, Vec2};
use maniac_engine::paint::Color;

use crate::constraints::{Constraints, LayoutCtx};
use crate::painter::Painter;
use crate::widget::Widget;

/// Text content shared between a widget and the code that updates it.
pub type SharedText = Rc<RefCell<String>>;

enum Content {
    Static(String),
    Shared(SharedText),
}

/// A single-run text label.
pub struct Text {
    content: Content,
    pub size: f32,
    pub color: Color,
}

impl Text {
    pub fn new(text: impl Into<String>, size: f32, color: Color) -> Self {
        Self { content: Content::Static(text.into()), size, color }
    }

    /// A label that reads its text from `source` each frame.
    pub fn shared(source: SharedText, size: f32, color: Color) -> Self {
        Self { content: Content::Shared(source), size, color }
    }

    fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        match &self.content {
            Content::Static(s) => f(s),
            Content::Shared(s) => f(&s.borrow()),
        }
    }
}

impl Widget for Text {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let size = self.with_text(|t| ctx.fonts.measure(t, self.size));
        constraints.constrain(size)
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        self.with_text(|t| painter.text(t, self.size, self.color, rect.origin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maniac_engine::text::FontSystem;

    #[test]
    fn shared_text_is_measured_live() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let source: SharedText = Rc::new(RefCell::new(String::new()));
        let label = Text::shared(source.clone(), 20.0, Color::white());
        let loose = Constraints::loose(Vec2::new(500.0, 500.0));

        let empty = label.measure(loose, &ctx);
        source.borrow_mut().push_str("Loading tilesets");
        let filled = label.measure(loose, &ctx);
        assert_eq!(empty.y, filled.y);
    }
}
