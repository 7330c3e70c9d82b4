use maniac_engine::coords::{Rect, Vec2};
use maniac_engine::paint::Color;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

const CAPTION_HEIGHT: f32 = 24.0;
const CAPTION_TEXT_SIZE: f32 = 14.0;

/// A fixed-size floating window with a caption bar.
///
/// Windows live on the desktop's window layer, which centers them in the
/// viewport. Clicks inside the window never fall through to what is below.
pub struct Window {
    caption: String,
    size: Vec2,
    child: Element,
    background: Color,
    caption_background: Color,
    caption_color: Color,
    on_escape: Option<Box<dyn FnMut()>>,
}

impl Window {
    pub fn new(caption: impl Into<String>, width: f32, height: f32, child: impl Into<Element>) -> Self {
        Self {
            caption: caption.into(),
            size: Vec2::new(width, height),
            child: child.into(),
            background: Color::from_srgb_u8(40, 40, 44, 255),
            caption_background: Color::from_srgb_u8(24, 24, 28, 255),
            caption_color: Color::white(),
            on_escape: None,
        }
    }

    /// Callback run when Escape is pressed while the window is shown.
    pub fn on_escape(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_escape = Some(Box::new(f));
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    fn body(rect: Rect) -> Rect {
        Rect::new(
            rect.origin.x,
            rect.origin.y + CAPTION_HEIGHT,
            rect.size.x,
            (rect.size.y - CAPTION_HEIGHT).max(0.0),
        )
    }
}

impl Widget for Window {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        constraints.constrain(self.size)
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        painter.fill_rect(rect, self.background);
        let caption = Rect::new(rect.origin.x, rect.origin.y, rect.size.x, CAPTION_HEIGHT);
        painter.fill_rect(caption, self.caption_background);
        let text_h = painter.measure_text(&self.caption, CAPTION_TEXT_SIZE).y;
        let origin = Vec2::new(
            caption.origin.x + 8.0,
            caption.origin.y + ((CAPTION_HEIGHT - text_h) * 0.5).max(0.0),
        );
        painter.text(&self.caption, CAPTION_TEXT_SIZE, self.caption_color, origin);
        painter.stroke_rect(rect, 1.0, self.caption_background);

        self.child.paint(painter, Self::body(rect));
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        if let UiEvent::KeyPress { key: maniac_engine::input::Key::Escape, .. } = event {
            if let Some(f) = &mut self.on_escape {
                f();
                return EventResult::Consumed;
            }
        }

        if self.child.on_event(event, Self::body(rect), ctx).is_consumed() {
            return EventResult::Consumed;
        }
        match event {
            UiEvent::Click { pos } if rect.contains(*pos) => EventResult::Consumed,
            _ => EventResult::Ignored,
        }
    }
}
