use std::cell::Cell;
use std::rc::Rc;

use maniac_engine::coords::{Rect, Vec2};
use maniac_engine::paint::Color;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::Widget;

/// Selected row index, shared with whoever acts on the selection.
pub type ListSelection = Rc<Cell<Option<usize>>>;

/// A vertical list of selectable text rows.
///
/// Clicking a row selects it; clicking the selected row again activates it.
/// Up/Down move the selection and Enter activates.
pub struct List {
    items: Vec<String>,
    selection: ListSelection,
    text_size: f32,
    scroll: usize,
    on_activate: Option<Box<dyn FnMut(usize)>>,
}

impl List {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            selection: Rc::new(Cell::new(None)),
            text_size: 14.0,
            scroll: 0,
            on_activate: None,
        }
    }

    /// Use an externally owned selection cell.
    pub fn selection(mut self, selection: ListSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn on_activate(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_activate = Some(Box::new(f));
        self
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.get()
    }

    fn row_height(&self) -> f32 {
        (self.text_size * 1.6).round()
    }

    fn visible_rows(&self, rect: Rect) -> usize {
        (rect.size.y / self.row_height()).floor().max(0.0) as usize
    }

    fn row_at(&self, rect: Rect, pos: Vec2) -> Option<usize> {
        if !rect.contains(pos) {
            return None;
        }
        let idx = self.scroll + ((pos.y - rect.origin.y) / self.row_height()) as usize;
        (idx < self.items.len()).then_some(idx)
    }

    fn select(&mut self, idx: usize, visible: usize) {
        self.selection.set(Some(idx));
        if idx < self.scroll {
            self.scroll = idx;
        } else if visible > 0 && idx >= self.scroll + visible {
            self.scroll = idx + 1 - visible;
        }
    }

    fn activate(&mut self, idx: usize) {
        if let Some(f) = &mut self.on_activate {
            f(idx);
        }
    }
}

impl Widget for List {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        let h = self.items.len() as f32 * self.row_height();
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 0.0 };
        constraints.constrain(Vec2::new(w, h))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        painter.fill_rect(rect, Color::from_srgb_u8(20, 20, 22, 255));
        let row_h = self.row_height();
        let selected = self.selection.get();
        for (offset, item) in self.items.iter().enumerate().skip(self.scroll).take(self.visible_rows(rect)) {
            let y = rect.origin.y + (offset - self.scroll) as f32 * row_h;
            let row = Rect::new(rect.origin.x, y, rect.size.x, row_h);
            if selected == Some(offset) {
                painter.fill_rect(row, Color::from_srgb_u8(60, 90, 150, 255));
            } else if painter.is_hovered(row) {
                painter.fill_rect(row, Color::from_srgb_u8(45, 45, 50, 255));
            }
            let text_h = painter.measure_text(item, self.text_size).y;
            let origin = Vec2::new(row.origin.x + 6.0, y + ((row_h - text_h) * 0.5).max(0.0));
            painter.text(item, self.text_size, Color::white(), origin);
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, _ctx: &LayoutCtx) -> EventResult {
        use maniac_engine::input::Key;

        let visible = self.visible_rows(rect);
        match event {
            UiEvent::Click { pos } if rect.contains(*pos) => {
                if let Some(idx) = self.row_at(rect, *pos) {
                    if self.selection.get() == Some(idx) {
                        self.activate(idx);
                    } else {
                        self.select(idx, visible);
                    }
                }
                EventResult::Consumed
            }
            UiEvent::KeyPress { key: Key::ArrowDown, .. } if !self.items.is_empty() => {
                let next = self.selection.get().map_or(0, |i| (i + 1).min(self.items.len() - 1));
                self.select(next, visible);
                EventResult::Consumed
            }
            UiEvent::KeyPress { key: Key::ArrowUp, .. } if !self.items.is_empty() => {
                let prev = self.selection.get().map_or(0, |i| i.saturating_sub(1));
                self.select(prev, visible);
                EventResult::Consumed
            }
            UiEvent::KeyPress { key: Key::Enter, .. } => match self.selection.get() {
                Some(idx) => {
                    self.activate(idx);
                    EventResult::Consumed
                }
                None => EventResult::Ignored,
            },
            UiEvent::ScrollWheel { delta } => {
                let max_scroll = self.items.len().saturating_sub(visible);
                let step = delta.round() as isize;
                self.scroll = (self.scroll as isize + step).clamp(0, max_scroll as isize) as usize;
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maniac_engine::text::FontSystem;

    fn list() -> List {
        List::new(vec!["Cave".into(), "Forest".into(), "Lab".into()])
    }

    #[test]
    fn click_selects_then_activates() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let activated = Rc::new(Cell::new(None));
        let a = activated.clone();
        let mut list = list().on_activate(move |i| a.set(Some(i)));
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        let second_row = UiEvent::Click { pos: Vec2::new(10.0, list.row_height() * 1.5) };

        list.on_event(&second_row, rect, &ctx);
        assert_eq!(list.selected(), Some(1));
        assert_eq!(activated.get(), None);

        list.on_event(&second_row, rect, &ctx);
        assert_eq!(activated.get(), Some(1));
    }

    #[test]
    fn arrow_keys_clamp_to_bounds() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let mut list = list();
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        let down = UiEvent::KeyPress { key: maniac_engine::input::Key::ArrowDown, modifiers: Default::default() };
        for _ in 0..5 {
            list.on_event(&down, rect, &ctx);
        }
        assert_eq!(list.selected(), Some(2));
    }

    #[test]
    fn click_below_last_row_selects_nothing() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let mut list = list();
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        let result = list.on_event(&UiEvent::Click { pos: Vec2::new(10.0, 190.0) }, rect, &ctx);
        assert_eq!(result, EventResult::Consumed);
        assert_eq!(list.selected(), None);
    }
}
