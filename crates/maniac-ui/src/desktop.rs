//! The widget host that modes attach their trees to.
//!
//! The desktop owns attached elements; a mode hands an element over with
//! [`Desktop::attach`] and takes it back with [`Desktop::detach`]. Ownership
//! moving in and out is what keeps one widget from being attached twice.

use maniac_engine::coords::Rect;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::Element;

/// Handle to an attached element.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

/// Which stacking layer an element lives on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Layer {
    /// Full-size roots, painted first.
    Desktop,
    /// Floating windows, centered, painted above roots and given events first.
    Windows,
}

struct Attached {
    id: WidgetId,
    element: Element,
}

#[derive(Default)]
pub struct Desktop {
    roots: Vec<Attached>,
    windows: Vec<Attached>,
    next_id: u64,
    rect: Rect,
    invalidated: bool,
}

impl Desktop {
    pub fn new(rect: Rect) -> Self {
        Self { rect, ..Self::default() }
    }

    fn layer(&self, layer: Layer) -> &Vec<Attached> {
        match layer {
            Layer::Desktop => &self.roots,
            Layer::Windows => &self.windows,
        }
    }

    // ── attachment ────────────────────────────────────────────────────────

    /// Takes ownership of `element` and places it on top of `layer`.
    pub fn attach(&mut self, layer: Layer, element: Element) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        let entry = Attached { id, element };
        match layer {
            Layer::Desktop => self.roots.push(entry),
            Layer::Windows => self.windows.push(entry),
        }
        self.invalidated = true;
        id
    }

    /// Removes an element and hands it back. `None` if `id` is not attached.
    pub fn detach(&mut self, id: WidgetId) -> Option<Element> {
        for list in [&mut self.roots, &mut self.windows] {
            if let Some(pos) = list.iter().position(|a| a.id == id) {
                self.invalidated = true;
                return Some(list.remove(pos).element);
            }
        }
        None
    }

    pub fn is_attached(&self, id: WidgetId) -> bool {
        self.roots.iter().chain(&self.windows).any(|a| a.id == id)
    }

    /// Ids on `layer`, bottom to top.
    pub fn attached_ids(&self, layer: Layer) -> Vec<WidgetId> {
        self.layer(layer).iter().map(|a| a.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.windows.is_empty()
    }

    // ── redraw requests ───────────────────────────────────────────────────

    /// Requests a repaint of the whole desktop.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// Returns and clears the pending repaint request.
    pub fn take_invalidated(&mut self) -> bool {
        std::mem::take(&mut self.invalidated)
    }

    // ── geometry ──────────────────────────────────────────────────────────

    pub fn absolute_rect(&self) -> Rect {
        self.rect
    }

    pub fn set_absolute_rect(&mut self, rect: Rect) {
        if self.rect != rect {
            self.rect = rect;
            self.invalidated = true;
        }
    }

    fn window_rect(&self, element: &Element, ctx: &LayoutCtx) -> Rect {
        let size = element.measure(Constraints::loose(self.rect.size), ctx);
        let origin = self.rect.origin + (self.rect.size - size) * 0.5;
        Rect::new(origin.x.max(self.rect.origin.x), origin.y.max(self.rect.origin.y), size.x, size.y)
    }

    // ── frame ─────────────────────────────────────────────────────────────

    pub fn paint(&self, painter: &mut Painter) {
        let ctx = painter.layout_ctx();
        for root in &self.roots {
            root.element.paint(painter, self.rect);
        }
        for window in &self.windows {
            let rect = self.window_rect(&window.element, &ctx);
            window.element.paint(painter, rect);
        }
    }

    /// Routes an event to the topmost window first, then to roots (topmost first).
    pub fn dispatch(&mut self, event: &UiEvent, ctx: &LayoutCtx) -> EventResult {
        let rects: Vec<Rect> = self.windows.iter().map(|w| self.window_rect(&w.element, ctx)).collect();
        for (window, rect) in self.windows.iter_mut().zip(rects).rev() {
            if window.element.on_event(event, rect, ctx).is_consumed() {
                self.invalidated = true;
                return EventResult::Consumed;
            }
        }

        let rect = self.rect;
        for root in self.roots.iter_mut().rev() {
            if root.element.on_event(event, rect, ctx).is_consumed() {
                self.invalidated = true;
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::container::Spacer;

    #[test]
    fn attach_detach_round_trips_ownership() {
        let mut desktop = Desktop::new(Rect::from_size(800.0, 600.0));
        let id = desktop.attach(Layer::Desktop, Element::new(Spacer::flex()));
        assert!(desktop.is_attached(id));
        assert!(desktop.take_invalidated());

        assert!(desktop.detach(id).is_some());
        assert!(!desktop.is_attached(id));
        assert!(desktop.detach(id).is_none());
        assert!(desktop.is_empty());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut desktop = Desktop::new(Rect::from_size(10.0, 10.0));
        let a = desktop.attach(Layer::Windows, Element::new(Spacer::flex()));
        desktop.detach(a);
        let b = desktop.attach(Layer::Windows, Element::new(Spacer::flex()));
        assert_ne!(a, b);
        assert_eq!(desktop.attached_ids(Layer::Windows), vec![b]);
        assert!(desktop.attached_ids(Layer::Desktop).is_empty());
    }

    #[test]
    fn resizing_invalidates_once() {
        let mut desktop = Desktop::new(Rect::from_size(10.0, 10.0));
        desktop.set_absolute_rect(Rect::from_size(20.0, 10.0));
        assert!(desktop.take_invalidated());
        desktop.set_absolute_rect(Rect::from_size(20.0, 10.0));
        assert!(!desktop.take_invalidated());
    }
}
