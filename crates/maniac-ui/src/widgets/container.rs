use maniac_engine::coords::{Rect, Vec2};
use maniac_engine::paint::Color;

use crate::constraints::{inset_rect, Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

/// A box with optional background, border and padding around one child.
pub struct Container {
    child: Option<Element>,
    padding: Edges,
    background: Option<Color>,
    border: Option<Color>,
    corner_radius: f32,
    min_width: f32,
    min_height: f32,
    width: Option<f32>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            child: None,
            padding: Edges::default(),
            background: None,
            border: None,
            corner_radius: 0.0,
            min_width: 0.0,
            min_height: 0.0,
            width: None,
        }
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.child = Some(child.into());
        self
    }

    pub fn padding(mut self, edges: Edges) -> Self {
        self.padding = edges;
        self
    }

    pub fn padding_all(mut self, v: f32) -> Self {
        self.padding = Edges::all(v);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn border(mut self, color: Color) -> Self {
        self.border = Some(color);
        self
    }

    pub fn corner_radius(mut self, r: f32) -> Self {
        self.corner_radius = r;
        self
    }

    pub fn min_size(mut self, width: f32, height: f32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    /// Fixed outer width, whatever the parent offers.
    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let mut outer = constraints;
        if let Some(w) = self.width {
            outer = Constraints { min: Vec2::new(w, outer.min.y), max: Vec2::new(w, outer.max.y) };
        }
        let child = self
            .child
            .as_ref()
            .map_or(Vec2::zero(), |c| c.measure(outer.shrink(self.padding), ctx));
        let w = (child.x + self.padding.h()).max(self.min_width);
        let h = (child.y + self.padding.v()).max(self.min_height);
        outer.constrain(Vec2::new(w, h))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        if let Some(bg) = self.background {
            painter.fill_rounded_rect(rect, self.corner_radius, bg);
        }
        if let Some(border) = self.border {
            painter.stroke_rect(rect, 1.0, border);
        }
        if let Some(child) = &self.child {
            child.paint(painter, inset_rect(rect, self.padding));
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        match &mut self.child {
            Some(child) => child.on_event(event, inset_rect(rect, self.padding), ctx),
            None => EventResult::Ignored,
        }
    }
}

/// Empty space. A zero-size spacer inside a [`Row`](super::flex::Row)
/// absorbs the row's leftover width.
pub struct Spacer {
    size: Vec2,
}

impl Spacer {
    /// Flexible spacer.
    pub fn flex() -> Self {
        Self { size: Vec2::zero() }
    }

    pub fn fixed(width: f32, height: f32) -> Self {
        Self { size: Vec2::new(width, height) }
    }
}

impl Widget for Spacer {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        if self.size == Vec2::zero() {
            return Vec2::zero();
        }
        constraints.constrain(self.size)
    }

    fn paint(&self, _painter: &mut Painter, _rect: Rect) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::flex::Column;
    use maniac_engine::text::FontSystem;

    #[test]
    fn fixed_width_overrides_parent() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let boxed = Container::new()
            .width(400.0)
            .padding_all(10.0)
            .child(Column::new().child(Spacer::fixed(20.0, 30.0)));
        let size = boxed.measure(Constraints::loose(Vec2::new(1000.0, 1000.0)), &ctx);
        assert_eq!(size, Vec2::new(400.0, 50.0));
    }

    #[test]
    fn flex_spacer_measures_zero() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let tight = Constraints::tight(Vec2::new(50.0, 50.0));
        assert_eq!(Spacer::flex().measure(tight, &ctx), Vec2::zero());
    }
}
