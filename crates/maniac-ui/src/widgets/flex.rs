use maniac_engine::coords::{Rect, Vec2};

use crate::constraints::{inset_rect, Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

// ── Align ─────────────────────────────────────────────────────────────────

/// Cross-axis alignment inside a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Children fill the full cross-axis extent.
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

impl Align {
    fn offset(self, start: f32, available: f32, extent: f32) -> f32 {
        match self {
            Align::Stretch | Align::Start => start,
            Align::Center => start + (available - extent) * 0.5,
            Align::End => start + (available - extent),
        }
    }
}

/// Builder fields shared by [`Column`] and [`Row`].
struct Flex {
    children: Vec<Element>,
    spacing: f32,
    padding: Edges,
    cross_align: Align,
}

impl Flex {
    fn new() -> Self {
        Self { children: Vec::new(), spacing: 0.0, padding: Edges::default(), cross_align: Align::Stretch }
    }

    fn gaps(&self) -> f32 {
        self.children.len().saturating_sub(1) as f32 * self.spacing
    }
}

macro_rules! flex_builder {
    ($ty:ident) => {
        impl $ty {
            pub fn new() -> Self {
                Self(Flex::new())
            }

            pub fn spacing(mut self, v: f32) -> Self {
                self.0.spacing = v;
                self
            }

            pub fn padding(mut self, edges: Edges) -> Self {
                self.0.padding = edges;
                self
            }

            pub fn padding_all(mut self, v: f32) -> Self {
                self.0.padding = Edges::all(v);
                self
            }

            pub fn cross_align(mut self, align: Align) -> Self {
                self.0.cross_align = align;
                self
            }

            pub fn child(mut self, child: impl Into<Element>) -> Self {
                self.0.children.push(child.into());
                self
            }

            pub fn children(mut self, iter: impl IntoIterator<Item = impl Into<Element>>) -> Self {
                self.0.children.extend(iter.into_iter().map(Into::into));
                self
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

// ── Column ────────────────────────────────────────────────────────────────

/// Vertical flex container. Children are stacked top to bottom.
pub struct Column(Flex);

flex_builder!(Column);

impl Column {
    fn child_constraints(&self, inner_w: f32) -> Constraints {
        match self.0.cross_align {
            Align::Stretch => {
                let min_x = if inner_w.is_finite() { inner_w } else { 0.0 };
                Constraints { min: Vec2::new(min_x, 0.0), max: Vec2::new(inner_w, f32::INFINITY) }
            }
            _ => Constraints::loose(Vec2::new(inner_w, f32::INFINITY)),
        }
    }

    fn layout(&self, rect: Rect, ctx: &LayoutCtx) -> Vec<Rect> {
        let inner = inset_rect(rect, self.0.padding);
        let child_c = self.child_constraints(inner.size.x);
        let mut y = inner.origin.y;
        self.0
            .children
            .iter()
            .map(|child| {
                let s = child.measure(child_c, ctx);
                let x = self.0.cross_align.offset(inner.origin.x, inner.size.x, s.x);
                let r = Rect::new(x, y, s.x, s.y);
                y += s.y + self.0.spacing;
                r
            })
            .collect()
    }
}

impl Widget for Column {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let inner_w = (constraints.max.x - self.0.padding.h()).max(0.0);
        let child_c = self.child_constraints(inner_w);

        let mut total_h = self.0.padding.v() + self.0.gaps();
        let mut max_child_w: f32 = 0.0;
        for child in &self.0.children {
            let s = child.measure(child_c, ctx);
            total_h += s.y;
            max_child_w = max_child_w.max(s.x);
        }

        let w = if self.0.cross_align == Align::Stretch && constraints.max.x.is_finite() {
            constraints.max.x
        } else {
            max_child_w + self.0.padding.h()
        };
        constraints.constrain(Vec2::new(w, total_h))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let ctx = painter.layout_ctx();
        let rects = self.layout(rect, &ctx);
        for (child, r) in self.0.children.iter().zip(rects) {
            child.paint(painter, r);
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        let rects = self.layout(rect, ctx);
        for (child, r) in self.0.children.iter_mut().zip(rects) {
            if child.on_event(event, r, ctx).is_consumed() {
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }
}

// ── Row ───────────────────────────────────────────────────────────────────

/// Horizontal flex container. Children are placed left to right.
///
/// Children that measure to zero size act as spacers and share the leftover
/// width equally.
pub struct Row(Flex);

flex_builder!(Row);

impl Row {
    fn child_constraints(&self, inner_h: f32) -> Constraints {
        match self.0.cross_align {
            Align::Stretch => {
                let min_h = if inner_h.is_finite() { inner_h } else { 0.0 };
                Constraints { min: Vec2::new(0.0, min_h), max: Vec2::new(f32::INFINITY, inner_h) }
            }
            _ => Constraints::loose(Vec2::new(f32::INFINITY, inner_h)),
        }
    }

    fn layout(&self, rect: Rect, ctx: &LayoutCtx) -> Vec<Rect> {
        let inner = inset_rect(rect, self.0.padding);
        let child_c = self.child_constraints(inner.size.y);
        let mut sizes: Vec<Vec2> = self.0.children.iter().map(|c| c.measure(child_c, ctx)).collect();

        let spacers = sizes.iter().filter(|s| **s == Vec2::zero()).count();
        if spacers > 0 {
            let fixed_w: f32 = sizes.iter().map(|s| s.x).sum();
            let spacer_w = ((inner.size.x - fixed_w - self.0.gaps()).max(0.0)) / spacers as f32;
            for s in sizes.iter_mut().filter(|s| **s == Vec2::zero()) {
                s.x = spacer_w;
            }
        }

        let mut x = inner.origin.x;
        sizes
            .into_iter()
            .map(|s| {
                let y = self.0.cross_align.offset(inner.origin.y, inner.size.y, s.y);
                let r = Rect::new(x, y, s.x, s.y);
                x += s.x + self.0.spacing;
                r
            })
            .collect()
    }
}

impl Widget for Row {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let inner_h = (constraints.max.y - self.0.padding.v()).max(0.0);
        let child_c = self.child_constraints(inner_h);

        let mut total_w = self.0.padding.h() + self.0.gaps();
        let mut max_child_h: f32 = 0.0;
        let mut has_spacer = false;
        for child in &self.0.children {
            let s = child.measure(child_c, ctx);
            has_spacer |= s == Vec2::zero();
            total_w += s.x;
            max_child_h = max_child_h.max(s.y);
        }

        // A row with spacers claims all the width it is offered.
        if has_spacer && constraints.max.x.is_finite() {
            total_w = constraints.max.x;
        }
        let h = if self.0.cross_align == Align::Stretch && constraints.max.y.is_finite() {
            constraints.max.y.min(max_child_h + self.0.padding.v())
        } else {
            max_child_h + self.0.padding.v()
        };
        constraints.constrain(Vec2::new(total_w, h))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let ctx = painter.layout_ctx();
        let rects = self.layout(rect, &ctx);
        for (child, r) in self.0.children.iter().zip(rects) {
            child.paint(painter, r);
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        let rects = self.layout(rect, ctx);
        for (child, r) in self.0.children.iter_mut().zip(rects) {
            if child.on_event(event, r, ctx).is_consumed() {
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }
}
