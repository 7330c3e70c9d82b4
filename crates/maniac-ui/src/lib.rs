//! ManiacLab UI: a retained widget tree painted onto the compositor canvas.
//!
//! Modes own widget trees and move them onto the [`Desktop`](desktop::Desktop)
//! while they are active. The [`ModeController`](mode::ModeController) makes
//! sure only one mode is attached at a time, and the
//! [`InputRouter`](router::InputRouter) peels off global shortcuts before
//! events reach any widget.

pub mod command;
pub mod constraints;
pub mod desktop;
pub mod event;
pub mod mode;
pub mod painter;
pub mod router;
pub mod widget;
pub mod widgets;

/// Everything needed to build modes and widgets.
pub mod prelude {
    pub use crate::command::CommandQueue;
    pub use crate::constraints::{Constraints, Edges, LayoutCtx};
    pub use crate::desktop::{Desktop, Layer, WidgetId};
    pub use crate::event::{EventResult, UiEvent};
    pub use crate::mode::{Mode, ModeController, ModeError, ModeRoots, RootHandle};
    pub use crate::painter::Painter;
    pub use crate::router::{InputRouter, Routed, Trigger};
    pub use crate::widget::{Element, Widget};
    pub use crate::widgets::{
        button::Button,
        container::{Container, Spacer},
        flex::{Align, Column, Row},
        list::{List, ListSelection},
        text::{SharedText, Text},
        window::Window,
    };

    pub use maniac_engine::coords::{Rect, Vec2};
    pub use maniac_engine::paint::Color;
}
