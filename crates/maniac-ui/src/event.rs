use maniac_engine::coords::Vec2;
use maniac_engine::input::{ElementState, InputEvent, Key, Modifiers, MouseButton};

/// Input events routed through the widget tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Primary mouse button pressed at `pos`.
    Click { pos: Vec2 },
    /// Pointer moved to `pos`.
    Hover { pos: Vec2 },
    KeyPress { key: Key, modifiers: Modifiers },
    /// Wheel motion in lines; positive moves the view further down.
    ScrollWheel { delta: f32 },
}

impl UiEvent {
    /// Widget-level view of a raw input event, if it has one.
    pub fn from_input(ev: &InputEvent) -> Option<UiEvent> {
        match ev {
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                x,
                y,
            } => Some(UiEvent::Click { pos: Vec2::new(*x, *y) }),
            InputEvent::PointerMoved { x, y } => Some(UiEvent::Hover { pos: Vec2::new(*x, *y) }),
            InputEvent::Key { key, state: ElementState::Pressed, modifiers, .. } => {
                Some(UiEvent::KeyPress { key: *key, modifiers: *modifiers })
            }
            InputEvent::Wheel { lines } => Some(UiEvent::ScrollWheel { delta: -*lines }),
            _ => None,
        }
    }
}

/// Result returned by [`Widget::on_event`](crate::widget::Widget::on_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Handled; stop routing.
    Consumed,
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_press_becomes_click() {
        let ev = InputEvent::mouse_pressed(MouseButton::Left, 3.0, 4.0);
        assert_eq!(UiEvent::from_input(&ev), Some(UiEvent::Click { pos: Vec2::new(3.0, 4.0) }));
    }

    #[test]
    fn releases_and_other_buttons_are_dropped() {
        let release = InputEvent::PointerButton {
            button: MouseButton::Left,
            state: ElementState::Released,
            x: 0.0,
            y: 0.0,
        };
        assert_eq!(UiEvent::from_input(&release), None);
        assert_eq!(UiEvent::from_input(&InputEvent::mouse_pressed(MouseButton::Right, 0.0, 0.0)), None);
    }
}
