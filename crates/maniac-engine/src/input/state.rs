use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ElementState, InputEvent, Key, Modifiers, MouseButton};

/// Current input state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    /// Pointer position in logical pixels, `None` outside the window.
    pub pointer_pos: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies `ev` to the held state and records it (plus any press
    /// transition) into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }
            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((*x, *y)),
            InputEvent::PointerLeft => self.pointer_pos = None,
            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;
                match state {
                    ElementState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    ElementState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }
            InputEvent::PointerButton { button, state, x, y } => {
                self.pointer_pos = Some((*x, *y));
                match state {
                    ElementState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    ElementState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }
            InputEvent::Wheel { .. } => {}
        }

        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_press_records_one_transition() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::key_pressed(Key::Enter));
        state.apply_event(&mut frame, InputEvent::key_pressed(Key::Enter));
        assert_eq!(frame.events.len(), 2);
        assert_eq!(frame.keys_pressed.len(), 1);
        assert!(state.key_down(Key::Enter));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::key_pressed(Key::S));
        state.apply_event(&mut frame, InputEvent::mouse_pressed(MouseButton::Left, 1.0, 2.0));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::S));
        assert!(!state.button_down(MouseButton::Left));
        assert_eq!(state.pointer_pos, Some((1.0, 2.0)));
    }
}
