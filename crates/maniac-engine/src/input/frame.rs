use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton};

/// Input gathered since the previous frame.
///
/// [`InputState`](super::InputState) holds what is currently down; this holds
/// the events and the press transitions of one frame. The runtime clears it
/// after every `on_frame`.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,
    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
    }

    /// Moves the buffered events out, leaving the transition sets intact.
    pub fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}
