//! Global shortcut table consulted before widgets see an event.

use std::collections::HashMap;

use maniac_engine::input::{ElementState, InputEvent, Key, MouseButton};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Trigger {
    Key(Key),
    Mouse(MouseButton),
}

/// Outcome of routing one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed<A> {
    /// A binding fired.
    Global(A),
    /// A bound trigger's release or auto-repeat; nothing fires and the
    /// widget tree does not see it.
    Suppressed,
    /// Not bound; hand the event to the active mode's widgets.
    PassThrough,
}

/// Maps key and mouse presses to actions, either globally or for one mode.
#[derive(Debug, Clone)]
pub struct InputRouter<A> {
    global: HashMap<Trigger, A>,
    per_mode: HashMap<String, HashMap<Trigger, A>>,
}

impl<A: Clone> InputRouter<A> {
    pub fn new() -> Self {
        Self { global: HashMap::new(), per_mode: HashMap::new() }
    }

    pub fn bind_global(&mut self, trigger: Trigger, action: A) {
        self.global.insert(trigger, action);
    }

    /// Binding active only while `mode` is the active mode. Shadows a global
    /// binding on the same trigger.
    pub fn bind_for_mode(&mut self, mode: impl Into<String>, trigger: Trigger, action: A) {
        self.per_mode.entry(mode.into()).or_default().insert(trigger, action);
    }

    fn lookup(&self, trigger: Trigger, active_mode: Option<&str>) -> Option<&A> {
        active_mode
            .and_then(|m| self.per_mode.get(m))
            .and_then(|table| table.get(&trigger))
            .or_else(|| self.global.get(&trigger))
    }

    pub fn route(&self, event: &InputEvent, active_mode: Option<&str>) -> Routed<A> {
        let (trigger, fires) = match event {
            InputEvent::Key { key, state, repeat, .. } => {
                (Trigger::Key(*key), *state == ElementState::Pressed && !*repeat)
            }
            InputEvent::PointerButton { button, state, .. } => {
                (Trigger::Mouse(*button), *state == ElementState::Pressed)
            }
            _ => return Routed::PassThrough,
        };

        match self.lookup(trigger, active_mode) {
            Some(action) if fires => Routed::Global(action.clone()),
            Some(_) => Routed::Suppressed,
            None => Routed::PassThrough,
        }
    }
}

impl<A: Clone> Default for InputRouter<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maniac_engine::input::Modifiers;

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        ToggleRunning,
        ToggleOverlay,
        Stamp,
    }

    fn router() -> InputRouter<Action> {
        let mut r = InputRouter::new();
        r.bind_global(Trigger::Key(Key::Enter), Action::ToggleRunning);
        r.bind_global(Trigger::Key(Key::F1), Action::ToggleOverlay);
        r.bind_for_mode("map_editor", Trigger::Key(Key::S), Action::Stamp);
        r
    }

    #[test]
    fn global_press_fires() {
        let r = router();
        assert_eq!(r.route(&InputEvent::key_pressed(Key::Enter), None), Routed::Global(Action::ToggleRunning));
    }

    #[test]
    fn unbound_passes_through() {
        let r = router();
        assert_eq!(r.route(&InputEvent::key_pressed(Key::A), Some("main_menu")), Routed::PassThrough);
        assert_eq!(r.route(&InputEvent::PointerMoved { x: 1.0, y: 1.0 }, None), Routed::PassThrough);
    }

    #[test]
    fn mode_binding_only_in_its_mode() {
        let r = router();
        let s = InputEvent::key_pressed(Key::S);
        assert_eq!(r.route(&s, Some("map_editor")), Routed::Global(Action::Stamp));
        assert_eq!(r.route(&s, Some("main_menu")), Routed::PassThrough);
    }

    #[test]
    fn mode_binding_shadows_global() {
        let mut r = router();
        r.bind_for_mode("map_editor", Trigger::Key(Key::F1), Action::Stamp);
        let f1 = InputEvent::key_pressed(Key::F1);
        assert_eq!(r.route(&f1, Some("map_editor")), Routed::Global(Action::Stamp));
        assert_eq!(r.route(&f1, None), Routed::Global(Action::ToggleOverlay));
    }

    #[test]
    fn release_and_repeat_are_suppressed() {
        let r = router();
        let release = InputEvent::Key {
            key: Key::Enter,
            state: ElementState::Released,
            modifiers: Modifiers::default(),
            repeat: false,
        };
        let repeat = InputEvent::Key {
            key: Key::Enter,
            state: ElementState::Pressed,
            modifiers: Modifiers::default(),
            repeat: true,
        };
        assert_eq!(r.route(&release, None), Routed::Suppressed);
        assert_eq!(r.route(&repeat, None), Routed::Suppressed);
    }
}
