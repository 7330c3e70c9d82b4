use std::cell::RefCell;
use std::rc::Rc;

use maniac_ui::prelude::*;

/// Records lifecycle calls into a shared log so ordering can be asserted.
struct Screen {
    name: &'static str,
    roots: ModeRoots,
    root: RootHandle,
    log: Rc<RefCell<Vec<String>>>,
    fail_enable: bool,
    synced: u32,
}

impl Screen {
    fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
        let mut roots = ModeRoots::new();
        let root = roots.add_root(Column::new().child(Spacer::fixed(10.0, 10.0)));
        roots.add_window(Window::new(name, 200.0, 100.0, Spacer::flex()));
        Self { name, roots, root, log: log.clone(), fail_enable: false, synced: 0 }
    }
}

impl Mode for Screen {
    fn enable(&mut self, desktop: &mut Desktop) -> Result<(), ModeError> {
        if self.fail_enable {
            self.log.borrow_mut().push(format!("enable-failed {}", self.name));
            return Err(ModeError::EnableFailed { mode: self.name.into(), reason: "broken".into() });
        }
        self.roots.enable(desktop)?;
        self.log.borrow_mut().push(format!("enable {}", self.name));
        Ok(())
    }

    fn disable(&mut self, desktop: &mut Desktop) {
        self.roots.disable(desktop);
        self.log.borrow_mut().push(format!("disable {}", self.name));
    }

    fn is_enabled(&self) -> bool {
        self.roots.is_enabled()
    }

    fn frame_synced(&mut self) {
        self.synced += 1;
    }
}

fn setup() -> (ModeController<Screen>, Desktop, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut modes = ModeController::new();
    modes.register("loading", Screen::new("loading", &log)).unwrap();
    modes.register("menu", Screen::new("menu", &log)).unwrap();
    (modes, Desktop::new(Rect::from_size(800.0, 600.0)), log)
}

#[test]
fn loading_then_menu_detaches_before_attaching() {
    let (mut modes, mut desktop, log) = setup();
    assert!(modes.active_mode().is_none());

    modes.switch_to("loading", &mut desktop).unwrap();
    assert_eq!(modes.active_name(), Some("loading"));
    assert!(desktop.take_invalidated());

    modes.switch_to("menu", &mut desktop).unwrap();
    assert_eq!(modes.active_name(), Some("menu"));
    assert_eq!(*log.borrow(), vec!["enable loading", "disable loading", "enable menu"]);

    let menu = modes.get("menu").unwrap();
    let mut expected = menu.roots.attached_ids();
    let mut attached = desktop.attached_ids(Layer::Desktop);
    attached.extend(desktop.attached_ids(Layer::Windows));
    expected.sort();
    attached.sort();
    assert_eq!(attached, expected);
    assert!(!modes.get("loading").unwrap().is_enabled());
}

#[test]
fn unknown_mode_leaves_state_alone() {
    let (mut modes, mut desktop, _log) = setup();
    modes.switch_to("loading", &mut desktop).unwrap();
    desktop.take_invalidated();

    let err = modes.switch_to("credits", &mut desktop).unwrap_err();
    assert_eq!(err, ModeError::UnknownMode("credits".into()));
    assert_eq!(modes.active_name(), Some("loading"));
    assert!(!desktop.take_invalidated());
}

#[test]
fn switching_to_active_mode_is_a_noop() {
    let (mut modes, mut desktop, log) = setup();
    modes.switch_to("menu", &mut desktop).unwrap();
    modes.switch_to("menu", &mut desktop).unwrap();
    assert_eq!(*log.borrow(), vec!["enable menu"]);
}

#[test]
fn failed_enable_restores_previous_mode() {
    let (mut modes, mut desktop, log) = setup();
    modes.switch_to("loading", &mut desktop).unwrap();
    modes.get_mut("menu").unwrap().fail_enable = true;

    let err = modes.switch_to("menu", &mut desktop).unwrap_err();
    assert!(matches!(err, ModeError::EnableFailed { .. }));
    assert_eq!(modes.active_name(), Some("loading"));
    assert_eq!(
        *log.borrow(),
        vec!["enable loading", "disable loading", "enable-failed menu", "enable loading"]
    );
    let loading = modes.get("loading").unwrap();
    assert!(desktop.is_attached(loading.roots.widget_id(loading.root).unwrap()));
}

#[test]
fn only_active_mode_is_attached_across_many_switches() {
    let (mut modes, mut desktop, _log) = setup();
    for name in ["menu", "loading", "loading", "menu", "loading"] {
        modes.switch_to(name, &mut desktop).unwrap();
        let active = modes.active_mode().unwrap();
        let mut ids = desktop.attached_ids(Layer::Desktop);
        ids.extend(desktop.attached_ids(Layer::Windows));
        assert_eq!(ids.len(), active.roots.attached_ids().len());
        assert_eq!(ids.len(), 2);
    }
}

#[test]
fn replacing_a_registered_mode_needs_no_active_mode() {
    let (mut modes, mut desktop, log) = setup();
    modes.register("menu", Screen::new("menu", &log)).unwrap();
    modes.switch_to("loading", &mut desktop).unwrap();
    let err = modes.register("menu", Screen::new("menu", &log)).unwrap_err();
    assert!(matches!(err, ModeError::InvalidTransition { .. }));
    // New names can still be added.
    modes.register("editor", Screen::new("editor", &log)).unwrap();
}

#[test]
fn frame_hooks_reach_only_the_active_mode() {
    let (mut modes, mut desktop, _log) = setup();
    modes.frame_synced();
    modes.switch_to("menu", &mut desktop).unwrap();
    modes.frame_synced();
    modes.frame_synced();
    assert_eq!(modes.get("menu").unwrap().synced, 2);
    assert_eq!(modes.get("loading").unwrap().synced, 0);
}

#[test]
fn windows_get_clicks_before_roots() {
    let (mut modes, mut desktop, _log) = setup();
    modes.switch_to("menu", &mut desktop).unwrap();
    let fonts = maniac_engine::text::FontSystem::new();
    let ctx = LayoutCtx::new(&fonts);

    // The 200x100 window is centered in 800x600.
    let inside = UiEvent::Click { pos: Vec2::new(400.0, 300.0) };
    let outside = UiEvent::Click { pos: Vec2::new(10.0, 10.0) };
    assert_eq!(desktop.dispatch(&inside, &ctx), EventResult::Consumed);
    assert_eq!(desktop.dispatch(&outside, &ctx), EventResult::Ignored);
}
