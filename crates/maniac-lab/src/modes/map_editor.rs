use std::cell::RefCell;
use std::rc::Rc;

use maniac_ui::prelude::*;

use super::{theme, Commands, UiCommand, MAIN_MENU};

/// The level view with a menu bar on top. The level itself is painted by
/// the simulation surface underneath the chrome.
pub struct MapEditorMode {
    roots: ModeRoots,
    info: SharedText,
    ticks: u64,
    running: bool,
    fault: Option<String>,
    fps: FpsCounter,
}

impl MapEditorMode {
    pub fn new(commands: &Commands) -> Self {
        let info: SharedText = Rc::new(RefCell::new(String::new()));
        let mut roots = ModeRoots::new();
        roots.add_root(
            Column::new().child(theme::menu_bar(
                Row::new()
                    .child(theme::inert_button("New map"))
                    .child(theme::inert_button("Open…"))
                    .child(theme::inert_button("Save"))
                    .child(theme::command_button("Back to main menu", commands, || {
                        UiCommand::SwitchMode(MAIN_MENU)
                    }))
                    .child(Spacer::flex())
                    .child(Text::shared(info.clone(), theme::BODY_SIZE, theme::text_color())),
            )),
        );
        let mut mode = Self { roots, info, ticks: 0, running: false, fault: None, fps: FpsCounter::default() };
        mode.refresh();
        mode
    }

    /// Simulation state shown in the status label.
    pub fn set_status(&mut self, ticks: u64, running: bool, fault: Option<&str>) {
        self.ticks = ticks;
        self.running = running;
        self.fault = fault.map(str::to_string);
        self.refresh();
    }

    #[cfg(test)]
    pub(crate) fn status_line(&self) -> String {
        self.info.borrow().clone()
    }

    fn refresh(&mut self) {
        let state = if self.running { "running" } else { "paused" };
        let mut line = format!("tick {} ({state})", self.ticks);
        if let Some(fps) = self.fps.rate() {
            line.push_str(&format!("  {fps:.0} fps"));
        }
        if let Some(fault) = &self.fault {
            line.push_str(&format!("  last fault: {fault}"));
        }
        *self.info.borrow_mut() = line;
    }
}

/// Frames per second, averaged over roughly one second.
#[derive(Debug, Default)]
struct FpsCounter {
    frames: u32,
    elapsed: f32,
    rate: Option<f32>,
}

impl FpsCounter {
    const WINDOW: f32 = 1.0;

    /// Counts one frame; returns true when the rate was recomputed.
    fn frame(&mut self, dt: f32) -> bool {
        self.frames += 1;
        self.elapsed += dt.max(0.0);
        if self.elapsed < Self::WINDOW {
            return false;
        }
        self.rate = Some(self.frames as f32 / self.elapsed);
        self.frames = 0;
        self.elapsed = 0.0;
        true
    }

    fn rate(&self) -> Option<f32> {
        self.rate
    }
}

impl Mode for MapEditorMode {
    fn enable(&mut self, desktop: &mut Desktop) -> Result<(), ModeError> {
        self.fps = FpsCounter::default();
        self.roots.enable(desktop)
    }

    fn disable(&mut self, desktop: &mut Desktop) {
        self.roots.disable(desktop);
    }

    fn is_enabled(&self) -> bool {
        self.roots.is_enabled()
    }

    fn frame_unsynced(&mut self, dt: f32) {
        if self.fps.frame(dt) {
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode() -> MapEditorMode {
        MapEditorMode::new(&Commands::new())
    }

    #[test]
    fn status_shows_ticks_and_state() {
        let mut mode = mode();
        assert_eq!(*mode.info.borrow(), "tick 0 (paused)");
        mode.set_status(42, true, None);
        assert_eq!(*mode.info.borrow(), "tick 42 (running)");
    }

    #[test]
    fn status_shows_last_fault() {
        let mut mode = mode();
        mode.set_status(3, true, Some("Synced: boom"));
        assert_eq!(*mode.info.borrow(), "tick 3 (running)  last fault: Synced: boom");
    }

    #[test]
    fn frame_rate_appears_after_a_second_of_frames() {
        let mut mode = mode();
        for _ in 0..3 {
            mode.frame_unsynced(0.25);
        }
        assert_eq!(*mode.info.borrow(), "tick 0 (paused)");
        mode.frame_unsynced(0.25);
        assert_eq!(*mode.info.borrow(), "tick 0 (paused)  4 fps");
    }
}
