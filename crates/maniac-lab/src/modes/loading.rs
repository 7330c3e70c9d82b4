use std::cell::RefCell;
use std::rc::Rc;

use maniac_ui::prelude::*;

use super::theme;

/// Startup screen shown while the tileset catalog is scanned.
pub struct LoadingMode {
    roots: ModeRoots,
    task: SharedText,
}

impl LoadingMode {
    pub fn new() -> Self {
        let task: SharedText = Rc::new(RefCell::new("...".into()));
        let mut roots = ModeRoots::new();
        roots.add_root(
            Column::new()
                .cross_align(Align::Center)
                .padding(Edges { top: 120.0, ..Edges::default() })
                .child(theme::label("ManiacLab", theme::TITLE_SIZE))
                .child(Spacer::fixed(1.0, 40.0))
                .child(theme::label("Loading", theme::BODY_SIZE))
                .child(Spacer::fixed(1.0, 8.0))
                .child(Text::shared(task.clone(), theme::BODY_SIZE, theme::dim_text_color())),
        );
        Self { roots, task }
    }

    /// Updates the line under "Loading".
    pub fn set_current_task(&self, text: impl Into<String>) {
        *self.task.borrow_mut() = text.into();
    }
}

impl Mode for LoadingMode {
    fn enable(&mut self, desktop: &mut Desktop) -> Result<(), ModeError> {
        self.roots.enable(desktop)
    }

    fn disable(&mut self, desktop: &mut Desktop) {
        self.roots.disable(desktop);
    }

    fn is_enabled(&self) -> bool {
        self.roots.is_enabled()
    }
}
