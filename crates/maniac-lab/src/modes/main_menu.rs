use maniac_ui::prelude::*;

use super::{theme, Commands, UiCommand, MAP_EDITOR, TILESET_EDITOR};

pub struct MainMenuMode {
    roots: ModeRoots,
}

impl MainMenuMode {
    pub fn new(commands: &Commands) -> Self {
        let menu = Column::new()
            .spacing(12.0)
            .child(theme::inert_button("Select profile"))
            .child(theme::inert_button("Continue playing"))
            .child(
                Row::new()
                    .child(theme::command_button("Map editor", commands, || UiCommand::SwitchMode(MAP_EDITOR)))
                    .child(Spacer::flex())
                    .child(theme::command_button("Tileset editor", commands, || {
                        UiCommand::SwitchMode(TILESET_EDITOR)
                    })),
            )
            .child(theme::command_button("Quit", commands, || UiCommand::Quit));

        let mut roots = ModeRoots::new();
        roots.add_root(
            Column::new()
                .cross_align(Align::Center)
                .padding(Edges { top: 80.0, ..Edges::default() })
                .spacing(8.0)
                .child(theme::label("ManiacLab", theme::TITLE_SIZE))
                .child(Text::new("◀ main menu ▶", theme::BODY_SIZE, theme::dim_text_color()))
                .child(Spacer::fixed(1.0, 24.0))
                .child(Container::new().width(400.0).padding_all(16.0).background(theme::panel_color()).child(menu)),
        );
        Self { roots }
    }
}

impl Mode for MainMenuMode {
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
