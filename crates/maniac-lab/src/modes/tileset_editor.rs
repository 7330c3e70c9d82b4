use std::cell::RefCell;
use std::rc::Rc;

use maniac_ui::prelude::*;

use super::{theme, Commands, UiCommand, MAIN_MENU};
use crate::catalog::Catalog;
use crate::tileset::TilesetInfo;

const SELECTOR_WIDTH: f32 = 512.0;
const SELECTOR_HEIGHT: f32 = 384.0;

/// Tileset browser: a menu bar, the current tileset, and an "Open" window
/// listing the scanned catalog.
pub struct TilesetEditorMode {
    roots: ModeRoots,
    selector: RootHandle,
    current_label: SharedText,
    current: Option<TilesetInfo>,
    commands: Commands,
}

impl TilesetEditorMode {
    pub fn new(commands: &Commands) -> Self {
        let current_label: SharedText = Rc::new(RefCell::new("No tileset loaded".into()));
        let mut roots = ModeRoots::new();
        roots.add_root(
            Column::new()
                .spacing(16.0)
                .child(theme::menu_bar(
                    Row::new()
                        .child(theme::command_button("New", commands, || UiCommand::NewTileset))
                        .child(theme::command_button("Open…", commands, || UiCommand::OpenTilesetSelector))
                        .child(theme::command_button("Back to main menu", commands, || {
                            UiCommand::SwitchMode(MAIN_MENU)
                        }))
                        .child(Spacer::flex()),
                ))
                .child(
                    Container::new()
                        .padding(Edges::symmetric(0.0, 16.0))
                        .child(Text::shared(current_label.clone(), theme::BODY_SIZE, theme::text_color())),
                ),
        );
        let selector = roots.add_hidden_window(Self::build_selector(&Catalog::new(), commands));
        Self { roots, selector, current_label, current: None, commands: commands.clone() }
    }

    fn build_selector(catalog: &Catalog, commands: &Commands) -> Window {
        // Catalog iteration is ordered by unique name.
        let names: Rc<Vec<String>> = Rc::new(catalog.keys().cloned().collect());
        let display: Vec<String> = catalog.values().map(|e| e.display_name().to_string()).collect();
        let selection: ListSelection = Rc::new(std::cell::Cell::new(None));

        let list = {
            let names = Rc::clone(&names);
            let commands = commands.clone();
            List::new(display)
                .selection(selection.clone())
                .on_activate(move |i| {
                    if let Some(name) = names.get(i) {
                        commands.push(UiCommand::LoadTileset(name.clone()));
                    }
                })
        };

        let load = {
            let commands = commands.clone();
            Button::new(theme::label("Load", theme::BODY_SIZE))
                .background(Color::from_srgb_u8(55, 70, 100, 255))
                .hover_background(Color::from_srgb_u8(70, 90, 130, 255))
                .padding(Edges::symmetric(6.0, 12.0))
                .corner_radius(4.0)
                .on_click(move || {
                    if let Some(name) = selection.get().and_then(|i| names.get(i)) {
                        commands.push(UiCommand::LoadTileset(name.clone()));
                    }
                })
        };

        let escape = commands.clone();
        Window::new(
            "Open tileset…",
            SELECTOR_WIDTH,
            SELECTOR_HEIGHT,
            Column::new()
                .padding_all(8.0)
                .spacing(8.0)
                .child(Container::new().min_size(0.0, SELECTOR_HEIGHT - 100.0).child(list))
                .child(
                    Row::new()
                        .spacing(8.0)
                        .child(Spacer::flex())
                        .child(theme::command_button("Cancel", commands, || UiCommand::CloseTilesetSelector))
                        .child(load),
                ),
        )
        .on_escape(move || escape.push(UiCommand::CloseTilesetSelector))
    }

    /// Rebuilds the selector from a freshly scanned catalog.
    pub fn set_catalog(&mut self, desktop: &mut Desktop, catalog: &Catalog) {
        let window = Self::build_selector(catalog, &self.commands);
        self.roots.replace(desktop, self.selector, window);
    }

    pub fn open_selector(&mut self, desktop: &mut Desktop) {
        self.roots.open_window(desktop, self.selector);
    }

    pub fn close_selector(&mut self, desktop: &mut Desktop) {
        self.roots.close_window(desktop, self.selector);
    }

    pub fn is_selector_open(&self) -> bool {
        self.roots.widget_id(self.selector).is_some()
    }

    /// Makes `info` the tileset being edited.
    pub fn set_current(&mut self, info: TilesetInfo) {
        *self.current_label.borrow_mut() = format!("{} ({})", info.display_name, info.unique_name);
        self.current = Some(info);
    }

    pub fn new_tileset(&mut self) {
        *self.current_label.borrow_mut() = "Untitled tileset".into();
        self.current = None;
    }

    pub fn current(&self) -> Option<&TilesetInfo> {
        self.current.as_ref()
    }
}

impl Mode for TilesetEditorMode {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use maniac_engine::input::{Key, Modifiers};
    use maniac_engine::text::FontSystem;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        for (unique, display) in [("lab", "Laboratory"), ("cave", "Cave")] {
            catalog.insert(
                unique.to_string(),
                CatalogEntry {
                    info: TilesetInfo {
                        unique_name: unique.into(),
                        display_name: display.into(),
                        description: String::new(),
                        author: String::new(),
                        license: String::new(),
                        version: 0,
                    },
                    location: format!("tilesets/{unique}.tileset"),
                },
            );
        }
        catalog
    }

    fn key(key: Key) -> UiEvent {
        UiEvent::KeyPress { key, modifiers: Modifiers::default() }
    }

    #[test]
    fn selector_lists_by_unique_name_and_loads_selection() {
        let commands = Commands::new();
        let mut desktop = Desktop::new(Rect::from_size(1024.0, 768.0));
        let mut mode = TilesetEditorMode::new(&commands);
        mode.enable(&mut desktop).unwrap();
        mode.set_catalog(&mut desktop, &catalog());
        assert!(!mode.is_selector_open());

        mode.open_selector(&mut desktop);
        assert!(mode.is_selector_open());

        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        desktop.dispatch(&key(Key::ArrowDown), &ctx);
        desktop.dispatch(&key(Key::Enter), &ctx);

        // "cave" sorts before "lab".
        match commands.drain().as_slice() {
            [UiCommand::LoadTileset(name)] => assert_eq!(name, "cave"),
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn escape_requests_close() {
        let commands = Commands::new();
        let mut desktop = Desktop::new(Rect::from_size(1024.0, 768.0));
        let mut mode = TilesetEditorMode::new(&commands);
        mode.enable(&mut desktop).unwrap();
        mode.open_selector(&mut desktop);

        let fonts = FontSystem::new();
        desktop.dispatch(&key(Key::Escape), &LayoutCtx::new(&fonts));
        assert!(matches!(commands.drain().as_slice(), [UiCommand::CloseTilesetSelector]));

        mode.close_selector(&mut desktop);
        assert!(!mode.is_selector_open());
    }

    #[test]
    fn selector_survives_mode_switches() {
        let commands = Commands::new();
        let mut desktop = Desktop::new(Rect::from_size(1024.0, 768.0));
        let mut mode = TilesetEditorMode::new(&commands);
        mode.enable(&mut desktop).unwrap();
        mode.open_selector(&mut desktop);
        mode.disable(&mut desktop);
        assert!(desktop.is_empty());

        mode.enable(&mut desktop).unwrap();
        assert!(mode.is_selector_open());
    }

    #[test]
    fn current_tileset_label() {
        let commands = Commands::new();
        let mut mode = TilesetEditorMode::new(&commands);
        let info = catalog()["lab"].info.clone();
        mode.set_current(info);
        assert_eq!(mode.current().map(|i| i.unique_name.as_str()), Some("lab"));
        assert_eq!(*mode.current_label.borrow(), "Laboratory (lab)");
        mode.new_tileset();
        assert!(mode.current().is_none());
    }
}
