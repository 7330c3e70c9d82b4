//! The application's screens.

mod loading;
mod main_menu;
mod map_editor;
mod theme;
mod tileset_editor;

use maniac_ui::desktop::Desktop;
use maniac_ui::mode::{Mode, ModeError};

use crate::catalog::Catalog;

pub use loading::LoadingMode;
pub use main_menu::MainMenuMode;
pub use map_editor::MapEditorMode;
pub use tileset_editor::TilesetEditorMode;

pub const LOADING: &str = "loading";
pub const MAIN_MENU: &str = "main_menu";
pub const MAP_EDITOR: &str = "map_editor";
pub const TILESET_EDITOR: &str = "tileset_editor";

/// Deferred actions raised by widget callbacks and background work.
#[derive(Debug)]
pub enum UiCommand {
    SwitchMode(&'static str),
    Quit,
    NewTileset,
    OpenTilesetSelector,
    CloseTilesetSelector,
    /// Load the tileset with this unique name.
    LoadTileset(String),
    CatalogReady(Catalog),
}

pub type Commands = maniac_ui::command::CommandQueue<UiCommand>;

/// The closed set of modes the app switches between.
pub enum AppMode {
    Loading(LoadingMode),
    MainMenu(MainMenuMode),
    MapEditor(MapEditorMode),
    TilesetEditor(TilesetEditorMode),
}

macro_rules! each_mode {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AppMode::Loading($m) => $body,
            AppMode::MainMenu($m) => $body,
            AppMode::MapEditor($m) => $body,
            AppMode::TilesetEditor($m) => $body,
        }
    };
}

impl Mode for AppMode {
    fn enable(&mut self, desktop: &mut Desktop) -> Result<(), ModeError> {
        each_mode!(self, m => m.enable(desktop))
    }

    fn disable(&mut self, desktop: &mut Desktop) {
        each_mode!(self, m => m.disable(desktop))
    }

    fn is_enabled(&self) -> bool {
        each_mode!(self, m => m.is_enabled())
    }

    fn frame_synced(&mut self) {
        each_mode!(self, m => m.frame_synced())
    }

    fn frame_unsynced(&mut self, dt: f32) {
        each_mode!(self, m => m.frame_unsynced(dt))
    }
}
