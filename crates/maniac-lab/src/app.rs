//! The ManiacLab application: wires modes, input, the scheduler, the
//! simulation and the two compositors together.

use std::sync::Arc;

use anyhow::Result;
use maniac_engine::compositor::{GpuCompositorBackend, SurfaceCompositor};
use maniac_engine::core::{App, AppControl, FrameCtx};
use maniac_engine::coords::{Rect, Vec2};
use maniac_engine::input::{InputEvent, Key, MouseButton};
use maniac_engine::paint::Color;
use maniac_engine::text::FontSystem;
use maniac_engine::time::{FrameScheduler, FrameSteps, StepPhase};
use maniac_ui::prelude::*;

use crate::catalog::{Catalog, CatalogScanner};
use crate::config::AppConfig;
use crate::level::{Level, Simulation};
use crate::modes::{
    AppMode, Commands, LoadingMode, MainMenuMode, MapEditorMode, TilesetEditorMode, UiCommand, LOADING,
    MAIN_MENU, MAP_EDITOR, TILESET_EDITOR,
};
use crate::tileset::{JsonHeaderCodec, TilesetCodec, TilesetInfo, TilesetParseError};
use crate::vfs::{DirVfs, Vfs};

/// Shortcuts handled before widgets see the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    ToggleRunning,
    ToggleDebugOverlay,
    TestObject,
    TestStamp,
    DebugOutput,
}

fn default_bindings() -> InputRouter<GlobalAction> {
    let mut router = InputRouter::new();
    router.bind_global(Trigger::Key(Key::Enter), GlobalAction::ToggleRunning);
    router.bind_global(Trigger::Key(Key::F1), GlobalAction::ToggleDebugOverlay);
    router.bind_for_mode(MAP_EDITOR, Trigger::Key(Key::O), GlobalAction::TestObject);
    router.bind_for_mode(MAP_EDITOR, Trigger::Key(Key::S), GlobalAction::TestStamp);
    router.bind_for_mode(MAP_EDITOR, Trigger::Mouse(MouseButton::Middle), GlobalAction::DebugOutput);
    router
}

const STAMP_AT: (u32, u32) = (44, 24);

// ── Lab ───────────────────────────────────────────────────────────────────

/// Everything except the GPU surfaces. Owned by [`ManiacLab`], split out so
/// the application logic runs without a window.
pub struct Lab {
    config: AppConfig,
    fonts: FontSystem,
    desktop: Desktop,
    modes: ModeController<AppMode>,
    router: InputRouter<GlobalAction>,
    commands: Commands,
    scheduler: FrameScheduler,
    level: Box<dyn Simulation>,
    vfs: Arc<dyn Vfs>,
    codec: Arc<dyn TilesetCodec>,
    scanner: CatalogScanner,
    catalog: Catalog,
    show_debug_overlay: bool,
    last_fault: Option<String>,
    quit: bool,
}

impl Lab {
    pub fn new(config: AppConfig) -> Result<Self> {
        let vfs: Arc<dyn Vfs> = Arc::new(DirVfs::new(config.data_root.clone()));
        Self::with_vfs(config, vfs)
    }

    pub fn with_vfs(config: AppConfig, vfs: Arc<dyn Vfs>) -> Result<Self> {
        let mut fonts = FontSystem::new();
        match config.load_font() {
            Some(bytes) => {
                if let Err(err) = fonts.load_font(&bytes) {
                    log::warn!("UI font rejected: {err}");
                }
            }
            None => log::warn!("no UI font found; text will not render"),
        }

        let commands = Commands::new();
        let mut modes = ModeController::new();
        modes.register(LOADING, AppMode::Loading(LoadingMode::new()))?;
        modes.register(MAIN_MENU, AppMode::MainMenu(MainMenuMode::new(&commands)))?;
        modes.register(MAP_EDITOR, AppMode::MapEditor(MapEditorMode::new(&commands)))?;
        modes.register(TILESET_EDITOR, AppMode::TilesetEditor(TilesetEditorMode::new(&commands)))?;

        let (w, h) = config.window_size;
        let mut desktop = Desktop::new(Rect::from_size(w as f32, h as f32));
        modes.switch_to(LOADING, &mut desktop)?;

        let codec: Arc<dyn TilesetCodec> = Arc::new(JsonHeaderCodec);
        let (lw, lh) = config.level_size;
        let mut lab = Self {
            fonts,
            desktop,
            modes,
            router: default_bindings(),
            commands,
            scheduler: FrameScheduler::new(config.scheduler.clone()),
            level: Box::new(Level::create(lw, lh, config.threaded_simulation)),
            scanner: CatalogScanner::new(Arc::clone(&vfs), Arc::clone(&codec)),
            vfs,
            codec,
            catalog: Catalog::new(),
            show_debug_overlay: false,
            last_fault: None,
            quit: false,
            config,
        };
        lab.start_catalog_scan();
        Ok(lab)
    }

    fn start_catalog_scan(&mut self) {
        let dir = self.config.tileset_dir.clone();
        if let Some(AppMode::Loading(loading)) = self.modes.get(LOADING) {
            loading.set_current_task(format!("Looking for tilesets in {dir}"));
        }
        let commands = self.commands.clone();
        self.scanner.scan(dir, move |catalog| commands.push(UiCommand::CatalogReady(catalog)));
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Routes one input event: global shortcuts first, the desktop otherwise.
    pub fn handle_input(&mut self, event: &InputEvent) {
        match self.router.route(event, self.modes.active_name()) {
            Routed::Global(action) => self.run_action(action, event),
            Routed::Suppressed => {}
            Routed::PassThrough => {
                if let Some(ui) = UiEvent::from_input(event) {
                    self.desktop.dispatch(&ui, &LayoutCtx::new(&self.fonts));
                }
            }
        }
    }

    fn run_action(&mut self, action: GlobalAction, event: &InputEvent) {
        match action {
            GlobalAction::ToggleRunning => {
                self.scheduler.toggle_running();
            }
            GlobalAction::ToggleDebugOverlay => {
                self.show_debug_overlay = !self.show_debug_overlay;
                log::info!("thread region overlay {}", if self.show_debug_overlay { "on" } else { "off" });
            }
            GlobalAction::TestObject => self.level.debug_test_object(),
            GlobalAction::TestStamp => self.level.debug_test_stamp(STAMP_AT.0, STAMP_AT.1),
            GlobalAction::DebugOutput => {
                if let InputEvent::PointerButton { x, y, .. } = event {
                    let cell = self.view_to_cell(Vec2::new(*x, *y));
                    self.level.debug_output(cell.x, cell.y);
                }
            }
        }
    }

    /// Maps a point on the simulation view to level cell coordinates.
    fn view_to_cell(&self, p: Vec2) -> Vec2 {
        let view = self.desktop.absolute_rect();
        let (w, h) = self.level.size();
        Vec2::new(
            (p.x - view.origin.x) / view.size.x.max(1.0) * w as f32,
            (p.y - view.origin.y) / view.size.y.max(1.0) * h as f32,
        )
    }

    // ── commands ──────────────────────────────────────────────────────────

    /// Applies queued UI commands and delivers a finished catalog scan.
    pub fn update(&mut self) {
        self.apply_commands();
        if self.scanner.poll() {
            self.apply_commands();
        }
    }

    fn apply_commands(&mut self) {
        for command in self.commands.drain() {
            match command {
                UiCommand::SwitchMode(name) => {
                    if let Err(err) = self.modes.switch_to(name, &mut self.desktop) {
                        log::error!("{err}");
                    }
                }
                UiCommand::Quit => self.quit = true,
                UiCommand::NewTileset => {
                    if let Some(editor) = self.tileset_editor() {
                        editor.new_tileset();
                    }
                }
                UiCommand::OpenTilesetSelector => {
                    if let Some(AppMode::TilesetEditor(editor)) = self.modes.get_mut(TILESET_EDITOR) {
                        editor.open_selector(&mut self.desktop);
                    }
                }
                UiCommand::CloseTilesetSelector => {
                    if let Some(AppMode::TilesetEditor(editor)) = self.modes.get_mut(TILESET_EDITOR) {
                        editor.close_selector(&mut self.desktop);
                    }
                }
                UiCommand::LoadTileset(name) => self.load_tileset(&name),
                UiCommand::CatalogReady(catalog) => self.catalog_ready(catalog),
            }
        }
    }

    fn tileset_editor(&mut self) -> Option<&mut TilesetEditorMode> {
        match self.modes.get_mut(TILESET_EDITOR) {
            Some(AppMode::TilesetEditor(editor)) => Some(editor),
            _ => None,
        }
    }

    fn catalog_ready(&mut self, catalog: Catalog) {
        if let Some(AppMode::TilesetEditor(editor)) = self.modes.get_mut(TILESET_EDITOR) {
            editor.set_catalog(&mut self.desktop, &catalog);
        }
        self.catalog = catalog;

        if self.modes.active_name() == Some(LOADING) {
            if let Err(err) = self.modes.switch_to(MAIN_MENU, &mut self.desktop) {
                log::error!("{err}");
            }
        }
    }

    fn read_tileset(&self, name: &str) -> Result<TilesetInfo, TilesetParseError> {
        let entry = self
            .catalog()
            .get(name)
            .ok_or_else(|| TilesetParseError::Open(crate::vfs::VfsError::NotFound(name.to_string())))?;
        let mut stream = self.vfs.open(&entry.location)?;
        self.codec.parse_metadata(&mut stream)
    }

    fn load_tileset(&mut self, name: &str) {
        let loaded = self.read_tileset(name);
        let desktop = &mut self.desktop;
        let Some(AppMode::TilesetEditor(editor)) = self.modes.get_mut(TILESET_EDITOR) else {
            return;
        };
        match loaded {
            Ok(info) => {
                log::info!("loaded tileset `{}`", info.unique_name);
                editor.set_current(info);
                editor.close_selector(desktop);
            }
            Err(err) => log::error!("cannot load tileset `{name}`: {err}"),
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn active_mode(&self) -> Option<&str> {
        self.modes.active_name()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.desktop.set_absolute_rect(rect);
    }

    /// The most recent step fault, as `"<phase>: <error>"`.
    pub fn last_fault(&self) -> Option<&str> {
        self.last_fault.as_deref()
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Runs one scheduler tick. `present` draws the frame once the synced
    /// steps are done; its result is returned.
    pub fn run_frame<P>(&mut self, dt: f32, present: P) -> AppControl
    where
        P: FnMut(FrameView<'_>) -> AppControl,
    {
        self.refresh_status();

        let mut driver = FrameDriver {
            level: self.level.as_mut(),
            modes: &mut self.modes,
            desktop: &self.desktop,
            fonts: &self.fonts,
            debug_overlay: self.show_debug_overlay,
            present,
            control: AppControl::Continue,
        };
        let last_fault = &mut self.last_fault;
        self.scheduler.tick(dt, &mut driver, &mut |phase: StepPhase, err: anyhow::Error| {
            *last_fault = Some(format!("{phase:?}: {err:#}"));
        });
        driver.control
    }

    fn refresh_status(&mut self) {
        let ticks = self.level.ticks();
        let running = self.is_running();
        let fault = self.last_fault.as_deref();
        if let Some(AppMode::MapEditor(editor)) = self.modes.get_mut(MAP_EDITOR) {
            editor.set_status(ticks, running, fault);
        }
    }
}

// ── frame pipeline ────────────────────────────────────────────────────────

/// The two compositors: the simulation view and the UI chrome above it.
struct Surfaces {
    sim: SurfaceCompositor<GpuCompositorBackend>,
    ui: SurfaceCompositor<GpuCompositorBackend>,
}

impl Surfaces {
    fn new(ctx: &FrameCtx<'_, '_>, width: u32, height: u32, scale: f32) -> Result<Self> {
        let device = ctx.gpu.device();
        let queue = ctx.gpu.queue();
        let mut sim = SurfaceCompositor::new(
            "simulation",
            GpuCompositorBackend::new(device, queue, "simulation"),
            width,
            height,
        )?;
        let mut ui = SurfaceCompositor::new("ui", GpuCompositorBackend::new(device, queue, "ui"), width, height)?;
        sim.set_scale_factor(scale);
        ui.set_scale_factor(scale);
        Ok(Self { sim, ui })
    }

    fn resize(&mut self, width: u32, height: u32, scale: f32) -> Result<()> {
        for surface in [&mut self.sim, &mut self.ui] {
            surface.resize(width, height)?;
            surface.set_scale_factor(scale);
        }
        Ok(())
    }
}

/// What the presenter gets to draw from.
pub struct FrameView<'f> {
    pub level: &'f dyn Simulation,
    pub desktop: &'f Desktop,
    pub fonts: &'f FontSystem,
    pub debug_overlay: bool,
}

/// Borrows what one scheduler tick needs.
struct FrameDriver<'f, P> {
    level: &'f mut dyn Simulation,
    modes: &'f mut ModeController<AppMode>,
    desktop: &'f Desktop,
    fonts: &'f FontSystem,
    debug_overlay: bool,
    present: P,
    control: AppControl,
}

impl<P> FrameSteps for FrameDriver<'_, P>
where
    P: FnMut(FrameView<'_>) -> AppControl,
{
    fn synced_step(&mut self) -> anyhow::Result<()> {
        self.level.advance()?;
        self.modes.frame_synced();
        Ok(())
    }

    fn unsynced_step(&mut self, dt: f32) -> anyhow::Result<()> {
        self.modes.frame_unsynced(dt);
        self.control = (self.present)(FrameView {
            level: &*self.level,
            desktop: self.desktop,
            fonts: self.fonts,
            debug_overlay: self.debug_overlay,
        });
        Ok(())
    }
}

// ── App ───────────────────────────────────────────────────────────────────

pub struct ManiacLab {
    lab: Lab,
    surfaces: Option<Surfaces>,
    /// Physical size and scale of the drawable.
    drawable: (u32, u32, f32),
    fatal: bool,
}

impl ManiacLab {
    pub fn new(config: AppConfig) -> Result<Self> {
        let (w, h) = config.window_size;
        Ok(Self { lab: Lab::new(config)?, surfaces: None, drawable: (w as u32, h as u32, 1.0), fatal: false })
    }

    fn ensure_surfaces(&mut self, ctx: &FrameCtx<'_, '_>) -> bool {
        if self.surfaces.is_some() {
            return true;
        }
        let (w, h, scale) = self.drawable;
        match Surfaces::new(ctx, w, h, scale) {
            Ok(surfaces) => {
                self.surfaces = Some(surfaces);
                true
            }
            Err(err) => {
                log::error!("cannot create presentation surfaces: {err:#}");
                false
            }
        }
    }
}

impl App for ManiacLab {
    fn on_resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.drawable = (width, height, scale_factor);
        let scale = scale_factor.max(f32::EPSILON);
        self.lab.set_viewport(Rect::from_size(width as f32 / scale, height as f32 / scale));

        if let Some(surfaces) = &mut self.surfaces {
            if let Err(err) = surfaces.resize(width, height, scale_factor) {
                log::error!("compositor resize failed: {err:#}");
                self.fatal = true;
            }
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.fatal {
            return AppControl::Exit;
        }

        for event in ctx.input_frame.take_events() {
            self.lab.handle_input(&event);
        }
        self.lab.update();
        if self.lab.should_quit() {
            return AppControl::Exit;
        }

        if !self.ensure_surfaces(ctx) {
            return AppControl::Exit;
        }
        let Some(surfaces) = self.surfaces.as_mut() else {
            return AppControl::Exit;
        };

        let pointer = ctx.input.pointer_pos.map(|(x, y)| Vec2::new(x, y));
        let pressed = ctx.input.button_down(MouseButton::Left);
        let dt = ctx.time.dt;

        // Drawing marks both surfaces dirty; no separate invalidation step.
        self.lab.run_frame(dt, |view| {
            ctx.render(Color::black(), |_rctx, target| {
                surfaces.sim.present(target, view.fonts, |canvas| {
                    view.level.render_into(canvas, view.debug_overlay)
                });
                surfaces.ui.present(target, view.fonts, |canvas| {
                    let mut painter = Painter::new(canvas, pointer, pressed);
                    view.desktop.paint(&mut painter);
                });
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::vfs::MemoryVfs;
    use maniac_engine::input::{ElementState, Modifiers};

    fn lab() -> Lab {
        let vfs = MemoryVfs::new()
            .with_file("tilesets/lab.tileset", r#"{"unique_name":"lab","display_name":"Laboratory"}"#)
            .with_file("tilesets/broken.tileset", "garbage");
        let config = AppConfig { font_candidates: Vec::new(), ..AppConfig::default() };
        Lab::with_vfs(config, Arc::new(vfs)).unwrap()
    }

    fn wait_for_catalog(lab: &mut Lab) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while lab.active_mode() == Some(LOADING) {
            lab.update();
            assert!(Instant::now() < deadline, "catalog scan did not finish");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn starts_loading_then_shows_main_menu() {
        let mut lab = lab();
        assert_eq!(lab.active_mode(), Some(LOADING));
        wait_for_catalog(&mut lab);
        assert_eq!(lab.active_mode(), Some(MAIN_MENU));
        assert_eq!(lab.catalog().keys().collect::<Vec<_>>(), vec!["lab"]);
    }

    #[test]
    fn enter_toggles_simulation() {
        let mut lab = lab();
        assert!(!lab.is_running());
        lab.handle_input(&InputEvent::key_pressed(Key::Enter));
        assert!(lab.is_running());
        lab.handle_input(&InputEvent::Key {
            key: Key::Enter,
            state: ElementState::Released,
            modifiers: Modifiers::default(),
            repeat: false,
        });
        assert!(lab.is_running());
        lab.handle_input(&InputEvent::key_pressed(Key::Enter));
        assert!(!lab.is_running());
    }

    #[test]
    fn f1_toggles_overlay() {
        let mut lab = lab();
        lab.handle_input(&InputEvent::key_pressed(Key::F1));
        assert!(lab.show_debug_overlay);
        lab.handle_input(&InputEvent::key_pressed(Key::F1));
        assert!(!lab.show_debug_overlay);
    }

    #[test]
    fn commands_switch_modes_and_quit() {
        let mut lab = lab();
        wait_for_catalog(&mut lab);
        lab.commands.push(UiCommand::SwitchMode(MAP_EDITOR));
        lab.update();
        assert_eq!(lab.active_mode(), Some(MAP_EDITOR));

        lab.commands.push(UiCommand::Quit);
        lab.update();
        assert!(lab.should_quit());
    }

    #[test]
    fn tileset_selection_loads_metadata() {
        let mut lab = lab();
        wait_for_catalog(&mut lab);
        lab.commands.push(UiCommand::SwitchMode(TILESET_EDITOR));
        lab.commands.push(UiCommand::OpenTilesetSelector);
        lab.update();
        assert!(lab.tileset_editor().unwrap().is_selector_open());

        lab.commands.push(UiCommand::LoadTileset("lab".into()));
        lab.update();
        let editor = lab.tileset_editor().unwrap();
        assert_eq!(editor.current().map(|i| i.display_name.as_str()), Some("Laboratory"));
        assert!(!editor.is_selector_open());
    }

    #[test]
    fn unknown_tileset_keeps_selector_open() {
        let mut lab = lab();
        wait_for_catalog(&mut lab);
        lab.commands.push(UiCommand::SwitchMode(TILESET_EDITOR));
        lab.commands.push(UiCommand::OpenTilesetSelector);
        lab.commands.push(UiCommand::LoadTileset("missing".into()));
        lab.update();
        let editor = lab.tileset_editor().unwrap();
        assert!(editor.current().is_none());
        assert!(editor.is_selector_open());
    }

    #[test]
    fn map_editor_hotkeys_only_in_map_editor() {
        let mut lab = lab();
        wait_for_catalog(&mut lab);
        let stamp = InputEvent::key_pressed(Key::S);
        assert_eq!(lab.router.route(&stamp, lab.modes.active_name()), Routed::PassThrough);

        lab.commands.push(UiCommand::SwitchMode(MAP_EDITOR));
        lab.update();
        assert_eq!(
            lab.router.route(&stamp, lab.modes.active_name()),
            Routed::Global(GlobalAction::TestStamp)
        );
    }

    #[test]
    fn view_coordinates_map_to_cells() {
        let mut lab = lab();
        lab.set_viewport(Rect::from_size(500.0, 500.0));
        assert_eq!(lab.view_to_cell(Vec2::new(250.0, 100.0)), Vec2::new(25.0, 10.0));
    }

    struct DivergingSim;

    impl Simulation for DivergingSim {
        fn advance(&mut self) -> anyhow::Result<()> {
            anyhow::bail!("cell (3, 4) diverged")
        }
        fn render_into(&self, _canvas: &mut maniac_engine::compositor::Canvas<'_>, _debug_overlay: bool) {}
        fn size(&self) -> (u32, u32) {
            (10, 10)
        }
        fn ticks(&self) -> u64 {
            7
        }
        fn debug_test_object(&mut self) {}
        fn debug_test_stamp(&mut self, _x: u32, _y: u32) {}
        fn debug_output(&self, _x: f32, _y: f32) {}
    }

    #[test]
    fn running_frame_advances_then_presents_once() {
        let mut lab = lab();
        lab.handle_input(&InputEvent::key_pressed(Key::Enter));

        let mut seen = Vec::new();
        let control = lab.run_frame(0.016, |view| {
            seen.push(view.level.ticks());
            AppControl::Continue
        });
        assert_eq!(control, AppControl::Continue);
        assert_eq!(seen, vec![1]);
        assert_eq!(lab.last_fault(), None);
    }

    #[test]
    fn presenter_result_is_returned() {
        let mut lab = lab();
        assert_eq!(lab.run_frame(0.016, |_| AppControl::Exit), AppControl::Exit);
    }

    #[test]
    fn simulation_fault_is_kept_and_frame_still_presents() {
        let mut lab = lab();
        wait_for_catalog(&mut lab);
        lab.commands.push(UiCommand::SwitchMode(MAP_EDITOR));
        lab.update();
        lab.level = Box::new(DivergingSim);
        lab.handle_input(&InputEvent::key_pressed(Key::Enter));

        let mut presented = 0;
        lab.run_frame(0.016, |_| {
            presented += 1;
            AppControl::Continue
        });
        assert_eq!(presented, 1);
        assert_eq!(lab.last_fault(), Some("Synced: cell (3, 4) diverged"));

        lab.run_frame(0.016, |_| AppControl::Continue);
        let Some(AppMode::MapEditor(editor)) = lab.modes.get(MAP_EDITOR) else {
            panic!("map editor is registered");
        };
        assert_eq!(editor.status_line(), "tick 7 (running)  last fault: Synced: cell (3, 4) diverged");
    }
}
