//! Exclusive application modes and the controller that switches between them.

use crate::desktop::{Desktop, Layer, WidgetId};
use crate::widget::Element;

// ── errors ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("unknown mode `{0}`")]
    UnknownMode(String),

    #[error("invalid transition: {reason}")]
    InvalidTransition { reason: String },

    #[error("mode `{mode}` failed to enable: {reason}")]
    EnableFailed { mode: String, reason: String },
}

// ── Mode ──────────────────────────────────────────────────────────────────

/// A screen that can be attached to and detached from the desktop.
///
/// On `Err` from `enable` a mode must leave nothing of its own attached.
pub trait Mode {
    fn enable(&mut self, desktop: &mut Desktop) -> Result<(), ModeError>;

    fn disable(&mut self, desktop: &mut Desktop);

    fn is_enabled(&self) -> bool;

    /// Per-simulation-step hook, called only while the mode is active.
    fn frame_synced(&mut self) {}

    /// Per-render hook, called only while the mode is active.
    fn frame_unsynced(&mut self, _dt: f32) {}
}

// ── ModeRoots ─────────────────────────────────────────────────────────────

/// Handle to an element owned by a [`ModeRoots`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RootHandle(usize);

enum Slot {
    Detached(Element),
    Attached(WidgetId),
    /// The desktop lost the element behind our back.
    Lost,
}

struct Owned {
    layer: Layer,
    slot: Slot,
    shown: bool,
}

/// The floating windows and desktop roots one mode owns.
///
/// Elements are moved into the desktop on enable and taken back on disable.
#[derive(Default)]
pub struct ModeRoots {
    owned: Vec<Owned>,
    enabled: bool,
}

impl ModeRoots {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, layer: Layer, element: Element, shown: bool) -> RootHandle {
        self.owned.push(Owned { layer, slot: Slot::Detached(element), shown });
        RootHandle(self.owned.len() - 1)
    }

    /// A full-size desktop root, attached whenever the mode is enabled.
    pub fn add_root(&mut self, element: impl Into<Element>) -> RootHandle {
        self.push(Layer::Desktop, element.into(), true)
    }

    /// A floating window attached whenever the mode is enabled.
    pub fn add_window(&mut self, element: impl Into<Element>) -> RootHandle {
        self.push(Layer::Windows, element.into(), true)
    }

    /// A floating window that stays hidden until [`open_window`](Self::open_window).
    pub fn add_hidden_window(&mut self, element: impl Into<Element>) -> RootHandle {
        self.push(Layer::Windows, element.into(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Desktop id of an attached element.
    pub fn widget_id(&self, handle: RootHandle) -> Option<WidgetId> {
        match self.owned.get(handle.0)?.slot {
            Slot::Attached(id) => Some(id),
            _ => None,
        }
    }

    /// Ids currently attached on behalf of this mode.
    pub fn attached_ids(&self) -> Vec<WidgetId> {
        self.owned
            .iter()
            .filter_map(|o| match o.slot {
                Slot::Attached(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn is_shown(&self, handle: RootHandle) -> bool {
        self.owned.get(handle.0).is_some_and(|o| o.shown)
    }

    /// Marks a window shown and attaches it if the mode is enabled.
    pub fn open_window(&mut self, desktop: &mut Desktop, handle: RootHandle) {
        let enabled = self.enabled;
        let Some(owned) = self.owned.get_mut(handle.0) else {
            return;
        };
        owned.shown = true;
        if enabled {
            Self::attach_one(owned, desktop);
        }
    }

    /// Marks a window hidden and detaches it if attached.
    pub fn close_window(&mut self, desktop: &mut Desktop, handle: RootHandle) {
        if let Some(owned) = self.owned.get_mut(handle.0) {
            owned.shown = false;
            Self::detach_one(owned, desktop);
        }
    }

    /// Swaps the element behind `handle`, keeping it attached if it was.
    pub fn replace(&mut self, desktop: &mut Desktop, handle: RootHandle, element: impl Into<Element>) {
        let enabled = self.enabled;
        let Some(owned) = self.owned.get_mut(handle.0) else {
            return;
        };
        Self::detach_one(owned, desktop);
        owned.slot = Slot::Detached(element.into());
        if enabled && owned.shown {
            Self::attach_one(owned, desktop);
        }
    }

    /// Attaches every shown element. Fails if already enabled.
    pub fn enable(&mut self, desktop: &mut Desktop) -> Result<(), ModeError> {
        if self.enabled {
            return Err(ModeError::InvalidTransition { reason: "mode is already enabled".into() });
        }
        for owned in self.owned.iter_mut().filter(|o| o.shown) {
            Self::attach_one(owned, desktop);
        }
        self.enabled = true;
        Ok(())
    }

    /// Detaches everything this mode attached.
    pub fn disable(&mut self, desktop: &mut Desktop) {
        for owned in &mut self.owned {
            Self::detach_one(owned, desktop);
        }
        self.enabled = false;
    }

    fn attach_one(owned: &mut Owned, desktop: &mut Desktop) {
        if let Slot::Detached(_) = owned.slot {
            if let Slot::Detached(element) = std::mem::replace(&mut owned.slot, Slot::Lost) {
                owned.slot = Slot::Attached(desktop.attach(owned.layer, element));
            }
        }
    }

    fn detach_one(owned: &mut Owned, desktop: &mut Desktop) {
        if let Slot::Attached(id) = owned.slot {
            owned.slot = match desktop.detach(id) {
                Some(element) => Slot::Detached(element),
                None => {
                    log::warn!("widget {id:?} was detached by someone else");
                    Slot::Lost
                }
            };
        }
    }
}

// ── ModeController ────────────────────────────────────────────────────────

/// Owns the registered modes and tracks which one is attached.
pub struct ModeController<M> {
    modes: Vec<(String, M)>,
    active: Option<usize>,
}

impl<M: Mode> ModeController<M> {
    pub fn new() -> Self {
        Self { modes: Vec::new(), active: None }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|(n, _)| n == name)
    }

    /// Adds `mode` under `name`. Replacing an existing name is only allowed
    /// while no mode is active.
    pub fn register(&mut self, name: impl Into<String>, mode: M) -> Result<(), ModeError> {
        let name = name.into();
        match self.index_of(&name) {
            Some(_) if self.active.is_some() => Err(ModeError::InvalidTransition {
                reason: format!("cannot replace mode `{name}` while a mode is active"),
            }),
            Some(idx) => {
                self.modes[idx].1 = mode;
                Ok(())
            }
            None => {
                self.modes.push((name, mode));
                Ok(())
            }
        }
    }

    /// Disables the active mode, then enables `name`.
    ///
    /// Either the whole transition happens or the previous mode stays active.
    /// Switching to the active mode does nothing.
    pub fn switch_to(&mut self, name: &str, desktop: &mut Desktop) -> Result<(), ModeError> {
        let next = self.index_of(name).ok_or_else(|| ModeError::UnknownMode(name.to_string()))?;
        if self.active == Some(next) {
            return Ok(());
        }

        let prev = self.active;
        if let Some(prev) = prev {
            self.modes[prev].1.disable(desktop);
        }

        if let Err(err) = self.modes[next].1.enable(desktop) {
            log::warn!("switch to mode `{name}` failed: {err}");
            if self.modes[next].1.is_enabled() {
                self.modes[next].1.disable(desktop);
            }
            if let Some(prev) = prev {
                if let Err(restore) = self.modes[prev].1.enable(desktop) {
                    log::error!("could not restore mode `{}`: {restore}", self.modes[prev].0);
                    self.active = None;
                }
            }
            return Err(err);
        }

        match prev {
            Some(prev) => log::info!("mode `{}` -> `{name}`", self.modes[prev].0),
            None => log::info!("mode `{name}`"),
        }
        self.active = Some(next);
        desktop.invalidate();
        Ok(())
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.modes[i].0.as_str())
    }

    pub fn active_mode(&self) -> Option<&M> {
        self.active.map(|i| &self.modes[i].1)
    }

    pub fn active_mode_mut(&mut self) -> Option<&mut M> {
        self.active.map(|i| &mut self.modes[i].1)
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.index_of(name).map(|i| &self.modes[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut M> {
        self.index_of(name).map(|i| &mut self.modes[i].1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|(n, _)| n.as_str())
    }

    pub fn frame_synced(&mut self) {
        if let Some(mode) = self.active_mode_mut() {
            mode.frame_synced();
        }
    }

    pub fn frame_unsynced(&mut self, dt: f32) {
        if let Some(mode) = self.active_mode_mut() {
            mode.frame_unsynced(dt);
        }
    }
}

impl<M: Mode> Default for ModeController<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::container::Spacer;
    use maniac_engine::coords::Rect;

    fn desktop() -> Desktop {
        Desktop::new(Rect::from_size(640.0, 480.0))
    }

    #[test]
    fn roots_move_in_and_out() {
        let mut desk = desktop();
        let mut roots = ModeRoots::new();
        let root = roots.add_root(Spacer::flex());
        let window = roots.add_window(Spacer::fixed(100.0, 100.0));

        roots.enable(&mut desk).unwrap();
        assert_eq!(desk.attached_ids(Layer::Desktop), vec![roots.widget_id(root).unwrap()]);
        assert_eq!(desk.attached_ids(Layer::Windows), vec![roots.widget_id(window).unwrap()]);

        roots.disable(&mut desk);
        assert!(desk.is_empty());
        assert!(roots.attached_ids().is_empty());
    }

    #[test]
    fn double_enable_is_rejected() {
        let mut desk = desktop();
        let mut roots = ModeRoots::new();
        roots.add_root(Spacer::flex());
        roots.enable(&mut desk).unwrap();
        assert!(matches!(roots.enable(&mut desk), Err(ModeError::InvalidTransition { .. })));
        assert_eq!(desk.attached_ids(Layer::Desktop).len(), 1);
    }

    #[test]
    fn hidden_window_waits_for_open() {
        let mut desk = desktop();
        let mut roots = ModeRoots::new();
        let win = roots.add_hidden_window(Spacer::fixed(50.0, 50.0));
        roots.enable(&mut desk).unwrap();
        assert!(desk.is_empty());

        roots.open_window(&mut desk, win);
        assert!(roots.widget_id(win).is_some());
        roots.close_window(&mut desk, win);
        assert!(desk.is_empty());

        // Opening while disabled only marks it shown.
        roots.disable(&mut desk);
        roots.open_window(&mut desk, win);
        assert!(desk.is_empty());
        roots.enable(&mut desk).unwrap();
        assert!(roots.widget_id(win).is_some());
    }

    #[test]
    fn replace_keeps_attachment() {
        let mut desk = desktop();
        let mut roots = ModeRoots::new();
        let win = roots.add_window(Spacer::fixed(50.0, 50.0));
        roots.enable(&mut desk).unwrap();
        let before = roots.widget_id(win).unwrap();

        roots.replace(&mut desk, win, Spacer::fixed(80.0, 80.0));
        let after = roots.widget_id(win).unwrap();
        assert_ne!(before, after);
        assert!(!desk.is_attached(before));
        assert_eq!(desk.attached_ids(Layer::Windows), vec![after]);
    }
}
