//! Input subsystem.
//!
//! The public types are platform-agnostic; `translate` maps winit window
//! events into them inside the runtime.

mod frame;
mod state;
mod translate;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{ElementState, InputEvent, Key, Modifiers, MouseButton};

pub(crate) use translate::translate_window_event;
