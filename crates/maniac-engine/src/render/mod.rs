//! Per-frame render handles passed to draw callbacks.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
