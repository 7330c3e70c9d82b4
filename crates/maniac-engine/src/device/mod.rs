//! GPU device and window surface.
//!
//! Creates the wgpu device/queue for the window, configures the swapchain and
//! hands out one [`GpuFrame`] per presented frame.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
