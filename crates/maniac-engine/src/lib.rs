//! ManiacLab engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by higher layers:
//! the winit loop, the wgpu device, the dual-rate frame scheduler and the
//! surface compositor that bridges the CPU-rasterized chrome onto the GPU.

pub mod compositor;
pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;
pub mod time;
pub mod window;
