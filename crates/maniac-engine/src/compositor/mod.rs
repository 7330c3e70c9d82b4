//! CPU-rasterized vector surface composited over the frame as one textured
//! quad.
//!
//! The surface is a premultiplied RGBA8 pixmap sized to a power-of-two
//! capacity. Drawing happens on the CPU through [`Canvas`]; when the pixmap
//! changed, the logical sub-rectangle is uploaded to the backend texture and
//! blitted with UVs `(0,0)..(s,t)` so the padding never shows.
//!
//! The GPU side sits behind [`CompositorBackend`]; [`GpuCompositorBackend`]
//! is the wgpu implementation.

mod backend;
mod canvas;
mod surface;
mod error;
mod gpu;
mod state;

pub use backend::{CompositorBackend, UploadRegion};
pub use canvas::Canvas;
pub use surface::SurfaceCompositor;
pub use error::CompositorError;
pub use gpu::GpuCompositorBackend;
pub use state::{next_pot, ResizeOutcome, SurfaceState};
