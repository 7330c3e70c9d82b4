use resvg::tiny_skia::{Color as SkColor, Pixmap};

use crate::coords::Vec2;
use crate::text::FontSystem;

use super::{Canvas, CompositorBackend, CompositorError, ResizeOutcome, SurfaceState, UploadRegion};

/// Owns one CPU surface and its backend texture.
///
/// `resize` follows the window; `present` redraws, uploads when the pixels
/// changed and blits. Nothing else touches the pixmap or the texture.
pub struct SurfaceCompositor<B: CompositorBackend> {
    backend: B,
    pixmap: Pixmap,
    state: SurfaceState,
    scale_factor: f32,
    has_content: bool,
    label: &'static str,
}

impl<B: CompositorBackend> SurfaceCompositor<B> {
    /// Creates a compositor for a `width x height` pixel surface.
    pub fn new(
        label: &'static str,
        mut backend: B,
        width: u32,
        height: u32,
    ) -> Result<Self, CompositorError> {
        let mut state = SurfaceState::new();
        let (tw, th) = state.required_capacity(width, height).unwrap_or((1, 1));
        backend.allocate(tw, th)?;
        let pixmap = Pixmap::new(tw, th)
            .ok_or_else(|| CompositorError::allocation(tw, th, "pixmap size out of range"))?;
        state.resize(width, height);

        log::debug!("{label}: surface {width}x{height}, texture {tw}x{th}");

        Ok(Self {
            backend,
            pixmap,
            state,
            scale_factor: 1.0,
            has_content: false,
            label,
        })
    }

    /// Updates the surface size in pixels.
    ///
    /// Reallocates only when a dimension exceeds the current capacity;
    /// otherwise only the UV scale changes. On error the previous surface
    /// stays in place.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<ResizeOutcome, CompositorError> {
        if let Some((tw, th)) = self.state.required_capacity(width, height) {
            let pixmap = Pixmap::new(tw, th)
                .ok_or_else(|| CompositorError::allocation(tw, th, "pixmap size out of range"))?;
            self.backend.allocate(tw, th)?;
            self.pixmap = pixmap;
            self.has_content = false;
            log::debug!("{}: texture grown to {tw}x{th}", self.label);
        }
        Ok(self.state.resize(width, height))
    }

    /// Ratio of surface pixels to the canvas's logical pixels.
    pub fn set_scale_factor(&mut self, scale: f32) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        if scale != self.scale_factor {
            self.scale_factor = scale;
            self.state.mark_dirty();
        }
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.state.mark_dirty();
    }

    #[inline]
    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Logical canvas size for the current surface size and scale.
    pub fn logical_size(&self) -> Vec2 {
        let (w, h) = self.state.size();
        Vec2::new(w as f32 / self.scale_factor, h as f32 / self.scale_factor)
    }

    /// Clears the surface, runs `draw`, uploads if anything changed and
    /// draws the quad into `target`.
    pub fn present<F>(&mut self, target: &mut B::Target<'_>, fonts: &FontSystem, draw: F)
    where
        F: FnOnce(&mut Canvas<'_>),
    {
        self.pixmap.fill(SkColor::TRANSPARENT);
        if self.has_content {
            self.state.mark_dirty();
        }

        let size = self.logical_size();
        let mut canvas = Canvas::new(&mut self.pixmap, fonts, size, self.scale_factor);
        draw(&mut canvas);
        self.has_content = canvas.has_drawn();

        if self.has_content {
            self.state.mark_dirty();
        }

        if self.state.is_dirty() {
            let (width, height) = self.state.size();
            self.backend.upload(UploadRegion {
                pixels: self.pixmap.data(),
                stride: self.pixmap.width() * 4,
                width,
                height,
            });
            self.state.clear_dirty();
        }

        self.backend.draw(target, self.state.uv_scale());
    }
}
