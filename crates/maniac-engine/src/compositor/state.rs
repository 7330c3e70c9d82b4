/// Rounds `v` up to a power of two (`0` rounds to `1`).
///
/// Returns `None` when the result does not fit in `u32`.
#[inline]
pub fn next_pot(v: u32) -> Option<u32> {
    v.max(1).checked_next_power_of_two()
}

/// What a resize did to the backing storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResizeOutcome {
    /// Capacity grew; the pixmap and texture were recreated.
    Reallocated,
    /// Fits the current capacity; only the UV scale changed.
    Rescaled,
}

/// Size bookkeeping of a composited surface.
///
/// Capacity only grows, and only when a logical dimension exceeds it, so a
/// window that shrinks and grows back inside its high-water mark never
/// reallocates.
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    width: u32,
    height: u32,
    tex_width: u32,
    tex_height: u32,
    uv_scale: [f32; 2],
    dirty: bool,
    allocations: u64,
}

impl SurfaceState {
    /// Empty state with no capacity; the first resize allocates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity needed for a `width x height` surface, or `None` if the
    /// current one suffices. Sizes are clamped to at least 1.
    pub fn required_capacity(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let (w, h) = (width.max(1), height.max(1));
        if w <= self.tex_width && h <= self.tex_height {
            return None;
        }
        // Saturate instead of failing here; the backend rejects sizes past
        // its limits anyway.
        let tw = next_pot(w).unwrap_or(u32::MAX).max(self.tex_width);
        let th = next_pot(h).unwrap_or(u32::MAX).max(self.tex_height);
        Some((tw, th))
    }

    /// Records a new logical size, growing capacity if needed.
    pub fn resize(&mut self, width: u32, height: u32) -> ResizeOutcome {
        let (w, h) = (width.max(1), height.max(1));

        let outcome = match self.required_capacity(w, h) {
            Some((tw, th)) => {
                self.tex_width = tw;
                self.tex_height = th;
                self.allocations += 1;
                ResizeOutcome::Reallocated
            }
            None => ResizeOutcome::Rescaled,
        };

        self.width = w;
        self.height = h;
        self.uv_scale = [
            w as f32 / self.tex_width as f32,
            h as f32 / self.tex_height as f32,
        ];
        self.dirty = true;
        outcome
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn capacity(&self) -> (u32, u32) {
        (self.tex_width, self.tex_height)
    }

    #[inline]
    pub fn uv_scale(&self) -> [f32; 2] {
        self.uv_scale
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Number of capacity allocations so far.
    #[inline]
    pub fn allocations(&self) -> u64 {
        self.allocations
    }
}
