/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// The canvas premultiplies when it rasterizes; callers never deal with
/// premultiplied values.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Color from sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Same color with alpha multiplied by `factor`.
    #[inline]
    pub fn with_alpha(self, factor: f32) -> Self {
        Self { a: (self.a * factor).clamp(0.0, 1.0), ..self }
    }

    /// Premultiplied components, clamped to `[0, 1]`.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            self.r.clamp(0.0, 1.0) * a,
            self.g.clamp(0.0, 1.0) * a,
            self.b.clamp(0.0, 1.0) * a,
            a,
        ]
    }

    #[inline]
    pub(crate) fn to_skia(self) -> resvg::tiny_skia::Color {
        resvg::tiny_skia::Color::from_rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
        .unwrap_or(resvg::tiny_skia::Color::TRANSPARENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_scales_rgb_by_alpha() {
        let c = Color::new(1.0, 0.5, 0.0, 0.5).premultiplied();
        assert_eq!(c, [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn premultiplied_clamps_out_of_range() {
        let c = Color::new(2.0, -1.0, 0.5, 3.0).premultiplied();
        assert_eq!(c, [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn with_alpha_fades() {
        assert_eq!(Color::white().with_alpha(0.25).a, 0.25);
    }
}
