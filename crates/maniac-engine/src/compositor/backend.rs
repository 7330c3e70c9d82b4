use super::CompositorError;

/// Pixels handed to [`CompositorBackend::upload`].
///
/// `pixels` starts at the surface origin; rows are `stride` bytes apart
/// (the capacity width), of which the first `width * 4` belong to the
/// logical area.
#[derive(Debug, Copy, Clone)]
pub struct UploadRegion<'a> {
    pub pixels: &'a [u8],
    pub stride: u32,
    pub width: u32,
    pub height: u32,
}

/// Where the composited surface ends up.
pub trait CompositorBackend {
    /// Whatever `draw` renders into (a render target for wgpu).
    type Target<'a>;

    /// (Re)creates the texture with the given capacity. Previous contents
    /// are discarded.
    fn allocate(&mut self, width: u32, height: u32) -> Result<(), CompositorError>;

    /// Copies `region` into the texture at the origin.
    fn upload(&mut self, region: UploadRegion<'_>);

    /// Draws a viewport-covering quad sampling `(0,0)..uv_scale`.
    fn draw(&mut self, target: &mut Self::Target<'_>, uv_scale: [f32; 2]);
}
