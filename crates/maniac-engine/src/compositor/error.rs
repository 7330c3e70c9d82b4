/// Compositor failures.
///
/// Allocation failure leaves the compositor without a presentation surface;
/// callers treat it as fatal for the frame pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompositorError {
    #[error("failed to allocate a {width}x{height} surface: {reason}")]
    SurfaceAllocationFailed {
        width: u32,
        height: u32,
        reason: String,
    },
}

impl CompositorError {
    pub(crate) fn allocation(width: u32, height: u32, reason: impl Into<String>) -> Self {
        CompositorError::SurfaceAllocationFailed {
            width,
            height,
            reason: reason.into(),
        }
    }
}
