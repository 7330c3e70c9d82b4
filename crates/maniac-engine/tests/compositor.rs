//! Surface compositor against a recording backend (no GPU).

use maniac_engine::compositor::{
    CompositorBackend, CompositorError, ResizeOutcome, SurfaceCompositor, UploadRegion,
};
use maniac_engine::coords::Rect;
use maniac_engine::paint::Color;
use maniac_engine::text::FontSystem;

#[derive(Default)]
struct Recorder {
    allocations: Vec<(u32, u32)>,
    uploads: Vec<(u32, u32, u32)>,
    draws: Vec<[f32; 2]>,
    fail_above: Option<u32>,
}

impl CompositorBackend for Recorder {
    type Target<'a> = ();

    fn allocate(&mut self, width: u32, height: u32) -> Result<(), CompositorError> {
        if let Some(limit) = self.fail_above {
            if width > limit || height > limit {
                return Err(CompositorError::SurfaceAllocationFailed {
                    width,
                    height,
                    reason: "over limit".into(),
                });
            }
        }
        self.allocations.push((width, height));
        Ok(())
    }

    fn upload(&mut self, region: UploadRegion<'_>) {
        assert!(region.pixels.len() as u32 >= region.stride * region.height);
        self.uploads.push((region.width, region.height, region.stride));
    }

    fn draw(&mut self, _target: &mut (), uv_scale: [f32; 2]) {
        self.draws.push(uv_scale);
    }
}

fn compositor(w: u32, h: u32) -> SurfaceCompositor<Recorder> {
    SurfaceCompositor::new("test", Recorder::default(), w, h).unwrap()
}

#[test]
fn resize_within_capacity_never_reallocates() {
    let mut c = compositor(1000, 700);
    assert_eq!(c.backend().allocations, vec![(1024, 1024)]);

    for (w, h) in [(10, 10), (1024, 1024), (512, 900), (1, 1)] {
        assert_eq!(c.resize(w, h).unwrap(), ResizeOutcome::Rescaled);
        assert_eq!(c.state().uv_scale(), [w as f32 / 1024.0, h as f32 / 1024.0]);
    }
    assert_eq!(c.backend().allocations.len(), 1);
    assert_eq!(c.state().allocations(), 1);
}

#[test]
fn growing_reallocates_once_to_next_pot() {
    let mut c = compositor(800, 600);
    assert_eq!(c.resize(1300, 600).unwrap(), ResizeOutcome::Reallocated);
    assert_eq!(c.state().capacity(), (2048, 1024));
    assert_eq!(c.resize(1300, 600).unwrap(), ResizeOutcome::Rescaled);
    assert_eq!(c.resize(900, 400).unwrap(), ResizeOutcome::Rescaled);
    assert_eq!(c.backend().allocations, vec![(1024, 1024), (2048, 1024)]);
}

#[test]
fn present_uploads_logical_region_with_capacity_stride() {
    let fonts = FontSystem::new();
    let mut c = compositor(300, 200);
    c.present(&mut (), &fonts, |canvas| {
        canvas.fill_rect(Rect::new(10.0, 10.0, 50.0, 20.0), Color::white());
    });

    assert_eq!(c.backend().uploads, vec![(300, 200, 512 * 4)]);
    assert_eq!(c.backend().draws, vec![[300.0 / 512.0, 200.0 / 256.0]]);
    assert!(!c.state().is_dirty());
}

#[test]
fn idle_surface_uploads_only_after_a_change() {
    let fonts = FontSystem::new();
    let mut c = compositor(64, 64);

    // First present uploads the fresh (dirty) surface.
    c.present(&mut (), &fonts, |_| {});
    c.present(&mut (), &fonts, |_| {});
    assert_eq!(c.backend().uploads.len(), 1);
    assert_eq!(c.backend().draws.len(), 2);

    c.mark_dirty();
    c.present(&mut (), &fonts, |_| {});
    assert_eq!(c.backend().uploads.len(), 2);
}

#[test]
fn every_drawing_frame_uploads_without_mark_dirty() {
    let fonts = FontSystem::new();
    let mut c = compositor(64, 64);
    for _ in 0..3 {
        c.present(&mut (), &fonts, |canvas| canvas.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::white()));
    }
    assert_eq!(c.backend().uploads.len(), 3);
    assert!(!c.state().is_dirty());
}

#[test]
fn clearing_previous_content_is_uploaded() {
    let fonts = FontSystem::new();
    let mut c = compositor(64, 64);
    c.present(&mut (), &fonts, |canvas| canvas.fill_rect(canvas.bounds(), Color::black()));
    c.present(&mut (), &fonts, |_| {});
    c.present(&mut (), &fonts, |_| {});
    // content, cleared, still empty
    assert_eq!(c.backend().uploads.len(), 2);
}

#[test]
fn allocation_failure_is_reported_and_keeps_old_surface() {
    let backend = Recorder { fail_above: Some(1024), ..Recorder::default() };
    let mut c = SurfaceCompositor::new("test", backend, 640, 480).unwrap();

    let err = c.resize(4000, 480).unwrap_err();
    assert!(matches!(
        err,
        CompositorError::SurfaceAllocationFailed { width: 4096, height: 512, .. }
    ));
    assert_eq!(c.state().size(), (640, 480));
    assert_eq!(c.state().capacity(), (1024, 512));
}

#[test]
fn scale_factor_shrinks_logical_canvas() {
    let fonts = FontSystem::new();
    let mut c = compositor(400, 300);
    c.set_scale_factor(2.0);
    let mut seen = None;
    c.present(&mut (), &fonts, |canvas| seen = Some(canvas.size()));
    let size = seen.unwrap();
    assert_eq!((size.x, size.y), (200.0, 150.0));
}
