//! The simulation seam.
//!
//! The cellular physics engine is an external collaborator. [`Level`] stands
//! in for it: a small diffusion grid that is cheap to step and easy to look
//! at, so the frame pipeline and the debug hooks have something real to drive.

use maniac_engine::compositor::Canvas;
use maniac_engine::coords::Rect;
use maniac_engine::paint::Color;

/// What the frame pipeline needs from a simulation.
pub trait Simulation {
    /// Advances one fixed step. A failed step leaves the state untouched.
    fn advance(&mut self) -> anyhow::Result<()>;

    /// Paints the current state scaled to fill `canvas`.
    fn render_into(&self, canvas: &mut Canvas<'_>, debug_overlay: bool);

    /// Grid size in cells.
    fn size(&self) -> (u32, u32);

    /// Steps advanced so far.
    fn ticks(&self) -> u64;

    fn debug_test_object(&mut self);

    fn debug_test_stamp(&mut self, x: u32, y: u32);

    /// Logs the state of the cell at `(x, y)` (cell coordinates).
    fn debug_output(&self, x: f32, y: f32);
}

const THREAD_BANDS: u32 = 4;

/// Placeholder simulation: heat diffusing over a grid.
pub struct Level {
    width: u32,
    height: u32,
    threaded: bool,
    ticks: u64,
    cells: Vec<f32>,
    scratch: Vec<f32>,
}

impl Level {
    pub fn create(width: u32, height: u32, threaded: bool) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let n = (width * height) as usize;
        log::info!(
            "level {width}x{height}, {} simulation",
            if threaded { "threaded" } else { "single-threaded" }
        );
        Self { width, height, threaded, ticks: 0, cells: vec![0.0; n], scratch: vec![0.0; n] }
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.cells[self.index(x, y)])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    fn fill_block(&mut self, cx: u32, cy: u32, radius: u32, value: f32) {
        let x0 = cx.saturating_sub(radius);
        let y0 = cy.saturating_sub(radius);
        let x1 = (cx + radius).min(self.width - 1);
        let y1 = (cy + radius).min(self.height - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let i = self.index(x, y);
                self.cells[i] = value;
            }
        }
    }

    /// Rows simulated by each worker, as `(first_row, row_count)`.
    fn bands(&self) -> Vec<(u32, u32)> {
        let count = if self.threaded { THREAD_BANDS.min(self.height) } else { 1 };
        let base = self.height / count;
        let extra = self.height % count;
        let mut row = 0;
        (0..count)
            .map(|i| {
                let rows = base + u32::from(i < extra);
                let band = (row, rows);
                row += rows;
                band
            })
            .collect()
    }
}

impl Simulation for Level {
    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn advance(&mut self) -> anyhow::Result<()> {
        let (w, h) = (self.width as i64, self.height as i64);
        let at = |cells: &[f32], x: i64, y: i64| {
            let x = x.clamp(0, w - 1);
            let y = y.clamp(0, h - 1);
            cells[(y * w + x) as usize]
        };
        for y in 0..h {
            for x in 0..w {
                let c = at(&self.cells, x, y);
                let around = at(&self.cells, x - 1, y)
                    + at(&self.cells, x + 1, y)
                    + at(&self.cells, x, y - 1)
                    + at(&self.cells, x, y + 1);
                self.scratch[(y * w + x) as usize] = c * 0.6 + around * 0.1;
            }
        }
        if let Some(i) = self.scratch.iter().position(|v| !v.is_finite()) {
            let (x, y) = (i as u32 % self.width, i as u32 / self.width);
            anyhow::bail!("cell ({x}, {y}) diverged at tick {}", self.ticks);
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
        self.ticks += 1;
        Ok(())
    }

    fn render_into(&self, canvas: &mut Canvas<'_>, debug_overlay: bool) {
        let size = canvas.size();
        let cw = size.x / self.width as f32;
        let ch = size.y / self.height as f32;

        for y in 0..self.height {
            for x in 0..self.width {
                let v = self.cells[self.index(x, y)].clamp(0.0, 1.0);
                if v < 0.01 {
                    continue;
                }
                let rect = Rect::new(x as f32 * cw, y as f32 * ch, cw, ch);
                canvas.fill_rect(rect, Color::new(v, v * 0.5, 0.1, 1.0));
            }
        }

        if debug_overlay {
            let outline = Color::new(0.2, 1.0, 0.3, 0.8);
            for (row, rows) in self.bands() {
                let rect = Rect::new(0.0, row as f32 * ch, size.x, rows as f32 * ch);
                canvas.stroke_rect(rect.inset(1.0), 2.0, outline);
            }
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn debug_test_object(&mut self) {
        log::debug!("test object at level center");
        self.fill_block(self.width / 2, self.height / 2, 2, 1.0);
    }

    fn debug_test_stamp(&mut self, x: u32, y: u32) {
        log::debug!("test stamp at ({x}, {y})");
        self.fill_block(x.min(self.width - 1), y.min(self.height - 1), 1, 1.0);
    }

    fn debug_output(&self, x: f32, y: f32) {
        if x < 0.0 || y < 0.0 {
            log::info!("cell ({x:.1}, {y:.1}) is outside the level");
            return;
        }
        match self.cell(x as u32, y as u32) {
            Some(v) => log::info!("cell ({x:.1}, {y:.1}) = {v:.4} at tick {}", self.ticks),
            None => log::info!("cell ({x:.1}, {y:.1}) is outside the level"),
        }
    }
}
