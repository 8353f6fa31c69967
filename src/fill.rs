//! Wave-based flood fill with directional neighbor pruning
//!
//! Each frontier point remembers the direction it was reached from and only
//! looks at neighbors that do not lead straight back to its parent. Waves are
//! processed one generation at a time; every `max_fill_count` waves the
//! caller gets a chance to present the partially filled target.

use std::mem;

use crate::config::{FillConfig, Propagation};
use crate::error::{Error, Result};
use crate::pixel_buffer::{Color, PixelBuffer, Plane, CHANNELS};

// ============================================================================
// Direction
// ============================================================================

/// How a frontier point was reached. The seed is `Center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Center,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Single-step offset. Center does not move.
    #[inline]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Center => (0, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Directions explored from a point reached by `self`. Never the way back.
    #[inline]
    pub const fn children(self) -> &'static [Direction] {
        use Direction::{Center, Down, Left, Right, Up};
        match self {
            Center => &[Up, Down, Left, Right],
            Up => &[Up, Left, Right],
            Down => &[Down, Left, Right],
            Left => &[Left, Up, Down],
            Right => &[Right, Up, Down],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierPoint {
    x: i32,
    y: i32,
    reached_by: Direction,
}

// ============================================================================
// Protocol types
// ============================================================================

/// Returned by a flush callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillControl {
    #[default]
    Continue,
    /// Abandon the fill; no trailing flush follows
    Stop,
}

/// Summary of one fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    /// Non-empty waves processed
    pub waves: u32,
    /// Cells painted (a cell can be painted more than once)
    pub painted: u64,
    /// Painted cells whose source alpha was above the threshold
    pub gated: u64,
    /// Flush points reached, including the trailing one
    pub flushes: u32,
    pub cancelled: bool,
}

/// Result of `FillEngine::advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    /// `max_fill_count` waves ran; present the target, then advance again
    Flush,
    /// Frontier is empty; present the target one last time
    Done(FillReport),
    /// No fill is armed
    Idle,
}

#[derive(Debug, Clone, Copy)]
struct FillJob {
    color: Color,
    /// Size of the buffer the fill was armed on
    dimensions: (u32, u32),
    since_flush: u32,
    report: FillReport,
}

// ============================================================================
// FillEngine
// ============================================================================

/// Reusable fill state for buffers of one size.
///
/// The two wave vectors and the per-cell dedup marks survive between waves
/// and between fills, so a fill allocates nothing once they have grown.
pub struct FillEngine {
    config: FillConfig,
    current: Vec<FrontierPoint>,
    next: Vec<FrontierPoint>,
    /// Wave mark per cell; equal to `wave_mark` when already queued for the next wave
    queued: Vec<u32>,
    wave_mark: u32,
    job: Option<FillJob>,
}

impl FillEngine {
    pub fn new(config: FillConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: Vec::new(),
            next: Vec::new(),
            queued: Vec::new(),
            wave_mark: 0,
            job: None,
        })
    }

    #[inline]
    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// True between `begin` and the `Done` step (or `cancel`)
    #[inline]
    pub fn is_filling(&self) -> bool {
        self.job.is_some()
    }

    /// Arm a fill at a buffer-space seed. An out-of-bounds seed arms an empty
    /// fill: the next `advance` reports `Done` without touching the target.
    pub fn begin(&mut self, buffer: &PixelBuffer, seed: (i32, i32), color: Color) -> Result<()> {
        if self.job.is_some() {
            return Err(Error::FillInProgress);
        }

        let cells = buffer.width() as usize * buffer.height() as usize;
        if self.queued.len() != cells {
            self.queued.clear();
            self.queued.resize(cells, 0);
            self.wave_mark = 0;
        }

        self.current.clear();
        self.next.clear();
        let (x, y) = seed;
        if buffer.in_bounds(x, y) {
            self.current.push(FrontierPoint {
                x,
                y,
                reached_by: Direction::Center,
            });
        } else {
            tracing::warn!(x, y, "fill seed outside buffer, nothing to paint");
        }

        self.job = Some(FillJob {
            color,
            dimensions: (buffer.width(), buffer.height()),
            since_flush: 0,
            report: FillReport::default(),
        });
        Ok(())
    }

    /// Run waves until a flush is due or the frontier empties.
    ///
    /// A buffer of a different size than the one given to `begin` cancels
    /// the fill without painting; the step is `Done` with `cancelled` set.
    pub fn advance(&mut self, buffer: &mut PixelBuffer) -> FillStep {
        let Some(mut job) = self.job.take() else {
            return FillStep::Idle;
        };

        if job.dimensions != (buffer.width(), buffer.height()) {
            tracing::warn!(
                armed_width = job.dimensions.0,
                armed_height = job.dimensions.1,
                width = buffer.width(),
                height = buffer.height(),
                "fill advanced on a buffer of another size, cancelling"
            );
            self.current.clear();
            self.next.clear();
            job.report.cancelled = true;
            return FillStep::Done(job.report);
        }

        while !self.current.is_empty() {
            self.run_wave(buffer, &mut job);
            job.report.waves += 1;
            job.since_flush += 1;
            if job.since_flush >= self.config.max_fill_count {
                job.since_flush = 0;
                job.report.flushes += 1;
                tracing::debug!(
                    waves = job.report.waves,
                    frontier = self.current.len(),
                    "fill flush"
                );
                self.job = Some(job);
                return FillStep::Flush;
            }
        }

        job.report.flushes += 1;
        tracing::info!(
            waves = job.report.waves,
            painted = job.report.painted,
            gated = job.report.gated,
            "fill finished"
        );
        FillStep::Done(job.report)
    }

    /// Drop the armed fill, keeping whatever was painted so far
    pub fn cancel(&mut self) -> Option<FillReport> {
        let job = self.job.take()?;
        self.current.clear();
        self.next.clear();
        let mut report = job.report;
        report.cancelled = true;
        tracing::info!(waves = report.waves, "fill cancelled");
        Some(report)
    }

    /// Fill from a buffer-space seed, calling `flush` at every flush point
    /// including the trailing one.
    pub fn fill<F>(
        &mut self,
        buffer: &mut PixelBuffer,
        seed: (i32, i32),
        color: Color,
        mut flush: F,
    ) -> Result<FillReport>
    where
        F: FnMut(&PixelBuffer) -> FillControl,
    {
        self.begin(buffer, seed, color)?;
        loop {
            match self.advance(buffer) {
                FillStep::Flush => {
                    if flush(&*buffer) == FillControl::Stop {
                        return Ok(self.cancel().unwrap_or_default());
                    }
                },
                FillStep::Done(report) => {
                    flush(&*buffer);
                    return Ok(report);
                },
                FillStep::Idle => return Ok(FillReport::default()),
            }
        }
    }

    /// Paint one cell and report whether it may keep spreading
    #[inline]
    fn paint(&self, buffer: &mut PixelBuffer, x: u32, y: u32, color: Color) -> bool {
        buffer.set_color(x, y, color);
        buffer.alpha(Plane::Source, x, y) <= self.config.alpha_threshold
    }

    fn run_wave(&mut self, buffer: &mut PixelBuffer, job: &mut FillJob) {
        self.wave_mark = self.wave_mark.wrapping_add(1);
        if self.wave_mark == 0 {
            self.queued.fill(0);
            self.wave_mark = 1;
        }
        let mark = self.wave_mark;
        let color = job.color;
        let gate = self.config.propagation == Propagation::Gated;

        let current = mem::take(&mut self.current);
        for point in &current {
            let spreads = self.paint(buffer, point.x as u32, point.y as u32, color);
            job.report.painted += 1;
            if !spreads {
                job.report.gated += 1;
                if gate {
                    continue;
                }
            }

            for &dir in point.reached_by.children() {
                let (dx, dy) = dir.offset();
                let (nx, ny) = (point.x + dx, point.y + dy);
                if !buffer.in_bounds(nx, ny) {
                    continue;
                }
                if buffer.alpha(Plane::Target, nx as u32, ny as u32) == color.a {
                    continue;
                }
                let cell = buffer.index(nx as u32, ny as u32) / CHANNELS;
                if self.queued[cell] == mark {
                    continue;
                }
                self.queued[cell] = mark;
                self.next.push(FrontierPoint {
                    x: nx,
                    y: ny,
                    reached_by: dir,
                });
            }
        }

        // Old wave storage becomes the next wave's
        self.current = current;
        self.current.clear();
        mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_flush(_: &PixelBuffer) -> FillControl {
        FillControl::Continue
    }

    /// Transparent canvas with an opaque black rectangle outline
    fn framed(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> PixelBuffer {
        let mut pixels = Color::TRANSPARENT.to_bytes().repeat((width * height) as usize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if x == x0 || x == x1 || y == y0 || y == y1 {
                    let i = ((x + y * width) * 4) as usize;
                    pixels[i..i + 4].copy_from_slice(&Color::BLACK.to_bytes());
                }
            }
        }
        PixelBuffer::new(width, height, pixels).unwrap()
    }

    fn target_color(buf: &PixelBuffer, x: i32, y: i32) -> Color {
        buf.pixel(Plane::Target, x, y).unwrap()
    }

    #[test]
    fn test_children_never_reverse() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let (dx, dy) = dir.offset();
            assert_eq!(dir.children().len(), 3);
            assert_eq!(dir.children()[0], dir);
            for child in dir.children() {
                let (cx, cy) = child.offset();
                assert_ne!((cx, cy), (-dx, -dy), "{:?} leads back from {:?}", child, dir);
            }
        }
        assert_eq!(Direction::Center.children().len(), 4);
    }

    #[test]
    fn test_fills_whole_transparent_buffer() {
        let mut buf = PixelBuffer::filled(4, 4, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::new(150, 30)).unwrap();

        let report = engine.fill(&mut buf, (1, 1), Color::GREEN, no_flush).unwrap();

        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.alpha(Plane::Target, x, y), 255);
                assert_eq!(target_color(&buf, x as i32, y as i32), Color::GREEN);
            }
        }
        assert!(buf.source().iter().all(|&b| b == 0));
        assert_eq!(report.painted, 16);
        assert!(!report.cancelled);
        assert!(!engine.is_filling());
    }

    #[test]
    fn test_wave_count_is_manhattan_radius() {
        // From a corner of an open 5x5 buffer the farthest cell is 8 steps away
        let mut buf = PixelBuffer::filled(5, 5, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::default()).unwrap();
        let report = engine.fill(&mut buf, (0, 0), Color::GREEN, no_flush).unwrap();
        assert_eq!(report.waves, 9);
        assert_eq!(report.painted, 25);
    }

    #[test]
    fn test_second_fill_changes_nothing() {
        let mut buf = framed(10, 8, 1, 1, 7, 6);
        let mut engine = FillEngine::new(FillConfig::default()).unwrap();

        engine.fill(&mut buf, (3, 3), Color::rgb(200, 10, 10), no_flush).unwrap();
        let first = buf.target().to_vec();
        let report = engine.fill(&mut buf, (3, 3), Color::rgb(200, 10, 10), no_flush).unwrap();

        assert_eq!(buf.target(), &first[..]);
        assert_eq!(report.waves, 1);
        assert_eq!(report.painted, 1);
    }

    #[test]
    fn test_outline_at_fill_alpha_contains_fill() {
        let mut buf = framed(10, 8, 1, 1, 7, 6);
        let mut engine = FillEngine::new(FillConfig::default()).unwrap();
        let fill = Color::rgb(0, 0, 255);

        engine.fill(&mut buf, (4, 3), fill, no_flush).unwrap();

        for y in 0..8 {
            for x in 0..10 {
                let inside = x > 1 && x < 7 && y > 1 && y < 6;
                let on_frame = ((x == 1 || x == 7) && (1..=6).contains(&y))
                    || ((y == 1 || y == 6) && (1..=7).contains(&x));
                let c = target_color(&buf, x, y);
                if inside {
                    assert_eq!(c, fill, "({}, {}) should be filled", x, y);
                } else if on_frame {
                    assert_eq!(c, Color::BLACK, "({}, {}) is frame", x, y);
                } else {
                    assert_eq!(c, Color::TRANSPARENT, "({}, {}) is outside", x, y);
                }
            }
        }
    }

    #[test]
    fn test_observed_mode_walks_through_gated_cells() {
        // Region of alpha 0 surrounded by alpha 200 (above threshold, below fill alpha)
        let (w, h) = (9u32, 9u32);
        let mut pixels = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let inside = (3..=5).contains(&x) && (3..=5).contains(&y);
                let a = if inside { 0 } else { 200 };
                pixels.extend_from_slice(&[0, 0, 0, a]);
            }
        }
        let mut buf = PixelBuffer::new(w, h, pixels).unwrap();
        let mut engine = FillEngine::new(FillConfig::new(150, 30)).unwrap();

        let report = engine.fill(&mut buf, (4, 4), Color::GREEN, no_flush).unwrap();

        assert!(buf.target().chunks_exact(4).all(|p| p == Color::GREEN.to_bytes()));
        assert_eq!(report.gated, 81 - 9);
    }

    #[test]
    fn test_gated_mode_stops_one_cell_past_region() {
        let (w, h) = (9u32, 9u32);
        let mut pixels = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let inside = (3..=5).contains(&x) && (3..=5).contains(&y);
                let a = if inside { 0 } else { 200 };
                pixels.extend_from_slice(&[0, 0, 0, a]);
            }
        }
        let mut buf = PixelBuffer::new(w, h, pixels).unwrap();
        let config = FillConfig::new(150, 30).with_propagation(Propagation::Gated);
        let mut engine = FillEngine::new(config).unwrap();

        engine.fill(&mut buf, (4, 4), Color::GREEN, no_flush).unwrap();

        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let in_region = (3..=5).contains(&x) && (3..=5).contains(&y);
                // 4-adjacent ring around the 3x3 region
                let ring = !in_region
                    && (((3..=5).contains(&x) && (y == 2 || y == 6))
                        || ((3..=5).contains(&y) && (x == 2 || x == 6)));
                let painted = target_color(&buf, x, y) == Color::GREEN;
                assert_eq!(painted, in_region || ring, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_flush_cadence() {
        // A 1xN strip filled from one end runs exactly N waves
        for (len, max) in [(10u32, 3u32), (9, 3), (1, 1), (7, 30), (30, 30), (31, 30)] {
            let mut buf = PixelBuffer::filled(len, 1, Color::TRANSPARENT).unwrap();
            let mut engine = FillEngine::new(FillConfig::new(150, max)).unwrap();
            let mut calls = 0u32;

            let report = engine
                .fill(&mut buf, (0, 0), Color::GREEN, |_| {
                    calls += 1;
                    FillControl::Continue
                })
                .unwrap();

            assert_eq!(report.waves, len);
            assert_eq!(calls, len / max + 1, "len={} max={}", len, max);
            assert_eq!(report.flushes, calls);
        }
    }

    #[test]
    fn test_flush_sees_partial_fill() {
        let mut buf = PixelBuffer::filled(12, 1, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::new(150, 4)).unwrap();
        let mut seen = Vec::new();

        engine
            .fill(&mut buf, (0, 0), Color::GREEN, |b| {
                let filled = b.target().chunks_exact(4).filter(|p| p[3] == 255).count();
                seen.push(filled);
                FillControl::Continue
            })
            .unwrap();

        assert_eq!(seen, vec![4, 8, 12, 12]);
    }

    #[test]
    fn test_out_of_bounds_seed_is_noop() {
        let mut buf = PixelBuffer::filled(4, 4, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::default()).unwrap();
        let mut calls = 0;

        for seed in [(-1, 0), (0, -1), (4, 0), (0, 4), (i32::MAX, i32::MIN)] {
            let report = engine
                .fill(&mut buf, seed, Color::GREEN, |_| {
                    calls += 1;
                    FillControl::Continue
                })
                .unwrap();
            assert_eq!(report.waves, 0);
            assert_eq!(report.flushes, 1);
        }

        assert_eq!(calls, 5);
        assert_eq!(buf.target(), buf.source());
    }

    #[test]
    fn test_stop_from_flush_cancels() {
        let mut buf = PixelBuffer::filled(20, 1, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::new(150, 5)).unwrap();
        let mut calls = 0;

        let report = engine
            .fill(&mut buf, (0, 0), Color::GREEN, |_| {
                calls += 1;
                FillControl::Stop
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert!(report.cancelled);
        assert_eq!(report.waves, 5);
        let filled = buf.target().chunks_exact(4).filter(|p| p[3] == 255).count();
        assert_eq!(filled, 5);
        assert!(!engine.is_filling());
    }

    #[test]
    fn test_incremental_protocol() {
        let mut buf = PixelBuffer::filled(6, 1, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::new(150, 2)).unwrap();

        assert_eq!(engine.advance(&mut buf), FillStep::Idle);
        engine.begin(&buf, (0, 0), Color::GREEN).unwrap();
        assert!(matches!(
            engine.begin(&buf, (1, 0), Color::GREEN),
            Err(Error::FillInProgress)
        ));

        assert_eq!(engine.advance(&mut buf), FillStep::Flush);
        assert_eq!(engine.advance(&mut buf), FillStep::Flush);
        assert_eq!(engine.advance(&mut buf), FillStep::Flush);
        match engine.advance(&mut buf) {
            FillStep::Done(report) => {
                assert_eq!(report.waves, 6);
                assert_eq!(report.flushes, 4);
            },
            other => panic!("expected Done, got {:?}", other),
        }
        assert_eq!(engine.advance(&mut buf), FillStep::Idle);
    }

    #[test]
    fn test_cancel_keeps_painted_cells() {
        let mut buf = PixelBuffer::filled(10, 1, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::new(150, 3)).unwrap();

        engine.begin(&buf, (0, 0), Color::GREEN).unwrap();
        assert_eq!(engine.advance(&mut buf), FillStep::Flush);
        let report = engine.cancel().unwrap();

        assert!(report.cancelled);
        assert_eq!(report.waves, 3);
        assert_eq!(target_color(&buf, 2, 0), Color::GREEN);
        assert_eq!(target_color(&buf, 3, 0), Color::TRANSPARENT);
        assert!(engine.cancel().is_none());

        // Engine is free again
        engine.fill(&mut buf, (9, 0), Color::GREEN, no_flush).unwrap();
        assert!(buf.target().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_engine_reused_across_buffer_sizes() {
        let mut engine = FillEngine::new(FillConfig::default()).unwrap();
        let mut small = PixelBuffer::filled(3, 3, Color::TRANSPARENT).unwrap();
        let mut large = PixelBuffer::filled(16, 9, Color::TRANSPARENT).unwrap();

        let a = engine.fill(&mut small, (1, 1), Color::GREEN, no_flush).unwrap();
        let b = engine.fill(&mut large, (15, 8), Color::GREEN, no_flush).unwrap();

        assert_eq!(a.painted, 9);
        assert_eq!(b.painted, 16 * 9);
    }

    #[test]
    fn test_advance_on_resized_buffer_cancels() {
        let small = PixelBuffer::filled(2, 2, Color::TRANSPARENT).unwrap();
        let mut large = PixelBuffer::filled(8, 8, Color::TRANSPARENT).unwrap();
        let mut engine = FillEngine::new(FillConfig::default()).unwrap();

        engine.begin(&small, (1, 1), Color::GREEN).unwrap();
        match engine.advance(&mut large) {
            FillStep::Done(report) => {
                assert!(report.cancelled);
                assert_eq!(report.waves, 0);
                assert_eq!(report.painted, 0);
            },
            other => panic!("expected Done, got {:?}", other),
        }
        assert_eq!(large.target(), large.source());
        assert!(!engine.is_filling());
        assert_eq!(engine.advance(&mut large), FillStep::Idle);

        // Same cell count, different shape
        let wide = PixelBuffer::filled(4, 1, Color::TRANSPARENT).unwrap();
        let mut tall = PixelBuffer::filled(1, 4, Color::TRANSPARENT).unwrap();
        engine.begin(&wide, (3, 0), Color::GREEN).unwrap();
        assert!(matches!(engine.advance(&mut tall), FillStep::Done(r) if r.cancelled));
        assert_eq!(tall.target(), tall.source());

        // Engine is usable afterwards on the right buffer
        let report = engine
            .fill(&mut large, (0, 0), Color::GREEN, no_flush)
            .unwrap();
        assert_eq!(report.painted, 64);
    }

    #[test]
    fn test_zero_max_fill_count_rejected() {
        assert!(matches!(
            FillEngine::new(FillConfig::new(100, 0)),
            Err(Error::InvalidConfig(_))
        ));
    }
}
