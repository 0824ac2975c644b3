//! Graph region planning and painting.
//!
//! The renderer never owns a full framebuffer. Each frame it plans a set of
//! bounded regions (at most [`MAX_PIXEL_BLOCK`] pixels each), paints every
//! region into a small caller-provided buffer, and the firmware streams each
//! buffer to the panel while the next one is being painted.
//!
//! # Frame protocol
//!
//! 1. The data feed rewrites trace columns (single-threaded, before the
//!    frame starts).
//! 2. [`GraphRenderer::begin_frame`] returns the [`FramePlan`]: full-height
//!    column bands when a full redraw is pending, otherwise the minimal
//!    dirty regions from diffing the live trace union against the
//!    previous-frame snapshot.
//! 3. [`GraphRenderer::paint_region`] fills a pixel buffer for one region.
//! 4. [`GraphRenderer::end_frame`] overwrites the snapshot with the live
//!    union for every column, so the next diff starts from what is actually
//!    on the panel.
//!
//! # Update Strategy
//!
//! | Pass | Trigger | Cost |
//! |-------------|----------------------------------|-------------------------------|
//! | Full | First frame, window replaced | O(W x H) pixels, 160 regions |
//! | Incremental | Steady state | O(sum of changed-region areas)|
//!
//! Painting is the DMA-transfer-bound operation; the incremental pass trades
//! a cheap O(W) interval scan to shrink the amount painted.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use heapless::Vec;

use super::trace::{Span, TraceStore, merge};
use super::window::GraphWindow;
use crate::colors::{WHITE, YELLOW, trace_color};
use crate::config::{MAX_PIXEL_BLOCK, NUM_TRACES, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::transport::Region;

// A single full-height column fits one transaction, so the incremental pass
// can always close a region at width 1.
const _: () = assert!(MAX_PIXEL_BLOCK >= SCREEN_HEIGHT);

/// Regions to paint this frame, in left-to-right order.
///
/// Every region consumes at least one column, so the plan never exceeds the
/// panel width.
pub type FramePlan = Vec<Region, SCREEN_WIDTH>;

/// Big-endian RGB565 bytes of a color, as streamed to the panel.
#[inline]
fn raw565(color: Rgb565) -> [u8; 2] {
    let raw: RawU16 = color.into();
    raw.into_inner().to_be_bytes()
}

// =============================================================================
// Graph Renderer
// =============================================================================

/// The incremental graph-rendering engine.
///
/// Owns the trace store, the viewport, and the previous-frame snapshot used
/// for dirty diffing. Not reentrant: a single task drives the frame protocol.
pub struct GraphRenderer {
    traces: TraceStore,
    window: GraphWindow,
    /// Per-column trace union as last painted.
    painted: [Option<Span>; SCREEN_WIDTH],
    /// Per-column trace union of the current frame (filled by `begin_frame`).
    live: [Option<Span>; SCREEN_WIDTH],
    /// Next frame must repaint the whole visible range.
    full_redraw: bool,
}

impl GraphRenderer {
    pub const fn new() -> Self {
        Self {
            traces: TraceStore::new(),
            window: GraphWindow::full_panel(),
            painted: [None; SCREEN_WIDTH],
            live: [None; SCREEN_WIDTH],
            full_redraw: true,
        }
    }

    #[inline]
    pub const fn traces(&self) -> &TraceStore { &self.traces }

    #[inline]
    pub fn traces_mut(&mut self) -> &mut TraceStore { &mut self.traces }

    #[inline]
    pub const fn window(&self) -> &GraphWindow { &self.window }

    /// Replace the viewport. Always forces a full redraw on the next frame.
    pub fn set_window(&mut self, window: GraphWindow) {
        self.window = window;
        self.full_redraw = true;
    }

    #[inline]
    pub const fn needs_full_redraw(&self) -> bool { self.full_redraw }

    /// Plan the regions to paint this frame.
    ///
    /// Also captures the live per-column trace union, so the trace store must
    /// not change again until after [`end_frame`](Self::end_frame).
    pub fn begin_frame(&mut self) -> FramePlan {
        for x in 0..SCREEN_WIDTH {
            self.live[x] = self.traces.merged(x);
        }
        if self.full_redraw {
            self.plan_full()
        } else {
            self.plan_incremental()
        }
    }

    /// Promote the live union to the previous-frame snapshot and clear the
    /// full-redraw flag. Call after all planned regions were painted.
    pub fn end_frame(&mut self) {
        self.painted = self.live;
        self.full_redraw = false;
    }

    /// Full pass: consecutive column bands at full panel height, each
    /// `MAX_PIXEL_BLOCK / SCREEN_HEIGHT` columns wide (last narrower).
    fn plan_full(&self) -> FramePlan {
        const BAND_WIDTH: usize = MAX_PIXEL_BLOCK / SCREEN_HEIGHT;
        let mut plan = FramePlan::new();
        let mut x = self.window.left;
        while x <= self.window.right {
            let width = BAND_WIDTH.min(self.window.right - x + 1);
            plan.push(Region::new(x, 0, width, SCREEN_HEIGHT)).ok();
            x += width;
        }
        plan
    }

    /// Span that must be repainted at a column to erase stale pixels and
    /// draw new ones, or `None` when the column is unchanged.
    fn diff_at(&self, x: usize) -> Option<Span> {
        if self.live[x] == self.painted[x] {
            None
        } else {
            merge(self.live[x], self.painted[x])
        }
    }

    /// Incremental pass: greedily grow each region column-by-column while
    /// the bounding-box area stays within the transfer ceiling. Growing
    /// recomputes the union height, since each new column may expand the
    /// vertical extent. Unchanged columns close the region and are skipped.
    fn plan_incremental(&self) -> FramePlan {
        let mut plan = FramePlan::new();
        let mut x = self.window.left;
        while x <= self.window.right {
            let Some(mut union) = self.diff_at(x) else {
                x += 1;
                continue;
            };
            let mut width = 1;
            while x + width <= self.window.right {
                let Some(next) = self.diff_at(x + width) else {
                    break;
                };
                let grown = union.widen(next);
                if (width + 1) * grown.height() > MAX_PIXEL_BLOCK {
                    break;
                }
                union = grown;
                width += 1;
            }
            plan.push(Region::new(x, union.lo() as usize, width, union.height())).ok();
            x += width;
        }
        plan
    }

    /// Paint one region into `buf` (big-endian RGB565, row-major).
    ///
    /// Fills with black, draws the gridlines falling inside the region
    /// (crosshair lines in white, others in yellow), then every enabled
    /// trace's clipped spans in its palette color. The region area must be
    /// at or under `MAX_PIXEL_BLOCK` - the plan guarantees that.
    pub fn paint_region(&self, region: Region, buf: &mut [u8]) {
        debug_assert!(region.validate().is_ok());
        debug_assert!(region.area() <= MAX_PIXEL_BLOCK);
        debug_assert!(buf.len() >= region.area() * 2);

        let (x0, y0, w, h) = (region.x, region.y, region.width, region.height);
        let x_end = x0 + w - 1;
        let y_end = y0 + h - 1;

        buf[..region.area() * 2].fill(0); // BLACK is 0x0000 in RGB565

        // Vertical gridlines: step back from the crosshair column to the
        // first line at or left of the region, then forward across it.
        if self.window.grid_x > 0 {
            let mut gx = self.window.mid_x;
            while gx > x0 && gx >= self.window.grid_x {
                gx -= self.window.grid_x;
            }
            while gx <= x_end {
                if gx >= x0 {
                    let color = raw565(if gx == self.window.mid_x { WHITE } else { YELLOW });
                    for row in 0..h {
                        put_pixel(buf, row * w + (gx - x0), color);
                    }
                }
                gx += self.window.grid_x;
            }
        }

        // Horizontal gridlines, symmetrically.
        if self.window.grid_y > 0 {
            let mut gy = self.window.mid_y;
            while gy > y0 && gy >= self.window.grid_y {
                gy -= self.window.grid_y;
            }
            while gy <= y_end {
                if gy >= y0 {
                    let color = raw565(if gy == self.window.mid_y { WHITE } else { YELLOW });
                    for col in 0..w {
                        put_pixel(buf, (gy - y0) * w + col, color);
                    }
                }
                gy += self.window.grid_y;
            }
        }

        // Traces on top of the grid, in index order.
        for trace_idx in 0..NUM_TRACES {
            if !self.traces.is_enabled(trace_idx) {
                continue;
            }
            let color = raw565(trace_color(trace_idx));
            for col in 0..w {
                let Some(span) = self.traces.column(trace_idx, x0 + col) else {
                    continue;
                };
                // Clip the span to the region on both ends.
                let row_lo = (span.lo() as usize).max(y0);
                let row_hi = (span.hi() as usize).min(y_end);
                for gy in row_lo..=row_hi {
                    put_pixel(buf, (gy - y0) * w + col, color);
                }
            }
        }
    }
}

impl Default for GraphRenderer {
    fn default() -> Self { Self::new() }
}

#[inline]
fn put_pixel(buf: &mut [u8], pixel_idx: usize, raw: [u8; 2]) {
    buf[pixel_idx * 2] = raw[0];
    buf[pixel_idx * 2 + 1] = raw[1];
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, GREEN, RED};
    use crate::config::BLOCK_BUFFER_SIZE;

    /// Read back one pixel of a painted region buffer as a color.
    fn pixel_at(buf: &[u8], region: Region, x: usize, y: usize) -> [u8; 2] {
        let col = x - region.x;
        let row = y - region.y;
        let idx = (row * region.width + col) * 2;
        [buf[idx], buf[idx + 1]]
    }

    fn paint(renderer: &GraphRenderer, region: Region) -> std::vec::Vec<u8> {
        let mut buf = std::vec![0u8; BLOCK_BUFFER_SIZE];
        renderer.paint_region(region, &mut buf);
        buf
    }

    /// Run one full frame: plan, "paint" nothing, snapshot.
    fn run_frame(renderer: &mut GraphRenderer) -> FramePlan {
        let plan = renderer.begin_frame();
        renderer.end_frame();
        plan
    }

    #[test]
    fn test_full_plan_partitions_into_bands() {
        let mut renderer = GraphRenderer::new();
        assert!(renderer.needs_full_redraw());

        let plan = renderer.begin_frame();
        // 640 / 240 = 2 columns per band, 320 / 2 = 160 bands, last exact.
        assert_eq!(plan.len(), 160);
        let mut x = 0;
        for region in &plan {
            assert_eq!(region.x, x);
            assert_eq!(region.width, 2);
            assert_eq!(region.y, 0);
            assert_eq!(region.height, SCREEN_HEIGHT);
            assert!(region.area() <= MAX_PIXEL_BLOCK);
            x += region.width;
        }
        assert_eq!(x, SCREEN_WIDTH);

        renderer.end_frame();
        assert!(!renderer.needs_full_redraw());
    }

    #[test]
    fn test_unchanged_incremental_is_noop() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        for x in 0..SCREEN_WIDTH {
            renderer.traces_mut().set_column(0, x, Some(Span::new(100, 110)));
        }

        run_frame(&mut renderer); // full
        let plan = run_frame(&mut renderer); // incremental, nothing changed
        assert!(plan.is_empty(), "unchanged signal must plan zero regions");
    }

    #[test]
    fn test_localized_change_paints_exactly_changed_columns() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        for x in 0..SCREEN_WIDTH {
            renderer.traces_mut().set_column(0, x, Some(Span::new(100, 110)));
        }
        run_frame(&mut renderer);

        for x in 10..=15 {
            renderer.traces_mut().set_column(0, x, Some(Span::new(50, 60)));
        }
        let plan = run_frame(&mut renderer);

        let mut painted_cols = std::vec::Vec::new();
        for region in &plan {
            // Union of old (100..=110) and new (50..=60) extents.
            assert_eq!(region.y, 50);
            assert_eq!(region.height, 61);
            painted_cols.extend(region.x..region.x + region.width);
        }
        assert_eq!(painted_cols, (10..=15).collect::<std::vec::Vec<_>>());
    }

    #[test]
    fn test_snapshot_matches_live_union_after_any_frame() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        renderer.traces_mut().set_enabled(2, true);
        for x in 0..SCREEN_WIDTH {
            renderer.traces_mut().set_column(0, x, Some(Span::new(20, 40)));
            renderer.traces_mut().set_column(2, x, Some(Span::new((x % 200) as u16, 220)));
        }
        run_frame(&mut renderer); // full

        renderer.traces_mut().set_enabled(2, false);
        run_frame(&mut renderer); // incremental

        for x in 0..SCREEN_WIDTH {
            assert_eq!(renderer.painted[x], renderer.traces.merged(x));
        }
    }

    #[test]
    fn test_incremental_regions_respect_transfer_ceiling() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        run_frame(&mut renderer);

        // Full-height change in every column forces the smallest regions.
        for x in 0..SCREEN_WIDTH {
            renderer.traces_mut().set_column(0, x, Some(Span::new(0, 239)));
        }
        let plan = run_frame(&mut renderer);
        assert!(!plan.is_empty());
        let mut covered = 0;
        for region in &plan {
            assert!(region.area() <= MAX_PIXEL_BLOCK);
            covered += region.width;
        }
        assert_eq!(covered, SCREEN_WIDTH);
    }

    #[test]
    fn test_mixed_height_changes_coalesce_within_ceiling() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        for x in 0..SCREEN_WIDTH {
            renderer.traces_mut().set_column(0, x, Some(Span::new(100, 110)));
        }
        run_frame(&mut renderer);

        // A tall change and a separate shallow change in the same frame.
        for x in 0..=9 {
            renderer.traces_mut().set_column(0, x, Some(Span::new(0, 239)));
        }
        for x in 20..=21 {
            renderer.traces_mut().set_column(0, x, Some(Span::new(105, 106)));
        }
        let plan = run_frame(&mut renderer);

        let mut painted_cols = std::vec::Vec::new();
        for region in &plan {
            assert!(region.area() <= MAX_PIXEL_BLOCK);
            painted_cols.extend(region.x..region.x + region.width);
        }
        let expected: std::vec::Vec<usize> = (0..=9).chain(20..=21).collect();
        assert_eq!(painted_cols, expected, "only the changed columns are painted");

        // Nothing changed since: the next incremental pass is a no-op.
        let plan = run_frame(&mut renderer);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_disabling_trace_plans_erase_regions() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        for x in 50..60 {
            renderer.traces_mut().set_column(0, x, Some(Span::new(30, 70)));
        }
        run_frame(&mut renderer);

        renderer.traces_mut().set_enabled(0, false);
        let plan = run_frame(&mut renderer);

        let mut painted_cols = std::vec::Vec::new();
        for region in &plan {
            // Only the stale span needs erasing.
            assert_eq!(region.y, 30);
            assert_eq!(region.height, 41);
            painted_cols.extend(region.x..region.x + region.width);
        }
        assert_eq!(painted_cols, (50..60).collect::<std::vec::Vec<_>>());
    }

    #[test]
    fn test_paint_background_grid_and_crosshair() {
        let renderer = GraphRenderer::new();
        // Crosshair at (160, 120), grid every 50px.
        let region = Region::new(158, 118, 4, 5);

        let buf = paint(&renderer, region);
        assert_eq!(pixel_at(&buf, region, 160, 118), raw565(WHITE), "crosshair column");
        assert_eq!(pixel_at(&buf, region, 158, 120), raw565(WHITE), "crosshair row");
        assert_eq!(pixel_at(&buf, region, 159, 119), raw565(BLACK));

        // Non-crosshair gridline: column 160 - 50 = 110.
        let region = Region::new(109, 0, 3, 10);
        let buf = paint(&renderer, region);
        assert_eq!(pixel_at(&buf, region, 110, 5), raw565(YELLOW));
        assert_eq!(pixel_at(&buf, region, 109, 5), raw565(BLACK));

        // Horizontal gridline: row 120 - 50 = 70.
        let region = Region::new(0, 69, 4, 3);
        let buf = paint(&renderer, region);
        assert_eq!(pixel_at(&buf, region, 2, 70), raw565(YELLOW));
        assert_eq!(pixel_at(&buf, region, 2, 69), raw565(BLACK));
    }

    #[test]
    fn test_paint_trace_rows_clipped_to_region() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(0, true);
        renderer.traces_mut().set_column(0, 5, Some(Span::new(10, 100)));

        let region = Region::new(5, 40, 1, 20); // rows 40..=59
        let buf = paint(&renderer, region);
        for y in 40..60 {
            assert_eq!(pixel_at(&buf, region, 5, y), raw565(RED), "row {y} inside the span");
        }

        // Rows above the span stay background.
        let region = Region::new(5, 0, 1, 10);
        let buf = paint(&renderer, region);
        for y in 0..10 {
            assert_eq!(pixel_at(&buf, region, 5, y), raw565(BLACK));
        }
    }

    #[test]
    fn test_trace_paints_over_gridline() {
        let mut renderer = GraphRenderer::new();
        renderer.traces_mut().set_enabled(1, true);
        renderer.traces_mut().set_column(1, 160, Some(Span::new(115, 125)));

        let region = Region::new(160, 115, 1, 11);
        let buf = paint(&renderer, region);
        assert_eq!(pixel_at(&buf, region, 160, 120), raw565(GREEN), "trace wins over crosshair");
    }

    #[test]
    fn test_set_window_forces_full_redraw() {
        let mut renderer = GraphRenderer::new();
        run_frame(&mut renderer);
        assert!(!renderer.needs_full_redraw());

        let mut window = *renderer.window();
        window.grid_x = 25;
        renderer.set_window(window);
        assert!(renderer.needs_full_redraw());
        let plan = renderer.begin_frame();
        assert_eq!(plan.len(), 160, "window change replans the full visible range");
    }
}
