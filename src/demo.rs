//! Synthetic test signal feeding trace 0.
//!
//! A scrolling triangle wave: the first update samples the wave across the
//! full column range, every later update scrolls the trace one column to the
//! left (wrapping), which exercises the incremental redraw path the same way
//! a real instrument feed would.

use micromath::F32;

use crate::config::SCREEN_WIDTH;
use crate::graph::{Span, TraceStore};

/// Peak-to-peak amplitude is twice this, in pixels.
const AMPLITUDE: f32 = 100.0;

/// Wave cycles per column.
const SPATIAL_FREQ: f32 = 0.02;

/// Wave cycles per second.
const TEMPORAL_FREQ: f32 = 0.05;

/// Triangle wave height at column `x`, time `t` seconds.
fn sample(x: f32, t: f32) -> f32 {
    let mut z = SPATIAL_FREQ * x + TEMPORAL_FREQ * t;
    z -= F32(z).floor().0;
    z = if z <= 0.5 { 2.0 * z } else { 2.0 * (1.0 - z) };
    2.0 * AMPLITUDE * z
}

/// Demo signal generator. Call [`update`](Self::update) once per refresh
/// cycle, before the renderer plans the frame.
pub struct DemoSignal {
    primed: bool,
}

impl DemoSignal {
    pub const fn new() -> Self { Self { primed: false } }

    /// Rewrite trace 0 for this cycle.
    ///
    /// Each column gets the inclusive vertical extent between its sample and
    /// the previous column's, so the trace is drawn without gaps on steep
    /// slopes.
    pub fn update(&mut self, t_secs: f32, traces: &mut TraceStore) {
        if self.primed {
            traces.columns_mut(0).rotate_left(1);
            return;
        }

        let mut prev_y = sample(-1.0, t_secs);
        for x in 0..SCREEN_WIDTH {
            let y = sample(x as f32, t_secs);
            let lo = F32(prev_y.min(y)).round().0 as u16;
            let hi = F32(prev_y.max(y)).round().0 as u16;
            traces.set_column(0, x, Some(Span::new(lo, hi)));
            prev_y = y;
        }
        self.primed = true;
    }
}

impl Default for DemoSignal {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SCREEN_HEIGHT;

    #[test]
    fn test_first_update_fills_every_column_in_bounds() {
        let mut signal = DemoSignal::new();
        let mut traces = TraceStore::new();
        signal.update(3.7, &mut traces);

        for x in 0..SCREEN_WIDTH {
            let span = traces.column(0, x).expect("every column populated");
            assert!(span.lo() <= span.hi());
            assert!((span.hi() as usize) < SCREEN_HEIGHT);
        }
    }

    #[test]
    fn test_later_updates_scroll_left_wrapping() {
        let mut signal = DemoSignal::new();
        let mut traces = TraceStore::new();
        signal.update(0.0, &mut traces);

        let before: std::vec::Vec<_> = (0..SCREEN_WIDTH).map(|x| traces.column(0, x)).collect();
        signal.update(1.0, &mut traces);

        for x in 0..SCREEN_WIDTH - 1 {
            assert_eq!(traces.column(0, x), before[x + 1]);
        }
        assert_eq!(traces.column(0, SCREEN_WIDTH - 1), before[0], "first column wraps to the end");
    }

    #[test]
    fn test_wave_is_continuous_between_columns() {
        let mut signal = DemoSignal::new();
        let mut traces = TraceStore::new();
        signal.update(12.5, &mut traces);

        // Adjacent column spans share or touch an edge (no vertical gaps).
        for x in 1..SCREEN_WIDTH {
            let prev = traces.column(0, x - 1).unwrap();
            let cur = traces.column(0, x).unwrap();
            assert!(
                cur.lo() <= prev.hi() + 1 && prev.lo() <= cur.hi() + 1,
                "gap between columns {} and {}",
                x - 1,
                x
            );
        }
    }
}
