//! Trace storage and vertical interval math.
//!
//! Each trace holds one vertical interval per screen column describing where
//! it is lit in that column. The single union primitive, [`Span::widen`]
//! (lifted over `Option` by [`merge`]), combines multiple traces in one
//! column and combines old/new frame state for dirty detection - it is
//! commutative, associative, and idempotent, so repeated application over any
//! trace ordering yields the same union.

use crate::config::{NUM_TRACES, SCREEN_HEIGHT, SCREEN_WIDTH};

// =============================================================================
// Span
// =============================================================================

/// Inclusive vertical pixel interval within one screen column.
///
/// Invariant: `lo <= hi`, both within `[0, SCREEN_HEIGHT - 1]`. The no-paint
/// state (trace disabled or no data) is `Option<Span>::None`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Span {
    lo: u16,
    hi: u16,
}

impl Span {
    /// Create a span, clamping both coordinates to the panel height.
    ///
    /// An inverted input (`lo > hi`) is a feed bug; it is normalized to the
    /// single row at `lo` so `height()` can never underflow.
    pub const fn new(lo: u16, hi: u16) -> Self {
        const MAX_Y: u16 = (SCREEN_HEIGHT - 1) as u16;
        let lo = if lo > MAX_Y { MAX_Y } else { lo };
        let hi = if hi > MAX_Y { MAX_Y } else { hi };
        Self {
            lo,
            hi: if hi < lo { lo } else { hi },
        }
    }

    #[inline]
    pub const fn lo(self) -> u16 { self.lo }

    #[inline]
    pub const fn hi(self) -> u16 { self.hi }

    /// Number of rows the span covers.
    #[inline]
    pub const fn height(self) -> usize { (self.hi - self.lo + 1) as usize }

    /// Smallest span containing both inputs.
    pub const fn widen(self, other: Span) -> Span {
        Span {
            lo: if other.lo < self.lo { other.lo } else { self.lo },
            hi: if other.hi > self.hi { other.hi } else { self.hi },
        }
    }
}

/// Union of two optional spans. `None` is the identity.
pub const fn merge(a: Option<Span>, b: Option<Span>) -> Option<Span> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.widen(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

// =============================================================================
// Trace Store
// =============================================================================

/// Per-trace column intervals with per-trace enable flags.
///
/// Mutated by the data feed once per refresh cycle, read-only to the
/// renderer. Fixed-size arrays, one `Option<Span>` per screen column.
pub struct TraceStore {
    spans: [[Option<Span>; SCREEN_WIDTH]; NUM_TRACES],
    enabled: [bool; NUM_TRACES],
}

impl TraceStore {
    pub const fn new() -> Self {
        Self {
            spans: [[None; SCREEN_WIDTH]; NUM_TRACES],
            enabled: [false; NUM_TRACES],
        }
    }

    /// Toggle a trace's visibility. No redraw side effect by itself; the
    /// renderer observes the flag on its next pass.
    #[inline]
    pub fn set_enabled(&mut self, trace_idx: usize, enable: bool) { self.enabled[trace_idx] = enable; }

    #[inline]
    pub const fn is_enabled(&self, trace_idx: usize) -> bool { self.enabled[trace_idx] }

    /// Interval of one trace at one column.
    #[inline]
    pub const fn column(&self, trace_idx: usize, x: usize) -> Option<Span> { self.spans[trace_idx][x] }

    /// Set the interval of one trace at one column.
    #[inline]
    pub fn set_column(&mut self, trace_idx: usize, x: usize, span: Option<Span>) {
        self.spans[trace_idx][x] = span;
    }

    /// Full column array of one trace, for the data feed to rewrite in place.
    #[inline]
    pub fn columns_mut(&mut self, trace_idx: usize) -> &mut [Option<Span>; SCREEN_WIDTH] {
        &mut self.spans[trace_idx]
    }

    /// Union of all enabled traces at one column.
    pub fn merged(&self, x: usize) -> Option<Span> {
        let mut union = None;
        for trace_idx in 0..NUM_TRACES {
            if self.enabled[trace_idx] {
                union = merge(union, self.spans[trace_idx][x]);
            }
        }
        union
    }
}

impl Default for TraceStore {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================
