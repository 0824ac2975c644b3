//! Graph viewport state: grid spacing, visible column range, crosshair.

use crate::config::{DEFAULT_GRID_SPACING, SCREEN_HEIGHT, SCREEN_WIDTH};

/// The active viewport.
///
/// `mid_x`/`mid_y` locate the crosshair; gridlines step outward from it by
/// `grid_x`/`grid_y`. A spacing of 0 disables gridlines on that axis.
/// Replacing the window always forces a full redraw, never a partial
/// invalidation (see [`GraphRenderer::set_window`](super::GraphRenderer::set_window)).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct GraphWindow {
    /// Vertical gridline spacing in pixels.
    pub grid_x: usize,
    /// Horizontal gridline spacing in pixels.
    pub grid_y: usize,
    /// First visible column (inclusive).
    pub left: usize,
    /// Last visible column (inclusive).
    pub right: usize,
    /// Crosshair column.
    pub mid_x: usize,
    /// Crosshair row.
    pub mid_y: usize,
}

impl GraphWindow {
    /// Full-panel viewport with the crosshair at screen center.
    pub const fn full_panel() -> Self {
        Self {
            grid_x: DEFAULT_GRID_SPACING,
            grid_y: DEFAULT_GRID_SPACING,
            left: 0,
            right: SCREEN_WIDTH - 1,
            mid_x: SCREEN_WIDTH / 2,
            mid_y: SCREEN_HEIGHT / 2,
        }
    }
}

impl Default for GraphWindow {
    fn default() -> Self { Self::full_panel() }
}
