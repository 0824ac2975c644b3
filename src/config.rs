//! Display and graph configuration constants.
//!
//! # Optimization: Pre-computed Layout Constants
//!
//! Values like `MAX_PIXEL_BLOCK` are computed at compile time as `const`,
//! avoiding per-frame arithmetic. These constants are used throughout the
//! planning and painting code instead of recalculating sizes every frame.

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (ST7789 in landscape orientation: 320x240).
pub const SCREEN_WIDTH: usize = 320;

/// Display height in pixels.
pub const SCREEN_HEIGHT: usize = 240;

// =============================================================================
// Transport Configuration
// =============================================================================

/// Number of full display lines that fit in one DMA-backed SPI transaction.
pub const MAX_LINES: usize = 2;

/// Hardware transfer ceiling: maximum pixel count per SPI transaction.
/// Every painted region and every split sub-block stays at or under this.
pub const MAX_PIXEL_BLOCK: usize = MAX_LINES * SCREEN_WIDTH;

/// Byte size of a buffer holding one maximum-sized pixel block (RGB565).
pub const BLOCK_BUFFER_SIZE: usize = MAX_PIXEL_BLOCK * 2;

// =============================================================================
// Graph Configuration
// =============================================================================

/// Number of logical traces the store holds.
pub const NUM_TRACES: usize = 6;

/// Default gridline spacing in pixels, both axes.
pub const DEFAULT_GRID_SPACING: usize = 50;
