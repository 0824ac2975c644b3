//! Color constants for the scope display.
//!
//! # Rgb565 Color Format
//!
//! Rgb565 uses 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue.
//! This format is native to the ST7789 and requires no conversion when
//! writing to the display buffer. Standard colors come from the
//! `embedded_graphics` `RgbColor` trait constants; `ORANGE` is the one
//! application-specific value.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait - guaranteed optimal values)
// =============================================================================

/// Pure black (0, 0, 0). Graph background.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white (31, 63, 31). Crosshair gridlines.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure yellow (31, 63, 0). Regular gridlines.
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

/// Pure red (31, 0, 0). Trace 0.
pub const RED: Rgb565 = Rgb565::RED;

/// Pure green (0, 63, 0). Trace 1.
pub const GREEN: Rgb565 = Rgb565::GREEN;

/// Pure blue (0, 0, 31). Trace 2.
pub const BLUE: Rgb565 = Rgb565::BLUE;

/// Pure cyan (0, 63, 31). Trace 3.
pub const CYAN: Rgb565 = Rgb565::CYAN;

/// Magenta (31, 0, 31). Trace 5.
pub const MAGENTA: Rgb565 = Rgb565::MAGENTA;

// =============================================================================
// Custom Colors (application-specific)
// =============================================================================

/// Orange. Trace 4. RGB565: (31, 32, 0) - slightly darker than yellow.
pub const ORANGE: Rgb565 = Rgb565::new(31, 32, 0);

// =============================================================================
// Trace Palette
// =============================================================================

/// Colors assigned to traces by index.
pub const TRACE_PALETTE: [Rgb565; 6] = [RED, GREEN, BLUE, CYAN, ORANGE, MAGENTA];

/// Color for a trace index, cycling when there are more traces than
/// palette entries.
#[inline]
pub const fn trace_color(trace_idx: usize) -> Rgb565 { TRACE_PALETTE[trace_idx % TRACE_PALETTE.len()] }

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(trace_color(0), RED);
        assert_eq!(trace_color(5), MAGENTA);
        assert_eq!(trace_color(6), RED, "palette should wrap after 6 traces");
        assert_eq!(trace_color(10), ORANGE);
    }
}
