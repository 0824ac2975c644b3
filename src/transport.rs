//! Pixel transport windowing math.
//!
//! The SPI bus can move at most [`MAX_PIXEL_BLOCK`](crate::config::MAX_PIXEL_BLOCK)
//! pixels per DMA-backed transaction. Any rectangular write larger than that
//! is split along the height axis into consecutive row-band sub-blocks, each
//! within the ceiling, covering the request with no overlap and no gap. The
//! splitting itself is pure math and lives here so it can be tested on the
//! host; the ST7789 driver in the binary turns each sub-block into one
//! CASET/RASET/RAMWR command group.

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};

// =============================================================================
// Errors
// =============================================================================

/// Precondition violations on transport requests.
///
/// These are programming errors: they are rejected before touching hardware
/// and the firmware treats them as fatal. There is no retryable class.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Error {
    /// Region is empty or extends past the panel edge.
    OutOfBounds,
    /// A single row of the region exceeds the transfer ceiling, so the
    /// request cannot be split along the height axis.
    BlockTooWide,
}

// =============================================================================
// Region
// =============================================================================

/// A rectangular pixel area written atomically in one transport call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Pixel count of the region.
    #[inline]
    pub const fn area(&self) -> usize { self.width * self.height }

    /// Check the region lies within the panel and is non-empty.
    pub const fn validate(&self) -> Result<(), Error> {
        if self.width == 0
            || self.height == 0
            || self.x + self.width > SCREEN_WIDTH
            || self.y + self.height > SCREEN_HEIGHT
        {
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }
}

// =============================================================================
// Block Splitting
// =============================================================================

/// One sub-block of a split request: the rows to write and the pixel offset
/// into the caller's row-major source buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block {
    pub region: Region,
    pub offset: usize,
}

/// Iterator over the row-band sub-blocks of a transport request.
pub struct BlockSplit {
    region: Region,
    rows_per_block: usize,
    next_row: usize,
}

impl Iterator for BlockSplit {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.next_row >= self.region.height {
            return None;
        }
        let rows = self.rows_per_block.min(self.region.height - self.next_row);
        let block = Block {
            region: Region::new(
                self.region.x,
                self.region.y + self.next_row,
                self.region.width,
                rows,
            ),
            offset: self.region.width * self.next_row,
        };
        self.next_row += rows;
        Some(block)
    }
}

/// Split a write request against the transfer ceiling.
///
/// Requests at or under `max_pixels` yield exactly one block. Larger requests
/// are split only along the height axis into bands of
/// `floor(max_pixels / width)` rows each (last band shorter on remainder),
/// the source offset advancing by `width * rows` per band.
pub fn split_blocks(region: Region, max_pixels: usize) -> Result<BlockSplit, Error> {
    region.validate()?;
    let rows_per_block = if region.area() <= max_pixels {
        region.height
    } else {
        match max_pixels / region.width {
            0 => return Err(Error::BlockTooWide),
            rows => rows,
        }
    };
    Ok(BlockSplit {
        region,
        rows_per_block,
        next_row: 0,
    })
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================
