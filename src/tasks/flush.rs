//! Display flush task for pipelined region transfers.
//!
//! This task runs on the Embassy executor alongside the render loop,
//! receiving one painted region at a time and streaming it to the panel via
//! DMA while the render loop paints the next region into the other buffer.
//!
//! The Signal pair enforces the single-slot pipeline: the render loop never
//! hands over a new region before the previous one has completed, so at most
//! one group of bus transactions is outstanding at any time.

use core::sync::atomic::{AtomicU32, Ordering};

use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use scope_pico2::config::BLOCK_BUFFER_SIZE;
use scope_pico2::transport::Region;

use crate::st7789::St7789Flusher;

// =============================================================================
// Region Double Buffering
// =============================================================================

/// Static region pixel buffer A (one transfer ceiling of RGB565 bytes).
pub static mut REGION_BUFFER_A: [u8; BLOCK_BUFFER_SIZE] = [0u8; BLOCK_BUFFER_SIZE];
/// Static region pixel buffer B.
pub static mut REGION_BUFFER_B: [u8; BLOCK_BUFFER_SIZE] = [0u8; BLOCK_BUFFER_SIZE];

/// Double buffer manager for parallel paint/flush operations.
///
/// Tracks which region buffer is currently being painted. After painting,
/// call `swap()` to switch buffers and get the index of the completed buffer
/// for flushing.
pub struct RegionBuffers {
    /// Index of the buffer currently being painted (0 or 1).
    paint_idx: usize,
}

impl RegionBuffers {
    /// Create the buffer manager.
    ///
    /// # Safety
    /// Must only be called once. The static buffers are owned by this instance.
    pub unsafe fn new() -> Self { Self { paint_idx: 0 } }

    /// Get a mutable reference to the current paint buffer.
    ///
    /// # Safety
    /// Caller must ensure the flush task is not reading this buffer (it only
    /// ever reads the other one between `swap()` and `FLUSH_DONE`).
    #[inline]
    pub unsafe fn paint_buffer(&mut self) -> &'static mut [u8] {
        if self.paint_idx == 0 {
            unsafe { &mut *core::ptr::addr_of_mut!(REGION_BUFFER_A) }
        } else {
            unsafe { &mut *core::ptr::addr_of_mut!(REGION_BUFFER_B) }
        }
    }

    /// Swap buffers after painting completes.
    ///
    /// Returns the index of the buffer that was just painted (for flushing).
    /// The next paint uses the other buffer.
    #[inline]
    pub fn swap(&mut self) -> usize {
        let completed_idx = self.paint_idx;
        self.paint_idx = 1 - self.paint_idx;
        completed_idx
    }
}

// =============================================================================
// Flush Task
// =============================================================================

/// A painted region ready for the bus: which buffer holds it and where it
/// lands on the panel.
#[derive(Clone, Copy)]
pub struct FlushRequest {
    pub buffer_idx: usize,
    pub region: Region,
}

/// Signal carrying the next region to flush.
pub static FLUSH_SIGNAL: Signal<CriticalSectionRawMutex, FlushRequest> = Signal::new();

/// Signal notifying the render loop that the flush completed.
pub static FLUSH_DONE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Total regions flushed (for profiling).
pub static REGIONS_FLUSHED: AtomicU32 = AtomicU32::new(0);

/// Last flush time in microseconds (for profiling).
pub static LAST_FLUSH_TIME_US: AtomicU32 = AtomicU32::new(0);

/// Display flush task - runs in parallel with region painting.
///
/// Waits for a request, streams that buffer's region to the display, then
/// signals completion so the render loop may reuse the buffer.
#[embassy_executor::task]
pub async fn display_flush_task(flusher: &'static mut St7789Flusher<'static>) {
    info!("Display flush task started");

    loop {
        let request = FLUSH_SIGNAL.wait().await;
        let flush_start = Instant::now();

        // SAFETY: The render loop is painting the OTHER buffer and will not
        // touch this one until FLUSH_DONE fires.
        let buffer = unsafe {
            if request.buffer_idx == 0 {
                &*core::ptr::addr_of!(REGION_BUFFER_A)
            } else {
                &*core::ptr::addr_of!(REGION_BUFFER_B)
            }
        };

        // Planned regions are always within the ceiling and the panel, so a
        // rejection here is a programming error and fatal.
        let len = request.region.area() * 2;
        defmt::unwrap!(flusher.write_block(request.region, &buffer[..len]).await);

        LAST_FLUSH_TIME_US.store(flush_start.elapsed().as_micros() as u32, Ordering::Relaxed);
        REGIONS_FLUSHED.fetch_add(1, Ordering::Relaxed);

        FLUSH_DONE.signal(());
    }
}
