//! Oscilloscope display firmware for Raspberry Pi Pico 2 (RP2350).
//!
//! Drives a multi-trace scrolling graph on the Pimoroni PIM715 Display Pack
//! 2.8" (ST7789, 320x240) over SPI with DMA.
//!
//! # Architecture
//!
//! The render loop and the flush task form a single-slot pipeline over two
//! region buffers:
//! - Main task: feeds the signal, plans the frame's regions, paints region N+1
//!   into one buffer while region N drains, waits for the flush before
//!   reusing a buffer.
//! - Flush task: waits for a request, streams that region to the panel via
//!   DMA, signals completion.
//!
//! A full-frame pass runs on the first frame and whenever the viewport
//! changes; steady state paints only the regions where the trace union
//! differs from the previous frame.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Modules only used in the firmware (the library holds the testable logic)
#[cfg(target_arch = "arm")]
mod st7789;
#[cfg(target_arch = "arm")]
mod tasks;

#[cfg(target_arch = "arm")]
use {
    core::sync::atomic::Ordering,
    crate::st7789::St7789Flusher,
    crate::tasks::flush::{LAST_FLUSH_TIME_US, REGIONS_FLUSHED},
    crate::tasks::{FLUSH_DONE, FLUSH_SIGNAL, FlushRequest, RegionBuffers, display_flush_task},
    defmt::info,
    defmt_rtt as _,
    embassy_executor::Spawner,
    embassy_rp::gpio::{Level, Output},
    embassy_rp::spi::Spi,
    embassy_time::{Duration, Instant},
    panic_probe as _,
    scope_pico2::demo::DemoSignal,
    scope_pico2::graph::GraphRenderer,
    static_cell::StaticCell,
};

// Program metadata for `picotool info`
#[cfg(target_arch = "arm")]
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-scope"),
    embassy_rp::binary_info::rp_program_description!(c"Multi-trace oscilloscope on PIM715 Display"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

#[cfg(target_arch = "arm")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Scope display starting...");

    let p = embassy_rp::init(Default::default());

    // Heartbeat LED (PIM715 RGB LED is active-low: Low = ON)
    let mut led_b = Output::new(p.PIN_28, Level::High);

    // Display pins
    // PIM715 pinout: CS=17, DC=16, CLK=18, MOSI=19, Backlight=20
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let mut _backlight = Output::new(p.PIN_20, Level::High); // Turn on backlight

    // Async SPI with DMA (TX-only, the display has no MISO line)
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, st7789::spi_config());

    // Initialize the panel and clear whatever the RAM powered up with
    let mut flusher = St7789Flusher::new(spi, dc, cs);
    flusher.init().await;
    defmt::unwrap!(flusher.blank_frame().await);
    info!("Display initialized");

    // Move flusher to static for the flush task (Embassy tasks need 'static)
    static FLUSHER: StaticCell<St7789Flusher<'static>> = StaticCell::new();
    let flusher: &'static mut St7789Flusher<'static> = FLUSHER.init(flusher);
    spawner.spawn(display_flush_task(flusher)).unwrap();
    info!("Display flush task spawned");

    // Renderer state is a few KB of trace and snapshot arrays; keep it off
    // the task stack.
    static RENDERER: StaticCell<GraphRenderer> = StaticCell::new();
    let renderer = RENDERER.init(GraphRenderer::new());
    renderer.traces_mut().set_enabled(0, true);

    // SAFETY: Only one RegionBuffers instance exists
    let mut buffers = unsafe { RegionBuffers::new() };

    let mut signal_source = DemoSignal::new();
    let mut flush_in_progress = false;

    let start = Instant::now();
    let mut last_profile_log = Instant::now();
    let mut frame_count = 0u32;

    info!("Render loop starting");

    loop {
        let frame_start = Instant::now();

        // The feed rewrites the whole trace before the renderer reads it for
        // this frame; nothing else mutates the store.
        let t_secs = start.elapsed().as_micros() as f32 * 1.0e-6;
        signal_source.update(t_secs, renderer.traces_mut());

        let plan = renderer.begin_frame();
        for region in &plan {
            let buffer = unsafe { buffers.paint_buffer() };
            renderer.paint_region(*region, &mut buffer[..region.area() * 2]);

            // Single-slot pipeline: at most one outstanding region on the
            // bus. Wait for the previous one before handing this buffer over.
            if flush_in_progress {
                FLUSH_DONE.wait().await;
            }
            let buffer_idx = buffers.swap();
            FLUSH_SIGNAL.signal(FlushRequest {
                buffer_idx,
                region: *region,
            });
            flush_in_progress = true;
        }
        renderer.end_frame();
        frame_count = frame_count.wrapping_add(1);

        // Log profiling data every 2 seconds
        if last_profile_log.elapsed() >= Duration::from_secs(2) {
            info!(
                "PROFILE: frame={} regions={} frame_time={}us last_flush={}us flushed={}",
                frame_count,
                plan.len(),
                frame_start.elapsed().as_micros() as u32,
                LAST_FLUSH_TIME_US.load(Ordering::Relaxed),
                REGIONS_FLUSHED.load(Ordering::Relaxed)
            );
            last_profile_log = Instant::now();
        }

        // Toggle the blue LED every second to show the loop is running
        if (start.elapsed().as_millis() as u32 / 1000).is_multiple_of(2) {
            led_b.set_low(); // ON
        } else {
            led_b.set_high(); // OFF
        }
    }
}

/// The firmware only targets ARM; on other targets the binary is a no-op so
/// host `cargo test` can build the whole package.
#[cfg(not(target_arch = "arm"))]
fn main() {}
