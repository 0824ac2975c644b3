//! Oscilloscope display library - testable modules for the scope firmware.
//!
//! This library contains the core logic that can be tested on the host machine:
//! trace interval math, graph region planning and painting, and the transport
//! windowing math that bounds every SPI transaction to the DMA ceiling. The
//! binary (`main.rs`) uses this library and adds the embedded-specific code
//! (ST7789 driver, flush task, render loop).
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p scope-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p scope-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// === Pure logic modules (testable on host, no ARM dependencies) ===

// Configuration
pub mod config;

// Rendering
pub mod colors;
pub mod graph;
pub mod transport;

// Synthetic signal source (feeds trace 0 in demo builds)
pub mod demo;
