//! Async ST7789 display driver for embassy-rp.
//!
//! The driver never holds a full framebuffer. Callers hand it bounded
//! rectangular pixel blocks ([`write_block`](St7789Flusher::write_block));
//! anything larger than the DMA transfer ceiling is split into row-band
//! sub-blocks by the transport math in the library, one
//! CASET/RASET/RAMWR command group per sub-block.
//!
//! # Transfer modes
//!
//! - Commands and their small parameter payloads go over the synchronous
//!   path (`blocking_write`) - the DMA setup overhead costs more than the
//!   transfer itself.
//! - Pixel payloads go over the async DMA path, so the render loop can paint
//!   the next region while the bus drains the current one.

use defmt::unwrap;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Config as SpiConfig, Spi};
use embassy_time::Timer;
use scope_pico2::config::{BLOCK_BUFFER_SIZE, MAX_PIXEL_BLOCK, SCREEN_HEIGHT, SCREEN_WIDTH};
use scope_pico2::transport::{Error, Region, split_blocks};

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const DISPON: u8 = 0x29;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;
const PORCTRL: u8 = 0xB2;
const GCTRL: u8 = 0xB7;
const VCOMS: u8 = 0xBB;
const LCMCTRL: u8 = 0xC0;
const VDVVRHEN: u8 = 0xC2;
const VRHS: u8 = 0xC3;
const VDVS: u8 = 0xC4;
const FRCTRL2: u8 = 0xC6;
const PWCTRL1: u8 = 0xD0;
const PVGAMCTRL: u8 = 0xE0;
const NVGAMCTRL: u8 = 0xE1;

// MADCTL flags
const MADCTL_MX: u8 = 0x40; // Column address order
const MADCTL_MV: u8 = 0x20; // Row/column exchange

/// SPI configuration for the ST7789 display.
/// The ST7789 supports up to 62.5MHz SPI clock.
pub fn spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = 62_500_000;
    config
}

/// ST7789 display flusher - owns SPI and the DC/CS control lines.
///
/// Owned by the flush task after init so block writes run in parallel with
/// region painting.
pub struct St7789Flusher<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
}

impl<'d> St7789Flusher<'d> {
    /// Create a new flusher from SPI and control pins.
    pub fn new(spi: Spi<'d, SPI0, Async>, dc: Output<'d>, cs: Output<'d>) -> Self {
        Self { spi, dc, cs }
    }

    /// Initialize the display hardware.
    ///
    /// Once this returns the panel is ready: every later block write needs
    /// only its own address window and pixel data.
    pub async fn init(&mut self) {
        // Software reset
        self.write_command(SWRESET);
        Timer::after_millis(150).await;

        // Exit sleep mode
        self.write_command(SLPOUT);
        Timer::after_millis(10).await;

        // Set pixel format to RGB565 (16-bit)
        self.write_command(COLMOD);
        self.write_data(&[0x55]);

        // Set memory access control for 90 degree rotation (landscape)
        self.write_command(MADCTL);
        self.write_data(&[MADCTL_MV | MADCTL_MX]);

        // Porch setting
        self.write_command(PORCTRL);
        self.write_data(&[0x0C, 0x0C, 0x00, 0x33, 0x33]);

        // Gate control, VGH=13.65V, VGL=-10.43V
        self.write_command(GCTRL);
        self.write_data(&[0x45]);

        // VCOM setting, 1.175V
        self.write_command(VCOMS);
        self.write_data(&[0x2B]);

        // LCM control, XOR MX and MH
        self.write_command(LCMCTRL);
        self.write_data(&[0x0C]);

        // VDV and VRH from commands
        self.write_command(VDVVRHEN);
        self.write_data(&[0x01, 0xFF]);

        // VRH set, Vap=4.4V
        self.write_command(VRHS);
        self.write_data(&[0x11]);

        // VDV set, 0V
        self.write_command(VDVS);
        self.write_data(&[0x20]);

        // Frame rate control, 60Hz
        self.write_command(FRCTRL2);
        self.write_data(&[0x0F]);

        // Power control 1, AVDD=6.8V, AVCL=-4.8V, VDDS=2.3V
        self.write_command(PWCTRL1);
        self.write_data(&[0xA4, 0xA1]);

        // Positive voltage gamma control
        self.write_command(PVGAMCTRL);
        self.write_data(&[
            0xD0, 0x00, 0x05, 0x0E, 0x15, 0x0D, 0x37, 0x43, 0x47, 0x09, 0x15, 0x12, 0x16, 0x19,
        ]);

        // Negative voltage gamma control
        self.write_command(NVGAMCTRL);
        self.write_data(&[
            0xD0, 0x00, 0x05, 0x0D, 0x0C, 0x06, 0x2D, 0x44, 0x40, 0x0E, 0x1C, 0x18, 0x16, 0x19,
        ]);

        // Inversion on
        self.write_command(INVON);
        Timer::after_millis(10).await;

        // Normal display mode
        self.write_command(NORON);
        Timer::after_millis(10).await;

        // Display on
        self.write_command(DISPON);
        Timer::after_millis(10).await;
    }

    /// Send a command byte (DC low, CS low during transfer).
    fn write_command(&mut self, cmd: u8) {
        self.cs.set_low();
        self.dc.set_low();
        unwrap!(self.spi.blocking_write(&[cmd]));
        self.cs.set_high();
    }

    /// Send command parameter bytes (DC high, CS low during transfer).
    fn write_data(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.cs.set_low();
        self.dc.set_high();
        unwrap!(self.spi.blocking_write(data));
        self.cs.set_high();
    }

    /// Set the drawing window (inclusive bounds, big-endian hi/lo bytes).
    fn set_window(&mut self, region: Region) {
        let x0 = region.x as u16;
        let x1 = (region.x + region.width - 1) as u16;
        let y0 = region.y as u16;
        let y1 = (region.y + region.height - 1) as u16;

        self.write_command(CASET);
        self.write_data(&[(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8]);

        self.write_command(RASET);
        self.write_data(&[(y0 >> 8) as u8, y0 as u8, (y1 >> 8) as u8, y1 as u8]);
    }

    /// One command group: address window, RAMWR, pixel payload via DMA.
    /// `data` must hold exactly the block's pixels (big-endian RGB565).
    async fn write_block_single(&mut self, region: Region, data: &[u8]) {
        debug_assert!(region.area() <= MAX_PIXEL_BLOCK);
        self.set_window(region);

        // RAMWR command then the pixel payload with CS held low
        self.cs.set_low();
        self.dc.set_low();
        unwrap!(self.spi.blocking_write(&[RAMWR]));
        self.dc.set_high();
        unwrap!(self.spi.write(data).await);
        self.cs.set_high();
    }

    /// Write a rectangular pixel block, splitting requests above the DMA
    /// ceiling into consecutive row-band command groups.
    ///
    /// `data` is row-major big-endian RGB565 for the whole region. Bounds
    /// violations are rejected before any bus traffic.
    pub async fn write_block(&mut self, region: Region, data: &[u8]) -> Result<(), Error> {
        debug_assert_eq!(data.len(), region.area() * 2);
        for block in split_blocks(region, MAX_PIXEL_BLOCK)? {
            let start = block.offset * 2;
            let end = start + block.region.area() * 2;
            self.write_block_single(block.region, &data[start..end]).await;
        }
        Ok(())
    }

    /// Fill the whole panel with black, reusing one ceiling-sized zero
    /// buffer across the row-band writes.
    pub async fn blank_frame(&mut self) -> Result<(), Error> {
        static BLANK: [u8; BLOCK_BUFFER_SIZE] = [0; BLOCK_BUFFER_SIZE];
        let full = Region::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);
        for block in split_blocks(full, MAX_PIXEL_BLOCK)? {
            self.write_block_single(block.region, &BLANK[..block.region.area() * 2]).await;
        }
        Ok(())
    }
}
