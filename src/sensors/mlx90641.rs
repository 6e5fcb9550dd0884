//! Melexis MLX90641 16×12 far-infrared array over I2C.
//!
//! Register-level driver written against `embedded_hal::i2c::I2c`, so the
//! same code runs on the ESP-IDF I2C master and on a mock bus in tests.
//!
//! ## Protocol
//!
//! - Addresses and data are 16-bit big-endian words.
//! - `STATUS` bit 3 is set when a new subpage is in RAM; the host clears
//!   it after reading.
//! - `CONTROL1` bits 7..9 select the refresh rate (0.5 Hz .. 64 Hz).
//! - Pixel RAM starts at `PIXEL_RAM` and holds one signed word per pixel.
//!
//! ## Conversion
//!
//! A linearised model is applied per pixel:
//! `T = reference_c + (raw - offset[i]) * scale`.  The coefficients are
//! measured per device against a reference blackbody and stored in NVS;
//! there is no built-in default, and the driver refuses to start without
//! a valid [`Calibration`].  Words outside the physically plausible range
//! are reported as NaN so the reconstructor fills them in.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::ThermalArray;
use crate::error::{ConfigError, SensorError};

/// Factory default 7-bit address.
pub const DEFAULT_ADDRESS: u8 = 0x33;
pub const PIXELS: usize = 192;
pub const WIDTH: u16 = 16;
pub const HEIGHT: u16 = 12;

const REG_STATUS: u16 = 0x8000;
const REG_CONTROL1: u16 = 0x800D;
const PIXEL_RAM: u16 = 0x0400;

const STATUS_NEW_DATA: u16 = 1 << 3;
const REFRESH_SHIFT: u16 = 7;
const REFRESH_MASK: u16 = 0b111 << REFRESH_SHIFT;

/// Poll budget for the data-ready bit (x `POLL_STEP_MS`).
const POLL_ATTEMPTS: u32 = 2_500;
const POLL_STEP_MS: u32 = 1;

/// Plausible object temperature window (Celsius).
const VALID_RANGE_C: core::ops::RangeInclusive<f32> = -40.0..=300.0;

/// Refresh-rate code for `CONTROL1`.
fn refresh_code(hz: u8) -> Option<u16> {
    match hz {
        1 => Some(1),
        2 => Some(2),
        4 => Some(3),
        8 => Some(4),
        16 => Some(5),
        32 => Some(6),
        64 => Some(7),
        _ => None,
    }
}

/// Per-pixel linear calibration for one physical array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Celsius per LSB after offset removal.
    scale: f32,
    /// Temperature at zero compensated signal.
    reference_c: f32,
    /// Raw offset, one per pixel.
    offsets: Vec<i16>,
}

impl Calibration {
    pub fn new(scale: f32, reference_c: f32, offsets: Vec<i16>) -> Result<Self, ConfigError> {
        let cal = Self {
            scale,
            reference_c,
            offsets,
        };
        cal.validate()?;
        Ok(cal)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.offsets.len() != PIXELS {
            return Err(ConfigError::ValidationFailed(
                "calibration needs one offset per pixel",
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "calibration scale must be positive",
            ));
        }
        if !VALID_RANGE_C.contains(&self.reference_c) {
            return Err(ConfigError::ValidationFailed(
                "calibration reference must be -40..300",
            ));
        }
        Ok(())
    }

    fn to_celsius(&self, pixel: usize, raw: i16) -> f32 {
        let Some(&offset) = self.offsets.get(pixel) else {
            return f32::NAN;
        };
        let t = self.reference_c + (raw as f32 - offset as f32) * self.scale;
        if VALID_RANGE_C.contains(&t) { t } else { f32::NAN }
    }
}

/// MLX90641 driver.
pub struct Mlx90641<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    calibration: Calibration,
    words: [u16; PIXELS],
}

impl<I2C: I2c, D: DelayNs> Mlx90641<I2C, D> {
    /// Validate the calibration, confirm the device answers, then program
    /// the refresh rate.
    pub fn new(
        i2c: I2C,
        delay: D,
        address: u8,
        refresh_rate_hz: u8,
        calibration: Calibration,
    ) -> Result<Self, SensorError> {
        if let Err(e) = calibration.validate() {
            warn!("mlx90641: {}", e);
            return Err(SensorError::Uncalibrated);
        }
        let code = refresh_code(refresh_rate_hz).ok_or(SensorError::BadResponse)?;
        let mut dev = Self {
            i2c,
            delay,
            address,
            calibration,
            words: [0; PIXELS],
        };
        let ctrl = dev.read_register(REG_CONTROL1)?;
        let new_ctrl = (ctrl & !REFRESH_MASK) | (code << REFRESH_SHIFT);
        dev.write_register(REG_CONTROL1, new_ctrl)?;
        if dev.read_register(REG_CONTROL1)? != new_ctrl {
            warn!("mlx90641: control register did not latch refresh rate");
            return Err(SensorError::BadResponse);
        }
        info!(
            "mlx90641: addr=0x{:02x} refresh={}Hz ctrl=0x{:04x}",
            address, refresh_rate_hz, new_ctrl
        );
        Ok(dev)
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, reg: u16) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut buf)
            .map_err(|_| SensorError::Transport)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_register(&mut self, reg: u16, value: u16) -> Result<(), SensorError> {
        let [rh, rl] = reg.to_be_bytes();
        let [vh, vl] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[rh, rl, vh, vl])
            .map_err(|_| SensorError::Transport)
    }

    fn wait_data_ready(&mut self) -> Result<u16, SensorError> {
        for _ in 0..POLL_ATTEMPTS {
            let status = self.read_register(REG_STATUS)?;
            if status & STATUS_NEW_DATA != 0 {
                return Ok(status);
            }
            self.delay.delay_ms(POLL_STEP_MS);
        }
        Err(SensorError::Timeout)
    }

    fn read_pixel_ram(&mut self) -> Result<(), SensorError> {
        let mut bytes = [0u8; PIXELS * 2];
        self.i2c
            .write_read(self.address, &PIXEL_RAM.to_be_bytes(), &mut bytes)
            .map_err(|_| SensorError::Transport)?;
        for (word, pair) in self.words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Ok(())
    }
}

impl<I2C: I2c, D: DelayNs> ThermalArray for Mlx90641<I2C, D> {
    fn pixel_count(&self) -> usize {
        PIXELS
    }

    fn read_frame(&mut self, out: &mut [f32]) -> Result<(), SensorError> {
        let status = self.wait_data_ready()?;
        self.read_pixel_ram()?;
        self.write_register(REG_STATUS, status & !STATUS_NEW_DATA)?;

        for (i, (cell, word)) in out.iter_mut().zip(self.words.iter()).enumerate() {
            *cell = self.calibration.to_celsius(i, *word as i16);
        }
        Ok(())
    }
}
