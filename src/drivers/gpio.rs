//! Push-pull GPIO output behind `embedded_hal::digital::OutputPin`.
//!
//! On ESP-IDF: drives the pin via hw_init helpers.
//! On host/test: tracks the level in-memory only.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin, StatefulOutputPin};

use crate::drivers::hw_init;

/// A `gpio_set_level` failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct OutputGpio {
    pin: i32,
    high: bool,
}

impl OutputGpio {
    /// The pin must already be configured as output by hw_init.
    pub fn new(pin: i32) -> Self {
        Self { pin, high: false }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        hw_init::gpio_write(self.pin, high).map_err(GpioError)?;
        self.high = high;
        Ok(())
    }
}

impl ErrorType for OutputGpio {
    type Error = GpioError;
}

impl OutputPin for OutputGpio {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl StatefulOutputPin for OutputGpio {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}
