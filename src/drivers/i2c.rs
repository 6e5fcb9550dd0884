//! I2C master behind `embedded_hal::i2c::I2c`.
//!
//! The legacy ESP-IDF master API only offers write, read and
//! write-then-read as single bus transactions, so those are the
//! transaction shapes accepted here.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cBusError {
    /// The driver returned this error code.
    Driver(i32),
    /// Transaction shape the driver cannot express.
    Unsupported,
}

impl embedded_hal::i2c::Error for I2cBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct EspI2c {
    port: i32,
}

impl EspI2c {
    /// The driver for `port` must be installed by hw_init.
    pub fn new(port: i32) -> Self {
        Self { port }
    }
}

impl ErrorType for EspI2c {
    type Error = I2cBusError;
}

impl I2c<SevenBitAddress> for EspI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let r = match operations {
            [] => Ok(()),
            [Operation::Write(w)] => hw_init::i2c_write(self.port, address, w),
            [Operation::Read(r)] => hw_init::i2c_read(self.port, address, r),
            [Operation::Write(w), Operation::Read(r)] => {
                hw_init::i2c_write_read(self.port, address, w, r)
            }
            _ => return Err(I2cBusError::Unsupported),
        };
        r.map_err(I2cBusError::Driver)
    }
}
