//! UART port as `std::io::Read + Write`.
//!
//! A read that times out with no data is reported as
//! `ErrorKind::TimedOut` rather than `Ok(0)`, so buffered line readers do
//! not mistake a quiet line for end of stream.

use std::io;

use crate::drivers::hw_init;

pub struct UartPort {
    port: i32,
    read_timeout_ms: u32,
}

impl UartPort {
    /// The driver for `port` must be installed by hw_init.
    pub fn new(port: i32, read_timeout_ms: u32) -> Self {
        Self {
            port,
            read_timeout_ms,
        }
    }
}

fn driver_error(code: i32) -> io::Error {
    io::Error::other(format!("uart driver error {code}"))
}

impl io::Read for UartPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match hw_init::uart_read(self.port, buf, self.read_timeout_ms) {
            Ok(0) => Err(io::ErrorKind::TimedOut.into()),
            Ok(n) => Ok(n),
            Err(code) => Err(driver_error(code)),
        }
    }
}

impl io::Write for UartPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        hw_init::uart_write(self.port, buf).map_err(driver_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        hw_init::uart_flush(self.port, 100).map_err(driver_error)
    }
}
