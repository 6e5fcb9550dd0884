//! One-byte command link to the bin microcontroller.
//!
//! Each command is written and flushed immediately; nothing is read back.

use std::io::Write;

use log::debug;

use crate::app::ports::{BinCommand, NotificationPort};
use crate::error::ActuatorError;

pub struct BinLink<W> {
    port: W,
}

impl<W: Write> BinLink<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write> NotificationPort for BinLink<W> {
    fn send(&mut self, command: BinCommand) -> Result<(), ActuatorError> {
        debug!("bin_link: sending {:?} ({:?})", command, command.byte() as char);
        self.port
            .write_all(&[command.byte()])
            .and_then(|()| self.port.flush())
            .map_err(|_| ActuatorError::LinkWriteFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn commands_are_single_bytes() {
        let mut link = BinLink::new(Vec::new());
        link.start().unwrap();
        link.notify().unwrap();
        assert_eq!(link.into_inner(), b"sn");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported() {
        let mut link = BinLink::new(Broken);
        assert_eq!(link.notify(), Err(ActuatorError::LinkWriteFailed));
    }
}
