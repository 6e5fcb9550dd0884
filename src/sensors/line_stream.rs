//! Serial CSV frame stream.
//!
//! The external array controller prints one frame per line:
//!
//! ```text
//! 24.81,25.02,nan,24.97, ... ,25.10,\r\n
//! ```
//!
//! Every value is followed by a comma, so the field after the last comma
//! (empty, or the line terminator) is discarded.  A line that fails UTF-8
//! decoding, or a read that times out, yields an empty frame which the
//! reconstructor drops as short.

use std::io::{BufRead, ErrorKind};

use log::{debug, warn};

use crate::error::SensorError;
use crate::frame::RawFrame;

/// Baud rate the array controller streams at.
pub const SERIAL_BAUD: u32 = 2_000_000;

/// Reads one CSV frame per line from any buffered reader.
pub struct LineSource<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(2048),
        }
    }

    /// Read the next line and split it into readings.
    pub fn acquire(&mut self) -> Result<RawFrame, SensorError> {
        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line) {
            Ok(0) => Err(SensorError::EndOfStream),
            Ok(_) => Ok(parse_line(&self.line)),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                debug!("serial: read interrupted ({:?}), partial line dropped", e.kind());
                Ok(RawFrame::default())
            }
            Err(e) => {
                warn!("serial: read failed: {}", e);
                Err(SensorError::Transport)
            }
        }
    }
}

/// Split one raw line into readings, dropping the trailing field.
pub fn parse_line(line: &[u8]) -> RawFrame {
    let Ok(text) = core::str::from_utf8(line) else {
        debug!("serial: non-UTF-8 line ({} bytes) dropped", line.len());
        return RawFrame::default();
    };
    let mut fields: Vec<&str> = text.split(',').collect();
    fields.pop();
    RawFrame::from_tokens(fields)
}
