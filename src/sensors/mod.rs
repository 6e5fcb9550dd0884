//! Sensor subsystem: the two frame transports behind one [`FrameSource`].
//!
//! | Variant  | Transport                         | Driver                 |
//! |----------|-----------------------------------|------------------------|
//! | `Bus`    | I2C array polled at refresh rate  | [`mlx90641`] / [`simulated`] |
//! | `Serial` | CSV line per frame, CRLF framed   | [`line_stream`]        |
//!
//! The variant is picked once at construction from `sensor_port`; the
//! acquisition loop only sees [`FramePort`].  Neither variant retries:
//! a bad read comes back as a short or NaN-filled [`RawFrame`].

pub mod line_stream;
pub mod mlx90641;
pub mod simulated;

use std::io::BufRead;
use std::time::{Duration, Instant};

use log::debug;

use crate::app::ports::FramePort;
use crate::error::SensorError;
use crate::frame::RawFrame;
use line_stream::LineSource;

/// A bus-attached IR array that fills one reading per pixel.
pub trait ThermalArray {
    /// Pixels delivered per frame.
    fn pixel_count(&self) -> usize;

    /// Block until a new frame is available and write it into `out`
    /// (`out.len() == pixel_count()`).  Dead pixels are written as NaN.
    fn read_frame(&mut self, out: &mut [f32]) -> Result<(), SensorError>;
}

/// Bus variant: a [`ThermalArray`] paced to a fixed refresh rate.
pub struct BusSource {
    array: Box<dyn ThermalArray + Send>,
    interval: Duration,
    next_due: Option<Instant>,
}

impl BusSource {
    pub fn new(array: Box<dyn ThermalArray + Send>, refresh_rate_hz: u8) -> Self {
        let hz = refresh_rate_hz.max(1) as u64;
        Self {
            array,
            interval: Duration::from_micros(1_000_000 / hz),
            next_due: None,
        }
    }

    fn acquire(&mut self) -> Result<RawFrame, SensorError> {
        if let Some(due) = self.next_due {
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        self.next_due = Some(Instant::now() + self.interval);

        let mut cells = vec![f32::NAN; self.array.pixel_count()];
        self.array.read_frame(&mut cells)?;
        Ok(RawFrame::new(cells))
    }
}

/// Raw frame transport, chosen at construction.
pub enum FrameSource {
    Bus(BusSource),
    Serial(LineSource<Box<dyn BufRead + Send>>),
}

impl FrameSource {
    pub fn bus(array: Box<dyn ThermalArray + Send>, refresh_rate_hz: u8) -> Self {
        Self::Bus(BusSource::new(array, refresh_rate_hz))
    }

    pub fn serial(reader: Box<dyn BufRead + Send>) -> Self {
        Self::Serial(LineSource::new(reader))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bus(_) => "bus",
            Self::Serial(_) => "serial",
        }
    }
}

impl FramePort for FrameSource {
    fn acquire(&mut self) -> Result<RawFrame, SensorError> {
        let raw = match self {
            Self::Bus(bus) => bus.acquire()?,
            Self::Serial(line) => line.acquire()?,
        };
        debug!("{}: {} readings", self.kind(), raw.len());
        Ok(raw)
    }
}
