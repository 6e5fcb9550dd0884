//! Piezo buzzer on one GPIO.
//!
//! Two drive modes:
//!
//! - `Hold`: pin high for the whole duration (active buzzer with its own
//!   oscillator).
//! - `Tone`: square wave at `frequency_hz` (passive transducer).
//!
//! The pin is always driven low afterwards, including when a write fails
//! part-way.

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::BuzzerPort;
use crate::config::BuzzerMode;
use crate::error::ActuatorError;

pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
    mode: BuzzerMode,
    frequency_hz: u32,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub fn new(pin: P, delay: D, mode: BuzzerMode, frequency_hz: u32) -> Self {
        Self {
            pin,
            delay,
            mode,
            frequency_hz: frequency_hz.max(1),
        }
    }

    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        match self.mode {
            BuzzerMode::Hold => {
                self.pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
                self.delay.delay_ms(duration.as_millis() as u32);
            }
            BuzzerMode::Tone => {
                let half_period_ns = 500_000_000 / self.frequency_hz;
                let cycles = duration.as_micros() as u64 * u64::from(self.frequency_hz) / 1_000_000;
                for _ in 0..cycles {
                    self.pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
                    self.delay.delay_ns(half_period_ns);
                    self.pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
                    self.delay.delay_ns(half_period_ns);
                }
            }
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> BuzzerPort for Buzzer<P, D> {
    fn sound(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        debug!("buzzer: {:?} for {:?}", self.mode, duration);
        let driven = self.drive(duration);
        let released = self.pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed);
        driven.and(released)
    }
}
