//! Hardware adapter: bridges the physical actuators to domain port traits.
//!
//! Owns the bin link and the buzzer, exposing them together through
//! [`NotificationPort`] and [`BuzzerPort`] so the evaluator has a single
//! actuator owner.

use std::time::Duration;

use crate::app::ports::{BinCommand, BuzzerPort, NotificationPort};
use crate::error::ActuatorError;

/// Concrete adapter that combines all actuators behind port traits.
pub struct ActuatorAdapter<N, B> {
    link: N,
    buzzer: B,
}

impl<N, B> ActuatorAdapter<N, B> {
    pub fn new(link: N, buzzer: B) -> Self {
        Self { link, buzzer }
    }

    pub fn into_parts(self) -> (N, B) {
        (self.link, self.buzzer)
    }
}

impl<N: NotificationPort, B> NotificationPort for ActuatorAdapter<N, B> {
    fn send(&mut self, command: BinCommand) -> Result<(), ActuatorError> {
        self.link.send(command)
    }
}

impl<N, B: BuzzerPort> BuzzerPort for ActuatorAdapter<N, B> {
    fn sound(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        self.buzzer.sound(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::bin_link::BinLink;

    #[derive(Default)]
    struct CountingBuzzer(Vec<Duration>);

    impl BuzzerPort for CountingBuzzer {
        fn sound(&mut self, duration: Duration) -> Result<(), ActuatorError> {
            self.0.push(duration);
            Ok(())
        }
    }

    #[test]
    fn routes_each_port_to_its_actuator() {
        let mut hw = ActuatorAdapter::new(BinLink::new(Vec::new()), CountingBuzzer::default());
        hw.start().unwrap();
        hw.sound(Duration::from_millis(300)).unwrap();
        hw.notify().unwrap();

        let (link, buzzer) = hw.into_parts();
        assert_eq!(link.into_inner(), b"sn");
        assert_eq!(buzzer.0, vec![Duration::from_millis(300)]);
    }
}
