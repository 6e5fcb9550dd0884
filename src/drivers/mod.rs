//! Actuator drivers, bus wrappers, and hardware initialisation.

pub mod bin_link;
pub mod buzzer;
pub mod delay;
pub mod gpio;
pub mod hw_init;
pub mod i2c;
pub mod task_pin;
pub mod uart;
