//! Application core: domain logic behind port traits.
//!
//! The acquisition loop, the alert evaluator and the task runtime live
//! here.  All interaction with hardware happens through the **port
//! traits** in [`ports`], so this layer is testable without peripherals.

pub mod acquisition;
pub mod evaluator;
pub mod events;
pub mod ports;
pub mod runtime;
