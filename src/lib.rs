//! Thermoguard firmware library.
//!
//! Exposes the pipeline for integration testing and for the two entry
//! points.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod pins;
pub mod scheduler;
pub mod sensors;
