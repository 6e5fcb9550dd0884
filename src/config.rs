//! System configuration parameters
//!
//! All tunable parameters for the Thermoguard monitor.  Built once before
//! any task starts (defaults, then NVS on device or CLI overrides on host)
//! and passed by value to each component; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::frame::reconstruct::NeighborRule;

/// How the buzzer is driven while an alert sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuzzerMode {
    /// Output held high for the whole duration (active buzzer).
    Hold,
    /// Square wave at `buzzer_frequency_hz` (passive piezo).
    Tone,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sensor ---
    /// `None` = bus-attached array, otherwise the serial stream device
    /// (a device path on host, a UART name such as `uart1` on device).
    pub sensor_port: Option<String>,
    /// Frame width in cells (row length of the flattened grid).
    pub grid_width: u16,
    /// Frame height in cells.
    pub grid_height: u16,
    /// Bus sensor refresh rate (Hz).
    pub refresh_rate_hz: u8,
    /// Interpolation rule for invalid cells.
    pub neighbor_rule: NeighborRule,

    // --- Alerting ---
    /// Cells strictly above this temperature (Celsius) are hotspots.
    pub temperature_threshold: f32,
    /// Seconds between hotspot checks.
    pub check_interval_seconds: u32,

    // --- Buzzer ---
    pub buzzer_duration_seconds: f32,
    pub buzzer_mode: BuzzerMode,
    /// Tone frequency when `buzzer_mode` is `Tone`.
    pub buzzer_frequency_hz: u32,
    /// Ready beep at startup (0 disables).
    pub startup_buzz_seconds: f32,

    // --- Bin notification link ---
    pub notification_enabled: bool,
    /// Serial device for the bin microcontroller (`None` = log only).
    pub notification_port: Option<String>,

    // --- Remote sync ---
    pub sync_retry_attempts: u8,
    pub sync_retry_delay_seconds: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sensor
            sensor_port: None,
            grid_width: 32,
            grid_height: 6,
            refresh_rate_hz: 8,
            neighbor_rule: NeighborRule::Reference,

            // Alerting
            temperature_threshold: 40.6,
            check_interval_seconds: 30,

            // Buzzer
            buzzer_duration_seconds: 2.5,
            buzzer_mode: BuzzerMode::Hold,
            buzzer_frequency_hz: 2000,
            startup_buzz_seconds: 2.0,

            // Bin link
            notification_enabled: true,
            notification_port: None,

            // Remote sync
            sync_retry_attempts: 3,
            sync_retry_delay_seconds: 5,
        }
    }
}

impl SystemConfig {
    /// Number of cells in one frame.
    pub fn cell_count(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=64).contains(&self.grid_width) {
            return Err(ConfigError::ValidationFailed("grid_width must be 1-64"));
        }
        if !(1..=64).contains(&self.grid_height) {
            return Err(ConfigError::ValidationFailed("grid_height must be 1-64"));
        }
        if ![1, 2, 4, 8, 16, 32, 64].contains(&self.refresh_rate_hz) {
            return Err(ConfigError::ValidationFailed(
                "refresh_rate_hz must be a power of two 1-64",
            ));
        }
        if !self.temperature_threshold.is_finite()
            || !(20.0..=100.0).contains(&self.temperature_threshold)
        {
            return Err(ConfigError::ValidationFailed(
                "temperature_threshold must be 20.0-100.0",
            ));
        }
        if !(1..=3600).contains(&self.check_interval_seconds) {
            return Err(ConfigError::ValidationFailed(
                "check_interval_seconds must be 1-3600",
            ));
        }
        if !(0.0..=30.0).contains(&self.buzzer_duration_seconds) {
            return Err(ConfigError::ValidationFailed(
                "buzzer_duration_seconds must be 0-30",
            ));
        }
        if !(0.0..=30.0).contains(&self.startup_buzz_seconds) {
            return Err(ConfigError::ValidationFailed(
                "startup_buzz_seconds must be 0-30",
            ));
        }
        if self.buzzer_mode == BuzzerMode::Tone && !(20..=20_000).contains(&self.buzzer_frequency_hz)
        {
            return Err(ConfigError::ValidationFailed(
                "buzzer_frequency_hz must be 20-20000 in tone mode",
            ));
        }
        if self.sync_retry_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "sync_retry_attempts must be at least 1",
            ));
        }
        if matches!(&self.sensor_port, Some(p) if p.is_empty()) {
            return Err(ConfigError::ValidationFailed("sensor_port must not be empty"));
        }
        Ok(())
    }
}
