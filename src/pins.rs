//! GPIO / peripheral pin assignments for the Thermoguard board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Buzzer
// ---------------------------------------------------------------------------

/// Digital output driving the buzzer transistor (active HIGH).
pub const BUZZER_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// IR array (MLX90641 on I2C0)
// ---------------------------------------------------------------------------

pub const I2C_PORT: i32 = 0;
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Fast-mode plus; the array needs it for 8 Hz+ refresh.
pub const I2C_FREQ_HZ: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// Serial links
// ---------------------------------------------------------------------------

/// UART carrying CSV frames from an external array bridge.
pub const SENSOR_UART_PORT: i32 = 2;
pub const SENSOR_UART_RX_GPIO: i32 = 16;
pub const SENSOR_UART_TX_GPIO: i32 = 17;

/// UART to the bin microcontroller.
pub const BIN_UART_PORT: i32 = 1;
pub const BIN_UART_TX_GPIO: i32 = 4;
pub const BIN_UART_RX_GPIO: i32 = 5;
pub const BIN_UART_BAUD: u32 = 9_600;
