//! One-shot hardware peripheral initialization and register helpers.
//!
//! Configures the buzzer GPIO, the I2C master and the two UARTs using raw
//! ESP-IDF sys calls.  Called once from `main()` before the tasks start.
//! On host builds every helper is a stub so drivers compile and run in
//! simulation.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    I2cInitFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C master init failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART init failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

/// Which frame transport to bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorBus {
    I2c,
    Uart,
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(sensor: SensorBus) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any task is spawned.
    unsafe {
        init_buzzer_gpio()?;
        match sensor {
            SensorBus::I2c => init_i2c()?,
            SensorBus::Uart => init_uart(
                pins::SENSOR_UART_PORT,
                crate::sensors::line_stream::SERIAL_BAUD,
                pins::SENSOR_UART_TX_GPIO,
                pins::SENSOR_UART_RX_GPIO,
            )?,
        }
        init_uart(
            pins::BIN_UART_PORT,
            pins::BIN_UART_BAUD,
            pins::BIN_UART_TX_GPIO,
            pins::BIN_UART_RX_GPIO,
        )?;
    }
    info!("hw_init: all peripherals configured ({:?} sensor)", sensor);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(sensor: SensorBus) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped ({:?} sensor)", sensor);
    Ok(())
}

// ── GPIO output ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_buzzer_gpio() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::BUZZER_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    unsafe { gpio_set_level(pins::BUZZER_GPIO, 0) };
    info!("hw_init: buzzer GPIO{} low", pins::BUZZER_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    // SAFETY: register write on a pin configured in init_buzzer_gpio().
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) -> Result<(), i32> {
    Ok(())
}

// ── I2C master ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const I2C_TIMEOUT_TICKS: TickType_t = 100;

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let mut cfg = i2c_config_t {
        mode: i2c_mode_t_I2C_MODE_MASTER,
        sda_io_num: pins::I2C_SDA_GPIO,
        scl_io_num: pins::I2C_SCL_GPIO,
        sda_pullup_en: true,
        scl_pullup_en: true,
        ..Default::default()
    };
    cfg.__bindgen_anon_1.master.clk_speed = pins::I2C_FREQ_HZ;

    let ret = unsafe { i2c_param_config(pins::I2C_PORT, &cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::I2cInitFailed(ret)); }
    let ret = unsafe { i2c_driver_install(pins::I2C_PORT, cfg.mode, 0, 0, 0) };
    if ret != ESP_OK as i32 { return Err(HwInitError::I2cInitFailed(ret)); }

    info!(
        "hw_init: I2C{} master SDA={} SCL={} @ {}Hz",
        pins::I2C_PORT, pins::I2C_SDA_GPIO, pins::I2C_SCL_GPIO, pins::I2C_FREQ_HZ
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn i2c_write(port: i32, address: u8, bytes: &[u8]) -> Result<(), i32> {
    // SAFETY: the driver for `port` was installed in init_i2c().
    let ret = unsafe {
        i2c_master_write_to_device(port, address, bytes.as_ptr(), bytes.len(), I2C_TIMEOUT_TICKS)
    };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(target_os = "espidf")]
pub fn i2c_read(port: i32, address: u8, buf: &mut [u8]) -> Result<(), i32> {
    // SAFETY: see i2c_write().
    let ret = unsafe {
        i2c_master_read_from_device(port, address, buf.as_mut_ptr(), buf.len(), I2C_TIMEOUT_TICKS)
    };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(target_os = "espidf")]
pub fn i2c_write_read(port: i32, address: u8, bytes: &[u8], buf: &mut [u8]) -> Result<(), i32> {
    // SAFETY: see i2c_write().
    let ret = unsafe {
        i2c_master_write_read_device(
            port,
            address,
            bytes.as_ptr(),
            bytes.len(),
            buf.as_mut_ptr(),
            buf.len(),
            I2C_TIMEOUT_TICKS,
        )
    };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

/// Host stubs report "not present"; the simulated array is used instead.
#[cfg(not(target_os = "espidf"))]
pub const SIM_NOT_PRESENT: i32 = -1;

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write(_port: i32, _address: u8, _bytes: &[u8]) -> Result<(), i32> {
    Err(SIM_NOT_PRESENT)
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_read(_port: i32, _address: u8, _buf: &mut [u8]) -> Result<(), i32> {
    Err(SIM_NOT_PRESENT)
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write_read(_port: i32, _address: u8, _bytes: &[u8], _buf: &mut [u8]) -> Result<(), i32> {
    Err(SIM_NOT_PRESENT)
}

// ── UART ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const UART_RX_BUF: i32 = 4096;

#[cfg(target_os = "espidf")]
unsafe fn init_uart(port: i32, baud: u32, tx: i32, rx: i32) -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: baud as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(port, &cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }
    let ret = unsafe { uart_set_pin(port, tx, rx, UART_PIN_NO_CHANGE, UART_PIN_NO_CHANGE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }
    let ret = unsafe {
        uart_driver_install(port, UART_RX_BUF, 0, 0, core::ptr::null_mut(), 0)
    };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    info!("hw_init: UART{} TX={} RX={} @ {} baud", port, tx, rx, baud);
    Ok(())
}

/// Bytes written, or the driver's error code.
#[cfg(target_os = "espidf")]
pub fn uart_write(port: i32, bytes: &[u8]) -> Result<usize, i32> {
    // SAFETY: the driver for `port` was installed in init_uart().
    let n = unsafe { uart_write_bytes(port, bytes.as_ptr().cast(), bytes.len()) };
    usize::try_from(n).map_err(|_| n)
}

/// Block until the TX FIFO drains or `timeout_ms` passes.
#[cfg(target_os = "espidf")]
pub fn uart_flush(port: i32, timeout_ms: u32) -> Result<(), i32> {
    // SAFETY: see uart_write().
    let ret = unsafe { uart_wait_tx_done(port, ms_to_ticks(timeout_ms)) };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

/// Bytes read (0 on timeout), or the driver's error code.
#[cfg(target_os = "espidf")]
pub fn uart_read(port: i32, buf: &mut [u8], timeout_ms: u32) -> Result<usize, i32> {
    // SAFETY: see uart_write().
    let n = unsafe {
        uart_read_bytes(port, buf.as_mut_ptr().cast(), buf.len() as u32, ms_to_ticks(timeout_ms))
    };
    usize::try_from(n).map_err(|_| n)
}

#[cfg(target_os = "espidf")]
fn ms_to_ticks(ms: u32) -> TickType_t {
    (ms * configTICK_RATE_HZ / 1000).max(1)
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_write(_port: i32, bytes: &[u8]) -> Result<usize, i32> {
    Ok(bytes.len())
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_flush(_port: i32, _timeout_ms: u32) -> Result<(), i32> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_read(_port: i32, _buf: &mut [u8], _timeout_ms: u32) -> Result<usize, i32> {
    Ok(0)
}
