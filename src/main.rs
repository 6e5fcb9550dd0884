//! Thermoguard Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FrameSource        ActuatorAdapter     LogEventSink  NvsAdapter│
//! │  (Mlx90641 / UART)  (BinLink + Buzzer)  SyncEventSink (Config) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │ AcquisitionTask ─▶ SharedFrameStore ◀─ AlertEvaluator  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  CheckSchedule (1 Hz) · Shutdown                               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use thermoguard::config::SystemConfig;
use thermoguard::drivers::buzzer::Buzzer;
use thermoguard::drivers::delay::SysDelay;
use thermoguard::drivers::gpio::OutputGpio;
use thermoguard::pins;

fn banner(config: &SystemConfig) {
    info!("╔══════════════════════════════════════╗");
    info!("║  Thermoguard v{:<23}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!(
        "Threshold {:.1}\u{00b0}C, check every {}s, buzzer {:?} {:.1}s",
        config.temperature_threshold,
        config.check_interval_seconds,
        config.buzzer_mode,
        config.buzzer_duration_seconds
    );
}

fn buzzer(config: &SystemConfig) -> Buzzer<OutputGpio, SysDelay> {
    Buzzer::new(
        OutputGpio::new(pins::BUZZER_GPIO),
        SysDelay,
        config.buzzer_mode,
        config.buzzer_frequency_hz,
    )
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use anyhow::Context;
    use log::warn;
    use thermoguard::adapters::hardware::ActuatorAdapter;
    use thermoguard::adapters::log_sink::LogEventSink;
    use thermoguard::adapters::nvs::NvsAdapter;
    use thermoguard::app::ports::ConfigPort;
    use thermoguard::app::runtime::Shutdown;
    use thermoguard::drivers::bin_link::BinLink;
    use thermoguard::drivers::hw_init::{self, SensorBus};
    use thermoguard::drivers::i2c::EspI2c;
    use thermoguard::drivers::uart::UartPort;
    use thermoguard::monitor::{Monitor, Timing};
    use thermoguard::sensors::FrameSource;
    use thermoguard::sensors::mlx90641::{self, Mlx90641};

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new().context("NVS init")?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    banner(&config);

    // ── 3. Peripherals ────────────────────────────────────────
    let bus = if config.sensor_port.is_some() { SensorBus::Uart } else { SensorBus::I2c };
    hw_init::init_peripherals(bus)?;

    let (source, grid) = match bus {
        SensorBus::I2c => {
            let calibration = nvs
                .load_calibration()
                .context("reading array calibration")?
                .context("no array calibration stored; the bus sensor will not start")?;
            let array = Mlx90641::new(
                EspI2c::new(pins::I2C_PORT),
                SysDelay,
                mlx90641::DEFAULT_ADDRESS,
                config.refresh_rate_hz,
                calibration,
            )
            .context("MLX90641 init")?;
            (
                FrameSource::bus(Box::new(array), config.refresh_rate_hz),
                (mlx90641::WIDTH, mlx90641::HEIGHT),
            )
        }
        SensorBus::Uart => {
            let uart = UartPort::new(pins::SENSOR_UART_PORT, 1_000);
            (
                FrameSource::serial(Box::new(std::io::BufReader::new(uart))),
                (config.grid_width, config.grid_height),
            )
        }
    };

    let link = BinLink::new(UartPort::new(pins::BIN_UART_PORT, 100));
    let hw = ActuatorAdapter::new(link, buzzer(&config));

    // ── 4. Run ────────────────────────────────────────────────
    let monitor = Monitor::start(
        &config,
        grid,
        source,
        hw,
        LogEventSink::new(),
        Shutdown::new(),
        Timing::default(),
    )?;
    info!("System ready.");
    let report = monitor.join();
    warn!("Monitor stopped: {:?}", report);
    Ok(())
}

// ── Host ──────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::fs::{File, OpenOptions};
    use std::io::{self, BufReader, Write};
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use log::{info, warn};

    use thermoguard::adapters::hardware::ActuatorAdapter;
    use thermoguard::adapters::log_sink::LogEventSink;
    use thermoguard::adapters::sync::{JsonLinesUploader, RetryPolicy, SyncEventSink};
    use thermoguard::app::runtime::Shutdown;
    use thermoguard::config::{BuzzerMode, SystemConfig};
    use thermoguard::drivers::bin_link::BinLink;
    use thermoguard::drivers::hw_init::{self, SensorBus};
    use thermoguard::frame::reconstruct::NeighborRule;
    use thermoguard::monitor::{Monitor, Timing};
    use thermoguard::sensors::FrameSource;
    use thermoguard::sensors::simulated::SimulatedArray;

    /// Thermoguard fever-screening monitor (host build)
    #[derive(Parser, Debug)]
    #[command(name = "thermoguard", version, long_about = None)]
    struct Args {
        /// Serial device or file streaming CSV frames (omit for the simulated array)
        #[arg(long)]
        sensor_port: Option<String>,

        /// Serial device for the bin microcontroller (omit to only log)
        #[arg(long)]
        notification_port: Option<String>,

        /// Hotspot threshold in Celsius
        #[arg(long)]
        threshold: Option<f32>,

        /// Seconds between checks
        #[arg(long)]
        interval: Option<u32>,

        /// Frame width in cells
        #[arg(long)]
        width: Option<u16>,

        /// Frame height in cells
        #[arg(long)]
        height: Option<u16>,

        /// Let right neighbors count on the bottom row too
        #[arg(long, default_value_t = false)]
        symmetric_neighbors: bool,

        /// Drive the buzzer as a square wave instead of a steady level
        #[arg(long, default_value_t = false)]
        tone: bool,

        /// Do not send fever notifications to the bin
        #[arg(long, default_value_t = false)]
        no_notify: bool,

        /// Append log records as JSON lines to this file
        #[arg(long)]
        sync_log: Option<PathBuf>,

        /// Simulated array: cell index to hold at 41.5 °C
        #[arg(long)]
        sim_fever_cell: Option<usize>,

        /// Increase log verbosity (-v debug, -vv trace)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    }

    impl Args {
        fn into_config(self) -> (SystemConfig, Option<PathBuf>, Option<usize>) {
            let mut c = SystemConfig::default();
            c.sensor_port = self.sensor_port;
            c.notification_port = self.notification_port;
            if let Some(t) = self.threshold {
                c.temperature_threshold = t;
            }
            if let Some(i) = self.interval {
                c.check_interval_seconds = i;
            }
            if let Some(w) = self.width {
                c.grid_width = w;
            }
            if let Some(h) = self.height {
                c.grid_height = h;
            }
            if self.symmetric_neighbors {
                c.neighbor_rule = NeighborRule::Symmetric;
            }
            if self.tone {
                c.buzzer_mode = BuzzerMode::Tone;
            }
            if self.no_notify {
                c.notification_enabled = false;
            }
            (c, self.sync_log, self.sim_fever_cell)
        }
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        env_logger::Builder::from_default_env()
            .filter_level(match args.verbose {
                0 => log::LevelFilter::Info,
                1 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            })
            .init();

        let (config, sync_log, sim_fever_cell) = args.into_config();
        config.validate().context("invalid configuration")?;
        super::banner(&config);

        let shutdown = Shutdown::new();
        let sd = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl-C received, shutting down");
            sd.trigger();
        })
        .context("installing Ctrl-C handler")?;

        // ── Sensor ────────────────────────────────────────────
        let grid = (config.grid_width, config.grid_height);
        let source = match &config.sensor_port {
            Some(path) => {
                hw_init::init_peripherals(SensorBus::Uart)?;
                let file = File::open(path).with_context(|| format!("opening {path}"))?;
                info!("Reading frames from {}", path);
                FrameSource::serial(Box::new(BufReader::new(file)))
            }
            None => {
                hw_init::init_peripherals(SensorBus::I2c)?;
                let array = SimulatedArray::new(config.grid_width, config.grid_height, 24.0);
                if let Some(cell) = sim_fever_cell {
                    array.handle().set_hotspot(cell, 41.5);
                }
                info!("Using simulated {}x{} array", grid.0, grid.1);
                FrameSource::bus(Box::new(array), config.refresh_rate_hz)
            }
        };

        // ── Actuators ─────────────────────────────────────────
        let port: Box<dyn Write + Send> = match &config.notification_port {
            Some(path) => Box::new(
                OpenOptions::new()
                    .write(true)
                    .open(path)
                    .with_context(|| format!("opening {path}"))?,
            ),
            None => Box::new(io::sink()),
        };
        let hw = ActuatorAdapter::new(BinLink::new(port), super::buzzer(&config));

        // ── Sinks ─────────────────────────────────────────────
        let sync = match sync_log {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("opening {}", path.display()))?;
                let (sink, handle) = SyncEventSink::spawn(
                    JsonLinesUploader::new(file),
                    RetryPolicy::from_config(&config),
                    shutdown.clone(),
                )?;
                Some((sink, handle))
            }
            None => None,
        };
        let (sync_sink, sync_handle) = sync.unzip();
        let sinks = (LogEventSink::new(), sync_sink);

        // ── Run ───────────────────────────────────────────────
        let monitor = Monitor::start(
            &config,
            grid,
            source,
            hw,
            sinks,
            shutdown,
            Timing::default(),
        )?;
        let report = monitor.join();
        info!(
            "Stopped: {} frames published, {} checks, {} fevers",
            report.acquisition.published, report.alerts.checks, report.alerts.fevers
        );

        if let Some(h) = sync_handle {
            match h.join() {
                Ok(r) => info!("Sync: {} uploaded, {} failed", r.uploaded, r.failed),
                Err(_) => warn!("Sync worker panicked"),
            }
        }
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    host::main()
}
