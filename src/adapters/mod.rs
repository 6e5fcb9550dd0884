//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                      | Connects to               |
//! |------------|---------------------------------|---------------------------|
//! | `hardware` | NotificationPort, BuzzerPort    | bin link + buzzer drivers |
//! | `log_sink` | EventSink                       | Serial / stderr log       |
//! | `sync`     | EventSink, UploadPort           | Remote log store          |
//! | `nvs`      | ConfigPort                      | NVS / in-memory store     |
//! | `time`     | (clock helpers)                 | ESP32 timer / std clocks  |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod sync;
pub mod time;
