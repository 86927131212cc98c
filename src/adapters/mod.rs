//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements  | Connects to                    |
//! |---------------|-------------|--------------------------------|
//! | `sim_gpio`    | GpioPort    | In-memory pin table            |
//! | `rppal_gpio`  | GpioPort    | Raspberry Pi `/dev/gpiomem`    |
//! | `model`       | ModelPort   | Echo / external model program  |
//! | `time`        | ClockPort   | System wall clock              |
//! | `config_file` | ConfigPort  | JSON file                      |
//! | `log_sink`    | EventSink   | `log` facade                   |

pub mod config_file;
pub mod log_sink;
pub mod model;
#[cfg(feature = "rpi")]
pub mod rppal_gpio;
pub mod sim_gpio;
pub mod time;
