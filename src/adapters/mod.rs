//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements  | Connects to                    |
//! |----------------|-------------|--------------------------------|
//! | `serial`       | ProbePort   | host serial ports, Modbus RTU  |
//! |                | Transport   |                                |
//! | `log_sink`     | EventSink   | `log` facade                   |
//! | `config_file`  | ConfigPort  | JSON file on disk              |

pub mod config_file;
pub mod log_sink;
#[cfg(feature = "serial")]
pub mod serial;
