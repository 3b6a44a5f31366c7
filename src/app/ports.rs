//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (serial probe, event sinks, config storage) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never opens a port itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::error::DeviceError;
use crate::modbus::{ReadRequest, Registers};

// ───────────────────────────────────────────────────────────────
// Probe port (driven adapter: serial bus → domain)
// ───────────────────────────────────────────────────────────────

/// A serial endpoint found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialEndpointDescriptor {
    /// OS path or name (`/dev/ttyUSB0`, `COM3`).
    pub name: String,
    /// Human-readable description of the device behind it.
    pub description: String,
}

/// Electrical and protocol parameters for one read transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    pub timeout: Duration,
    pub request: ReadRequest,
}

impl LinkSettings {
    pub fn from_config(config: &SystemConfig) -> Result<Self, DeviceError> {
        Ok(Self {
            baud_rate: config.baud_rate,
            timeout: config.timeout(),
            request: ReadRequest::new(
                config.slave_address,
                config.register_start,
                config.register_count,
            )?,
        })
    }
}

/// Read-side port: the domain calls this to find and query probes.
pub trait ProbePort {
    /// Enumerate candidate endpoints in system order.
    fn discover(&mut self) -> Result<Vec<SerialEndpointDescriptor>, DeviceError>;

    /// Open `endpoint`, perform exactly one register read and release the
    /// endpoint before returning, on success and on error alike.
    fn read_registers(
        &mut self,
        endpoint: &SerialEndpointDescriptor,
        link: &LinkSettings,
    ) -> Result<Registers, DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate values on load and before persisting;
/// invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config could not be deserialized.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// I/O error from the storage backend.
    IoError(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
