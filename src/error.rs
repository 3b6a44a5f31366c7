//! Unified error types for the soil probe engine.
//!
//! A single `Error` enum that every subsystem converts into, with one
//! sub-enum per failure domain.  Device errors carry owned context
//! (port names, OS messages) so they can be aggregated across probe
//! attempts and reported after the loop finishes.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The probe could not be reached or answered incorrectly.
    Device(DeviceError),
    /// A dosage calculation step failed (recovered by the calculator).
    Dosage(DosageError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Dosage(e) => write!(f, "dosage: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

/// Failure of a single serial endpoint, or of endpoint enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Listing serial ports failed at the OS level.
    Enumeration(String),
    /// The port exists but could not be opened.
    Open { port: String, reason: String },
    /// Read/write on an open port failed.
    Io(String),
    /// No (complete) response before the per-attempt deadline.
    Timeout,
    /// Response CRC did not match its payload.
    CrcMismatch { expected: u16, actual: u16 },
    /// Response came from a different slave address.
    UnexpectedSlave { expected: u8, actual: u8 },
    /// Response carried a different function code.
    UnexpectedFunction(u8),
    /// The device answered with a Modbus exception.
    Exception(u8),
    /// Frame structure is wrong (byte count, length).
    MalformedFrame(&'static str),
    /// Fewer registers than the decoder needs.
    ShortRead { expected: usize, actual: usize },
    /// Request parameters are outside protocol limits.
    InvalidRequest(&'static str),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enumeration(msg) => write!(f, "port enumeration failed: {msg}"),
            Self::Open { port, reason } => write!(f, "cannot open {port}: {reason}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Timeout => write!(f, "no response within timeout"),
            Self::CrcMismatch { expected, actual } => {
                write!(f, "CRC mismatch (expected 0x{expected:04X}, got 0x{actual:04X})")
            }
            Self::UnexpectedSlave { expected, actual } => {
                write!(f, "response from slave {actual}, expected {expected}")
            }
            Self::UnexpectedFunction(code) => write!(f, "unexpected function code 0x{code:02X}"),
            Self::Exception(code) => write!(f, "device exception 0x{code:02X} ({})", exception_name(*code)),
            Self::MalformedFrame(msg) => write!(f, "malformed frame: {msg}"),
            Self::ShortRead { expected, actual } => {
                write!(f, "short read: expected {expected} registers, got {actual}")
            }
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Io(e.to_string()),
        }
    }
}

fn exception_name(code: u8) -> &'static str {
    match code {
        0x01 => "illegal function",
        0x02 => "illegal data address",
        0x03 => "illegal data value",
        0x04 => "slave device failure",
        0x05 => "acknowledge",
        0x06 => "slave device busy",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Dosage errors
// ---------------------------------------------------------------------------

/// Internal failure of a dosage step.  Never escapes
/// [`DosageCalculator::compute_dosage`](crate::dosage::DosageCalculator::compute_dosage),
/// which substitutes the fallback rate instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DosageError {
    /// A recommendation range string could not be parsed.
    UnparsableRange(String),
    /// An efficiency factor is zero, negative or non-finite.
    InvalidEfficiency(&'static str),
    /// An intermediate or final value is NaN or infinite.
    NonFinite(&'static str),
}

impl fmt::Display for DosageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsableRange(text) => write!(f, "cannot parse range {text:?}"),
            Self::InvalidEfficiency(nutrient) => write!(f, "invalid efficiency factor for {nutrient}"),
            Self::NonFinite(what) => write!(f, "non-finite {what}"),
        }
    }
}

impl std::error::Error for DosageError {}

impl From<DosageError> for Error {
    fn from(e: DosageError) -> Self {
        Self::Dosage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
