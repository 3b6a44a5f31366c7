//! Transport abstraction — any byte-oriented half-duplex channel.
//!
//! Concrete implementations:
//! - serial port (`adapters::serial`, via the `serialport` crate)
//! - scripted in-memory transports in the test suite
//!
//! The RTU client is generic over `Transport`, so adding a new
//! transport (RS-485 gateway, TCP bridge) requires no changes to the
//! protocol logic.

use std::time::Duration;

use crate::error::DeviceError;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: Into<DeviceError>;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read; 0 means nothing arrived
    /// before the transport's own timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Drop any bytes already waiting in the receive buffer.
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Bound how long the next `read` may block.
    fn set_timeout(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
        Ok(())
    }
}
