//! Modbus RTU master — register reads from the soil probe.
//!
//! ```text
//!  ProbePort adapter ──▶ RtuClient ──▶ Transport (serial line)
//!                           │
//!                        codec (frame encode / decode / CRC)
//! ```

pub mod client;
pub mod codec;
pub mod transport;

pub use client::RtuClient;
pub use codec::{MAX_READ_REGISTERS, ReadRequest, Registers, crc16, decode_read_response};
pub use transport::Transport;
