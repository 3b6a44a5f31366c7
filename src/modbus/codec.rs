//! Modbus RTU frame codec for function 0x03 (read holding registers).
//!
//! Wire format:
//! ```text
//! request   ┌───────┬──────┬──────────┬──────────┬─────────┐
//!           │ slave │ 0x03 │ start BE │ count BE │ CRC LE  │
//!           └───────┴──────┴──────────┴──────────┴─────────┘
//! response  ┌───────┬──────┬────────────┬──────────────┬─────────┐
//!           │ slave │ 0x03 │ byte_count │ N × u16 BE   │ CRC LE  │
//!           └───────┴──────┴────────────┴──────────────┴─────────┘
//! exception ┌───────┬──────┬──────┬─────────┐
//!           │ slave │ 0x83 │ code │ CRC LE  │
//!           └───────┴──────┴──────┴─────────┘
//! ```
//!
//! CRC-16/MODBUS: reflected polynomial 0xA001, initial value 0xFFFF,
//! transmitted low byte first.

use crate::error::DeviceError;

/// Function code: read holding registers.
pub const FN_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Set on the function code of an exception response.
const EXCEPTION_FLAG: u8 = 0x80;

/// Protocol limit on registers per read.
pub const MAX_READ_REGISTERS: usize = 125;

/// Encoded request size.
pub const REQUEST_LEN: usize = 8;

/// Exception response size.
pub const EXCEPTION_LEN: usize = 5;

/// Slave, function and byte-count bytes that open every response.
pub const RESPONSE_HEADER_LEN: usize = 3;

/// Largest possible read response (125 registers).
pub const MAX_RESPONSE_LEN: usize = 5 + 2 * MAX_READ_REGISTERS;

/// Decoded register block.
pub type Registers = heapless::Vec<u16, MAX_READ_REGISTERS>;

/// Compute the Modbus CRC-16 of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// A validated read-holding-registers request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub slave: u8,
    pub start: u16,
    pub count: u16,
}

impl ReadRequest {
    pub fn new(slave: u8, start: u16, count: u16) -> Result<Self, DeviceError> {
        if slave == 0 || slave > 247 {
            return Err(DeviceError::InvalidRequest("slave address must be 1..=247"));
        }
        if count == 0 || count as usize > MAX_READ_REGISTERS {
            return Err(DeviceError::InvalidRequest("register count must be 1..=125"));
        }
        if u32::from(start) + u32::from(count) > 0x1_0000 {
            return Err(DeviceError::InvalidRequest("register range exceeds address space"));
        }
        Ok(Self { slave, start, count })
    }

    /// Encode into the 8-byte request frame.
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        let mut frame = [0u8; REQUEST_LEN];
        frame[0] = self.slave;
        frame[1] = FN_READ_HOLDING_REGISTERS;
        frame[2..4].copy_from_slice(&self.start.to_be_bytes());
        frame[4..6].copy_from_slice(&self.count.to_be_bytes());
        let crc = crc16(&frame[..6]);
        frame[6..8].copy_from_slice(&crc.to_le_bytes());
        frame
    }

    /// Length of a normal response to this request.
    pub fn response_len(&self) -> usize {
        5 + 2 * self.count as usize
    }
}

/// Total frame length implied by the response header.
///
/// Needs the first [`RESPONSE_HEADER_LEN`] bytes; returns `None` if fewer
/// are supplied.
pub fn expected_frame_len(header: &[u8]) -> Option<usize> {
    if header.len() < 2 {
        return None;
    }
    if header[1] & EXCEPTION_FLAG != 0 {
        return Some(EXCEPTION_LEN);
    }
    header.get(2).map(|&byte_count| 5 + byte_count as usize)
}

/// Validate a complete response frame against `request` and extract the
/// register values.
pub fn decode_read_response(frame: &[u8], request: &ReadRequest) -> Result<Registers, DeviceError> {
    if frame.len() < EXCEPTION_LEN {
        return Err(DeviceError::MalformedFrame("frame shorter than minimum"));
    }

    let (body, crc_bytes) = frame.split_at(frame.len() - 2);
    let actual = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
    let expected = crc16(body);
    if actual != expected {
        return Err(DeviceError::CrcMismatch { expected, actual });
    }

    if body[0] != request.slave {
        return Err(DeviceError::UnexpectedSlave {
            expected: request.slave,
            actual: body[0],
        });
    }

    let function = body[1];
    if function == FN_READ_HOLDING_REGISTERS | EXCEPTION_FLAG {
        return Err(DeviceError::Exception(body[2]));
    }
    if function != FN_READ_HOLDING_REGISTERS {
        return Err(DeviceError::UnexpectedFunction(function));
    }

    let byte_count = body[2] as usize;
    let data = &body[RESPONSE_HEADER_LEN..];
    if byte_count != data.len() {
        return Err(DeviceError::MalformedFrame("byte count disagrees with frame length"));
    }
    if byte_count % 2 != 0 {
        return Err(DeviceError::MalformedFrame("odd byte count"));
    }
    if byte_count != 2 * request.count as usize {
        return Err(DeviceError::ShortRead {
            expected: request.count as usize,
            actual: byte_count / 2,
        });
    }

    let mut registers = Registers::new();
    for pair in data.chunks_exact(2) {
        registers
            .push(u16::from_be_bytes([pair[0], pair[1]]))
            .map_err(|_| DeviceError::MalformedFrame("too many registers"))?;
    }
    Ok(registers)
}
