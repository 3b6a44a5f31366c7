//! Blocking Modbus RTU master.
//!
//! One request, one response, no retries: a failed transaction is
//! reported to the caller, which decides whether to try another device.

use std::time::{Duration, Instant};

use log::debug;

use super::codec::{
    MAX_RESPONSE_LEN, RESPONSE_HEADER_LEN, ReadRequest, Registers, decode_read_response,
    expected_frame_len,
};
use super::transport::Transport;
use crate::error::DeviceError;

/// RTU master bound to one transport.
pub struct RtuClient<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> RtuClient<T> {
    /// `timeout` bounds the whole transaction, from request write to the
    /// last response byte.
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Issue a read-holding-registers request and wait for the answer.
    pub fn read_holding_registers(&mut self, request: &ReadRequest) -> Result<Registers, DeviceError> {
        let deadline = Instant::now() + self.timeout;

        lift(self.transport.discard_input())?;
        self.write_all(&request.encode())?;
        lift(self.transport.flush())?;

        let mut buf = [0u8; MAX_RESPONSE_LEN];
        self.fill(&mut buf[..RESPONSE_HEADER_LEN], deadline)?;

        let total = expected_frame_len(&buf[..RESPONSE_HEADER_LEN])
            .ok_or(DeviceError::MalformedFrame("incomplete header"))?;
        if total > MAX_RESPONSE_LEN {
            return Err(DeviceError::MalformedFrame("declared length exceeds protocol maximum"));
        }
        if total > RESPONSE_HEADER_LEN {
            self.fill(&mut buf[RESPONSE_HEADER_LEN..total], deadline)?;
        }

        debug!("RTU | rx {} bytes from slave {}", total, request.slave);
        decode_read_response(&buf[..total], request)
    }

    /// Give back the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn write_all(&mut self, mut data: &[u8]) -> Result<(), DeviceError> {
        while !data.is_empty() {
            let n = lift(self.transport.write(data))?;
            if n == 0 {
                return Err(DeviceError::Io("transport accepted zero bytes".into()));
            }
            data = &data[n..];
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8], deadline: Instant) -> Result<(), DeviceError> {
        let mut offset = 0;
        while offset < buf.len() {
            // Each read may only block for what is left of the transaction.
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(DeviceError::Timeout);
            }
            lift(self.transport.set_timeout(remaining))?;
            let n = lift(self.transport.read(&mut buf[offset..]))?;
            if n == 0 {
                return Err(DeviceError::Timeout);
            }
            offset += n;
        }
        Ok(())
    }
}

fn lift<V, E: Into<DeviceError>>(result: Result<V, E>) -> Result<V, DeviceError> {
    result.map_err(Into::into)
}
