//! Mock adapters for integration tests.
//!
//! `MockProbe` answers discovery and register reads from a script and
//! records every attempt, so tests can assert on probe order.
//! `ScriptedTransport` feeds canned bytes to the real RTU client.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

use soilprobe::app::events::AppEvent;
use soilprobe::app::ports::{EventSink, LinkSettings, ProbePort, SerialEndpointDescriptor};
use soilprobe::error::DeviceError;
use soilprobe::modbus::{Registers, Transport, crc16};

pub fn endpoint(name: &str) -> SerialEndpointDescriptor {
    SerialEndpointDescriptor {
        name: name.into(),
        description: format!("mock {name}"),
    }
}

/// 14-register block with the probe's layout filled in.
pub fn probe_registers(temp: u16, n: u16, moisture: u16, ec: u16, ph: u16, p: u16, k: u16) -> Vec<u16> {
    let mut regs = vec![temp, n, moisture, ec, ph, p, k];
    regs.resize(14, 0);
    regs
}

/// Full RTU response frame for `registers` from `slave`.
pub fn response_frame(slave: u8, registers: &[u16]) -> Vec<u8> {
    let mut frame = vec![slave, 0x03, (registers.len() * 2) as u8];
    for r in registers {
        frame.extend_from_slice(&r.to_be_bytes());
    }
    let crc = crc16(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}

// ── MockProbe ─────────────────────────────────────────────────

pub struct MockProbe {
    discovery: Result<Vec<SerialEndpointDescriptor>, DeviceError>,
    responses: HashMap<String, Result<Vec<u16>, DeviceError>>,
    pub attempts: Vec<String>,
    pub last_link: Option<LinkSettings>,
}

#[allow(dead_code)]
impl MockProbe {
    pub fn new(endpoints: &[&str]) -> Self {
        Self {
            discovery: Ok(endpoints.iter().map(|n| endpoint(n)).collect()),
            responses: HashMap::new(),
            attempts: Vec::new(),
            last_link: None,
        }
    }

    pub fn failing_discovery(error: DeviceError) -> Self {
        Self {
            discovery: Err(error),
            ..Self::new(&[])
        }
    }

    pub fn respond(mut self, name: &str, result: Result<Vec<u16>, DeviceError>) -> Self {
        self.responses.insert(name.into(), result);
        self
    }
}

impl ProbePort for MockProbe {
    fn discover(&mut self) -> Result<Vec<SerialEndpointDescriptor>, DeviceError> {
        self.discovery.clone()
    }

    fn read_registers(
        &mut self,
        endpoint: &SerialEndpointDescriptor,
        link: &LinkSettings,
    ) -> Result<Registers, DeviceError> {
        self.attempts.push(endpoint.name.clone());
        self.last_link = Some(*link);
        match self.responses.get(&endpoint.name) {
            Some(Ok(regs)) => Ok(Registers::from_slice(regs).expect("too many registers")),
            Some(Err(e)) => Err(e.clone()),
            None => Err(DeviceError::Timeout),
        }
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

/// Replays `rx` in chunks of at most `chunk` bytes; an exhausted script
/// reads as silence.
pub struct ScriptedTransport {
    rx: VecDeque<u8>,
    chunk: usize,
    pub tx: Vec<u8>,
    pub discarded: bool,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(rx: &[u8]) -> Self {
        Self::chunked(rx, usize::MAX)
    }

    pub fn chunked(rx: &[u8], chunk: usize) -> Self {
        Self {
            rx: rx.iter().copied().collect(),
            chunk,
            tx: Vec::new(),
            discarded: false,
        }
    }
}

impl Transport for ScriptedTransport {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.rx.len());
        for slot in &mut buf[..n] {
            *slot = self.rx.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.discarded = true;
        Ok(())
    }
}

/// Transport whose reads fail with an OS error.
pub struct BrokenTransport(pub io::ErrorKind);

impl Transport for BrokenTransport {
    type Error = io::Error;

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(self.0, "broken"))
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Delivers `header` after `header_delay`, then goes silent.  A read
/// blocks until the timeout last set through the transport expires,
/// as a serial port does.
pub struct StallingTransport {
    header: Vec<u8>,
    header_delay: Duration,
    timeout: Duration,
    pub timeouts: Vec<Duration>,
}

impl StallingTransport {
    pub fn new(header: &[u8], header_delay: Duration, port_timeout: Duration) -> Self {
        Self {
            header: header.to_vec(),
            header_delay,
            timeout: port_timeout,
            timeouts: Vec::new(),
        }
    }
}

impl Transport for StallingTransport {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let started = Instant::now();
        if !self.header.is_empty() && self.header_delay <= self.timeout {
            std::thread::sleep(self.header_delay);
            let n = buf.len().min(self.header.len());
            buf[..n].copy_from_slice(&self.header[..n]);
            self.header.drain(..n);
            return Ok(n);
        }
        std::thread::sleep(self.timeout.saturating_sub(started.elapsed()));
        Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.timeouts.push(timeout);
        self.timeout = timeout;
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
