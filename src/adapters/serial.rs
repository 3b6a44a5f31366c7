//! Serial-port adapter — the only module that touches real ports.
//!
//! Implements [`ProbePort`] with the `serialport` crate: enumeration via
//! `available_ports()`, and one Modbus RTU transaction per attempt over a
//! freshly opened port.  The port handle is owned by the RTU client for
//! the duration of the call and closed when it drops, on every path.

use std::io;
use std::time::Duration;

use log::debug;
use serialport::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, SerialPortType,
    StopBits,
};

use crate::app::ports::{LinkSettings, ProbePort, SerialEndpointDescriptor};
use crate::error::DeviceError;
use crate::modbus::{Registers, RtuClient, Transport};

// ── Transport for serial ports ────────────────────────────────

impl Transport for Box<dyn SerialPort> {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        io::Read::read(&mut **self, buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        io::Write::write(&mut **self, data)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        io::Write::flush(&mut **self)
    }

    fn discard_input(&mut self) -> Result<(), io::Error> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), io::Error> {
        SerialPort::set_timeout(&mut **self, timeout).map_err(io::Error::from)
    }
}

// ── ProbePort implementation ──────────────────────────────────

/// Probe adapter over the host's serial ports (8N1, no flow control).
#[derive(Debug, Default)]
pub struct SerialProbeAdapter;

impl SerialProbeAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ProbePort for SerialProbeAdapter {
    fn discover(&mut self) -> Result<Vec<SerialEndpointDescriptor>, DeviceError> {
        let ports =
            serialport::available_ports().map_err(|e| DeviceError::Enumeration(e.to_string()))?;
        debug!("SERIAL | {} port(s) enumerated", ports.len());
        Ok(ports.into_iter().map(describe).collect())
    }

    fn read_registers(
        &mut self,
        endpoint: &SerialEndpointDescriptor,
        link: &LinkSettings,
    ) -> Result<Registers, DeviceError> {
        let path = os_port_path(&endpoint.name);
        let port = serialport::new(path.as_str(), link.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(link.timeout)
            .open()
            .map_err(|e| DeviceError::Open {
                port: endpoint.name.clone(),
                reason: e.to_string(),
            })?;

        let mut client = RtuClient::new(port, link.timeout);
        client.read_holding_registers(&link.request)
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn describe(info: SerialPortInfo) -> SerialEndpointDescriptor {
    let description = match &info.port_type {
        SerialPortType::UsbPort(usb) => usb_label(
            usb.product.as_deref(),
            usb.manufacturer.as_deref(),
            usb.vid,
            usb.pid,
        ),
        SerialPortType::BluetoothPort => "Bluetooth".into(),
        SerialPortType::PciPort => "PCI".into(),
        SerialPortType::Unknown => "Unknown".into(),
    };
    SerialEndpointDescriptor {
        name: info.port_name,
        description,
    }
}

fn usb_label(product: Option<&str>, manufacturer: Option<&str>, vid: u16, pid: u16) -> String {
    let name = product.or(manufacturer).unwrap_or("USB Serial");
    format!("{name} (USB {vid:04x}:{pid:04x})")
}

/// On Windows, COM ports >= 10 need the `\\.\COMxx` form.
#[cfg(target_os = "windows")]
fn os_port_path(name: &str) -> String {
    if name.starts_with("COM") && !name.starts_with(r"\\") {
        format!(r"\\.\{}", name)
    } else {
        name.to_owned()
    }
}

#[cfg(not(target_os = "windows"))]
fn os_port_path(name: &str) -> String {
    name.to_owned()
}
