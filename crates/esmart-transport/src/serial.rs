use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Default line speed of eSmart 3 controllers.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default per-read timeout. Short enough that an empty read returns quickly.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Line speed in baud. Default: 9600.
    pub baud_rate: u32,
    /// Read timeout. Default: 100 ms.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Settings for `port` with the default line speed and timeout.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Serial-port transport backed by the `serialport` crate.
pub struct SerialTransport {
    config: SerialConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create a closed transport; call [`Transport::open`] before use.
    pub fn new(config: SerialConfig) -> Self {
        Self { config, port: None }
    }

    /// Current settings.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(TransportError::NotOpen)
    }
}

impl Transport for SerialTransport {
    fn identifier(&self) -> &str {
        &self.config.port
    }

    fn open(&mut self) -> Result<()> {
        self.close();
        let port = serialport::new(self.config.port.as_str(), self.config.baud_rate)
            .timeout(self.config.timeout)
            .open()
            .map_err(|err| TransportError::open(&self.config.port, err))?;
        info!(
            port = %self.config.port,
            baud = self.config.baud_rate,
            "opened serial port"
        );
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!(port = %self.config.port, "closed serial port");
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        let waiting = self.port_mut()?.bytes_to_read()?;
        Ok(waiting as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let port = self.port_mut()?;
        loop {
            match Read::read(&mut *port, buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => return Ok(0),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port_mut()?;
        Write::write_all(&mut *port, data)?;
        Write::flush(&mut *port)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.config.port)
            .field("baud_rate", &self.config.baud_rate)
            .field("open", &self.port.is_some())
            .finish()
    }
}

/// A serial device visible to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path.
    pub name: String,
    /// Short description of the port type (`usb 1a86:7523 ...`, `pci`, ...).
    pub kind: String,
}

/// List the serial ports present on this machine.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|info| PortInfo {
            name: info.port_name,
            kind: describe_port_type(&info.port_type),
        })
        .collect())
}

fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut out = format!("usb {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = &usb.product {
                out.push(' ');
                out.push_str(product);
            }
            out
        }
        SerialPortType::PciPort => "pci".to_string(),
        SerialPortType::BluetoothPort => "bluetooth".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    }
}
