//! Serial port transport backed by the `serialport` crate.

use crate::error::{LinkError, LinkResult};
use crate::transport::Transport;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Transport over a directly attached serial port (USB adapter or the
/// radio's transparent mode).
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open a serial port at the given baud rate.
    pub fn open(path: &str, baud: u32) -> LinkResult<SerialTransport> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(500))
            .open()?;
        info!(port = path, baud, "serial port opened");
        Ok(SerialTransport { port })
    }

    /// Enumerate serial ports that sit behind a USB adapter.
    ///
    /// Used for autodiscovery when the station config does not pin a port.
    pub fn available_usb_ports() -> LinkResult<Vec<String>> {
        let ports = serialport::available_ports()?;
        Ok(ports
            .into_iter()
            .filter(|p| matches!(p.port_type, serialport::SerialPortType::UsbPort(_)))
            .map(|p| p.port_name)
            .collect())
    }

    /// Open the first USB serial port found.
    pub fn open_first_usb(baud: u32) -> LinkResult<SerialTransport> {
        let ports = SerialTransport::available_usb_ports()?;
        let path = ports.first().ok_or(LinkError::NoPort)?;
        SerialTransport::open(path, baud)
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> LinkResult<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        debug!(len = bytes.len(), frame = %hex::encode(bytes), "serial write");
        Ok(())
    }

    fn read(&mut self, max: usize, timeout: Duration) -> LinkResult<Vec<u8>> {
        self.port.set_timeout(timeout)?;
        let mut buf = vec![0u8; max];
        match self.port.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                debug!(len = n, frame = %hex::encode(&buf), "serial read");
                Ok(buf)
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(LinkError::Io(e)),
        }
    }
}
