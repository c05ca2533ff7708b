//! CL4790-class radio transport in API mode.
//!
//! The transceiver is used as a transparent serial pipe by default; API mode
//! adds per-frame addressing so one station can poll several robots on the
//! same channel. Channel, system id and baud configuration happen through
//! the vendor tool before deployment and are not handled here.
//!
//! Outgoing API packet: `0x81 | len | session | retries | mac[3] | payload`.
//! Incoming API packet: `0x81 | len | rssi | rssi* | mac[3] | payload`.

use crate::error::{LinkError, LinkResult};
use crate::transport::{LinkAddress, Transport};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

/// API-mode frame header byte.
const API_HEADER: u8 = 0x81;

/// Maximum payload the radio accepts in one API packet.
const API_PAYLOAD_MAX: usize = 0x80;

/// Link-layer retry count requested from the radio per packet.
const API_RETRIES: u8 = 0x04;

/// Bytes of receive metadata between the length byte and the payload.
const API_RX_METADATA: usize = 5;

/// Build one outgoing API-mode packet around a payload.
pub fn encode_api_packet(destination: Option<LinkAddress>, payload: &[u8]) -> LinkResult<Vec<u8>> {
    if payload.len() > API_PAYLOAD_MAX {
        return Err(LinkError::Transport(format!(
            "payload too large for radio API packet: {} bytes",
            payload.len()
        )));
    }
    let mac = destination.unwrap_or(LinkAddress::BROADCAST);
    let mut packet = Vec::with_capacity(7 + payload.len());
    packet.push(API_HEADER);
    packet.push(payload.len() as u8);
    packet.push(0x00); // session count
    packet.push(API_RETRIES);
    packet.extend_from_slice(&mac.0);
    packet.extend_from_slice(payload);
    Ok(packet)
}

/// Transport over a radio in API mode with optional per-frame addressing.
pub struct RadioTransport {
    port: Box<dyn serialport::SerialPort>,
    destination: Option<LinkAddress>,
}

impl RadioTransport {
    /// Open the serial side of the radio.
    pub fn open(path: &str, baud: u32) -> LinkResult<RadioTransport> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(500))
            .open()?;
        info!(port = path, baud, "radio port opened (API mode)");
        Ok(RadioTransport {
            port,
            destination: None,
        })
    }

    fn read_exact_timed(&mut self, len: usize, timeout: Duration) -> LinkResult<Option<Vec<u8>>> {
        self.port.set_timeout(timeout)?;
        let mut buf = vec![0u8; len];
        match self.port.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf)),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(LinkError::Io(e)),
        }
    }
}

impl Transport for RadioTransport {
    fn write(&mut self, bytes: &[u8]) -> LinkResult<()> {
        let packet = encode_api_packet(self.destination, bytes)?;
        self.port.write_all(&packet)?;
        self.port.flush()?;
        debug!(
            dest = %self.destination.unwrap_or(LinkAddress::BROADCAST),
            len = bytes.len(),
            frame = %hex::encode(bytes),
            "radio write"
        );
        Ok(())
    }

    fn read(&mut self, max: usize, timeout: Duration) -> LinkResult<Vec<u8>> {
        // Hunt for the API header; stray bytes between packets are dropped.
        match self.read_exact_timed(1, timeout)? {
            Some(b) if b[0] == API_HEADER => {}
            Some(b) => {
                warn!(byte = b[0], "discarding stray byte while seeking API header");
                return Ok(Vec::new());
            }
            None => return Ok(Vec::new()),
        }

        let len = match self.read_exact_timed(1, timeout)? {
            Some(b) => b[0] as usize,
            None => return Ok(Vec::new()),
        };
        // RSSI pair plus sender MAC tail precede the payload.
        if self.read_exact_timed(API_RX_METADATA, timeout)?.is_none() {
            return Ok(Vec::new());
        }
        let payload = match self.read_exact_timed(len, timeout)? {
            Some(p) => p,
            None => return Ok(Vec::new()),
        };
        debug!(len = payload.len(), frame = %hex::encode(&payload), "radio read");
        if payload.len() > max {
            Ok(payload[..max].to_vec())
        } else {
            Ok(payload)
        }
    }

    fn set_destination(&mut self, destination: Option<LinkAddress>) {
        self.destination = destination;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_broadcast_packet() {
        let packet = encode_api_packet(None, &[0xAA, 0xBB]).unwrap();
        assert_eq!(
            packet,
            vec![0x81, 2, 0x00, 0x04, 0xFF, 0xFF, 0xFF, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_encode_addressed_packet() {
        let dest = LinkAddress([0x78, 0x9A, 0xBC]);
        let packet = encode_api_packet(Some(dest), &[0x01]).unwrap();
        assert_eq!(&packet[4..7], &[0x78, 0x9A, 0xBC]);
        assert_eq!(packet[1], 1);
    }

    #[test]
    fn test_encode_rejects_oversize_payload() {
        let payload = vec![0u8; API_PAYLOAD_MAX + 1];
        assert!(encode_api_packet(None, &payload).is_err());
    }
}
