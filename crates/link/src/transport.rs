//! Transport boundary: a byte-oriented duplex channel with blocking writes
//! and timeout reads.

use crate::error::{LinkError, LinkResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Link-layer destination tag: the low three bytes of a radio MAC address.
///
/// Only meaningful to radio transports running in addressed mode; serial
/// transports ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAddress(pub [u8; 3]);

impl LinkAddress {
    /// Broadcast address accepted by every radio on the channel.
    pub const BROADCAST: LinkAddress = LinkAddress([0xFF, 0xFF, 0xFF]);
}

impl FromStr for LinkAddress {
    type Err = LinkError;

    /// Parse a colon-separated MAC address, keeping its low three bytes.
    ///
    /// Accepts both full six-byte MACs ("12:34:56:78:9A:BC") and the bare
    /// three-byte tail ("78:9A:BC").
    fn from_str(s: &str) -> LinkResult<LinkAddress> {
        let bytes: Result<Vec<u8>, _> = s
            .split(':')
            .map(|part| u8::from_str_radix(part, 16))
            .collect();
        let bytes = bytes.map_err(|_| LinkError::InvalidAddress(s.to_string()))?;
        if bytes.len() < 3 || bytes.len() > 6 {
            return Err(LinkError::InvalidAddress(s.to_string()));
        }
        let tail = &bytes[bytes.len() - 3..];
        Ok(LinkAddress([tail[0], tail[1], tail[2]]))
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:02X}:{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// Byte-oriented duplex channel to the physical link.
///
/// Implementations must be cheap to lock: the link layer holds the transport
/// for a full write/read round trip, so a blocking `read` bounded by its
/// timeout is the longest anything waits.
pub trait Transport: Send {
    /// Write a complete frame to the channel.
    fn write(&mut self, bytes: &[u8]) -> LinkResult<()>;

    /// Read up to `max` bytes, waiting at most `timeout`.
    ///
    /// An empty buffer means nothing arrived within the window; transport
    /// faults are errors.
    fn read(&mut self, max: usize, timeout: Duration) -> LinkResult<Vec<u8>>;

    /// Set the destination tag for subsequent writes.
    ///
    /// Default is a no-op for transports without link-layer addressing.
    fn set_destination(&mut self, _destination: Option<LinkAddress>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_mac_keeps_tail() {
        let addr: LinkAddress = "12:34:56:78:9A:BC".parse().unwrap();
        assert_eq!(addr, LinkAddress([0x78, 0x9A, 0xBC]));
    }

    #[test]
    fn test_parse_three_byte_tail() {
        let addr: LinkAddress = "78:9a:bc".parse().unwrap();
        assert_eq!(addr, LinkAddress([0x78, 0x9A, 0xBC]));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("78:9A".parse::<LinkAddress>().is_err());
        assert!("".parse::<LinkAddress>().is_err());
        assert!("zz:zz:zz".parse::<LinkAddress>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let addr = LinkAddress([0x01, 0xAB, 0xFF]);
        assert_eq!(addr.to_string().parse::<LinkAddress>().unwrap(), addr);
    }
}
