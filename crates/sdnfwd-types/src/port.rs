//! Port numbers and attachment points.

use crate::{DeviceId, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A device port, or one of the reserved logical ports.
///
/// `Flood` sends out every port of the device except the ingress port;
/// `Normal` hands the packet to the device's own (non-OpenFlow) pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PortNumber {
    Physical(u32),
    Flood,
    Normal,
}

impl PortNumber {
    /// Returns true for the reserved logical ports.
    pub const fn is_logical(&self) -> bool {
        !matches!(self, PortNumber::Physical(_))
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortNumber::Physical(n) => write!(f, "{}", n),
            PortNumber::Flood => f.write_str("FLOOD"),
            PortNumber::Normal => f.write_str("NORMAL"),
        }
    }
}

impl FromStr for PortNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("flood") {
            return Ok(PortNumber::Flood);
        }
        if s.eq_ignore_ascii_case("normal") {
            return Ok(PortNumber::Normal);
        }
        s.parse::<u32>()
            .map(PortNumber::Physical)
            .map_err(|_| ParseError::InvalidPortNumber(s.to_string()))
    }
}

impl From<u32> for PortNumber {
    fn from(n: u32) -> Self {
        PortNumber::Physical(n)
    }
}

impl TryFrom<String> for PortNumber {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PortNumber> for String {
    fn from(port: PortNumber) -> String {
        port.to_string()
    }
}

/// Where a host or link terminates on a device.
///
/// Textual form is `<device>/<port>`, e.g. `of:0000000000000001/3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttachmentPoint {
    pub device: DeviceId,
    pub port: PortNumber,
}

impl AttachmentPoint {
    pub fn new(device: DeviceId, port: impl Into<PortNumber>) -> Self {
        Self {
            device,
            port: port.into(),
        }
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}

impl FromStr for AttachmentPoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, port) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidAttachmentPoint(s.to_string()))?;
        let device = device
            .parse()
            .map_err(|_| ParseError::InvalidAttachmentPoint(s.to_string()))?;
        let port = port
            .parse()
            .map_err(|_| ParseError::InvalidAttachmentPoint(s.to_string()))?;
        Ok(AttachmentPoint { device, port })
    }
}

impl TryFrom<String> for AttachmentPoint {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AttachmentPoint> for String {
    fn from(ap: AttachmentPoint) -> String {
        ap.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_parse_and_display() {
        assert_eq!("3".parse::<PortNumber>().unwrap(), PortNumber::Physical(3));
        assert_eq!("FLOOD".parse::<PortNumber>().unwrap(), PortNumber::Flood);
        assert_eq!("normal".parse::<PortNumber>().unwrap(), PortNumber::Normal);
        assert_eq!(PortNumber::Flood.to_string(), "FLOOD");
        assert!("-1".parse::<PortNumber>().is_err());
    }

    #[test]
    fn test_logical_ports() {
        assert!(PortNumber::Flood.is_logical());
        assert!(PortNumber::Normal.is_logical());
        assert!(!PortNumber::Physical(1).is_logical());
    }

    #[test]
    fn test_attachment_point_round_trip() {
        let ap: AttachmentPoint = "of:0000000000000001/3".parse().unwrap();
        assert_eq!(ap.device, DeviceId::from_dpid(1));
        assert_eq!(ap.port, PortNumber::Physical(3));
        assert_eq!(ap.to_string(), "of:0000000000000001/3");
    }

    #[test]
    fn test_attachment_point_rejects_missing_port() {
        assert!("of:0000000000000001".parse::<AttachmentPoint>().is_err());
        assert!("of:0000000000000001/x".parse::<AttachmentPoint>().is_err());
        assert!("/3".parse::<AttachmentPoint>().is_err());
    }
}
