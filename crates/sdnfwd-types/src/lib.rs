//! Network value types for the sdnfwd forwarding core.
//!
//! Everything here is an immutable value compared by value:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`Ipv4Address`], [`IpAddress`], [`IpPrefix`]: addresses and CIDR prefixes
//! - [`VlanId`]: 12-bit 802.1Q tag values, also used as segment identifiers
//! - [`DeviceId`], [`PortNumber`], [`AttachmentPoint`]: where things live
//! - [`Link`], [`Path`]: topology edges and device-to-device routes
//! - [`Host`]: an end station with a known attachment point
//! - [`EtherType`]: frame type field values the controller cares about

mod device;
mod ethertype;
mod host;
mod ip;
mod link;
mod mac;
mod port;
mod vlan;

pub use device::DeviceId;
pub use ethertype::EtherType;
pub use host::Host;
pub use ip::{IpAddress, IpPrefix, Ipv4Address, Ipv6Address};
pub use link::{Link, Path};
pub use mac::MacAddress;
pub use port::{AttachmentPoint, PortNumber};
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid VLAN ID: {0} (must be 0-4095)")]
    InvalidVlanId(u16),

    #[error("invalid device id: {0:?}")]
    InvalidDeviceId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),

    #[error("invalid attachment point: {0} (expected <device>/<port>)")]
    InvalidAttachmentPoint(String),
}
