//! Ethernet frame type values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The 16-bit EtherType field of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EtherType(pub u16);

impl EtherType {
    pub const IPV4: EtherType = EtherType(0x0800);
    pub const ARP: EtherType = EtherType(0x0806);
    pub const VLAN: EtherType = EtherType(0x8100);
    pub const IPV6: EtherType = EtherType(0x86dd);
    pub const LLDP: EtherType = EtherType(0x88cc);
    /// Vendor (BSN) discovery frames.
    pub const BSN: EtherType = EtherType(0x8942);

    /// Returns true for link-discovery traffic the controller must not learn from.
    pub const fn is_discovery(&self) -> bool {
        self.0 == Self::LLDP.0 || self.0 == Self::BSN.0
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}
