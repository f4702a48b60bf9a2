//! End-station (host) records.

use crate::{AttachmentPoint, IpAddress, MacAddress, VlanId};
use serde::{Deserialize, Serialize};

/// A host known to the host directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    pub mac: MacAddress,
    #[serde(default)]
    pub vlan: Option<VlanId>,
    pub location: AttachmentPoint,
    #[serde(default)]
    pub ips: Vec<IpAddress>,
}

impl Host {
    pub fn new(mac: MacAddress, location: AttachmentPoint) -> Self {
        Self {
            mac,
            vlan: None,
            location,
            ips: Vec::new(),
        }
    }
}
