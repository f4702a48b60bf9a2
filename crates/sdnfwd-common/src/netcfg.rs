//! Network configuration payloads, already validated.

use sdnfwd_types::{AttachmentPoint, DeviceId, IpPrefix, VlanId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a segment owner terminates a host subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentRole {
    Edge { subnet: IpPrefix },
    Transit,
}

/// Segment identifier assignment for one device.
///
/// The subnet exists exactly when the device is an edge device; the role
/// enum makes any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub device: DeviceId,
    pub sid: VlanId,
    pub role: SegmentRole,
}

impl SegmentDescriptor {
    pub fn edge(device: DeviceId, sid: VlanId, subnet: IpPrefix) -> Self {
        Self {
            device,
            sid,
            role: SegmentRole::Edge { subnet },
        }
    }

    pub fn transit(device: DeviceId, sid: VlanId) -> Self {
        Self {
            device,
            sid,
            role: SegmentRole::Transit,
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.role, SegmentRole::Edge { .. })
    }

    pub fn subnet(&self) -> Option<&IpPrefix> {
        match &self.role {
            SegmentRole::Edge { subnet } => Some(subnet),
            SegmentRole::Transit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpServer {
    pub name: Option<String>,
    pub connect_point: AttachmentPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpConfig {
    pub servers: Vec<DhcpServer>,
}

impl DhcpConfig {
    pub fn server_with_name(&self, name: &str) -> Option<&DhcpServer> {
        self.servers.iter().find(|s| s.name.as_deref() == Some(name))
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

/// Which application a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SegmentRouting,
    Dhcp,
}

impl ConfigKey {
    /// Key under `apps` in a network configuration document.
    pub const fn app_name(&self) -> &'static str {
        match self {
            ConfigKey::SegmentRouting => "vlan-sr",
            ConfigKey::Dhcp => "dhcp",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.app_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppConfig {
    SegmentRouting(Vec<SegmentDescriptor>),
    Dhcp(DhcpConfig),
}

impl AppConfig {
    pub fn key(&self) -> ConfigKey {
        match self {
            AppConfig::SegmentRouting(_) => ConfigKey::SegmentRouting,
            AppConfig::Dhcp(_) => ConfigKey::Dhcp,
        }
    }
}
