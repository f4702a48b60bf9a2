//! Events delivered to the controller.

use crate::{AppConfig, ConfigKey};
use sdnfwd_types::{AttachmentPoint, DeviceId, EtherType, Link, MacAddress, VlanId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded Ethernet header fields of a packet-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthernetFrame {
    pub src: MacAddress,
    pub dst: MacAddress,
    pub ether_type: EtherType,
    #[serde(default)]
    pub vlan: Option<VlanId>,
}

/// A frame punted to the controller, with the point it entered the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundPacket {
    pub received_from: AttachmentPoint,
    pub frame: EthernetFrame,
}

impl InboundPacket {
    pub fn new(received_from: AttachmentPoint, frame: EthernetFrame) -> Self {
        Self { received_from, frame }
    }

    pub fn device(&self) -> &DeviceId {
        &self.received_from.device
    }
}

impl fmt::Display for InboundPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} type {} at {}",
            self.frame.src, self.frame.dst, self.frame.ether_type, self.received_from
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyEvent {
    LinkAdded(Link),
    LinkRemoved(Link),
    DeviceAdded(DeviceId),
    DeviceUpdated(DeviceId),
    DeviceRemoved(DeviceId),
}

impl fmt::Display for TopologyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyEvent::LinkAdded(link) => write!(f, "link added: {}", link),
            TopologyEvent::LinkRemoved(link) => write!(f, "link removed: {}", link),
            TopologyEvent::DeviceAdded(dev) => write!(f, "device added: {}", dev),
            TopologyEvent::DeviceUpdated(dev) => write!(f, "device updated: {}", dev),
            TopologyEvent::DeviceRemoved(dev) => write!(f, "device removed: {}", dev),
        }
    }
}

/// Per-application network configuration changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    Added(AppConfig),
    Updated(AppConfig),
    Removed(ConfigKey),
}

impl ConfigEvent {
    pub fn key(&self) -> ConfigKey {
        match self {
            ConfigEvent::Added(config) | ConfigEvent::Updated(config) => config.key(),
            ConfigEvent::Removed(key) => *key,
        }
    }
}

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    PacketIn(InboundPacket),
    TopologyChanged(TopologyEvent),
    ConfigChanged(ConfigEvent),
}

impl ControllerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::PacketIn(_) => "packet-in",
            ControllerEvent::TopologyChanged(_) => "topology",
            ControllerEvent::ConfigChanged(_) => "config",
        }
    }
}
