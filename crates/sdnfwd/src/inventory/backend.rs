//! Log-only rule installer and packet I/O.

use dashmap::DashMap;
use log::{debug, info, warn};
use sdnfwd_common::{AppId, InboundPacket, PacketIo, RuleDescriptor, RuleInstaller};
use sdnfwd_types::PortNumber;
use std::sync::atomic::{AtomicU64, Ordering};

/// Accepts every rule, logs it and counts it per owner.
#[derive(Debug, Default)]
pub struct LoggingRuleInstaller {
    installed: DashMap<AppId, u64>,
}

impl LoggingRuleInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn installed_by(&self, owner: &AppId) -> u64 {
        self.installed.get(owner).map(|n| *n).unwrap_or(0)
    }

    pub fn total_installed(&self) -> u64 {
        self.installed.iter().map(|n| *n.value()).sum()
    }
}

impl RuleInstaller for LoggingRuleInstaller {
    fn install(&self, rule: RuleDescriptor) {
        match serde_json::to_string(&rule) {
            Ok(json) => debug!("Rule: {}", json),
            Err(e) => warn!("Failed to encode rule {}: {}", rule, e),
        }
        info!("Install rule on {}", rule);
        *self.installed.entry(rule.owner).or_insert(0) += 1;
    }

    fn remove_all_by_owner(&self, owner: &AppId) {
        let count = self.installed.remove(owner).map(|(_, n)| n).unwrap_or(0);
        info!("Removed {} rule(s) owned by {}", count, owner);
    }
}

/// Logs packet-outs and blocks.
#[derive(Debug, Default)]
pub struct LoggingPacketIo {
    packet_outs: AtomicU64,
    blocked: AtomicU64,
}

impl LoggingPacketIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packet_outs(&self) -> u64 {
        self.packet_outs.load(Ordering::Relaxed)
    }

    pub fn blocked(&self) -> u64 {
        self.blocked.load(Ordering::Relaxed)
    }
}

impl PacketIo for LoggingPacketIo {
    fn send_out(&self, packet: &InboundPacket, port: PortNumber) {
        self.packet_outs.fetch_add(1, Ordering::Relaxed);
        debug!("Packet-out {} on {}/{}", packet, packet.device(), port);
    }

    fn block(&self, packet: &InboundPacket) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
        debug!("Blocked {}", packet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdnfwd_common::EthernetFrame;
    use sdnfwd_types::{AttachmentPoint, DeviceId, EtherType, MacAddress};

    #[test]
    fn test_counts_per_owner_and_flush() {
        let installer = LoggingRuleInstaller::new();
        let device = DeviceId::from_dpid(1);

        installer.install(RuleDescriptor::new(device.clone(), AppId::SEGMENT_ROUTING));
        installer.install(RuleDescriptor::new(device.clone(), AppId::SEGMENT_ROUTING));
        installer.install(RuleDescriptor::new(device, AppId::ICMP_BASELINE));

        assert_eq!(installer.installed_by(&AppId::SEGMENT_ROUTING), 2);
        assert_eq!(installer.total_installed(), 3);

        installer.remove_all_by_owner(&AppId::SEGMENT_ROUTING);
        assert_eq!(installer.installed_by(&AppId::SEGMENT_ROUTING), 0);
        assert_eq!(installer.total_installed(), 1);
    }

    #[test]
    fn test_packet_io_counters() {
        let io = LoggingPacketIo::new();
        let packet = InboundPacket::new(
            AttachmentPoint::new(DeviceId::from_dpid(1), 1),
            EthernetFrame {
                src: MacAddress::new([0, 0, 0, 0, 0, 1]),
                dst: MacAddress::BROADCAST,
                ether_type: EtherType::ARP,
                vlan: None,
            },
        );

        io.send_out(&packet, PortNumber::Flood);
        io.block(&packet);

        assert_eq!(io.packet_outs(), 1);
        assert_eq!(io.blocked(), 1);
    }
}
