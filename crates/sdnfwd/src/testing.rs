//! Recording collaborators for tests.
//!
//! [`RecordingRuleInstaller`] and [`RecordingPacketIo`] keep everything they
//! are handed so tests can assert on the exact rules and packet-outs a
//! handler produced.

use sdnfwd_common::{AppId, InboundPacket, PacketIo, RuleDescriptor, RuleInstaller};
use sdnfwd_types::{AttachmentPoint, DeviceId, PortNumber};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct RecordingRuleInstaller {
    rules: Mutex<Vec<RuleDescriptor>>,
    flushed: Mutex<Vec<AppId>>,
}

impl RecordingRuleInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installed rules in installation order.
    pub fn rules(&self) -> Vec<RuleDescriptor> {
        self.rules.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn rules_on(&self, device: &DeviceId) -> Vec<RuleDescriptor> {
        self.rules()
            .into_iter()
            .filter(|r| &r.device == device)
            .collect()
    }

    /// Owners passed to `remove_all_by_owner`, in call order.
    pub fn flushed(&self) -> Vec<AppId> {
        self.flushed.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.clear();
        }
    }
}

impl RuleInstaller for RecordingRuleInstaller {
    fn install(&self, rule: RuleDescriptor) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push(rule);
        }
    }

    fn remove_all_by_owner(&self, owner: &AppId) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.retain(|r| &r.owner != owner);
        }
        if let Ok(mut flushed) = self.flushed.lock() {
            flushed.push(owner.clone());
        }
    }
}

/// A packet-out or a block, keyed by the packet's ingress point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentPacket {
    Out(AttachmentPoint, PortNumber),
    Blocked(AttachmentPoint),
}

#[derive(Debug, Default)]
pub struct RecordingPacketIo {
    sent: Mutex<Vec<SentPacket>>,
}

impl RecordingPacketIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentPacket> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, entry: SentPacket) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(entry);
        }
    }
}

impl PacketIo for RecordingPacketIo {
    fn send_out(&self, packet: &InboundPacket, port: PortNumber) {
        self.record(SentPacket::Out(packet.received_from.clone(), port));
    }

    fn block(&self, packet: &InboundPacket) {
        self.record(SentPacket::Blocked(packet.received_from.clone()));
    }
}
