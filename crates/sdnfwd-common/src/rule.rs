//! Device-level forwarding rules.
//!
//! A rule is made of:
//! - Match criteria (which frames it applies to)
//! - Instructions (what the device does with matched frames)
//! - Priority and lifetime hints for the installation backend
//! - The owning application

use crate::AppId;
use sdnfwd_types::{DeviceId, EtherType, IpPrefix, MacAddress, PortNumber, VlanId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use std::time::Duration;

/// One match field of a [`TrafficSelector`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    EthSrc(MacAddress),
    EthDst(MacAddress),
    EthType(EtherType),
    /// Tagged with exactly this VLAN id.
    VlanId(VlanId),
    /// Carries no VLAN tag.
    Untagged,
    IpProtocol(u8),
    Ipv4Dst(IpPrefix),
}

impl Criterion {
    fn same_field(&self, other: &Criterion) -> bool {
        match (self, other) {
            // Tagged and untagged constrain the same header field.
            (Criterion::VlanId(_), Criterion::Untagged)
            | (Criterion::Untagged, Criterion::VlanId(_)) => true,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::EthSrc(mac) => write!(f, "eth_src={}", mac),
            Criterion::EthDst(mac) => write!(f, "eth_dst={}", mac),
            Criterion::EthType(t) => write!(f, "eth_type={}", t),
            Criterion::VlanId(vid) => write!(f, "vlan_vid={}", vid),
            Criterion::Untagged => write!(f, "vlan_vid=none"),
            Criterion::IpProtocol(p) => write!(f, "ip_proto={}", p),
            Criterion::Ipv4Dst(prefix) => write!(f, "ipv4_dst={}", prefix),
        }
    }
}

/// Conjunction of match criteria, at most one per header field.
///
/// Criteria keep insertion order so two selectors built the same way
/// compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrafficSelector {
    criteria: Vec<Criterion>,
}

impl TrafficSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, replacing any existing criterion on the same field.
    pub fn with(mut self, criterion: Criterion) -> Self {
        self.add(criterion);
        self
    }

    pub fn add(&mut self, criterion: Criterion) {
        match self.criteria.iter_mut().find(|c| c.same_field(&criterion)) {
            Some(existing) => *existing = criterion,
            None => self.criteria.push(criterion),
        }
    }

    pub fn match_eth_src(self, mac: MacAddress) -> Self {
        self.with(Criterion::EthSrc(mac))
    }

    pub fn match_eth_dst(self, mac: MacAddress) -> Self {
        self.with(Criterion::EthDst(mac))
    }

    pub fn match_eth_type(self, ether_type: EtherType) -> Self {
        self.with(Criterion::EthType(ether_type))
    }

    pub fn match_vlan_id(self, vlan: VlanId) -> Self {
        self.with(Criterion::VlanId(vlan))
    }

    pub fn match_untagged(self) -> Self {
        self.with(Criterion::Untagged)
    }

    pub fn match_ip_protocol(self, protocol: u8) -> Self {
        self.with(Criterion::IpProtocol(protocol))
    }

    pub fn match_ipv4_dst(self, prefix: IpPrefix) -> Self {
        self.with(Criterion::Ipv4Dst(prefix))
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn contains(&self, criterion: &Criterion) -> bool {
        self.criteria.contains(criterion)
    }

    pub fn eth_src(&self) -> Option<MacAddress> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::EthSrc(mac) => Some(*mac),
            _ => None,
        })
    }

    pub fn eth_dst(&self) -> Option<MacAddress> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::EthDst(mac) => Some(*mac),
            _ => None,
        })
    }

    pub fn vlan_id(&self) -> Option<VlanId> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::VlanId(vid) => Some(*vid),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl fmt::Display for TrafficSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.criteria.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// One action applied to a matched frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    PushVlan,
    SetVlanId(VlanId),
    PopVlan,
    Output(PortNumber),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushVlan => write!(f, "push_vlan"),
            Instruction::SetVlanId(vid) => write!(f, "set_vlan_vid:{}", vid),
            Instruction::PopVlan => write!(f, "pop_vlan"),
            Instruction::Output(port) => write!(f, "output:{}", port),
        }
    }
}

/// Ordered instruction list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrafficTreatment {
    instructions: Vec<Instruction>,
}

impl TrafficTreatment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_vlan(mut self) -> Self {
        self.instructions.push(Instruction::PushVlan);
        self
    }

    pub fn set_vlan_id(mut self, vlan: VlanId) -> Self {
        self.instructions.push(Instruction::SetVlanId(vlan));
        self
    }

    pub fn pop_vlan(mut self) -> Self {
        self.instructions.push(Instruction::PopVlan);
        self
    }

    pub fn output(mut self, port: PortNumber) -> Self {
        self.instructions.push(Instruction::Output(port));
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Output ports in instruction order.
    pub fn outputs(&self) -> impl Iterator<Item = PortNumber> + '_ {
        self.instructions.iter().filter_map(|i| match i {
            Instruction::Output(port) => Some(*port),
            _ => None,
        })
    }
}

impl fmt::Display for TrafficTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.instructions.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// How long a rule stays on the device.
///
/// `Temporary` is an idle timeout honoured by the backend; the core never
/// runs timers of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifetime {
    Permanent,
    Temporary(Duration),
}

impl Lifetime {
    pub fn from_secs(secs: u64) -> Self {
        Lifetime::Temporary(Duration::from_secs(secs))
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Lifetime::Permanent)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Permanent => write!(f, "permanent"),
            Lifetime::Temporary(d) => write!(f, "{}s", d.as_secs()),
        }
    }
}

/// A rule to be installed on one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub device: DeviceId,
    pub selector: TrafficSelector,
    pub treatment: TrafficTreatment,
    pub priority: u16,
    pub lifetime: Lifetime,
    pub owner: AppId,
}

impl RuleDescriptor {
    /// Creates an empty rule (match all, no instructions, priority 0, permanent).
    pub fn new(device: DeviceId, owner: AppId) -> Self {
        Self {
            device,
            selector: TrafficSelector::default(),
            treatment: TrafficTreatment::default(),
            priority: 0,
            lifetime: Lifetime::Permanent,
            owner,
        }
    }

    pub fn with_selector(mut self, selector: TrafficSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_treatment(mut self, treatment: TrafficTreatment) -> Self {
        self.treatment = treatment;
        self
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} prio={} {} -> {} ({}, {})",
            self.device, self.priority, self.selector, self.treatment, self.lifetime, self.owner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0, 0, 0, 0, 0, last])
    }

    #[test]
    fn test_selector_replaces_same_field() {
        let selector = TrafficSelector::new()
            .match_eth_dst(mac(1))
            .match_eth_src(mac(2))
            .match_eth_dst(mac(3));

        assert_eq!(
            selector.criteria(),
            &[Criterion::EthDst(mac(3)), Criterion::EthSrc(mac(2))]
        );
        assert_eq!(selector.eth_dst(), Some(mac(3)));
    }

    #[test]
    fn test_untagged_and_vlan_are_one_field() {
        let vid = VlanId::new(10).unwrap();
        let selector = TrafficSelector::new().match_untagged().match_vlan_id(vid);
        assert_eq!(selector.criteria(), &[Criterion::VlanId(vid)]);
    }

    #[test]
    fn test_treatment_outputs() {
        let treatment = TrafficTreatment::new()
            .push_vlan()
            .set_vlan_id(VlanId::new(5).unwrap())
            .output(PortNumber::Physical(2));

        assert_eq!(treatment.instructions().len(), 3);
        assert_eq!(treatment.outputs().collect::<Vec<_>>(), vec![PortNumber::Physical(2)]);
        assert_eq!(treatment.to_string(), "[push_vlan, set_vlan_vid:5, output:2]");
    }

    #[test]
    fn test_rule_display() {
        let rule = RuleDescriptor::new(DeviceId::from_dpid(1), AppId::PROACTIVE_FWD)
            .with_selector(TrafficSelector::new().match_eth_dst(mac(2)))
            .with_treatment(TrafficTreatment::new().output(PortNumber::Physical(1)))
            .with_priority(10)
            .with_lifetime(Lifetime::from_secs(10));

        assert_eq!(
            rule.to_string(),
            "of:0000000000000001 prio=10 [eth_dst=00:00:00:00:00:02] -> [output:1] (10s, nctu.winlab.myfwd)"
        );
    }

    #[test]
    fn test_rule_serializes_to_json() {
        let rule = RuleDescriptor::new(DeviceId::from_dpid(1), AppId::ICMP_BASELINE)
            .with_treatment(TrafficTreatment::new().output(PortNumber::Normal));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["device"], "of:0000000000000001");
        assert_eq!(json["owner"], "nctu.winlab.testping");
        assert_eq!(json["lifetime"], "Permanent");
    }
}
