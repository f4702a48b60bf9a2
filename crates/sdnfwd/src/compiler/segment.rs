//! Segment-routing rules over the VLAN tag space.
//!
//! Every configured device owns a segment id. Traffic for a segment is
//! tagged with its id when it enters the network at an edge, switched on the
//! tag in transit, and untagged at the owner before MAC delivery.

use super::RuleTemplate;
use log::debug;
use sdnfwd_common::{
    HostDirectory, RuleDescriptor, SegmentDescriptor, TopologyAccessor, TrafficSelector,
    TrafficTreatment,
};
use sdnfwd_types::{EtherType, IpPrefix, PortNumber, VlanId};

/// Rules for every descriptor in `descriptors` over the current topology.
///
/// For each owner and every other available device, the first candidate
/// path toward the owner decides the egress port. Compiling the same inputs
/// twice yields the same rules in the same order.
pub fn compile_segment_rules(
    descriptors: &[SegmentDescriptor],
    topology: &dyn TopologyAccessor,
    hosts: &dyn HostDirectory,
    template: &RuleTemplate,
) -> Vec<RuleDescriptor> {
    let devices = topology.devices();
    let mut rules = Vec::new();

    for descriptor in descriptors {
        for device in devices.iter().filter(|d| **d != descriptor.device) {
            let paths = topology.paths(device, &descriptor.device);
            let Some(egress) = paths.first().and_then(|p| p.src()).map(|ap| ap.port) else {
                debug!(
                    "No path from {} to segment {} owner {}",
                    device, descriptor.sid, descriptor.device
                );
                continue;
            };

            if let Some(subnet) = descriptor.subnet() {
                rules.push(template.rule(
                    device.clone(),
                    push_selector(subnet),
                    push_treatment(descriptor.sid, egress),
                ));
            }
            rules.push(template.rule(
                device.clone(),
                TrafficSelector::new().match_vlan_id(descriptor.sid),
                TrafficTreatment::new().output(egress),
            ));
        }

        if !devices.contains(&descriptor.device) {
            debug!(
                "Segment {} owner {} is not available, skipping host rules",
                descriptor.sid, descriptor.device
            );
            continue;
        }
        for host in hosts.hosts_on(&descriptor.device) {
            let port = host.location.port;
            rules.push(template.rule(
                descriptor.device.clone(),
                TrafficSelector::new()
                    .match_vlan_id(descriptor.sid)
                    .match_eth_dst(host.mac),
                TrafficTreatment::new().pop_vlan().output(port),
            ));
            rules.push(template.rule(
                descriptor.device.clone(),
                TrafficSelector::new().match_eth_dst(host.mac),
                TrafficTreatment::new().output(port),
            ));
        }
    }

    rules
}

fn push_selector(subnet: &IpPrefix) -> TrafficSelector {
    TrafficSelector::new()
        .match_untagged()
        .match_eth_type(EtherType::IPV4)
        .match_ipv4_dst(*subnet)
}

fn push_treatment(sid: VlanId, egress: PortNumber) -> TrafficTreatment {
    TrafficTreatment::new().push_vlan().set_vlan_id(sid).output(egress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InMemoryInventory;
    use pretty_assertions::assert_eq;
    use sdnfwd_common::{AppId, Criterion, Instruction, Lifetime};
    use sdnfwd_types::{AttachmentPoint, DeviceId, Host, MacAddress};
    use std::collections::HashSet;

    fn ap(dpid: u64, port: u32) -> AttachmentPoint {
        AttachmentPoint::new(DeviceId::from_dpid(dpid), port)
    }

    fn vid(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    fn template() -> RuleTemplate {
        RuleTemplate::new(AppId::SEGMENT_ROUTING, 10, Lifetime::from_secs(60))
    }

    /// c(1) --2:1-- e(2), host h on e/3.
    fn two_switches() -> InMemoryInventory {
        let mut inv = InMemoryInventory::new();
        inv.add_bidirectional_link(ap(1, 2), ap(2, 1));
        inv.add_host(Host::new(MacAddress::new([0, 0, 0, 0, 0, 0xaa]), ap(2, 3)));
        inv
    }

    #[test]
    fn test_unavailable_owner_gets_no_host_rules() {
        let inv = two_switches();
        let mut directory = InMemoryInventory::new();
        directory.add_host(Host::new(MacAddress::new([0, 0, 0, 0, 0, 0xbb]), ap(9, 1)));
        let descriptors = vec![SegmentDescriptor::transit(DeviceId::from_dpid(9), vid(90))];

        let rules = compile_segment_rules(&descriptors, &inv, &directory, &template());

        assert!(rules.is_empty());
    }

    #[test]
    fn test_edge_owner_gets_push_forward_pop() {
        let inv = two_switches();
        let subnet: IpPrefix = "10.0.0.0/24".parse().unwrap();
        let descriptors = vec![SegmentDescriptor::edge(DeviceId::from_dpid(2), vid(10), subnet)];

        let rules = compile_segment_rules(&descriptors, &inv, &inv, &template());
        assert_eq!(rules.len(), 4);

        let push = &rules[0];
        assert_eq!(push.device, DeviceId::from_dpid(1));
        assert_eq!(
            push.selector.criteria(),
            &[
                Criterion::Untagged,
                Criterion::EthType(EtherType::IPV4),
                Criterion::Ipv4Dst(subnet),
            ]
        );
        assert_eq!(
            push.treatment.instructions(),
            &[
                Instruction::PushVlan,
                Instruction::SetVlanId(vid(10)),
                Instruction::Output(PortNumber::Physical(2)),
            ]
        );

        let forward = &rules[1];
        assert_eq!(forward.device, DeviceId::from_dpid(1));
        assert_eq!(forward.selector.criteria(), &[Criterion::VlanId(vid(10))]);
        assert_eq!(forward.treatment.instructions(), &[Instruction::Output(PortNumber::Physical(2))]);

        let pop = &rules[2];
        assert_eq!(pop.device, DeviceId::from_dpid(2));
        assert_eq!(pop.selector.vlan_id(), Some(vid(10)));
        assert_eq!(
            pop.treatment.instructions(),
            &[Instruction::PopVlan, Instruction::Output(PortNumber::Physical(3))]
        );

        let mac_forward = &rules[3];
        assert_eq!(mac_forward.selector.criteria().len(), 1);
        assert_eq!(mac_forward.treatment.instructions(), &[Instruction::Output(PortNumber::Physical(3))]);
    }

    #[test]
    fn test_transit_owner_has_no_push() {
        let inv = two_switches();
        let descriptors = vec![SegmentDescriptor::transit(DeviceId::from_dpid(2), vid(20))];

        let rules = compile_segment_rules(&descriptors, &inv, &inv, &template());

        assert!(rules
            .iter()
            .all(|r| !r.treatment.instructions().contains(&Instruction::PushVlan)));
        // forward at d1, pop + MAC-forward at d2
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_unreachable_device_is_skipped() {
        let mut inv = two_switches();
        inv.add_device(DeviceId::from_dpid(9), vec![]);
        let descriptors = vec![SegmentDescriptor::transit(DeviceId::from_dpid(2), vid(20))];

        let rules = compile_segment_rules(&descriptors, &inv, &inv, &template());

        assert!(rules.iter().all(|r| r.device != DeviceId::from_dpid(9)));
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let inv = two_switches();
        let subnet: IpPrefix = "10.0.0.0/24".parse().unwrap();
        let descriptors = vec![
            SegmentDescriptor::edge(DeviceId::from_dpid(2), vid(10), subnet),
            SegmentDescriptor::transit(DeviceId::from_dpid(1), vid(11)),
        ];

        let first: HashSet<_> = compile_segment_rules(&descriptors, &inv, &inv, &template())
            .into_iter()
            .collect();
        let second: HashSet<_> = compile_segment_rules(&descriptors, &inv, &inv, &template())
            .into_iter()
            .collect();

        assert_eq!(first, second);
    }
}
