//! ICMP baseline flows.
//!
//! One permanent rule per device hands IPv4 ICMP to the device's normal
//! pipeline, so reachability checks work before any path is installed.

use crate::compiler::RuleTemplate;
use sdnfwd_common::{RuleDescriptor, TrafficSelector, TrafficTreatment};
use sdnfwd_types::{DeviceId, EtherType, PortNumber};

pub const IP_PROTO_ICMP: u8 = 1;

pub fn compile_icmp_rule(device: &DeviceId, template: &RuleTemplate) -> RuleDescriptor {
    template.rule(
        device.clone(),
        TrafficSelector::new()
            .match_eth_type(EtherType::IPV4)
            .match_ip_protocol(IP_PROTO_ICMP),
        TrafficTreatment::new().output(PortNumber::Normal),
    )
}

/// Baseline rules for every device in `devices`.
pub fn compile_icmp_rules(devices: &[DeviceId], template: &RuleTemplate) -> Vec<RuleDescriptor> {
    devices
        .iter()
        .map(|device| compile_icmp_rule(device, template))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sdnfwd_common::{AppId, Criterion, Instruction, Lifetime};

    #[test]
    fn test_icmp_rule_shape() {
        let template = RuleTemplate::new(AppId::ICMP_BASELINE, 40000, Lifetime::Permanent);
        let rules = compile_icmp_rules(&[DeviceId::from_dpid(1), DeviceId::from_dpid(2)], &template);

        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[0].selector.criteria(),
            &[Criterion::EthType(EtherType::IPV4), Criterion::IpProtocol(1)]
        );
        assert_eq!(rules[0].treatment.instructions(), &[Instruction::Output(PortNumber::Normal)]);
        assert_eq!(rules[1].device, DeviceId::from_dpid(2));
        assert!(rules[1].lifetime.is_permanent());
        assert_eq!(rules[1].priority, 40000);
    }
}
