//! MAC-matched forwarding rules.

use super::RuleTemplate;
use sdnfwd_common::{RuleDescriptor, TrafficSelector, TrafficTreatment};
use sdnfwd_types::{AttachmentPoint, DeviceId, MacAddress, Path, PortNumber};

/// Which MAC fields hop rules match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MacMatch {
    #[default]
    Destination,
    SourceAndDestination,
}

impl MacMatch {
    fn selector(&self, src: MacAddress, dst: MacAddress) -> TrafficSelector {
        match self {
            MacMatch::Destination => TrafficSelector::new().match_eth_dst(dst),
            MacMatch::SourceAndDestination => {
                TrafficSelector::new().match_eth_src(src).match_eth_dst(dst)
            }
        }
    }
}

/// Rule sending `src -> dst` traffic out of `port` on a single device.
pub fn compile_direct_rule(
    device: &DeviceId,
    port: PortNumber,
    src: MacAddress,
    dst: MacAddress,
    mac_match: MacMatch,
    template: &RuleTemplate,
) -> RuleDescriptor {
    template.rule(
        device.clone(),
        mac_match.selector(src, dst),
        TrafficTreatment::new().output(port),
    )
}

/// Rules carrying `src -> dst` traffic along `path` to `destination`.
///
/// The first rule is at the destination device and matches the destination
/// MAC only. One rule per link follows, walking the path backwards from the
/// destination so downstream hops exist before upstream ones.
pub fn compile_path_rules(
    path: &Path,
    destination: &AttachmentPoint,
    src: MacAddress,
    dst: MacAddress,
    mac_match: MacMatch,
    template: &RuleTemplate,
) -> Vec<RuleDescriptor> {
    let mut rules = Vec::with_capacity(path.hop_count() + 1);

    rules.push(template.rule(
        destination.device.clone(),
        TrafficSelector::new().match_eth_dst(dst),
        TrafficTreatment::new().output(destination.port),
    ));

    for link in path.links().iter().rev() {
        rules.push(compile_direct_rule(
            &link.src.device,
            link.src.port,
            src,
            dst,
            mac_match,
            template,
        ));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sdnfwd_common::{AppId, Criterion, Lifetime};
    use sdnfwd_types::Link;

    fn ap(dpid: u64, port: u32) -> AttachmentPoint {
        AttachmentPoint::new(DeviceId::from_dpid(dpid), port)
    }

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x0a, 0, 0, 0, 0, last])
    }

    fn template() -> RuleTemplate {
        RuleTemplate::new(AppId::PROACTIVE_FWD, 10, Lifetime::from_secs(10))
    }

    #[test]
    fn test_direct_rule_destination_only() {
        let rule = compile_direct_rule(
            &DeviceId::from_dpid(1),
            PortNumber::Physical(3),
            mac(1),
            mac(2),
            MacMatch::Destination,
            &template(),
        );

        assert_eq!(rule.selector.criteria(), &[Criterion::EthDst(mac(2))]);
        assert_eq!(rule.treatment.outputs().collect::<Vec<_>>(), vec![PortNumber::Physical(3)]);
        assert_eq!(rule.priority, 10);
        assert_eq!(rule.lifetime, Lifetime::from_secs(10));
    }

    #[test]
    fn test_path_rules_in_reverse_order() {
        let path = Path::new(vec![
            Link::new(ap(1, 2), ap(2, 1)),
            Link::new(ap(2, 3), ap(3, 1)),
        ]);
        let destination = ap(3, 5);

        let rules = compile_path_rules(
            &path,
            &destination,
            mac(1),
            mac(2),
            MacMatch::SourceAndDestination,
            &template(),
        );

        let placed: Vec<(DeviceId, Vec<PortNumber>)> = rules
            .iter()
            .map(|r| (r.device.clone(), r.treatment.outputs().collect()))
            .collect();
        assert_eq!(
            placed,
            vec![
                (DeviceId::from_dpid(3), vec![PortNumber::Physical(5)]),
                (DeviceId::from_dpid(2), vec![PortNumber::Physical(3)]),
                (DeviceId::from_dpid(1), vec![PortNumber::Physical(2)]),
            ]
        );

        // Destination rule ignores the source MAC; hop rules match both.
        assert_eq!(rules[0].selector.eth_src(), None);
        assert_eq!(rules[1].selector.eth_src(), Some(mac(1)));
        assert_eq!(rules[2].selector.eth_dst(), Some(mac(2)));
    }
}
