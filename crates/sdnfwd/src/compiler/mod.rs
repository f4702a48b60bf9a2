//! Translation of forwarding decisions into device rules.
//!
//! The compiler is pure: it only builds [`RuleDescriptor`]s. Handing them to
//! the installer is the caller's job.
//!
//! Two modes are supported:
//!
//! - plain: MAC-matched output rules along a path ([`compile_path_rules`],
//!   [`compile_direct_rule`])
//! - segment routing: VLAN push at ingress edges, VLAN forwarding in transit,
//!   VLAN pop at the owner device ([`compile_segment_rules`])

mod plain;
mod segment;

pub use plain::{compile_direct_rule, compile_path_rules, MacMatch};
pub use segment::compile_segment_rules;

use sdnfwd_common::{AppId, Lifetime, RuleDescriptor, TrafficSelector, TrafficTreatment};
use sdnfwd_types::DeviceId;

/// Owner, priority and lifetime shared by every rule of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    pub owner: AppId,
    pub priority: u16,
    pub lifetime: Lifetime,
}

impl RuleTemplate {
    pub fn new(owner: AppId, priority: u16, lifetime: Lifetime) -> Self {
        Self {
            owner,
            priority,
            lifetime,
        }
    }

    pub fn rule(
        &self,
        device: DeviceId,
        selector: TrafficSelector,
        treatment: TrafficTreatment,
    ) -> RuleDescriptor {
        RuleDescriptor::new(device, self.owner.clone())
            .with_selector(selector)
            .with_treatment(treatment)
            .with_priority(self.priority)
            .with_lifetime(self.lifetime)
    }
}
