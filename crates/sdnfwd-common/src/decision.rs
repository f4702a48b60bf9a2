//! Outcome of handling one controller event.

use sdnfwd_types::PortNumber;

/// What the controller did with an event.
///
/// None of these are failures; expected conditions such as an unknown
/// destination or a missing path are reported here instead of as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Discovery traffic or an event with nothing to do.
    Ignored,
    /// Destination unknown. `broadcast_point` is the topology's verdict on
    /// the ingress point; `blocked` is set when strict flooding dropped it.
    Flooded { broadcast_point: bool, blocked: bool },
    /// Destination on the ingress device: packet-out plus a direct rule.
    Forwarded { port: PortNumber, rules: usize },
    /// Destination behind the ingress port itself.
    Filtered,
    PathInstalled { rules: usize },
    NoPath,
    /// A configuration or topology sweep installed rules.
    RulesInstalled { rules: usize },
    /// A configuration was withdrawn.
    ConfigCleared,
}

impl Decision {
    pub fn is_flood(&self) -> bool {
        matches!(self, Decision::Flooded { .. })
    }

    /// Number of rules handed to the installer.
    pub fn rules_installed(&self) -> usize {
        match self {
            Decision::Forwarded { rules, .. }
            | Decision::PathInstalled { rules }
            | Decision::RulesInstalled { rules } => *rules,
            _ => 0,
        }
    }
}
