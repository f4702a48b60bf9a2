//! Runtime settings of the controller.

use super::{ConfigError, ConfigResult};
use crate::compiler::RuleTemplate;
use crate::flood::FloodMode;
use clap::ValueEnum;
use sdnfwd_common::{AppId, Lifetime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Where packet-in destinations are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ForwardingMode {
    /// Learning-table lookup on the ingress device.
    #[default]
    Bridge,
    /// Host directory lookup and path installation across devices.
    Proactive,
}

impl fmt::Display for ForwardingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardingMode::Bridge => f.write_str("bridge"),
            ForwardingMode::Proactive => f.write_str("proactive"),
        }
    }
}

/// Priority and idle timeout for the rules of one application.
///
/// A missing timeout means the rules are permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleProfile {
    pub priority: u16,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl RuleProfile {
    pub const fn new(priority: u16, timeout_secs: Option<u64>) -> Self {
        Self {
            priority,
            timeout_secs,
        }
    }

    pub fn lifetime(&self) -> Lifetime {
        match self.timeout_secs {
            Some(secs) => Lifetime::from_secs(secs),
            None => Lifetime::Permanent,
        }
    }

    pub fn template(&self, owner: AppId) -> RuleTemplate {
        RuleTemplate::new(owner, self.priority, self.lifetime())
    }
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    pub mode: ForwardingMode,
    pub flood_mode: FloodMode,
    /// Match the source MAC as well on proactive hop rules.
    pub match_src_mac: bool,
    pub bridge: RuleProfile,
    pub proactive: RuleProfile,
    pub segment_routing: RuleProfile,
    pub icmp_baseline: RuleProfile,
    pub icmp_baseline_enabled: bool,
    /// Per-device bound on learned MACs; unbounded when absent.
    pub max_entries_per_device: Option<usize>,
    /// Port statistics report interval; 0 disables the report.
    pub stats_interval_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: ForwardingMode::Bridge,
            flood_mode: FloodMode::Compatible,
            match_src_mac: true,
            bridge: RuleProfile::new(40000, Some(10)),
            proactive: RuleProfile::new(10, Some(10)),
            segment_routing: RuleProfile::new(10, Some(60)),
            icmp_baseline: RuleProfile::new(40000, None),
            icmp_baseline_enabled: false,
            max_entries_per_device: None,
            stats_interval_secs: 0,
        }
    }
}

impl ControllerConfig {
    /// Reads settings from a JSON file; absent fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: ControllerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_entries_per_device == Some(0) {
            return Err(ConfigError::invalid_field(
                "controller",
                "maxEntriesPerDevice",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Rule template for reactive forwarding in the current mode.
    pub fn forwarding_template(&self) -> RuleTemplate {
        match self.mode {
            ForwardingMode::Bridge => self.bridge.template(AppId::LEARNING_BRIDGE),
            ForwardingMode::Proactive => self.proactive.template(AppId::PROACTIVE_FWD),
        }
    }

    pub fn segment_template(&self) -> RuleTemplate {
        self.segment_routing.template(AppId::SEGMENT_ROUTING)
    }

    pub fn icmp_template(&self) -> RuleTemplate {
        self.icmp_baseline.template(AppId::ICMP_BASELINE)
    }
}
