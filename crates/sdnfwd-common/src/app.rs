//! Application identities.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Identity of the application that owns a set of rules.
///
/// Rules are flushed by owner, so every rule the core emits carries one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(Cow<'static, str>);

impl AppId {
    /// Reactive MAC-learning bridge.
    pub const LEARNING_BRIDGE: AppId = AppId::from_static("nctu.winlab.learningbridge");
    /// Host-directory driven path forwarding.
    pub const PROACTIVE_FWD: AppId = AppId::from_static("nctu.winlab.myfwd");
    /// Segment-routing VLAN push/forward/pop.
    pub const SEGMENT_ROUTING: AppId = AppId::from_static("nctu.winlab.vlan-sr");
    /// ICMP baseline flows.
    pub const ICMP_BASELINE: AppId = AppId::from_static("nctu.winlab.testping");
    /// DHCP server registry.
    pub const DHCP: AppId = AppId::from_static("nctu.winlab.dhcpfwd");

    pub const fn from_static(name: &'static str) -> Self {
        AppId(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        AppId(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
