//! Atomically replaced network configuration snapshot.

use arc_swap::ArcSwap;
use sdnfwd_common::{AppConfig, ConfigEvent, ConfigKey, DhcpConfig, SegmentDescriptor};
use std::sync::Arc;

/// The network configuration in effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkConfig {
    pub segments: Vec<SegmentDescriptor>,
    pub dhcp: Option<DhcpConfig>,
}

impl NetworkConfig {
    fn with_applied(&self, event: &ConfigEvent) -> NetworkConfig {
        let mut next = self.clone();
        match event {
            ConfigEvent::Added(config) | ConfigEvent::Updated(config) => match config {
                AppConfig::SegmentRouting(descriptors) => next.segments = descriptors.clone(),
                AppConfig::Dhcp(dhcp) => next.dhcp = Some(dhcp.clone()),
            },
            ConfigEvent::Removed(ConfigKey::SegmentRouting) => next.segments.clear(),
            ConfigEvent::Removed(ConfigKey::Dhcp) => next.dhcp = None,
        }
        next
    }
}

/// Holder of the current [`NetworkConfig`].
///
/// Readers get a whole snapshot, either the one before or the one after a
/// concurrent update, never a mix.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: ArcSwap<NetworkConfig>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<NetworkConfig> {
        self.current.load_full()
    }

    /// Applies a change and returns the snapshot it produced.
    pub fn apply(&self, event: &ConfigEvent) -> Arc<NetworkConfig> {
        let mut applied = Arc::default();
        self.current.rcu(|current| {
            let next = Arc::new(current.with_applied(event));
            applied = Arc::clone(&next);
            next
        });
        applied
    }

    pub fn replace(&self, config: NetworkConfig) {
        self.current.store(Arc::new(config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sdnfwd_common::DhcpServer;
    use sdnfwd_types::{DeviceId, VlanId};

    fn segments(sid: u16) -> Vec<SegmentDescriptor> {
        vec![SegmentDescriptor::transit(DeviceId::from_dpid(1), VlanId::new(sid).unwrap())]
    }

    #[test]
    fn test_update_replaces_segments_wholesale() {
        let store = ConfigStore::new();
        store.apply(&ConfigEvent::Added(AppConfig::SegmentRouting(segments(1))));
        let snapshot = store.apply(&ConfigEvent::Updated(AppConfig::SegmentRouting(segments(2))));

        assert_eq!(snapshot.segments, segments(2));
        assert_eq!(store.snapshot().segments, segments(2));
    }

    #[test]
    fn test_remove_only_touches_its_app() {
        let store = ConfigStore::new();
        let dhcp = DhcpConfig {
            servers: vec![DhcpServer {
                name: None,
                connect_point: "of:0000000000000001/1".parse().unwrap(),
            }],
        };
        store.apply(&ConfigEvent::Added(AppConfig::SegmentRouting(segments(1))));
        store.apply(&ConfigEvent::Added(AppConfig::Dhcp(dhcp.clone())));

        let snapshot = store.apply(&ConfigEvent::Removed(ConfigKey::SegmentRouting));
        assert!(snapshot.segments.is_empty());
        assert_eq!(snapshot.dhcp, Some(dhcp));

        let snapshot = store.apply(&ConfigEvent::Removed(ConfigKey::Dhcp));
        assert_eq!(*snapshot, NetworkConfig::default());
    }

    #[test]
    fn test_old_snapshot_is_unaffected() {
        let store = ConfigStore::new();
        store.apply(&ConfigEvent::Added(AppConfig::SegmentRouting(segments(1))));
        let before = store.snapshot();

        store.apply(&ConfigEvent::Removed(ConfigKey::SegmentRouting));

        assert_eq!(before.segments, segments(1));
        assert!(store.snapshot().segments.is_empty());
    }
}
