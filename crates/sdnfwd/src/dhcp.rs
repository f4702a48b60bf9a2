//! DHCP server location tracking.
//!
//! Only the configuration side exists: the tracker remembers where the
//! configured DHCP server is attached so other components can look it up.

use arc_swap::ArcSwapOption;
use log::{error, info};
use sdnfwd_common::DhcpConfig;
use sdnfwd_types::{AttachmentPoint, DeviceId};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct DhcpServerTracker {
    server: ArcSwapOption<AttachmentPoint>,
}

impl DhcpServerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the first configured server as the active one.
    ///
    /// `None` (configuration withdrawn) and an empty server list both clear
    /// the tracked location.
    pub fn apply(&self, config: Option<&DhcpConfig>) -> Option<AttachmentPoint> {
        let Some(config) = config else {
            info!("No DHCP config available");
            self.server.store(None);
            return None;
        };

        let Some(server) = config.servers.first() else {
            error!("DHCP server configuration is not found");
            self.server.store(None);
            return None;
        };

        info!("connectPoint deviceId: {}", server.connect_point.device);
        self.server.store(Some(Arc::new(server.connect_point.clone())));
        Some(server.connect_point.clone())
    }

    pub fn server_location(&self) -> Option<AttachmentPoint> {
        self.server.load_full().map(|ap| (*ap).clone())
    }

    pub fn server_device(&self) -> Option<DeviceId> {
        self.server.load_full().map(|ap| ap.device.clone())
    }
}
