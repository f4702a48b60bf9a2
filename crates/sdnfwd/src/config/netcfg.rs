//! Network configuration documents.
//!
//! Layout:
//!
//! ```json
//! {
//!   "apps": {
//!     "nctu.winlab.vlan-sr": {
//!       "vlan-sr": {
//!         "devices": [
//!           { "dpid": "of:0000000000000001", "sid": 101, "isEdgeSwitch": true, "subnet": "10.0.1.0/24" },
//!           { "dpid": "of:0000000000000002", "sid": 102, "isEdgeSwitch": false }
//!         ]
//!       }
//!     },
//!     "nctu.winlab.dhcpfwd": {
//!       "dhcp": { "dhcpServers": [ { "name": "dhcp0", "connectPoint": "of:0000000000000003/3" } ] }
//!     }
//!   }
//! }
//! ```
//!
//! Applications are matched on the inner config key (`vlan-sr`, `dhcp`);
//! unknown keys are skipped.

use super::{ConfigError, ConfigResult};
use log::{info, warn};
use sdnfwd_common::{AppConfig, ConfigKey, DhcpConfig, DhcpServer, SegmentDescriptor};
use sdnfwd_types::{DeviceId, IpPrefix, VlanId};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NetcfgDocument {
    #[serde(default)]
    apps: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentDeviceEntry {
    dpid: String,
    sid: i64,
    #[serde(default)]
    is_edge_switch: bool,
    #[serde(default)]
    subnet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SegmentSection {
    #[serde(default)]
    devices: Vec<SegmentDeviceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DhcpServerEntry {
    #[serde(default)]
    name: Option<String>,
    connect_point: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DhcpSection {
    #[serde(default)]
    dhcp_servers: Vec<DhcpServerEntry>,
}

/// Parses a whole network configuration document.
pub fn parse_netcfg(text: &str) -> ConfigResult<Vec<AppConfig>> {
    let document: NetcfgDocument = serde_json::from_str(text)?;
    let mut configs = Vec::new();

    for (app, sections) in &document.apps {
        let Some(sections) = sections.as_object() else {
            warn!("Ignoring netcfg entry {}: not an object", app);
            continue;
        };
        for (key, section) in sections {
            match parse_app_config(key, section)? {
                Some(config) => configs.push(config),
                None => warn!("Ignoring unknown config key {} of {}", key, app),
            }
        }
    }

    info!("Parsed {} application config(s)", configs.len());
    Ok(configs)
}

pub fn load_netcfg(path: impl AsRef<Path>) -> ConfigResult<Vec<AppConfig>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_netcfg(&text)
}

/// Parses one application section by config key. Unknown keys yield `None`.
pub fn parse_app_config(key: &str, section: &Value) -> ConfigResult<Option<AppConfig>> {
    if key == ConfigKey::SegmentRouting.app_name() {
        let section: SegmentSection = serde_json::from_value(section.clone())?;
        return segment_descriptors(section).map(|d| Some(AppConfig::SegmentRouting(d)));
    }
    if key == ConfigKey::Dhcp.app_name() {
        let section: DhcpSection = serde_json::from_value(section.clone())?;
        return dhcp_config(section).map(|c| Some(AppConfig::Dhcp(c)));
    }
    Ok(None)
}

fn segment_descriptors(section: SegmentSection) -> ConfigResult<Vec<SegmentDescriptor>> {
    let app = ConfigKey::SegmentRouting.app_name();
    let mut devices = HashSet::new();
    let mut sids = HashSet::new();
    let mut descriptors = Vec::with_capacity(section.devices.len());

    for entry in section.devices {
        let device: DeviceId = entry.dpid.parse()?;
        let sid = u16::try_from(entry.sid)
            .ok()
            .and_then(|sid| VlanId::new(sid).ok())
            .ok_or_else(|| {
                ConfigError::invalid_field(app, "sid", format!("{} is outside 0-4095", entry.sid))
            })?;

        if !devices.insert(device.clone()) {
            return Err(ConfigError::invalid_field(
                app,
                "dpid",
                format!("{} listed more than once", device),
            ));
        }
        if !sids.insert(sid) {
            return Err(ConfigError::invalid_field(
                app,
                "sid",
                format!("{} assigned to more than one device", sid),
            ));
        }

        let descriptor = if entry.is_edge_switch {
            let subnet = entry.subnet.as_deref().ok_or_else(|| {
                ConfigError::invalid_field(app, "subnet", format!("edge device {} has no subnet", device))
            })?;
            let subnet: IpPrefix = subnet.parse()?;
            if !subnet.is_ipv4() {
                return Err(ConfigError::invalid_field(
                    app,
                    "subnet",
                    format!("{} is not an IPv4 prefix", subnet),
                ));
            }
            SegmentDescriptor::edge(device, sid, subnet)
        } else {
            if let Some(subnet) = &entry.subnet {
                warn!("Ignoring subnet {} of non-edge device {}", subnet, device);
            }
            SegmentDescriptor::transit(device, sid)
        };
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

fn dhcp_config(section: DhcpSection) -> ConfigResult<DhcpConfig> {
    let servers = section
        .dhcp_servers
        .into_iter()
        .map(|entry| -> ConfigResult<DhcpServer> {
            Ok(DhcpServer {
                name: entry.name,
                connect_point: entry.connect_point.parse()?,
            })
        })
        .collect::<ConfigResult<Vec<_>>>()?;
    Ok(DhcpConfig { servers })
}
