//! Event handlers of the forwarding controller.

use super::stats::{ControllerStats, ControllerStatsSnapshot};
use crate::compiler::{compile_direct_rule, compile_path_rules, compile_segment_rules, MacMatch};
use crate::config::{ConfigStore, ControllerConfig, ForwardingMode};
use crate::dhcp::DhcpServerTracker;
use crate::flood::flood;
use crate::learning::{LearnOutcome, LearningTable};
use crate::path::select_path;
use crate::ping::compile_icmp_rules;
use dashmap::DashSet;
use itertools::Itertools;
use log::{debug, info};
use sdnfwd_common::{
    AppConfig, AppId, ConfigEvent, ConfigKey, ControllerEvent, Decision, HostDirectory, InboundPacket,
    PacketIo, RuleDescriptor, RuleInstaller, TopologyAccessor, TopologyEvent,
};
use sdnfwd_types::{AttachmentPoint, PortNumber};
use std::sync::Arc;

/// The external services the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub topology: Arc<dyn TopologyAccessor>,
    pub hosts: Arc<dyn HostDirectory>,
    pub installer: Arc<dyn RuleInstaller>,
    pub packet_io: Arc<dyn PacketIo>,
}

/// Reacts to packet-in, topology and configuration events.
///
/// Handlers are synchronous and never wait on the installer. All mutable
/// state sits in the learning table, the configuration store and the
/// counters, each of which is safe to share across concurrent handlers.
pub struct PacketEventController {
    config: ControllerConfig,
    collaborators: Collaborators,
    learning: Arc<LearningTable>,
    netcfg: ConfigStore,
    dhcp: DhcpServerTracker,
    owners: DashSet<AppId>,
    stats: ControllerStats,
}

impl PacketEventController {
    pub fn new(config: ControllerConfig, collaborators: Collaborators) -> Self {
        let learning = match config.max_entries_per_device {
            Some(max) => LearningTable::with_capacity_limit(max),
            None => LearningTable::new(),
        };
        Self {
            config,
            collaborators,
            learning: Arc::new(learning),
            netcfg: ConfigStore::new(),
            dhcp: DhcpServerTracker::new(),
            owners: DashSet::new(),
            stats: ControllerStats::new(),
        }
    }

    /// Replaces the learning table, e.g. to share one between controllers.
    pub fn with_learning_table(mut self, learning: Arc<LearningTable>) -> Self {
        self.learning = learning;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn learning(&self) -> &Arc<LearningTable> {
        &self.learning
    }

    pub fn netcfg(&self) -> &ConfigStore {
        &self.netcfg
    }

    pub fn dhcp(&self) -> &DhcpServerTracker {
        &self.dhcp
    }

    pub fn stats(&self) -> ControllerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Applications that have installed at least one rule.
    pub fn owners(&self) -> Vec<AppId> {
        self.owners.iter().map(|o| o.key().clone()).sorted().collect()
    }

    pub fn handle(&self, event: &ControllerEvent) -> Decision {
        match event {
            ControllerEvent::PacketIn(packet) => self.on_packet_in(packet),
            ControllerEvent::TopologyChanged(event) => self.on_topology_changed(event),
            ControllerEvent::ConfigChanged(event) => self.on_config_changed(event),
        }
    }

    /// Installs the ICMP baseline when it is enabled.
    pub fn start(&self) -> Decision {
        info!(
            "Starting controller in {} mode (flood: {})",
            self.config.mode, self.config.flood_mode
        );
        if !self.config.icmp_baseline_enabled {
            return Decision::Ignored;
        }
        self.install_icmp_baseline()
    }

    /// Removes every rule installed on behalf of this controller.
    pub fn shutdown(&self) {
        for owner in self.owners() {
            self.collaborators.installer.remove_all_by_owner(&owner);
            self.owners.remove(&owner);
        }
        info!("Controller stopped");
    }

    pub fn on_packet_in(&self, packet: &InboundPacket) -> Decision {
        ControllerStats::bump(&self.stats.packets_in);

        if packet.frame.ether_type.is_discovery() {
            ControllerStats::bump(&self.stats.ignored);
            return Decision::Ignored;
        }

        let ingress = &packet.received_from;
        match self.learning.learn(&ingress.device, packet.frame.src, ingress.port) {
            LearnOutcome::Inserted => ControllerStats::bump(&self.stats.learned),
            LearnOutcome::Moved { .. } => ControllerStats::bump(&self.stats.mac_moves),
            LearnOutcome::Unchanged | LearnOutcome::Rejected => {}
        }

        let Some(destination) = self.resolve_destination(packet) else {
            return self.flood(packet);
        };

        if destination.device != ingress.device {
            return self.install_path(packet, &destination);
        }

        if destination.port == ingress.port {
            debug!(
                "Destination {} is behind ingress port {}, dropping",
                packet.frame.dst, ingress
            );
            ControllerStats::bump(&self.stats.filtered);
            return Decision::Filtered;
        }

        self.forward_local(packet, destination.port)
    }

    pub fn on_topology_changed(&self, event: &TopologyEvent) -> Decision {
        info!("Topology Event - {}", event);
        match event {
            TopologyEvent::DeviceAdded(_) | TopologyEvent::DeviceUpdated(_)
                if self.config.icmp_baseline_enabled =>
            {
                self.install_icmp_baseline()
            }
            _ => Decision::Ignored,
        }
    }

    pub fn on_config_changed(&self, event: &ConfigEvent) -> Decision {
        let snapshot = self.netcfg.apply(event);

        match event {
            ConfigEvent::Added(AppConfig::SegmentRouting(_))
            | ConfigEvent::Updated(AppConfig::SegmentRouting(_)) => {
                if snapshot.segments.is_empty() {
                    info!("No VLAN SR config available");
                    return Decision::RulesInstalled { rules: 0 };
                }
                let template = self.config.segment_template();
                let rules = compile_segment_rules(
                    &snapshot.segments,
                    self.collaborators.topology.as_ref(),
                    self.collaborators.hosts.as_ref(),
                    &template,
                );
                let count = self.install(rules);
                info!(
                    "Applied VLAN SR config for {} device(s), {} rule(s) installed",
                    snapshot.segments.len(),
                    count
                );
                Decision::RulesInstalled { rules: count }
            }
            ConfigEvent::Added(AppConfig::Dhcp(dhcp)) | ConfigEvent::Updated(AppConfig::Dhcp(dhcp)) => {
                self.dhcp.apply(Some(dhcp));
                Decision::RulesInstalled { rules: 0 }
            }
            ConfigEvent::Removed(key) => {
                if *key == ConfigKey::Dhcp {
                    self.dhcp.apply(None);
                }
                info!("Removed {} config", key);
                Decision::ConfigCleared
            }
        }
    }

    /// Applies configuration sections in order, outside of any event loop.
    pub fn apply_configs(&self, apps: impl IntoIterator<Item = AppConfig>) -> Vec<Decision> {
        apps.into_iter()
            .map(|app| self.on_config_changed(&ConfigEvent::Added(app)))
            .collect()
    }

    fn resolve_destination(&self, packet: &InboundPacket) -> Option<AttachmentPoint> {
        let dst = &packet.frame.dst;
        match self.config.mode {
            ForwardingMode::Bridge => self
                .learning
                .lookup(packet.device(), dst)
                .map(|port| AttachmentPoint::new(packet.device().clone(), port)),
            ForwardingMode::Proactive => self.collaborators.hosts.locate(dst).map(|h| h.location),
        }
    }

    fn mac_match(&self) -> MacMatch {
        match self.config.mode {
            ForwardingMode::Proactive if self.config.match_src_mac => MacMatch::SourceAndDestination,
            _ => MacMatch::Destination,
        }
    }

    fn flood(&self, packet: &InboundPacket) -> Decision {
        let outcome = flood(
            self.collaborators.topology.as_ref(),
            self.collaborators.packet_io.as_ref(),
            packet,
            self.config.flood_mode,
        );
        ControllerStats::bump(&self.stats.floods);
        if !outcome.broadcast_point {
            ControllerStats::bump(&self.stats.non_broadcast_floods);
        }
        if outcome.blocked {
            ControllerStats::bump(&self.stats.blocked);
        } else {
            ControllerStats::bump(&self.stats.packet_outs);
        }
        Decision::Flooded {
            broadcast_point: outcome.broadcast_point,
            blocked: outcome.blocked,
        }
    }

    fn forward_local(&self, packet: &InboundPacket, port: PortNumber) -> Decision {
        self.collaborators.packet_io.send_out(packet, port);
        ControllerStats::bump(&self.stats.packet_outs);

        let rule = compile_direct_rule(
            packet.device(),
            port,
            packet.frame.src,
            packet.frame.dst,
            self.mac_match(),
            &self.config.forwarding_template(),
        );
        let rules = self.install(vec![rule]);
        Decision::Forwarded { port, rules }
    }

    fn install_path(&self, packet: &InboundPacket, destination: &AttachmentPoint) -> Decision {
        let Some(path) = select_path(
            self.collaborators.topology.as_ref(),
            packet.device(),
            &destination.device,
        ) else {
            debug!(
                "No path from {} to {} for {}",
                packet.device(),
                destination.device,
                packet.frame.dst
            );
            ControllerStats::bump(&self.stats.no_path);
            return Decision::NoPath;
        };

        info!(
            "Start to install path from {} to {}",
            packet.frame.src, packet.frame.dst
        );
        let rules = compile_path_rules(
            &path,
            destination,
            packet.frame.src,
            packet.frame.dst,
            self.mac_match(),
            &self.config.forwarding_template(),
        );
        let rules = self.install(rules);
        Decision::PathInstalled { rules }
    }

    fn install_icmp_baseline(&self) -> Decision {
        let devices = self.collaborators.topology.devices();
        let rules = compile_icmp_rules(&devices, &self.config.icmp_template());
        let count = self.install(rules);
        info!("Installed ICMP baseline on {} device(s)", devices.len());
        Decision::RulesInstalled { rules: count }
    }

    fn install(&self, rules: Vec<RuleDescriptor>) -> usize {
        let count = rules.len();
        for rule in rules {
            if !self.owners.contains(&rule.owner) {
                self.owners.insert(rule.owner.clone());
            }
            self.collaborators.installer.install(rule);
        }
        ControllerStats::add(&self.stats.rules_installed, count);
        count
    }
}
