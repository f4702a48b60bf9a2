//! In-memory topology and host directory.

use crate::config::{ConfigError, ConfigResult};
use log::info;
use sdnfwd_common::{HostDirectory, TopologyAccessor};
use sdnfwd_types::{AttachmentPoint, DeviceId, Host, Link, MacAddress, Path, PortNumber};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// JSON description of a static network.
///
/// ```json
/// {
///   "devices": [{"id": "of:0000000000000001", "ports": [1, 2]}],
///   "links": [{"src": "of:0000000000000001/2", "dst": "of:0000000000000002/1"}],
///   "hosts": [{"mac": "00:00:00:00:00:01", "location": "of:0000000000000001/1"}]
/// }
/// ```
///
/// Links are bidirectional unless `"bidirectional": false` is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
    #[serde(default)]
    pub links: Vec<LinkEntry>,
    #[serde(default)]
    pub hosts: Vec<Host>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: DeviceId,
    #[serde(default)]
    pub ports: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkEntry {
    pub src: AttachmentPoint,
    pub dst: AttachmentPoint,
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
}

fn default_bidirectional() -> bool {
    true
}

/// Equal-cost paths returned per device pair. Meshes and grids have
/// exponentially many.
pub const MAX_PATH_CANDIDATES: usize = 16;

/// Static inventory implementing [`TopologyAccessor`] and [`HostDirectory`].
///
/// Path candidates are the fewest-hop paths, enumerated in link order and
/// capped at [`MAX_PATH_CANDIDATES`].
/// Broadcast points are edge ports plus the endpoints of links on a BFS
/// spanning forest rooted at the lowest device id of each component.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    devices: BTreeMap<DeviceId, BTreeSet<PortNumber>>,
    links: BTreeSet<Link>,
    hosts: BTreeMap<MacAddress, Host>,
    infrastructure_points: HashSet<AttachmentPoint>,
    tree_points: HashSet<AttachmentPoint>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: TopologyDocument) -> Self {
        let mut inventory = Self::new();
        for device in document.devices {
            let ports = device.ports.into_iter().map(PortNumber::Physical).collect();
            inventory.add_device(device.id, ports);
        }
        for link in document.links {
            if link.bidirectional {
                inventory.add_bidirectional_link(link.src, link.dst);
            } else {
                inventory.add_link(Link::new(link.src, link.dst));
            }
        }
        for host in document.hosts {
            inventory.add_host(host);
        }
        inventory
    }

    pub fn parse(text: &str) -> ConfigResult<Self> {
        let document: TopologyDocument = serde_json::from_str(text)?;
        Ok(Self::from_document(document))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let inventory = Self::parse(&text)?;
        info!(
            "Loaded topology from {}: {} devices, {} links, {} hosts",
            path.display(),
            inventory.devices.len(),
            inventory.links.len(),
            inventory.hosts.len()
        );
        Ok(inventory)
    }

    pub fn add_device(&mut self, device: DeviceId, ports: Vec<PortNumber>) {
        self.devices.entry(device).or_default().extend(ports);
        self.refresh();
    }

    pub fn add_link(&mut self, link: Link) {
        self.register_point(&link.src);
        self.register_point(&link.dst);
        self.links.insert(link);
        self.refresh();
    }

    pub fn add_bidirectional_link(&mut self, a: AttachmentPoint, b: AttachmentPoint) {
        let link = Link::new(a, b);
        self.add_link(link.reversed());
        self.add_link(link);
    }

    pub fn remove_link(&mut self, link: &Link) -> bool {
        let removed = self.links.remove(link);
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn add_host(&mut self, host: Host) {
        self.register_point(&host.location);
        self.hosts.insert(host.mac, host);
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    fn register_point(&mut self, point: &AttachmentPoint) {
        self.devices
            .entry(point.device.clone())
            .or_default()
            .insert(point.port);
    }

    fn outgoing<'a>(&'a self, device: &'a DeviceId) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| &l.src.device == device)
    }

    fn refresh(&mut self) {
        self.infrastructure_points = self
            .links
            .iter()
            .flat_map(|l| [l.src.clone(), l.dst.clone()])
            .collect();

        let mut tree = HashSet::new();
        let mut visited = HashSet::new();
        for root in self.devices.keys() {
            if !visited.insert(root.clone()) {
                continue;
            }
            let mut queue = VecDeque::from([root.clone()]);
            while let Some(device) = queue.pop_front() {
                for link in self.outgoing(&device) {
                    if visited.insert(link.dst.device.clone()) {
                        tree.insert(link.src.clone());
                        tree.insert(link.dst.clone());
                        queue.push_back(link.dst.device.clone());
                    }
                }
            }
        }
        self.tree_points = tree;
    }

    /// Hop count from every device that can reach `dst`.
    fn distances_to(&self, dst: &DeviceId) -> HashMap<DeviceId, usize> {
        let mut distances = HashMap::from([(dst.clone(), 0)]);
        let mut queue = VecDeque::from([dst.clone()]);
        while let Some(device) = queue.pop_front() {
            let next = distances[&device] + 1;
            for link in self.links.iter().filter(|l| l.dst.device == device) {
                if !distances.contains_key(&link.src.device) {
                    distances.insert(link.src.device.clone(), next);
                    queue.push_back(link.src.device.clone());
                }
            }
        }
        distances
    }

    fn collect_paths(
        &self,
        at: &DeviceId,
        distances: &HashMap<DeviceId, usize>,
        current: &mut Vec<Link>,
        paths: &mut Vec<Path>,
    ) {
        let remaining = distances.get(at).copied().unwrap_or(usize::MAX);
        if remaining == 0 {
            paths.push(Path::new(current.clone()));
            return;
        }
        for link in self.outgoing(at) {
            if paths.len() >= MAX_PATH_CANDIDATES {
                return;
            }
            if distances.get(&link.dst.device).map(|d| d + 1) == Some(remaining) {
                current.push(link.clone());
                self.collect_paths(&link.dst.device, distances, current, paths);
                current.pop();
            }
        }
    }
}

impl TopologyAccessor for InMemoryInventory {
    fn devices(&self) -> Vec<DeviceId> {
        self.devices.keys().cloned().collect()
    }

    fn ports(&self, device: &DeviceId) -> Vec<PortNumber> {
        self.devices
            .get(device)
            .map(|ports| ports.iter().copied().collect())
            .unwrap_or_default()
    }

    fn paths(&self, src: &DeviceId, dst: &DeviceId) -> Vec<Path> {
        if src == dst || !self.devices.contains_key(src) || !self.devices.contains_key(dst) {
            return Vec::new();
        }
        let distances = self.distances_to(dst);
        if !distances.contains_key(src) {
            return Vec::new();
        }
        let mut paths = Vec::new();
        self.collect_paths(src, &distances, &mut Vec::new(), &mut paths);
        paths
    }

    fn is_broadcast_point(&self, point: &AttachmentPoint) -> bool {
        let Some(ports) = self.devices.get(&point.device) else {
            return false;
        };
        if self.infrastructure_points.contains(point) {
            self.tree_points.contains(point)
        } else {
            ports.contains(&point.port)
        }
    }
}

impl HostDirectory for InMemoryInventory {
    fn locate(&self, mac: &MacAddress) -> Option<Host> {
        self.hosts.get(mac).cloned()
    }

    fn hosts_on(&self, device: &DeviceId) -> Vec<Host> {
        self.hosts
            .values()
            .filter(|h| &h.location.device == device)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ap(dpid: u64, port: u32) -> AttachmentPoint {
        AttachmentPoint::new(DeviceId::from_dpid(dpid), port)
    }

    fn dev(dpid: u64) -> DeviceId {
        DeviceId::from_dpid(dpid)
    }

    /// Square 1-2-4 and 1-3-4 plus a tail 4-5.
    fn square() -> InMemoryInventory {
        let mut inv = InMemoryInventory::new();
        inv.add_bidirectional_link(ap(1, 2), ap(2, 1));
        inv.add_bidirectional_link(ap(1, 3), ap(3, 1));
        inv.add_bidirectional_link(ap(2, 2), ap(4, 2));
        inv.add_bidirectional_link(ap(3, 2), ap(4, 3));
        inv.add_bidirectional_link(ap(4, 4), ap(5, 1));
        inv
    }

    #[test]
    fn test_all_shortest_paths_in_link_order() {
        let inv = square();
        let paths = inv.paths(&dev(1), &dev(4));

        assert_eq!(paths.len(), 2);
        assert_eq!(
            paths[0].links(),
            &[Link::new(ap(1, 2), ap(2, 1)), Link::new(ap(2, 2), ap(4, 2))]
        );
        assert_eq!(
            paths[1].links(),
            &[Link::new(ap(1, 3), ap(3, 1)), Link::new(ap(3, 2), ap(4, 3))]
        );
    }

    #[test]
    fn test_grid_path_candidates_are_capped() {
        // 6x6 grid: 252 equal-cost paths between opposite corners.
        let mut inv = InMemoryInventory::new();
        let id = |row: u64, col: u64| row * 10 + col + 1;
        for row in 0..6 {
            for col in 0..6 {
                if col < 5 {
                    inv.add_bidirectional_link(ap(id(row, col), 1), ap(id(row, col + 1), 2));
                }
                if row < 5 {
                    inv.add_bidirectional_link(ap(id(row, col), 3), ap(id(row + 1, col), 4));
                }
            }
        }

        let paths = inv.paths(&dev(id(0, 0)), &dev(id(5, 5)));

        assert_eq!(paths.len(), MAX_PATH_CANDIDATES);
        assert!(paths.iter().all(|p| p.hop_count() == 10));
        // Link order sends the first candidate along the top row first.
        assert_eq!(paths[0].src(), Some(&ap(id(0, 0), 1)));
    }

    #[test]
    fn test_longer_paths_are_not_candidates() {
        let inv = square();
        let paths = inv.paths(&dev(2), &dev(5));

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].hop_count(), 2);
        assert_eq!(paths[0].dst(), Some(&ap(5, 1)));
    }

    #[test]
    fn test_no_paths_for_same_or_unknown_device() {
        let mut inv = square();
        inv.add_device(dev(9), vec![PortNumber::Physical(1)]);

        assert!(inv.paths(&dev(1), &dev(1)).is_empty());
        assert!(inv.paths(&dev(1), &dev(9)).is_empty());
        assert!(inv.paths(&dev(1), &dev(42)).is_empty());
    }

    #[test]
    fn test_broadcast_points() {
        let mut inv = square();
        inv.add_host(Host::new(MacAddress::new([0, 0, 0, 0, 0, 1]), ap(1, 1)));

        // Edge port.
        assert!(inv.is_broadcast_point(&ap(1, 1)));
        // Tree links from root 1 reach 2 and 3 first, then 4 via 2.
        assert!(inv.is_broadcast_point(&ap(1, 2)));
        assert!(inv.is_broadcast_point(&ap(2, 2)));
        assert!(inv.is_broadcast_point(&ap(4, 2)));
        // 3-4 closes the loop.
        assert!(!inv.is_broadcast_point(&ap(3, 2)));
        assert!(!inv.is_broadcast_point(&ap(4, 3)));
        // Unknown device or port.
        assert!(!inv.is_broadcast_point(&ap(7, 1)));
        assert!(!inv.is_broadcast_point(&ap(1, 9)));
    }

    #[test]
    fn test_remove_link_updates_paths() {
        let mut inv = square();
        assert!(inv.remove_link(&Link::new(ap(1, 2), ap(2, 1))));

        let paths = inv.paths(&dev(1), &dev(4));
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].src(), Some(&ap(1, 3)));
    }

    #[test]
    fn test_hosts() {
        let mut inv = square();
        let a = Host::new(MacAddress::new([0, 0, 0, 0, 0, 0xa]), ap(1, 1));
        let b = Host::new(MacAddress::new([0, 0, 0, 0, 0, 0xb]), ap(5, 2));
        inv.add_host(b.clone());
        inv.add_host(a.clone());

        assert_eq!(inv.locate(&a.mac), Some(a.clone()));
        assert_eq!(inv.hosts_on(&dev(5)), vec![b]);
        assert_eq!(inv.ports(&dev(5)), vec![PortNumber::Physical(1), PortNumber::Physical(2)]);
        assert!(inv.locate(&MacAddress::BROADCAST).is_none());
    }

    #[test]
    fn test_parse_document() {
        let inv = InMemoryInventory::parse(
            r#"{
                "devices": [{"id": "of:0000000000000001", "ports": [1, 2, 3]}],
                "links": [
                    {"src": "of:0000000000000001/2", "dst": "of:0000000000000002/1"},
                    {"src": "of:0000000000000002/3", "dst": "of:0000000000000003/1", "bidirectional": false}
                ],
                "hosts": [{"mac": "00:00:00:00:00:0a", "location": "of:0000000000000003/2"}]
            }"#,
        )
        .unwrap();

        assert_eq!(inv.devices(), vec![dev(1), dev(2), dev(3)]);
        assert_eq!(inv.links().count(), 3);
        assert_eq!(inv.paths(&dev(1), &dev(3)).len(), 1);
        assert!(inv.paths(&dev(3), &dev(1)).is_empty());
        assert_eq!(inv.hosts_on(&dev(3)).len(), 1);
    }
}
