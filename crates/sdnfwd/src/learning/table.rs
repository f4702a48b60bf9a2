//! Sharded MAC learning table.

use dashmap::DashMap;
use log::{debug, warn};
use sdnfwd_types::{DeviceId, MacAddress, PortNumber};
use std::collections::HashMap;

/// Result of a single [`LearningTable::learn`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// First observation of the MAC on this device.
    Inserted,
    /// Already known on the same port.
    Unchanged,
    /// Known on another port of the same device; the entry now points at `new`.
    Moved { old: PortNumber, new: PortNumber },
    /// The device table is at capacity and the MAC is new.
    Rejected,
}

/// Device-scoped MAC to port mapping.
///
/// Each device has its own sub-table; concurrent learners on different
/// devices never contend, and at most one port is stored per (device, MAC).
#[derive(Debug, Default)]
pub struct LearningTable {
    tables: DashMap<DeviceId, HashMap<MacAddress, PortNumber>>,
    max_entries_per_device: Option<usize>,
}

impl LearningTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table that stops accepting new MACs on a device once it
    /// holds `max` entries. Known MACs keep updating.
    pub fn with_capacity_limit(max: usize) -> Self {
        Self {
            tables: DashMap::new(),
            max_entries_per_device: Some(max),
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.max_entries_per_device
    }

    /// Records that `mac` was seen entering `device` on `port`.
    pub fn learn(&self, device: &DeviceId, mac: MacAddress, port: PortNumber) -> LearnOutcome {
        let mut table = self.tables.entry(device.clone()).or_default();

        match table.get(&mac).copied() {
            Some(old) if old == port => LearnOutcome::Unchanged,
            Some(old) => {
                table.insert(mac, port);
                warn!(
                    "MAC address {} is moved from port {} to port {} on device {}",
                    mac, old, port, device
                );
                LearnOutcome::Moved { old, new: port }
            }
            None => {
                if let Some(max) = self.max_entries_per_device {
                    if table.len() >= max {
                        debug!(
                            "Learning table of {} is full ({} entries), not learning {}",
                            device, max, mac
                        );
                        return LearnOutcome::Rejected;
                    }
                }
                table.insert(mac, port);
                debug!("Learned {} on {}/{}", mac, device, port);
                LearnOutcome::Inserted
            }
        }
    }

    pub fn lookup(&self, device: &DeviceId, mac: &MacAddress) -> Option<PortNumber> {
        self.tables
            .get(device)
            .and_then(|table| table.get(mac).copied())
    }

    /// Number of MACs known on a device.
    pub fn len(&self, device: &DeviceId) -> usize {
        self.tables.get(device).map(|t| t.len()).unwrap_or(0)
    }

    pub fn total_entries(&self) -> usize {
        self.tables.iter().map(|t| t.value().len()).sum()
    }

    pub fn device_count(&self) -> usize {
        self.tables.len()
    }

    /// Entries of one device, sorted by MAC.
    pub fn entries(&self, device: &DeviceId) -> Vec<(MacAddress, PortNumber)> {
        let mut entries: Vec<_> = self
            .tables
            .get(device)
            .map(|t| t.iter().map(|(mac, port)| (*mac, *port)).collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x00, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn port(n: u32) -> PortNumber {
        PortNumber::Physical(n)
    }

    #[test]
    fn test_learn_then_lookup() {
        let table = LearningTable::new();
        let d1 = DeviceId::from_dpid(1);

        assert_eq!(table.learn(&d1, mac(1), port(1)), LearnOutcome::Inserted);
        assert_eq!(table.lookup(&d1, &mac(1)), Some(port(1)));
        assert_eq!(table.lookup(&d1, &mac(2)), None);
    }

    #[test]
    fn test_relearn_same_port_is_unchanged() {
        let table = LearningTable::new();
        let d1 = DeviceId::from_dpid(1);

        table.learn(&d1, mac(1), port(1));
        assert_eq!(table.learn(&d1, mac(1), port(1)), LearnOutcome::Unchanged);
        assert_eq!(table.len(&d1), 1);
    }

    #[test]
    fn test_most_recent_learn_wins() {
        let table = LearningTable::new();
        let d1 = DeviceId::from_dpid(1);

        table.learn(&d1, mac(1), port(1));
        assert_eq!(
            table.learn(&d1, mac(1), port(4)),
            LearnOutcome::Moved { old: port(1), new: port(4) }
        );
        assert_eq!(table.lookup(&d1, &mac(1)), Some(port(4)));
        assert_eq!(table.len(&d1), 1);
    }

    #[test]
    fn test_devices_are_isolated() {
        let table = LearningTable::new();
        let d1 = DeviceId::from_dpid(1);
        let d2 = DeviceId::from_dpid(2);

        table.learn(&d1, mac(1), port(1));
        table.learn(&d2, mac(1), port(7));

        assert_eq!(table.lookup(&d1, &mac(1)), Some(port(1)));
        assert_eq!(table.lookup(&d2, &mac(1)), Some(port(7)));
        assert_eq!(table.device_count(), 2);
        assert_eq!(table.total_entries(), 2);
    }

    #[test]
    fn test_capacity_limit_rejects_only_new_macs() {
        let table = LearningTable::with_capacity_limit(2);
        let d1 = DeviceId::from_dpid(1);

        table.learn(&d1, mac(1), port(1));
        table.learn(&d1, mac(2), port(2));
        assert_eq!(table.learn(&d1, mac(3), port(3)), LearnOutcome::Rejected);
        assert_eq!(table.lookup(&d1, &mac(3)), None);

        // A known MAC can still move.
        assert_eq!(
            table.learn(&d1, mac(1), port(5)),
            LearnOutcome::Moved { old: port(1), new: port(5) }
        );

        // Other devices have their own budget.
        let d2 = DeviceId::from_dpid(2);
        assert_eq!(table.learn(&d2, mac(3), port(3)), LearnOutcome::Inserted);
    }

    #[test]
    fn test_entries_sorted_by_mac() {
        let table = LearningTable::new();
        let d1 = DeviceId::from_dpid(1);

        table.learn(&d1, mac(9), port(2));
        table.learn(&d1, mac(3), port(1));

        assert_eq!(table.entries(&d1), vec![(mac(3), port(1)), (mac(9), port(2))]);
        assert!(table.entries(&DeviceId::from_dpid(5)).is_empty());
    }

    #[test]
    fn test_concurrent_learning() {
        let table = Arc::new(LearningTable::new());
        let handles: Vec<_> = (1..=4u64)
            .map(|dpid| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    let device = DeviceId::from_dpid(dpid);
                    for i in 0..50u8 {
                        table.learn(&device, mac(i), port(u32::from(i % 4) + 1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.device_count(), 4);
        assert_eq!(table.total_entries(), 200);
    }
}
