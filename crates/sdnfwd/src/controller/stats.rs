//! Controller counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters, updated concurrently by handlers.
#[derive(Debug, Default)]
pub struct ControllerStats {
    pub packets_in: AtomicU64,
    pub ignored: AtomicU64,
    pub learned: AtomicU64,
    pub mac_moves: AtomicU64,
    pub floods: AtomicU64,
    /// Floods whose ingress was not a broadcast point.
    pub non_broadcast_floods: AtomicU64,
    pub blocked: AtomicU64,
    pub packet_outs: AtomicU64,
    pub rules_installed: AtomicU64,
    pub no_path: AtomicU64,
    pub filtered: AtomicU64,
}

/// Point-in-time copy of [`ControllerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStatsSnapshot {
    pub packets_in: u64,
    pub ignored: u64,
    pub learned: u64,
    pub mac_moves: u64,
    pub floods: u64,
    pub non_broadcast_floods: u64,
    pub blocked: u64,
    pub packet_outs: u64,
    pub rules_installed: u64,
    pub no_path: u64,
    pub filtered: u64,
}

impl ControllerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ControllerStatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        ControllerStatsSnapshot {
            packets_in: load(&self.packets_in),
            ignored: load(&self.ignored),
            learned: load(&self.learned),
            mac_moves: load(&self.mac_moves),
            floods: load(&self.floods),
            non_broadcast_floods: load(&self.non_broadcast_floods),
            blocked: load(&self.blocked),
            packet_outs: load(&self.packet_outs),
            rules_installed: load(&self.rules_installed),
            no_path: load(&self.no_path),
            filtered: load(&self.filtered),
        }
    }
}

impl ControllerStatsSnapshot {
    /// `name=value` pairs in declaration order.
    pub fn fields(&self) -> [(&'static str, u64); 11] {
        [
            ("packets_in", self.packets_in),
            ("ignored", self.ignored),
            ("learned", self.learned),
            ("mac_moves", self.mac_moves),
            ("floods", self.floods),
            ("non_broadcast_floods", self.non_broadcast_floods),
            ("blocked", self.blocked),
            ("packet_outs", self.packet_outs),
            ("rules_installed", self.rules_installed),
            ("no_path", self.no_path),
            ("filtered", self.filtered),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_reads_counters() {
        let stats = ControllerStats::new();
        ControllerStats::bump(&stats.packets_in);
        ControllerStats::bump(&stats.packets_in);
        ControllerStats::add(&stats.rules_installed, 3);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.packets_in, 2);
        assert_eq!(snapshot.rules_installed, 3);
        assert_eq!(snapshot.fields()[0], ("packets_in", 2));
        assert_eq!(snapshot.fields()[8], ("rules_installed", 3));
    }
}
