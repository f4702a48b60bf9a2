//! Path selection between two devices.

use sdnfwd_common::TopologyAccessor;
use sdnfwd_types::{DeviceId, Path};

/// Picks one path from `src` to `dst`.
///
/// Returns `None` when the devices are the same or no candidate exists.
/// The path with the fewest hops wins; ties go to the candidate the
/// accessor listed first. Paths are not cached between calls.
pub fn select_path(topology: &dyn TopologyAccessor, src: &DeviceId, dst: &DeviceId) -> Option<Path> {
    if src == dst {
        return None;
    }
    pick_shortest(topology.paths(src, dst))
}

/// Fewest-hop non-empty candidate, first one on ties.
pub fn pick_shortest(candidates: Vec<Path>) -> Option<Path> {
    candidates
        .into_iter()
        .filter(|p| !p.is_empty())
        .min_by_key(Path::hop_count)
}
