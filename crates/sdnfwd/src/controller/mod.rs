//! The packet-event controller.
//!
//! [`PacketEventController`] turns packet-ins into flood, packet-out and
//! rule-install actions, and runs the segment-routing sweep when the network
//! configuration changes. It holds no per-event state of its own.

mod handler;
mod stats;

pub use handler::{Collaborators, PacketEventController};
pub use stats::{ControllerStats, ControllerStatsSnapshot};
