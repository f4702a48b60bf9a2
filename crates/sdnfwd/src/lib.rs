//! sdnfwd - forwarding-decision core of an SDN controller.
//!
//! The crate decides what happens to frames punted to the controller and
//! which match/action rules get pushed to the switches:
//!
//! ```text
//! packet-in ──> [learning] ──> resolve dst ──┬─ unknown ──> [flood]
//!                                            ├─ local ────> packet-out + direct rule
//!                                            └─ remote ───> [path] ──> [compiler] ──> installer
//!
//! netcfg ─────> [config] ──> snapshot ──> [compiler] (segment routing) ──> installer
//! ```
//!
//! # Key Components
//!
//! - [`controller::PacketEventController`]: per-event handlers
//! - [`daemon::ControllerDaemon`]: event channel and task dispatch
//! - [`learning::LearningTable`]: device-scoped MAC to port table
//! - [`compiler`]: plain and segment-routing rule compilation
//! - [`inventory`]: in-memory topology and logging backends for the
//!   `sdnfwdd` binary

pub mod compiler;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod dhcp;
pub mod flood;
pub mod inventory;
pub mod learning;
pub mod path;
pub mod ping;
pub mod stats;
pub mod testing;

pub use controller::{Collaborators, PacketEventController};
pub use daemon::{ControllerDaemon, ControllerDaemonConfig, ControllerError, EventSender};
