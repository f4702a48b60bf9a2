//! Shared abstractions for the sdnfwd forwarding core.
//!
//! This crate holds everything the core exchanges with the outside world:
//!
//! - [`TopologyAccessor`], [`HostDirectory`], [`RuleInstaller`], [`PacketIo`]:
//!   narrow interfaces to the inventory, rule backend and packet I/O services
//! - [`RuleDescriptor`]: a device-level match/action rule with priority,
//!   lifetime and owning application
//! - [`ControllerEvent`]: the closed set of events the controller reacts to
//! - [`AppConfig`]: per-application network configuration payloads
//! - [`Decision`]: what a handler did with an event
//!
//! # Architecture
//!
//! ```text
//! [packet-in] ──┐
//! [topology] ───┼──> ControllerEvent ──> controller ──> RuleDescriptor ──> RuleInstaller
//! [netcfg] ─────┘                           │
//!                                           └──> PacketIo (packet-out / block)
//! ```
//!
//! Collaborators are fire-and-forget: installation results are never
//! reported back to the core.

mod app;
mod decision;
mod event;
mod netcfg;
mod rule;
mod service;

pub use app::AppId;
pub use decision::Decision;
pub use event::{ConfigEvent, ControllerEvent, EthernetFrame, InboundPacket, TopologyEvent};
pub use netcfg::{AppConfig, ConfigKey, DhcpConfig, DhcpServer, SegmentDescriptor, SegmentRole};
pub use rule::{Criterion, Instruction, Lifetime, RuleDescriptor, TrafficSelector, TrafficTreatment};
pub use service::{HostDirectory, PacketIo, RuleInstaller, TopologyAccessor};
