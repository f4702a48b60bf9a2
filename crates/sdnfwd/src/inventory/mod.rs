//! Stand-alone collaborators for running the core without a controller
//! platform.
//!
//! - [`InMemoryInventory`]: topology and host directory built from a JSON
//!   document (or programmatically in tests)
//! - [`LoggingRuleInstaller`], [`LoggingPacketIo`]: backends that log what
//!   they are asked to do

mod backend;
mod topology;

pub use backend::{LoggingPacketIo, LoggingRuleInstaller};
pub use topology::{InMemoryInventory, TopologyDocument, MAX_PATH_CANDIDATES};
