//! Per-device MAC learning.
//!
//! The table maps (device, source MAC) to the port the MAC was last seen on.
//! Entries never age out; a MAC seen on a new port of the same device
//! replaces the old port and is reported as a move.

mod table;

pub use table::{LearnOutcome, LearningTable};
