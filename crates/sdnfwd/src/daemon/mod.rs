//! Controller daemon: event intake and dispatch.

mod controllerd;

pub use controllerd::{
    ControllerDaemon, ControllerDaemonConfig, ControllerError, ControllerResult, EventSender,
    StopHandle,
};
