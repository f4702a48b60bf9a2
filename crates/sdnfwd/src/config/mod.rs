//! Controller settings and network configuration.
//!
//! - [`ControllerConfig`]: runtime settings (mode, flooding, rule profiles)
//! - [`parse_netcfg`] / [`load_netcfg`]: per-application network
//!   configuration in the `{"apps": {...}}` document format
//! - [`ConfigStore`]: the current network configuration snapshot, replaced
//!   atomically as a whole

mod error;
mod netcfg;
mod store;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use netcfg::{load_netcfg, parse_app_config, parse_netcfg};
pub use store::{ConfigStore, NetworkConfig};
pub use types::{ControllerConfig, ForwardingMode, RuleProfile};
