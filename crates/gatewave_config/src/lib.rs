//! Parsing and validation of `gatewave.toml` simulator configuration files.
//!
//! This crate reads the simulator configuration and produces a strongly-typed
//! [`GatewaveConfig`]: the simulation options consumed by the kernel and the
//! delay/load/area/energy tables consumed by the cell library.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
