//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::GatewaveConfig;
use std::path::Path;

/// File name looked up inside a configuration directory.
pub const CONFIG_FILE_NAME: &str = "gatewave.toml";

/// Loads and validates a `gatewave.toml` configuration from a directory.
///
/// Reads `<dir>/gatewave.toml`, parses it, and validates the values.
pub fn load_config(dir: &Path) -> Result<GatewaveConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `gatewave.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<GatewaveConfig, ConfigError> {
    let config: GatewaveConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects values the scheduler cannot make progress with.
fn validate_config(config: &GatewaveConfig) -> Result<(), ConfigError> {
    if config.simulation.time_limit == Some(0) {
        return Err(ConfigError::ValidationError(
            "simulation.time_limit must be positive".to_string(),
        ));
    }
    for (op, gate) in config.cells.gates() {
        if gate.delay(2) == 0 {
            return Err(ConfigError::ValidationError(format!(
                "cells.{}: two-input delay must be positive",
                op.name().to_lowercase()
            )));
        }
    }
    if config.cells.inverter.delay == 0 {
        return Err(ConfigError::ValidationError(
            "cells.inverter.delay must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellParams, GateParams};

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.simulation.fanout_delay);
        assert_eq!(config.simulation.time_limit, None);
        assert_eq!(config.cells, CellParams::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[simulation]
fanout_delay = false
time_limit = 5000

[cells.inverter]
delay = 2
load = 1
area = 1.5
energy = 0.5

[cells.xor]
delay_base = 20
delay_per_input = 10
load = 5
area_per_input = 2.5
energy = 1.5

[cells.register]
clk_to_q = 40
load = 3
area = 10.0
energy = 9.0
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(!config.simulation.fanout_delay);
        assert_eq!(config.simulation.time_limit, Some(5000));
        assert_eq!(config.cells.inverter.delay, 2);
        assert_eq!(config.cells.xor.delay(2), 40);
        assert_eq!(config.cells.register.clk_to_q, 40);
        // untouched tables keep their reference values
        assert_eq!(config.cells.xnor, GateParams::PARITY);
        assert_eq!(config.cells.and, GateParams::SIMPLE);
        assert_eq!(config.cells.latch.clk_to_q, 38);
    }

    #[test]
    fn partial_gate_table_errors() {
        let toml = r#"
[cells.and]
delay_base = 5
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn zero_time_limit_errors() {
        let toml = r#"
[simulation]
time_limit = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_gate_delay_errors() {
        let toml = r#"
[cells.nor]
delay_base = 0
delay_per_input = 0
load = 3
area_per_input = 1.0
energy = 1.0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.contains("cells.nor")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[simulation]\ntime_limit = 100\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.simulation.time_limit, Some(100));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
