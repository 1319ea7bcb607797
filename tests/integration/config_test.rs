//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use r_chatplay::config::{ConfigError, Settings};
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        let settings = Settings {
            tick_interval_ms: 25,
            time_update_interval_ms: 100,
            log_filter: "r_chatplay=debug".to_string(),
            ..Settings::default()
        };
        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded.tick_interval_ms, 25);
        assert_eq!(loaded.time_update_interval_ms, 100);
        assert_eq!(loaded.log_filter, "r_chatplay=debug");

        let updated = Settings {
            log_json: true,
            ..loaded
        };
        updated.save(&config_path)?;
        let reloaded = Settings::load(&config_path)?;
        assert!(reloaded.log_json);
        assert_eq!(reloaded.tick_interval_ms, 25);

        Ok(())
    }

    /// Test malformed and invalid configuration handling
    #[test]
    fn test_invalid_config() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{ not json")?;
        assert!(matches!(Settings::load(&config_path), Err(ConfigError::ParseError(_))));

        let invalid = Settings {
            time_update_interval_ms: 0,
            ..Settings::default()
        };
        let result = invalid.validate();
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Time update interval"));
        }
        Ok(())
    }
}
