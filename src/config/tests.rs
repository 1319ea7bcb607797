//! Tests for configuration management module

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval_ms, 50);
        assert_eq!(settings.time_update_interval_ms, 250);
        assert_eq!(settings.log_filter, "info");
        assert!(!settings.log_json);
        assert_eq!(settings.tick_interval(), Duration::from_millis(50));
        assert_eq!(settings.time_update_interval(), Duration::from_millis(250));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_save_and_load() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("nested").join("config.json");

        let settings = Settings {
            tick_interval_ms: 20,
            log_json: true,
            ..Settings::default()
        };
        settings.save(&config_path)?;
        assert!(config_path.exists());

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded, settings);
        Ok(())
    }

    #[test]
    fn test_missing_file_gives_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let loaded = Settings::load(&dir.path().join("absent.json"))?;
        assert_eq!(loaded, Settings::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "tick_interval_ms": 10 }"#)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded.tick_interval_ms, 10);
        assert_eq!(loaded.time_update_interval_ms, 250);
        Ok(())
    }

    #[test]
    fn test_settings_validation() {
        let invalid = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(invalid.validate(), Err(ConfigError::ValidationError(_))));

        let invalid = Settings {
            update_capacity: 0,
            ..Settings::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_default_path() {
        let path = Settings::default_path();
        assert!(path.ends_with("chatplay/config.json"));
    }
}
