// novade-input-manager/src/config/loader.rs

//! Loading [`InputManagerConfig`] from TOML.
//!
//! ```toml
//! [[input]]
//! identifier = "type:touchpad"
//! tap = true
//! natural_scroll = true
//!
//! [[input]]
//! identifier = "1133:49271:Logitech_USB_Optical_Mouse"
//! accel_profile = "flat"
//! pointer_accel = -0.25
//!
//! [[seat]]
//! name = "seat0"
//! fallback = true
//!
//! [[seat]]
//! name = "seat1"
//! attach = ["1:1:AT_Translated_Set_2_keyboard"]
//! ```

use std::path::Path;
use tracing::{debug, info};

use super::rules::{InputRuleSet, SeatRuleSet};
use super::InputManagerConfig;
use crate::error::ConfigError;

impl InputManagerConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigError::ParseError` for malformed TOML or out-of-range values,
    /// `ConfigError::ValidationError` for invalid patterns or seat names.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: InputManagerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// `ConfigError::ReadError` if the file cannot be read, otherwise as
    /// [`InputManagerConfig::from_toml_str`].
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("InputManagerConfig: loading configuration from '{}'", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(
            "InputManagerConfig: {} input rule(s), {} seat rule(s) from '{}'",
            config.inputs.len(),
            config.seats.len(),
            path.display()
        );
        Ok(config)
    }

    /// Checks every rule pattern and seat entry.
    ///
    /// The checks are the ones the rule sets apply when storing, run on
    /// scratch sets so the whole document is validated up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        InputRuleSet::new().replace_all(self.inputs.iter().cloned())?;
        SeatRuleSet::new().replace_all(self.seats.iter().cloned())?;
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError("logging level must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AccelProfile, PointerAccel};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[[input]]
identifier = "type:touchpad"
tap = true
natural_scroll = true

[[input]]
identifier = "1133:49271:Logitech_USB_Optical_Mouse"
accel_profile = "flat"
pointer_accel = -0.25

[[input]]
identifier = "type:touch"
calibration_matrix = [0.0, 1.0, 0.0, -1.0, 0.0, 1.0]

[[seat]]
name = "seat0"
fallback = true

[[seat]]
name = "seat1"
attach = ["1:1:AT_Translated_Set_2_keyboard"]

[logging]
level = "debug"
"#;

    #[test]
    fn test_parse_sample() {
        let config = InputManagerConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.inputs.len(), 3);
        assert_eq!(config.inputs[0].tap, Some(true));
        assert_eq!(config.inputs[1].accel_profile, Some(AccelProfile::Flat));
        assert_eq!(config.inputs[1].pointer_accel, Some(PointerAccel::new(-0.25).unwrap()));
        assert!(config.inputs[2].calibration_matrix.is_some());
        assert_eq!(config.seats.len(), 2);
        assert!(config.seats[0].is_fallback());
        assert!(config.seats[1].has_attachment("1:1:AT_Translated_Set_2_keyboard"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = InputManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config, InputManagerConfig::default());
    }

    #[test]
    fn test_unknown_type_is_validation_error() {
        let err = InputManagerConfig::from_toml_str("[[input]]\nidentifier = \"type:trackball\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("trackball")));
    }

    #[test]
    fn test_bad_calibration_matrix_is_parse_error() {
        let err = InputManagerConfig::from_toml_str("[[input]]\nidentifier = \"*\"\ncalibration_matrix = [1.0, 0.0]\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = InputManagerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.inputs.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = InputManagerConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { path: ref p, .. } if *p == path));
    }
}
