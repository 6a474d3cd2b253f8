// novade-input-manager/src/config/mod.rs

//! Input and seat configuration.
//!
//! [`InputManagerConfig`] is the parsed document handed to the manager: a
//! list of per-device rules (`[[input]]`) and a list of seat rules
//! (`[[seat]]`). At runtime those lists live in the versioned
//! [`InputRuleSet`] and [`SeatRuleSet`].

pub mod loader;
pub mod rules;
pub mod seat;
pub mod types;

pub use rules::{InputRuleSet, RuleSelector, SeatRuleSet};
pub use seat::{SeatConfig, WILDCARD};
pub use types::{
    AccelProfile, CalibrationMatrix, ClickMethod, InputConfig, PointerAccel, ScrollMethod, SendEventsMode, TapButtonMap,
};

use serde::{Deserialize, Serialize};

/// Logging settings, consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"novade_input_manager=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Everything the input manager is configured with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputManagerConfig {
    #[serde(default, rename = "input")]
    pub inputs: Vec<InputConfig>,
    #[serde(default, rename = "seat")]
    pub seats: Vec<SeatConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}
