// novade-input-manager/src/config/seat.rs

//! Seat configuration rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pattern that attaches every device to a seat, and seat name that applies
/// a configuration to every seat lacking its own.
pub const WILDCARD: &str = "*";

/// Configuration of one seat (or of every seat, when `name` is `*`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatConfig {
    pub name: String,
    /// `Some(true)` makes the seat receive every device no seat claims.
    /// `Some(false)` is an explicit opt-out and still counts as a configured
    /// fallback setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    /// Device identifiers (or `*`) attached to this seat.
    #[serde(default, rename = "attach", skip_serializing_if = "BTreeSet::is_empty")]
    pub attachments: BTreeSet<String>,
}

impl SeatConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_attachment(mut self, pattern: impl Into<String>) -> Self {
        self.attachments.insert(pattern.into());
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    pub fn has_attachment(&self, pattern: &str) -> bool {
        self.attachments.contains(pattern)
    }

    /// True if this config claims the device with the given identifier,
    /// either by name or through a `*` attachment.
    pub fn claims(&self, identifier: &str) -> bool {
        self.has_attachment(WILDCARD) || self.has_attachment(identifier)
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback == Some(true)
    }

    /// Layers `other` on top of `self`: a set fallback flag wins and
    /// attachments accumulate.
    pub fn merge_from(&mut self, other: &SeatConfig) {
        if other.fallback.is_some() {
            self.fallback = other.fallback;
        }
        self.attachments.extend(other.attachments.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims() {
        let config = SeatConfig::new("seat1").with_attachment("1:2:Foo_Bar");
        assert!(config.claims("1:2:Foo_Bar"));
        assert!(!config.claims("3:4:Other"));

        let all = SeatConfig::new("seat1").with_attachment(WILDCARD);
        assert!(all.claims("3:4:Other"));
    }

    #[test]
    fn test_merge_keeps_fallback_unless_set() {
        let mut config = SeatConfig::new("seat0").with_fallback(false).with_attachment("a");
        config.merge_from(&SeatConfig::new("seat0").with_attachment("b"));

        assert_eq!(config.fallback, Some(false));
        assert!(config.has_attachment("a") && config.has_attachment("b"));

        config.merge_from(&SeatConfig::new("seat0").with_fallback(true));
        assert!(config.is_fallback());
    }

    #[test]
    fn test_deserialize_attach_key() {
        let config: SeatConfig = toml::from_str("name = \"seat1\"\nfallback = true\nattach = [\"*\"]\n").unwrap();
        assert!(config.is_fallback());
        assert!(config.claims("anything"));
    }
}
