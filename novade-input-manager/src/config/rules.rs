// novade-input-manager/src/config/rules.rs

//! Versioned rule sets.
//!
//! The manager owns exactly one [`InputRuleSet`] and one [`SeatRuleSet`] and
//! threads them into the resolver and the assignment engine. Every mutation
//! bumps the set's generation, which is how cached resolutions notice that
//! the rules changed underneath them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

use super::seat::{SeatConfig, WILDCARD};
use super::types::InputConfig;
use crate::device::{DeviceKind, InputDevice};
use crate::error::ConfigError;

const TYPE_PREFIX: &str = "type:";

/// Which devices an [`InputConfig`] applies to, in increasing precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleSelector {
    Wildcard,
    Type(DeviceKind),
    Identifier(String),
}

impl RuleSelector {
    /// Parses a rule pattern.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` for an empty pattern or an unknown
    /// `type:` kind.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        if pattern == WILDCARD {
            return Ok(RuleSelector::Wildcard);
        }
        if let Some(kind) = pattern.strip_prefix(TYPE_PREFIX) {
            return kind
                .parse::<DeviceKind>()
                .map(RuleSelector::Type)
                .map_err(|e| ConfigError::ValidationError(format!("input '{}': {}", pattern, e)));
        }
        if pattern.trim().is_empty() {
            return Err(ConfigError::ValidationError("input identifier must not be empty".to_string()));
        }
        Ok(RuleSelector::Identifier(pattern.to_string()))
    }

    pub fn matches(&self, device: &InputDevice) -> bool {
        match self {
            RuleSelector::Wildcard => true,
            RuleSelector::Type(kind) => device.kind == *kind,
            RuleSelector::Identifier(identifier) => device.identifier == *identifier,
        }
    }
}

impl fmt::Display for RuleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSelector::Wildcard => f.write_str(WILDCARD),
            RuleSelector::Type(kind) => write!(f, "{}{}", TYPE_PREFIX, kind),
            RuleSelector::Identifier(identifier) => f.write_str(identifier),
        }
    }
}

/// Per-device configuration rules, split by precedence class.
#[derive(Debug, Default)]
pub struct InputRuleSet {
    generation: u64,
    wildcard: Option<InputConfig>,
    by_type: BTreeMap<DeviceKind, InputConfig>,
    by_identifier: HashMap<String, InputConfig>,
}

impl InputRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stores a rule, merging it into an existing rule with the same pattern.
    ///
    /// Returns the selector and the rule as stored.
    pub fn store(&mut self, rule: InputConfig) -> Result<(RuleSelector, &InputConfig), ConfigError> {
        let selector = RuleSelector::parse(&rule.identifier)?;
        self.generation += 1;
        debug!("InputRuleSet: storing '{}' (generation {})", selector, self.generation);

        // Stored under the canonical pattern, so `type:tablet-tool` and
        // `type:tablet_tool` end up in the same rule.
        let fresh = InputConfig::new(selector.to_string());
        let stored = match &selector {
            RuleSelector::Wildcard => self.wildcard.get_or_insert(fresh),
            RuleSelector::Type(kind) => self.by_type.entry(*kind).or_insert(fresh),
            RuleSelector::Identifier(identifier) => self.by_identifier.entry(identifier.clone()).or_insert(fresh),
        };
        stored.merge_from(&rule);
        Ok((selector, stored))
    }

    /// Removes the rule stored under `selector`.
    pub fn remove(&mut self, selector: &RuleSelector) -> Option<InputConfig> {
        let removed = match selector {
            RuleSelector::Wildcard => self.wildcard.take(),
            RuleSelector::Type(kind) => self.by_type.remove(kind),
            RuleSelector::Identifier(identifier) => self.by_identifier.remove(identifier),
        };
        if removed.is_some() {
            self.generation += 1;
        }
        removed
    }

    /// Replaces every rule. The generation keeps counting up, so nothing
    /// cached against the previous contents can be mistaken for current.
    pub fn replace_all(&mut self, rules: impl IntoIterator<Item = InputConfig>) -> Result<(), ConfigError> {
        let mut fresh = InputRuleSet {
            generation: self.generation,
            ..InputRuleSet::default()
        };
        for rule in rules {
            fresh.store(rule)?;
        }
        fresh.generation += 1;
        *self = fresh;
        Ok(())
    }

    pub fn wildcard(&self) -> Option<&InputConfig> {
        self.wildcard.as_ref()
    }

    pub fn for_type(&self, kind: DeviceKind) -> Option<&InputConfig> {
        self.by_type.get(&kind)
    }

    pub fn for_identifier(&self, identifier: &str) -> Option<&InputConfig> {
        self.by_identifier.get(identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.wildcard.is_none() && self.by_type.is_empty() && self.by_identifier.is_empty()
    }
}

/// Seat configurations: one per seat name plus an optional `*` entry.
#[derive(Debug, Default)]
pub struct SeatRuleSet {
    generation: u64,
    wildcard: Option<SeatConfig>,
    by_name: BTreeMap<String, SeatConfig>,
}

impl SeatRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stores a seat configuration, merging into an existing one of the same
    /// name, and returns the stored result.
    pub fn store(&mut self, config: SeatConfig) -> Result<&SeatConfig, ConfigError> {
        if config.name.trim().is_empty() {
            return Err(ConfigError::ValidationError("seat name must not be empty".to_string()));
        }
        if let Some(pattern) = config.attachments.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "seat '{}': invalid attachment pattern '{}'",
                config.name, pattern
            )));
        }

        self.generation += 1;
        let stored = if config.is_wildcard() {
            self.wildcard.get_or_insert_with(|| SeatConfig::new(WILDCARD))
        } else {
            self.by_name
                .entry(config.name.clone())
                .or_insert_with(|| SeatConfig::new(config.name.clone()))
        };
        stored.merge_from(&config);
        Ok(stored)
    }

    pub fn remove(&mut self, name: &str) -> Option<SeatConfig> {
        let removed = if name == WILDCARD {
            self.wildcard.take()
        } else {
            self.by_name.remove(name)
        };
        if removed.is_some() {
            self.generation += 1;
        }
        removed
    }

    pub fn replace_all(&mut self, configs: impl IntoIterator<Item = SeatConfig>) -> Result<(), ConfigError> {
        let mut fresh = SeatRuleSet {
            generation: self.generation,
            ..SeatRuleSet::default()
        };
        for config in configs {
            fresh.store(config)?;
        }
        fresh.generation += 1;
        *self = fresh;
        Ok(())
    }

    /// The configuration stored under exactly this seat name.
    pub fn specific(&self, seat_name: &str) -> Option<&SeatConfig> {
        self.by_name.get(seat_name)
    }

    pub fn wildcard(&self) -> Option<&SeatConfig> {
        self.wildcard.as_ref()
    }

    /// The configuration a seat actually runs with: its own, else `*`.
    pub fn effective(&self, seat_name: &str) -> Option<&SeatConfig> {
        self.specific(seat_name).or(self.wildcard.as_ref())
    }

    /// Named (non-wildcard) configurations, ordered by seat name.
    pub fn specific_configs(&self) -> impl Iterator<Item = &SeatConfig> {
        self.by_name.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AccelProfile, SendEventsMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selector_parse() {
        assert_eq!(RuleSelector::parse("*").unwrap(), RuleSelector::Wildcard);
        assert_eq!(RuleSelector::parse("type:touchpad").unwrap(), RuleSelector::Type(DeviceKind::Touchpad));
        assert_eq!(RuleSelector::parse("type:tablet-tool").unwrap(), RuleSelector::Type(DeviceKind::TabletTool));
        assert_eq!(
            RuleSelector::parse("1:2:Foo_Bar").unwrap(),
            RuleSelector::Identifier("1:2:Foo_Bar".to_string())
        );
        assert!(RuleSelector::parse("type:trackball").is_err());
        assert!(RuleSelector::parse("").is_err());
        assert_eq!(RuleSelector::parse("type:tablet-tool").unwrap().to_string(), "type:tablet_tool");
    }

    #[test]
    fn test_store_merges_same_pattern() {
        let mut rules = InputRuleSet::new();
        let mut first = InputConfig::new("type:pointer");
        first.accel_profile = Some(AccelProfile::Flat);
        let mut second = InputConfig::new("type:pointer");
        second.send_events = Some(SendEventsMode::Disabled);

        rules.store(first).unwrap();
        rules.store(second).unwrap();

        let stored = rules.for_type(DeviceKind::Pointer).unwrap();
        assert_eq!(stored.accel_profile, Some(AccelProfile::Flat));
        assert_eq!(stored.send_events, Some(SendEventsMode::Disabled));
        assert_eq!(rules.generation(), 2);
    }

    #[test]
    fn test_replace_all_keeps_generation_monotonic() {
        let mut rules = InputRuleSet::new();
        rules.store(InputConfig::new("*")).unwrap();
        let before = rules.generation();

        rules.replace_all(vec![InputConfig::new("type:keyboard")]).unwrap();

        assert!(rules.generation() > before);
        assert!(rules.wildcard().is_none());
        assert!(rules.for_type(DeviceKind::Keyboard).is_some());
    }

    #[test]
    fn test_failed_replace_leaves_rules_untouched() {
        let mut rules = InputRuleSet::new();
        rules.store(InputConfig::new("*")).unwrap();

        assert!(rules.replace_all(vec![InputConfig::new("type:bogus")]).is_err());
        assert!(rules.wildcard().is_some());
    }

    #[test]
    fn test_remove_bumps_generation_only_when_present() {
        let mut rules = InputRuleSet::new();
        rules.store(InputConfig::new("1:2:Foo_Bar")).unwrap();
        let generation = rules.generation();

        assert!(rules.remove(&RuleSelector::Wildcard).is_none());
        assert_eq!(rules.generation(), generation);
        assert!(rules.remove(&RuleSelector::Identifier("1:2:Foo_Bar".to_string())).is_some());
        assert_eq!(rules.generation(), generation + 1);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_seat_effective_prefers_specific() {
        let mut seats = SeatRuleSet::new();
        seats.store(SeatConfig::new("*").with_attachment("*")).unwrap();
        seats.store(SeatConfig::new("seat1").with_fallback(true)).unwrap();

        assert!(seats.effective("seat1").unwrap().is_fallback());
        assert!(!seats.effective("seat1").unwrap().claims("1:2:Foo_Bar"));
        assert!(seats.effective("seat2").unwrap().claims("1:2:Foo_Bar"));
    }

    #[test]
    fn test_seat_store_validates() {
        let mut seats = SeatRuleSet::new();
        assert!(seats.store(SeatConfig::new("")).is_err());
        assert!(seats.store(SeatConfig::new("seat1").with_attachment(" ")).is_err());
        assert_eq!(seats.generation(), 0);
    }
}
