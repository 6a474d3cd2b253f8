// novade-input-manager/src/resolver.rs

//! Effective configuration of a device.
//!
//! Rules are layered in ascending precedence: `*`, then `type:<kind>`, then
//! the exact identifier. Unset fields never overwrite set ones.

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::config::{InputConfig, InputRuleSet};
use crate::device::{DeviceKind, InputDevice};

/// Merges the rules that apply to a device into one configuration.
///
/// Returns `None` when no rule applies, in which case the driver defaults
/// stand. The rule set itself is only read.
pub fn merge_rules(rules: &InputRuleSet, identifier: &str, kind: DeviceKind) -> Option<InputConfig> {
    let layers = [rules.wildcard(), rules.for_type(kind), rules.for_identifier(identifier)];
    if layers.iter().all(Option::is_none) {
        return None;
    }

    let mut effective = InputConfig::new(identifier);
    for rule in layers.into_iter().flatten() {
        effective.merge_from(rule);
    }
    Some(effective)
}

/// Caches merged configurations per (identifier, kind).
///
/// The cache belongs to one rule set generation. As soon as the rule set
/// reports a different generation, everything cached is dropped.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    generation: u64,
    cache: HashMap<(String, DeviceKind), Option<InputConfig>>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the effective configuration for `device`.
    pub fn resolve(&mut self, rules: &InputRuleSet, device: &InputDevice) -> Option<InputConfig> {
        if rules.generation() != self.generation {
            trace!(
                "ConfigResolver: rules moved from generation {} to {}, dropping {} cached entries",
                self.generation,
                rules.generation(),
                self.cache.len()
            );
            self.cache.clear();
            self.generation = rules.generation();
        }

        let key = (device.identifier.clone(), device.kind);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let effective = merge_rules(rules, &device.identifier, device.kind);
        debug!(
            "ConfigResolver: '{}' ({}) resolved to {}",
            device.identifier,
            device.kind,
            if effective.is_some() { "a merged configuration" } else { "driver defaults" }
        );
        self.cache.insert(key, effective.clone());
        effective
    }

    /// Number of cached resolutions, for diagnostics.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccelProfile, SendEventsMode};
    use crate::device::{BackendDeviceType, DeviceId, DriverHandle};
    use pretty_assertions::assert_eq;

    fn pointer(identifier: &str) -> InputDevice {
        InputDevice {
            id: DeviceId(0),
            handle: DriverHandle(1),
            identifier: identifier.to_string(),
            name: "Foo Bar".to_string(),
            device_type: BackendDeviceType::Pointer,
            kind: DeviceKind::Pointer,
            is_virtual: false,
        }
    }

    fn rule(identifier: &str, configure: impl FnOnce(&mut InputConfig)) -> InputConfig {
        let mut config = InputConfig::new(identifier);
        configure(&mut config);
        config
    }

    #[test]
    fn test_precedence_wildcard_type_identifier() {
        let mut rules = InputRuleSet::new();
        rules
            .replace_all(vec![
                rule("1:2:Foo_Bar", |c| c.accel_profile = Some(AccelProfile::Adaptive)),
                rule("*", |c| c.send_events = Some(SendEventsMode::Disabled)),
                rule("type:pointer", |c| c.accel_profile = Some(AccelProfile::Flat)),
            ])
            .unwrap();

        let effective = ConfigResolver::new().resolve(&rules, &pointer("1:2:Foo_Bar")).unwrap();

        let mut expected = InputConfig::new("1:2:Foo_Bar");
        expected.send_events = Some(SendEventsMode::Disabled);
        expected.accel_profile = Some(AccelProfile::Adaptive);
        assert_eq!(effective, expected);
    }

    #[test]
    fn test_no_rule_means_driver_defaults() {
        let mut rules = InputRuleSet::new();
        rules.store(rule("type:keyboard", |c| c.tap = Some(true))).unwrap();

        assert_eq!(ConfigResolver::new().resolve(&rules, &pointer("1:2:Foo_Bar")), None);
    }

    #[test]
    fn test_type_rule_alone_carries_device_identifier() {
        let mut rules = InputRuleSet::new();
        rules.store(rule("type:pointer", |c| c.left_handed = Some(true))).unwrap();

        let effective = merge_rules(&rules, "3:4:Mouse", DeviceKind::Pointer).unwrap();
        assert_eq!(effective.identifier, "3:4:Mouse");
        assert_eq!(effective.left_handed, Some(true));
    }

    #[test]
    fn test_resolution_does_not_touch_stored_rules() {
        let mut rules = InputRuleSet::new();
        rules.store(rule("*", |c| c.tap = Some(true))).unwrap();
        rules.store(rule("1:2:Foo_Bar", |c| c.dwt = Some(false))).unwrap();

        let mut resolver = ConfigResolver::new();
        resolver.resolve(&rules, &pointer("1:2:Foo_Bar"));

        assert_eq!(rules.for_identifier("1:2:Foo_Bar").unwrap().tap, None);
        assert_eq!(rules.wildcard().unwrap().dwt, None);
    }

    #[test]
    fn test_reload_never_yields_stale_merge() {
        let device = pointer("1:2:Foo_Bar");
        let identifier_rule = rule("1:2:Foo_Bar", |c| c.natural_scroll = Some(true));
        let mut rules = InputRuleSet::new();
        let mut resolver = ConfigResolver::new();

        rules
            .replace_all(vec![
                rule("type:pointer", |c| c.accel_profile = Some(AccelProfile::Flat)),
                identifier_rule.clone(),
            ])
            .unwrap();
        let first = resolver.resolve(&rules, &device).unwrap();
        assert_eq!(first.accel_profile, Some(AccelProfile::Flat));

        rules
            .replace_all(vec![
                rule("type:pointer", |c| c.send_events = Some(SendEventsMode::Disabled)),
                identifier_rule,
            ])
            .unwrap();
        let second = resolver.resolve(&rules, &device).unwrap();

        assert_eq!(second.accel_profile, None);
        assert_eq!(second.send_events, Some(SendEventsMode::Disabled));
        assert_eq!(second.natural_scroll, Some(true));
    }

    #[test]
    fn test_cache_hit_within_generation() {
        let mut rules = InputRuleSet::new();
        rules.store(rule("*", |c| c.tap = Some(true))).unwrap();
        let mut resolver = ConfigResolver::new();

        let first = resolver.resolve(&rules, &pointer("1:2:Foo_Bar"));
        let second = resolver.resolve(&rules, &pointer("1:2:Foo_Bar"));
        assert_eq!(first, second);
        assert_eq!(resolver.cached_len(), 1);

        rules.store(rule("*", |c| c.dwt = Some(true))).unwrap();
        resolver.resolve(&rules, &pointer("5:6:Other"));
        assert_eq!(resolver.cached_len(), 1);
    }
}
