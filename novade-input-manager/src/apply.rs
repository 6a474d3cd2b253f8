// novade-input-manager/src/apply.rs

//! Pushing effective configuration to drivers, and resetting to defaults.

use tracing::{debug, error, info};

use crate::config::InputConfig;
use crate::device::InputDevice;
use crate::driver::{DeviceDriver, SettingKind};
use crate::error::{DriverError, InputError};

/// Outcome of one apply or reset call.
///
/// Rejected fields do not stop the call and nothing already pushed is rolled
/// back, so a report can list both applied and rejected fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: Vec<SettingKind>,
    pub rejected: Vec<(SettingKind, DriverError)>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// The rejections as crate errors, for callers that want to surface them.
    pub fn errors(&self, identifier: &str) -> Vec<InputError> {
        self.rejected
            .iter()
            .map(|(setting, source)| InputError::DriverRejected {
                identifier: identifier.to_string(),
                setting: *setting,
                source: source.clone(),
            })
            .collect()
    }
}

/// Pushes configuration through a [`DeviceDriver`].
///
/// Which fields are pushed depends only on the backend device type (see
/// [`SettingKind::supported_by`]); the orchestrator holds no state, so both
/// operations are idempotent.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigOrchestrator;

impl ConfigOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Pushes every field that is set in `config` and supported by the device.
    ///
    /// # Arguments
    ///
    /// * `device`: The registered device the driver belongs to.
    /// * `config`: Its effective configuration.
    /// * `driver`: The driver, borrowed for this call only.
    pub fn apply<D: DeviceDriver + ?Sized>(&self, device: &InputDevice, config: &InputConfig, driver: &mut D) -> ApplyReport {
        info!("ConfigOrchestrator: applying configuration to '{}' ({})", device.identifier, device.kind);
        let mut report = ApplyReport::default();
        for kind in SettingKind::supported_by(device.device_type) {
            let Some(setting) = config.setting(*kind) else {
                continue;
            };
            debug!("ConfigOrchestrator: {}: {} = {:?}", device.identifier, kind, setting);
            Self::push(device, *kind, driver.set(setting), &mut report);
        }
        report
    }

    /// Pushes the driver's own default back for every field the device type
    /// supports. Fields without a default are skipped.
    pub fn reset<D: DeviceDriver + ?Sized>(&self, device: &InputDevice, driver: &mut D) -> ApplyReport {
        info!("ConfigOrchestrator: resetting '{}' to driver defaults", device.identifier);
        let mut report = ApplyReport::default();
        for kind in SettingKind::supported_by(device.device_type) {
            let Some(default) = driver.default_for(*kind) else {
                debug!("ConfigOrchestrator: {}: no default for {}", device.identifier, kind);
                continue;
            };
            debug!("ConfigOrchestrator: {}: {} reset to {:?}", device.identifier, kind, default);
            Self::push(device, *kind, driver.set(default), &mut report);
        }
        report
    }

    fn push(device: &InputDevice, kind: SettingKind, result: Result<(), DriverError>, report: &mut ApplyReport) {
        match result {
            Ok(()) => report.applied.push(kind),
            Err(source) => {
                let err = InputError::DriverRejected {
                    identifier: device.identifier.clone(),
                    setting: kind,
                    source: source.clone(),
                };
                error!("ConfigOrchestrator: {}", err);
                report.rejected.push((kind, source));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccelProfile, CalibrationMatrix, SendEventsMode};
    use crate::device::{BackendDeviceType, DeviceId, DeviceKind, DriverHandle};
    use crate::driver::{DeviceSetting, MockDeviceDriver};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Keeps the last value pushed per field.
    #[derive(Default)]
    struct FakeDriver {
        state: HashMap<SettingKind, DeviceSetting>,
        pushes: usize,
    }

    impl DeviceDriver for FakeDriver {
        fn tap_finger_count(&self) -> u32 {
            0
        }

        fn set(&mut self, setting: DeviceSetting) -> Result<(), DriverError> {
            self.pushes += 1;
            self.state.insert(setting.kind(), setting);
            Ok(())
        }

        fn default_for(&self, kind: SettingKind) -> Option<DeviceSetting> {
            match kind {
                SettingKind::SendEvents => Some(DeviceSetting::SendEvents(SendEventsMode::Enabled)),
                SettingKind::CalibrationMatrix => Some(DeviceSetting::CalibrationMatrix(CalibrationMatrix::IDENTITY)),
                _ => None,
            }
        }
    }

    fn device(device_type: BackendDeviceType, kind: DeviceKind) -> InputDevice {
        InputDevice {
            id: DeviceId(7),
            handle: DriverHandle(7),
            identifier: "1:2:Foo_Bar".to_string(),
            name: "Foo Bar".to_string(),
            device_type,
            kind,
            is_virtual: false,
        }
    }

    fn pointer_config() -> InputConfig {
        let mut config = InputConfig::new("1:2:Foo_Bar");
        config.accel_profile = Some(AccelProfile::Flat);
        config.tap = Some(true);
        config.send_events = Some(SendEventsMode::Disabled);
        config.calibration_matrix = Some(CalibrationMatrix::IDENTITY);
        config
    }

    #[test]
    fn test_apply_pushes_only_set_and_supported_fields() {
        let mut driver = FakeDriver::default();
        let report = ConfigOrchestrator::new().apply(
            &device(BackendDeviceType::Pointer, DeviceKind::Pointer),
            &pointer_config(),
            &mut driver,
        );

        assert_eq!(report.applied, vec![SettingKind::AccelProfile, SettingKind::SendEvents, SettingKind::Tap]);
        assert!(report.is_clean());
        assert!(!driver.state.contains_key(&SettingKind::CalibrationMatrix));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let orchestrator = ConfigOrchestrator::new();
        let dev = device(BackendDeviceType::Pointer, DeviceKind::Touchpad);
        let config = pointer_config();
        let mut driver = FakeDriver::default();

        let first = orchestrator.apply(&dev, &config, &mut driver);
        let state_after_first = driver.state.clone();
        let second = orchestrator.apply(&dev, &config, &mut driver);

        assert_eq!(first, second);
        assert_eq!(driver.state, state_after_first);
    }

    #[test]
    fn test_touch_gets_calibration_keyboard_only_send_events() {
        let orchestrator = ConfigOrchestrator::new();
        let config = pointer_config();

        let mut touch = FakeDriver::default();
        let report = orchestrator.apply(&device(BackendDeviceType::Touch, DeviceKind::Touch), &config, &mut touch);
        assert_eq!(report.applied, vec![SettingKind::SendEvents, SettingKind::CalibrationMatrix]);

        let mut keyboard = FakeDriver::default();
        let report = orchestrator.apply(&device(BackendDeviceType::Keyboard, DeviceKind::Keyboard), &config, &mut keyboard);
        assert_eq!(report.applied, vec![SettingKind::SendEvents]);

        let mut pad = FakeDriver::default();
        let report = orchestrator.apply(&device(BackendDeviceType::TabletPad, DeviceKind::TabletPad), &config, &mut pad);
        assert!(report.applied.is_empty());
        assert_eq!(pad.pushes, 0);
    }

    #[test]
    fn test_rejected_field_does_not_stop_the_rest() {
        let mut driver = MockDeviceDriver::new();
        driver
            .expect_set()
            .with(eq(DeviceSetting::AccelProfile(AccelProfile::Flat)))
            .times(1)
            .returning(|_| Ok(()));
        driver
            .expect_set()
            .with(eq(DeviceSetting::SendEvents(SendEventsMode::Disabled)))
            .times(1)
            .returning(|_| Err(DriverError::Unsupported));
        driver
            .expect_set()
            .with(eq(DeviceSetting::Tap(true)))
            .times(1)
            .returning(|_| Ok(()));

        let report = ConfigOrchestrator::new().apply(
            &device(BackendDeviceType::Pointer, DeviceKind::Pointer),
            &pointer_config(),
            &mut driver,
        );

        assert_eq!(report.applied, vec![SettingKind::AccelProfile, SettingKind::Tap]);
        assert_eq!(report.rejected, vec![(SettingKind::SendEvents, DriverError::Unsupported)]);
        let errors = report.errors("1:2:Foo_Bar");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            InputError::DriverRejected { setting: SettingKind::SendEvents, .. }
        ));
    }

    #[test]
    fn test_reset_pushes_driver_defaults_and_skips_missing() {
        let mut driver = FakeDriver::default();
        driver.state.insert(
            SettingKind::SendEvents,
            DeviceSetting::SendEvents(SendEventsMode::Disabled),
        );

        let report = ConfigOrchestrator::new().reset(&device(BackendDeviceType::Touch, DeviceKind::Touch), &mut driver);

        assert_eq!(report.applied, vec![SettingKind::SendEvents, SettingKind::CalibrationMatrix]);
        assert_eq!(
            driver.state.get(&SettingKind::SendEvents),
            Some(&DeviceSetting::SendEvents(SendEventsMode::Enabled))
        );

        let mut pointer = FakeDriver::default();
        let report = ConfigOrchestrator::new().reset(&device(BackendDeviceType::Pointer, DeviceKind::Pointer), &mut pointer);
        assert_eq!(report.applied, vec![SettingKind::SendEvents]);
    }
}
