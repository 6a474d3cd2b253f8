// novade-input-manager/tests/common/mod.rs

#![allow(dead_code)]

use novade_input_manager::config::SendEventsMode;
use novade_input_manager::config::{AccelProfile, CalibrationMatrix};
use novade_input_manager::driver::{DeviceDriver, DeviceSetting, InputBackend, SettingKind};
use novade_input_manager::{BackendDeviceType, DriverError, DriverHandle, RawInputDevice};
use std::collections::{HashMap, HashSet};

/// Remembers the last value pushed per field and can refuse chosen fields.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub tap_fingers: u32,
    pub state: HashMap<SettingKind, DeviceSetting>,
    pub unsupported: HashSet<SettingKind>,
    pub pushes: Vec<DeviceSetting>,
}

impl DeviceDriver for FakeDriver {
    fn tap_finger_count(&self) -> u32 {
        self.tap_fingers
    }

    fn set(&mut self, setting: DeviceSetting) -> Result<(), DriverError> {
        if self.unsupported.contains(&setting.kind()) {
            return Err(DriverError::Unsupported);
        }
        self.pushes.push(setting);
        self.state.insert(setting.kind(), setting);
        Ok(())
    }

    fn default_for(&self, kind: SettingKind) -> Option<DeviceSetting> {
        match kind {
            SettingKind::AccelProfile => Some(DeviceSetting::AccelProfile(AccelProfile::Adaptive)),
            SettingKind::SendEvents => Some(DeviceSetting::SendEvents(SendEventsMode::Enabled)),
            SettingKind::Tap => Some(DeviceSetting::Tap(false)),
            SettingKind::CalibrationMatrix => Some(DeviceSetting::CalibrationMatrix(CalibrationMatrix::IDENTITY)),
            _ => None,
        }
    }
}

/// Backend with one [`FakeDriver`] per plugged device.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub drivers: HashMap<DriverHandle, FakeDriver>,
}

impl FakeBackend {
    /// Plugs a device and returns what the backend would announce for it.
    pub fn plug(&mut self, handle: u64, vendor: u32, product: u32, name: &str, device_type: BackendDeviceType) -> RawInputDevice {
        self.drivers.insert(DriverHandle(handle), FakeDriver::default());
        RawInputDevice::new(DriverHandle(handle), vendor, product, name, device_type)
    }

    pub fn plug_touchpad(&mut self, handle: u64, name: &str) -> RawInputDevice {
        let raw = self.plug(handle, 1739, 52619, name, BackendDeviceType::Pointer);
        if let Some(driver) = self.drivers.get_mut(&DriverHandle(handle)) {
            driver.tap_fingers = 3;
        }
        raw
    }

    pub fn driver(&self, handle: u64) -> &FakeDriver {
        &self.drivers[&DriverHandle(handle)]
    }

    pub fn setting(&self, handle: u64, kind: SettingKind) -> Option<DeviceSetting> {
        self.driver(handle).state.get(&kind).copied()
    }
}

impl InputBackend for FakeBackend {
    type Driver = FakeDriver;

    fn driver_mut(&mut self, handle: DriverHandle) -> Option<&mut FakeDriver> {
        self.drivers.get_mut(&handle)
    }
}

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("novade_input_manager=debug")
        .try_init();
}
