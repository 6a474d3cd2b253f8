// novade-input-manager/src/driver/libinput.rs

//! [`DeviceDriver`] for libinput devices (`backend_libinput` feature).
//!
//! A libinput device can expose several capabilities at once (a keyboard with
//! a built-in pointing stick, for instance). Like wlroots, the backend
//! announces one input device per capability; all of them share the same
//! libinput handle.

use std::collections::HashMap;

use input::{
    AccelProfile as LibinputAccelProfile, ClickMethod as LibinputClickMethod, Device, DeviceCapability,
    DeviceConfigError, ScrollMethod as LibinputScrollMethod, SendEventsMode as LibinputSendEventsMode,
    TapButtonMap as LibinputTapButtonMap,
};
use tracing::debug;

use super::{DeviceDriver, DeviceSetting, InputBackend, SettingKind};
use crate::config::{
    AccelProfile, CalibrationMatrix, ClickMethod, PointerAccel, ScrollMethod, SendEventsMode, TapButtonMap,
};
use crate::device::{BackendDeviceType, DriverHandle, RawInputDevice};
use crate::error::DriverError;

impl From<DeviceConfigError> for DriverError {
    fn from(err: DeviceConfigError) -> Self {
        match err {
            DeviceConfigError::Unsupported => DriverError::Unsupported,
            DeviceConfigError::Invalid => DriverError::Invalid,
        }
    }
}

fn accel_profile_from(profile: LibinputAccelProfile) -> Option<AccelProfile> {
    match profile {
        LibinputAccelProfile::Flat => Some(AccelProfile::Flat),
        LibinputAccelProfile::Adaptive => Some(AccelProfile::Adaptive),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn scroll_method_from(method: LibinputScrollMethod) -> Option<ScrollMethod> {
    match method {
        LibinputScrollMethod::NoScroll => Some(ScrollMethod::NoScroll),
        LibinputScrollMethod::TwoFinger => Some(ScrollMethod::TwoFinger),
        LibinputScrollMethod::Edge => Some(ScrollMethod::Edge),
        LibinputScrollMethod::OnButtonDown => Some(ScrollMethod::OnButtonDown),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Devices without a default click method are skipped on reset; there is no
/// click method value that would restore them.
fn click_method_from(method: Option<LibinputClickMethod>) -> Option<ClickMethod> {
    match method {
        Some(LibinputClickMethod::ButtonAreas) => Some(ClickMethod::ButtonAreas),
        Some(LibinputClickMethod::Clickfinger) => Some(ClickMethod::Clickfinger),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn send_events_into(mode: SendEventsMode) -> LibinputSendEventsMode {
    match mode {
        SendEventsMode::Enabled => LibinputSendEventsMode::ENABLED,
        SendEventsMode::Disabled => LibinputSendEventsMode::DISABLED,
        SendEventsMode::DisabledOnExternalMouse => LibinputSendEventsMode::DISABLED_ON_EXTERNAL_MOUSE,
    }
}

impl DeviceDriver for Device {
    fn tap_finger_count(&self) -> u32 {
        self.config_tap_finger_count()
    }

    fn set(&mut self, setting: DeviceSetting) -> Result<(), DriverError> {
        let result = match setting {
            DeviceSetting::AccelProfile(profile) => self.config_accel_set_profile(match profile {
                AccelProfile::Flat => LibinputAccelProfile::Flat,
                AccelProfile::Adaptive => LibinputAccelProfile::Adaptive,
            }),
            DeviceSetting::ClickMethod(method) => match method {
                ClickMethod::ButtonAreas => self.config_click_set_method(LibinputClickMethod::ButtonAreas),
                ClickMethod::Clickfinger => self.config_click_set_method(LibinputClickMethod::Clickfinger),
                // The bindings have no way to express "no click method".
                ClickMethod::None => Err(DeviceConfigError::Unsupported),
            },
            DeviceSetting::Drag(enabled) => self.config_tap_set_drag_enabled(enabled),
            DeviceSetting::DragLock(enabled) => self.config_tap_set_drag_lock_enabled(enabled),
            DeviceSetting::DisableWhileTyping(enabled) => self.config_dwt_set_enabled(enabled),
            DeviceSetting::LeftHanded(enabled) => self.config_left_handed_set(enabled),
            DeviceSetting::MiddleEmulation(enabled) => self.config_middle_emulation_set_enabled(enabled),
            DeviceSetting::NaturalScroll(enabled) => self.config_scroll_set_natural_scroll_enabled(enabled),
            DeviceSetting::PointerAccel(speed) => self.config_accel_set_speed(speed.get()),
            DeviceSetting::ScrollButton(button) => self.config_scroll_set_button(button),
            DeviceSetting::ScrollMethod(method) => self.config_scroll_set_method(match method {
                ScrollMethod::NoScroll => LibinputScrollMethod::NoScroll,
                ScrollMethod::TwoFinger => LibinputScrollMethod::TwoFinger,
                ScrollMethod::Edge => LibinputScrollMethod::Edge,
                ScrollMethod::OnButtonDown => LibinputScrollMethod::OnButtonDown,
            }),
            DeviceSetting::SendEvents(mode) => self.config_send_events_set_mode(send_events_into(mode)),
            DeviceSetting::Tap(enabled) => self.config_tap_set_enabled(enabled),
            DeviceSetting::TapButtonMap(map) => self.config_tap_set_button_map(match map {
                TapButtonMap::Lrm => LibinputTapButtonMap::LeftRightMiddle,
                TapButtonMap::Lmr => LibinputTapButtonMap::LeftMiddleRight,
            }),
            DeviceSetting::CalibrationMatrix(CalibrationMatrix(matrix)) => self.config_calibration_set_matrix(matrix),
        };
        result.map_err(DriverError::from)
    }

    fn default_for(&self, kind: SettingKind) -> Option<DeviceSetting> {
        match kind {
            SettingKind::AccelProfile => self
                .config_accel_default_profile()
                .and_then(accel_profile_from)
                .map(DeviceSetting::AccelProfile),
            SettingKind::ClickMethod => {
                click_method_from(self.config_click_default_method()).map(DeviceSetting::ClickMethod)
            }
            SettingKind::Drag => Some(DeviceSetting::Drag(self.config_tap_default_drag_enabled())),
            SettingKind::DragLock => Some(DeviceSetting::DragLock(self.config_tap_default_drag_lock_enabled())),
            SettingKind::DisableWhileTyping => {
                Some(DeviceSetting::DisableWhileTyping(self.config_dwt_default_enabled()))
            }
            SettingKind::LeftHanded => Some(DeviceSetting::LeftHanded(self.config_left_handed_default())),
            SettingKind::MiddleEmulation => {
                Some(DeviceSetting::MiddleEmulation(self.config_middle_emulation_default_enabled()))
            }
            SettingKind::NaturalScroll => Some(DeviceSetting::NaturalScroll(
                self.config_scroll_default_natural_scroll_enabled(),
            )),
            SettingKind::PointerAccel => PointerAccel::new(self.config_accel_default_speed())
                .ok()
                .map(DeviceSetting::PointerAccel),
            SettingKind::ScrollButton => Some(DeviceSetting::ScrollButton(self.config_scroll_default_button())),
            SettingKind::ScrollMethod => {
                self.config_scroll_default_method()
                    .and_then(scroll_method_from)
                    .map(DeviceSetting::ScrollMethod)
            }
            // libinput's default send-events mode is always "enabled".
            SettingKind::SendEvents => Some(DeviceSetting::SendEvents(SendEventsMode::Enabled)),
            SettingKind::Tap => Some(DeviceSetting::Tap(self.config_tap_default_enabled())),
            SettingKind::TapButtonMap => self.config_tap_default_button_map().map(|map| {
                DeviceSetting::TapButtonMap(match map {
                    LibinputTapButtonMap::LeftMiddleRight => TapButtonMap::Lmr,
                    _ => TapButtonMap::Lrm,
                })
            }),
            SettingKind::CalibrationMatrix => self
                .config_calibration_default_matrix()
                .map(|matrix| DeviceSetting::CalibrationMatrix(CalibrationMatrix(matrix))),
        }
    }
}

const CAPABILITIES: [(DeviceCapability, BackendDeviceType); 6] = [
    (DeviceCapability::Keyboard, BackendDeviceType::Keyboard),
    (DeviceCapability::Pointer, BackendDeviceType::Pointer),
    (DeviceCapability::Touch, BackendDeviceType::Touch),
    (DeviceCapability::TabletTool, BackendDeviceType::TabletTool),
    (DeviceCapability::TabletPad, BackendDeviceType::TabletPad),
    (DeviceCapability::Switch, BackendDeviceType::Switch),
];

/// Keeps the libinput devices the compositor has seen, keyed by the handles
/// given out in [`RawInputDevice`]s.
#[derive(Default)]
pub struct LibinputBackend {
    devices: HashMap<DriverHandle, Device>,
    next_handle: u64,
}

impl LibinputBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a device from a libinput `DeviceAdded` event and returns one
    /// [`RawInputDevice`] per capability, ready to feed to the manager.
    pub fn add_device(&mut self, device: Device) -> Vec<RawInputDevice> {
        let mut announced = Vec::new();
        for (capability, device_type) in CAPABILITIES {
            if !device.has_capability(capability) {
                continue;
            }
            let handle = DriverHandle(self.next_handle);
            self.next_handle += 1;
            announced.push(RawInputDevice::new(
                handle,
                device.id_vendor(),
                device.id_product(),
                device.name(),
                device_type,
            ));
            self.devices.insert(handle, device.clone());
        }
        debug!("LibinputBackend: '{}' announced as {} input device(s)", device.name(), announced.len());
        announced
    }

    /// Forgets a device from a libinput `DeviceRemoved` event and returns the
    /// handles that must be removed from the manager.
    pub fn remove_device(&mut self, device: &Device) -> Vec<DriverHandle> {
        let mut handles: Vec<DriverHandle> = self
            .devices
            .iter()
            .filter(|(_, known)| *known == device)
            .map(|(handle, _)| *handle)
            .collect();
        handles.sort();
        for handle in &handles {
            self.devices.remove(handle);
        }
        handles
    }
}

impl InputBackend for LibinputBackend {
    type Driver = Device;

    fn driver_mut(&mut self, handle: DriverHandle) -> Option<&mut Device> {
        self.devices.get_mut(&handle)
    }
}
