// novade-input-manager/src/driver/mod.rs

//! The driver capability: how configuration reaches a physical device.
//!
//! The manager never talks to libinput (or any other backend) directly. It
//! borrows a [`DeviceDriver`] from the [`InputBackend`] for the duration of a
//! single apply/reset call and pushes one [`DeviceSetting`] at a time.

#[cfg(feature = "backend_libinput")]
pub mod libinput;

use std::fmt;

use crate::config::{
    AccelProfile, CalibrationMatrix, ClickMethod, PointerAccel, ScrollMethod, SendEventsMode, TapButtonMap,
};
use crate::device::{BackendDeviceType, DriverHandle};
use crate::error::DriverError;

/// Names a single driver-level configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    AccelProfile,
    ClickMethod,
    Drag,
    DragLock,
    DisableWhileTyping,
    LeftHanded,
    MiddleEmulation,
    NaturalScroll,
    PointerAccel,
    ScrollButton,
    ScrollMethod,
    SendEvents,
    Tap,
    TapButtonMap,
    CalibrationMatrix,
}

/// Fields pushed to pointers, touchpads and tablet tools, in push order.
const POINTER_SETTINGS: &[SettingKind] = &[
    SettingKind::AccelProfile,
    SettingKind::ClickMethod,
    SettingKind::Drag,
    SettingKind::DragLock,
    SettingKind::DisableWhileTyping,
    SettingKind::LeftHanded,
    SettingKind::MiddleEmulation,
    SettingKind::NaturalScroll,
    SettingKind::PointerAccel,
    SettingKind::ScrollButton,
    SettingKind::ScrollMethod,
    SettingKind::SendEvents,
    SettingKind::Tap,
    SettingKind::TapButtonMap,
];

const SEND_EVENTS_ONLY: &[SettingKind] = &[SettingKind::SendEvents];

const TOUCH_SETTINGS: &[SettingKind] = &[SettingKind::SendEvents, SettingKind::CalibrationMatrix];

impl SettingKind {
    pub const ALL: [SettingKind; 15] = [
        SettingKind::AccelProfile,
        SettingKind::ClickMethod,
        SettingKind::Drag,
        SettingKind::DragLock,
        SettingKind::DisableWhileTyping,
        SettingKind::LeftHanded,
        SettingKind::MiddleEmulation,
        SettingKind::NaturalScroll,
        SettingKind::PointerAccel,
        SettingKind::ScrollButton,
        SettingKind::ScrollMethod,
        SettingKind::SendEvents,
        SettingKind::Tap,
        SettingKind::TapButtonMap,
        SettingKind::CalibrationMatrix,
    ];

    /// Fields that apply to a device of the given backend type.
    pub fn supported_by(device_type: BackendDeviceType) -> &'static [SettingKind] {
        match device_type {
            BackendDeviceType::Pointer | BackendDeviceType::TabletTool => POINTER_SETTINGS,
            BackendDeviceType::Keyboard | BackendDeviceType::Switch => SEND_EVENTS_ONLY,
            BackendDeviceType::Touch => TOUCH_SETTINGS,
            BackendDeviceType::TabletPad => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKind::AccelProfile => "accel_profile",
            SettingKind::ClickMethod => "click_method",
            SettingKind::Drag => "drag",
            SettingKind::DragLock => "drag_lock",
            SettingKind::DisableWhileTyping => "dwt",
            SettingKind::LeftHanded => "left_handed",
            SettingKind::MiddleEmulation => "middle_emulation",
            SettingKind::NaturalScroll => "natural_scroll",
            SettingKind::PointerAccel => "pointer_accel",
            SettingKind::ScrollButton => "scroll_button",
            SettingKind::ScrollMethod => "scroll_method",
            SettingKind::SendEvents => "send_events",
            SettingKind::Tap => "tap",
            SettingKind::TapButtonMap => "tap_button_map",
            SettingKind::CalibrationMatrix => "calibration_matrix",
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field together with its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceSetting {
    AccelProfile(AccelProfile),
    ClickMethod(ClickMethod),
    Drag(bool),
    DragLock(bool),
    DisableWhileTyping(bool),
    LeftHanded(bool),
    MiddleEmulation(bool),
    NaturalScroll(bool),
    PointerAccel(PointerAccel),
    ScrollButton(u32),
    ScrollMethod(ScrollMethod),
    SendEvents(SendEventsMode),
    Tap(bool),
    TapButtonMap(TapButtonMap),
    CalibrationMatrix(CalibrationMatrix),
}

impl DeviceSetting {
    pub fn kind(&self) -> SettingKind {
        match self {
            DeviceSetting::AccelProfile(_) => SettingKind::AccelProfile,
            DeviceSetting::ClickMethod(_) => SettingKind::ClickMethod,
            DeviceSetting::Drag(_) => SettingKind::Drag,
            DeviceSetting::DragLock(_) => SettingKind::DragLock,
            DeviceSetting::DisableWhileTyping(_) => SettingKind::DisableWhileTyping,
            DeviceSetting::LeftHanded(_) => SettingKind::LeftHanded,
            DeviceSetting::MiddleEmulation(_) => SettingKind::MiddleEmulation,
            DeviceSetting::NaturalScroll(_) => SettingKind::NaturalScroll,
            DeviceSetting::PointerAccel(_) => SettingKind::PointerAccel,
            DeviceSetting::ScrollButton(_) => SettingKind::ScrollButton,
            DeviceSetting::ScrollMethod(_) => SettingKind::ScrollMethod,
            DeviceSetting::SendEvents(_) => SettingKind::SendEvents,
            DeviceSetting::Tap(_) => SettingKind::Tap,
            DeviceSetting::TapButtonMap(_) => SettingKind::TapButtonMap,
            DeviceSetting::CalibrationMatrix(_) => SettingKind::CalibrationMatrix,
        }
    }
}

/// Per-device driver configuration interface.
///
/// Calls are synchronous and expected to return promptly.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceDriver {
    /// Number of fingers the device supports for tapping; nonzero for touchpads.
    fn tap_finger_count(&self) -> u32;

    /// Pushes one value to the device.
    fn set(&mut self, setting: DeviceSetting) -> Result<(), DriverError>;

    /// The driver's own default for `kind`, or `None` if the device has no
    /// such option.
    fn default_for(&self, kind: SettingKind) -> Option<DeviceSetting>;
}

/// The device backend, as far as configuration is concerned.
pub trait InputBackend {
    type Driver: DeviceDriver;

    /// Borrows the driver behind `handle`. `None` for devices the backend
    /// cannot configure (virtual devices, non-libinput devices).
    fn driver_mut(&mut self, handle: DriverHandle) -> Option<&mut Self::Driver>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_fields_per_type() {
        assert_eq!(SettingKind::supported_by(BackendDeviceType::Pointer).len(), 14);
        assert_eq!(
            SettingKind::supported_by(BackendDeviceType::TabletTool),
            SettingKind::supported_by(BackendDeviceType::Pointer)
        );
        assert_eq!(SettingKind::supported_by(BackendDeviceType::Keyboard), &[SettingKind::SendEvents]);
        assert_eq!(SettingKind::supported_by(BackendDeviceType::Switch), &[SettingKind::SendEvents]);
        assert_eq!(
            SettingKind::supported_by(BackendDeviceType::Touch),
            &[SettingKind::SendEvents, SettingKind::CalibrationMatrix]
        );
        assert!(SettingKind::supported_by(BackendDeviceType::TabletPad).is_empty());
        assert!(!SettingKind::supported_by(BackendDeviceType::Pointer).contains(&SettingKind::CalibrationMatrix));
    }

    #[test]
    fn test_setting_kind_roundtrip() {
        let setting = DeviceSetting::ScrollButton(274);
        assert_eq!(setting.kind(), SettingKind::ScrollButton);
        assert_eq!(setting.kind().to_string(), "scroll_button");
    }
}
