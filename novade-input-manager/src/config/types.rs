// novade-input-manager/src/config/types.rs

//! Per-device configuration rules and the values they can carry.
//!
//! Every field of [`InputConfig`] is optional. `None` means "not configured
//! by this rule" and is never pushed to a driver; there are no reserved
//! sentinel values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::driver::{DeviceSetting, SettingKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelProfile {
    Flat,
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMethod {
    None,
    ButtonAreas,
    Clickfinger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMethod {
    NoScroll,
    TwoFinger,
    Edge,
    OnButtonDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendEventsMode {
    Enabled,
    Disabled,
    DisabledOnExternalMouse,
}

/// Mapping of 1/2/3-finger taps to buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapButtonMap {
    /// left, right, middle
    Lrm,
    /// left, middle, right
    Lmr,
}

/// Pointer acceleration speed, normalized to `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PointerAccel(f64);

impl PointerAccel {
    pub const MIN: f64 = -1.0;
    pub const MAX: f64 = 1.0;

    pub fn new(speed: f64) -> Result<Self, InvalidPointerAccel> {
        if (Self::MIN..=Self::MAX).contains(&speed) {
            Ok(Self(speed))
        } else {
            Err(InvalidPointerAccel(speed))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PointerAccel {
    type Error = InvalidPointerAccel;

    fn try_from(speed: f64) -> Result<Self, Self::Error> {
        PointerAccel::new(speed)
    }
}

impl From<PointerAccel> for f64 {
    fn from(accel: PointerAccel) -> Self {
        accel.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidPointerAccel(pub f64);

impl fmt::Display for InvalidPointerAccel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pointer_accel {} is outside [{}, {}]",
            self.0,
            PointerAccel::MIN,
            PointerAccel::MAX
        )
    }
}

impl std::error::Error for InvalidPointerAccel {}

/// Row-major 2x3 touch calibration matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibrationMatrix(pub [f32; 6]);

impl CalibrationMatrix {
    pub const IDENTITY: CalibrationMatrix = CalibrationMatrix([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
}

/// One configuration rule, or the effective configuration of a device.
///
/// `identifier` is the rule pattern: `*`, `type:<kind>` or an exact device
/// identifier. For an effective configuration it is the device identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accel_profile: Option<AccelProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_method: Option<ClickMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_lock: Option<bool>,
    /// Disable while typing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_handed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_emulation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_scroll: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer_accel: Option<PointerAccel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_button: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_method: Option<ScrollMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_events: Option<SendEventsMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_button_map: Option<TapButtonMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_matrix: Option<CalibrationMatrix>,
}

fn overlay<T: Copy>(target: &mut Option<T>, source: Option<T>) {
    if source.is_some() {
        *target = source;
    }
}

impl InputConfig {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Layers `other` on top of `self`. Fields unset in `other` keep their
    /// current value; the identifier is left alone.
    pub fn merge_from(&mut self, other: &InputConfig) {
        overlay(&mut self.accel_profile, other.accel_profile);
        overlay(&mut self.click_method, other.click_method);
        overlay(&mut self.drag, other.drag);
        overlay(&mut self.drag_lock, other.drag_lock);
        overlay(&mut self.dwt, other.dwt);
        overlay(&mut self.left_handed, other.left_handed);
        overlay(&mut self.middle_emulation, other.middle_emulation);
        overlay(&mut self.natural_scroll, other.natural_scroll);
        overlay(&mut self.pointer_accel, other.pointer_accel);
        overlay(&mut self.scroll_button, other.scroll_button);
        overlay(&mut self.scroll_method, other.scroll_method);
        overlay(&mut self.send_events, other.send_events);
        overlay(&mut self.tap, other.tap);
        overlay(&mut self.tap_button_map, other.tap_button_map);
        overlay(&mut self.calibration_matrix, other.calibration_matrix);
    }

    /// The configured value for `kind` as a driver setting, if set.
    pub fn setting(&self, kind: SettingKind) -> Option<DeviceSetting> {
        match kind {
            SettingKind::AccelProfile => self.accel_profile.map(DeviceSetting::AccelProfile),
            SettingKind::ClickMethod => self.click_method.map(DeviceSetting::ClickMethod),
            SettingKind::Drag => self.drag.map(DeviceSetting::Drag),
            SettingKind::DragLock => self.drag_lock.map(DeviceSetting::DragLock),
            SettingKind::DisableWhileTyping => self.dwt.map(DeviceSetting::DisableWhileTyping),
            SettingKind::LeftHanded => self.left_handed.map(DeviceSetting::LeftHanded),
            SettingKind::MiddleEmulation => self.middle_emulation.map(DeviceSetting::MiddleEmulation),
            SettingKind::NaturalScroll => self.natural_scroll.map(DeviceSetting::NaturalScroll),
            SettingKind::PointerAccel => self.pointer_accel.map(DeviceSetting::PointerAccel),
            SettingKind::ScrollButton => self.scroll_button.map(DeviceSetting::ScrollButton),
            SettingKind::ScrollMethod => self.scroll_method.map(DeviceSetting::ScrollMethod),
            SettingKind::SendEvents => self.send_events.map(DeviceSetting::SendEvents),
            SettingKind::Tap => self.tap.map(DeviceSetting::Tap),
            SettingKind::TapButtonMap => self.tap_button_map.map(DeviceSetting::TapButtonMap),
            SettingKind::CalibrationMatrix => self.calibration_matrix.map(DeviceSetting::CalibrationMatrix),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        SettingKind::ALL.iter().all(|kind| self.setting(*kind).is_none())
    }
}
