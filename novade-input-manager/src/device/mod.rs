// novade-input-manager/src/device/mod.rs

//! Input devices as seen by the input manager.
//!
//! A device enters the system as a [`RawInputDevice`] (what the backend knows
//! about it) and is turned into an [`InputDevice`] once it has been given a
//! [`DeviceId`], a stable textual identifier and a [`DeviceKind`].

pub mod registry;

pub use registry::DeviceRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Engine-assigned identity of a live device.
///
/// Ids are allocated monotonically and never handed out twice, so two devices
/// that happen to share an identifier string are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub(crate) u64);

impl DeviceId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// Opaque reference to the backend's representation of a device.
///
/// The backend owns whatever sits behind the handle; the manager only uses it
/// to ask the backend for the driver when it needs to push configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverHandle(pub u64);

impl fmt::Display for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Device type as reported by the backend, before touchpad detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendDeviceType {
    Pointer,
    Keyboard,
    Touch,
    TabletTool,
    TabletPad,
    Switch,
}

/// Kind of a device, used by `type:<kind>` configuration rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Pointer,
    Touchpad,
    Keyboard,
    Touch,
    TabletTool,
    TabletPad,
    Switch,
    Unknown,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 8] = [
        DeviceKind::Pointer,
        DeviceKind::Touchpad,
        DeviceKind::Keyboard,
        DeviceKind::Touch,
        DeviceKind::TabletTool,
        DeviceKind::TabletPad,
        DeviceKind::Switch,
        DeviceKind::Unknown,
    ];

    /// Classifies a device from its backend type.
    ///
    /// Pointers and touchpads share a backend type; a pointer whose driver
    /// reports a nonzero tap finger count is a touchpad. `tap_finger_count` is
    /// `None` when the device has no driver to ask (virtual devices).
    pub fn classify(device_type: BackendDeviceType, tap_finger_count: Option<u32>) -> Self {
        match device_type {
            BackendDeviceType::Pointer => match tap_finger_count {
                Some(count) if count > 0 => DeviceKind::Touchpad,
                _ => DeviceKind::Pointer,
            },
            BackendDeviceType::Keyboard => DeviceKind::Keyboard,
            BackendDeviceType::Touch => DeviceKind::Touch,
            BackendDeviceType::TabletTool => DeviceKind::TabletTool,
            BackendDeviceType::TabletPad => DeviceKind::TabletPad,
            BackendDeviceType::Switch => DeviceKind::Switch,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Pointer => "pointer",
            DeviceKind::Touchpad => "touchpad",
            DeviceKind::Keyboard => "keyboard",
            DeviceKind::Touch => "touch",
            DeviceKind::TabletTool => "tablet_tool",
            DeviceKind::TabletPad => "tablet_pad",
            DeviceKind::Switch => "switch",
            DeviceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeviceKind(pub String);

impl fmt::Display for UnknownDeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown device type '{}'", self.0)
    }
}

impl std::error::Error for UnknownDeviceKind {}

impl FromStr for DeviceKind {
    type Err = UnknownDeviceKind;

    /// Accepts the canonical underscore spelling as well as `tablet-tool` style.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownDeviceKind(s.to_string()))
    }
}

/// Builds the stable identifier of a device: `"<vendor>:<product>:<name>"`.
///
/// Surrounding whitespace of the name is stripped and every remaining space
/// becomes an underscore. Case is preserved.
pub fn device_identifier(vendor: u32, product: u32, name: &str) -> String {
    let name = name.trim().replace(' ', "_");
    format!("{}:{}:{}", vendor, product, name)
}

/// What the backend announces when a device appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInputDevice {
    pub handle: DriverHandle,
    pub vendor: u32,
    pub product: u32,
    pub name: String,
    pub device_type: BackendDeviceType,
}

impl RawInputDevice {
    pub fn new(handle: DriverHandle, vendor: u32, product: u32, name: impl Into<String>, device_type: BackendDeviceType) -> Self {
        Self {
            handle,
            vendor,
            product,
            name: name.into(),
            device_type,
        }
    }

    pub fn identifier(&self) -> String {
        device_identifier(self.vendor, self.product, &self.name)
    }
}

/// A registered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub id: DeviceId,
    pub handle: DriverHandle,
    pub identifier: String,
    pub name: String,
    pub device_type: BackendDeviceType,
    pub kind: DeviceKind,
    /// Virtual keyboards have no driver configuration and bypass seat rules
    /// when they are first added.
    pub is_virtual: bool,
}
