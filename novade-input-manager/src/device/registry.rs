// novade-input-manager/src/device/registry.rs

//! Registry of live input devices.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{DeviceId, DeviceKind, DriverHandle, InputDevice, RawInputDevice};
use crate::error::InputError;

/// Owns every live [`InputDevice`].
///
/// Devices are kept in registration order (ids are monotonic) with a second
/// index from driver handle to id, so backend events can be mapped back to a
/// device without scanning.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, InputDevice>,
    by_handle: HashMap<DriverHandle, DeviceId>,
    next_id: u64,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device announced by the backend.
    ///
    /// # Errors
    ///
    /// * `InputError::DuplicateHandle` if the handle is already registered.
    /// * `InputError::DeviceIdExhausted` if no further id can be allocated.
    ///
    /// Nothing is inserted when an error is returned.
    pub fn register(&mut self, raw: &RawInputDevice, kind: DeviceKind, is_virtual: bool) -> Result<DeviceId, InputError> {
        let identifier = raw.identifier();

        if let Some(existing) = self.by_handle.get(&raw.handle).and_then(|id| self.devices.get(id)) {
            return Err(InputError::DuplicateHandle {
                handle: raw.handle,
                identifier: existing.identifier.clone(),
            });
        }

        let id = DeviceId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| InputError::DeviceIdExhausted { identifier: identifier.clone() })?;

        debug!("DeviceRegistry: registering '{}' as {} ({}, handle {})", identifier, id, kind, raw.handle);
        self.devices.insert(
            id,
            InputDevice {
                id,
                handle: raw.handle,
                identifier,
                name: raw.name.clone(),
                device_type: raw.device_type,
                kind,
                is_virtual,
            },
        );
        self.by_handle.insert(raw.handle, id);
        Ok(id)
    }

    /// Removes a device. The caller must already have detached it from every seat.
    pub fn unregister(&mut self, id: DeviceId) -> Option<InputDevice> {
        let device = self.devices.remove(&id)?;
        self.by_handle.remove(&device.handle);
        debug!("DeviceRegistry: unregistered '{}' ({})", device.identifier, id);
        Some(device)
    }

    /// Maps a backend handle to the registered device, if any.
    pub fn find_by_handle(&self, handle: DriverHandle) -> Option<DeviceId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn get(&self, id: DeviceId) -> Option<&InputDevice> {
        self.devices.get(&id)
    }

    /// All live devices in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &InputDevice> {
        self.devices.values()
    }

    pub fn ids(&self) -> Vec<DeviceId> {
        self.devices.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn with_next_id(next_id: u64) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }
}
