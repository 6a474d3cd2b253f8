// novade-input-manager/src/notification.rs

//! Notifications for the seat-management side of the compositor.
//!
//! The manager queues these while it processes an event or a configuration
//! change and hands them out through
//! [`InputManager::drain_notifications`](crate::InputManager::drain_notifications)
//! once the operation is complete.

use crate::device::DeviceId;
use crate::seat::{ClientId, FocusTarget, SeatId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatNotification {
    /// Wire the device's input into the seat.
    DeviceAttached { seat: SeatId, device: DeviceId },
    /// Stop routing the device's input to the seat.
    DeviceDetached { seat: SeatId, device: DeviceId },
    /// The device's effective configuration was (re)applied.
    DeviceConfigured { seat: SeatId, device: DeviceId },
    /// The device was reset to driver defaults.
    DeviceReset { seat: SeatId, device: DeviceId },
    /// The seat's own configuration was applied.
    SeatConfigured { seat: SeatId },
    FocusChanged {
        seat: SeatId,
        previous: Option<FocusTarget>,
        current: Option<FocusTarget>,
    },
    ExclusiveClientChanged { seat: SeatId, client: Option<ClientId> },
    /// Move the cursor of the seat onto its newly focused target.
    CursorWarpRequested { seat: SeatId, target: FocusTarget },
    /// Reload cursor themes for the seat.
    XcursorReconfigured { seat: SeatId },
}

impl SeatNotification {
    /// The seat the notification is addressed to.
    pub fn seat(&self) -> SeatId {
        match self {
            SeatNotification::DeviceAttached { seat, .. }
            | SeatNotification::DeviceDetached { seat, .. }
            | SeatNotification::DeviceConfigured { seat, .. }
            | SeatNotification::DeviceReset { seat, .. }
            | SeatNotification::SeatConfigured { seat }
            | SeatNotification::FocusChanged { seat, .. }
            | SeatNotification::ExclusiveClientChanged { seat, .. }
            | SeatNotification::CursorWarpRequested { seat, .. }
            | SeatNotification::XcursorReconfigured { seat } => *seat,
        }
    }
}
