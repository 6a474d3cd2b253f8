// novade-input-manager/src/seat/mod.rs

//! Logical seats: independent keyboard/pointer focus contexts.

pub mod registry;

pub use registry::{FocusUpdate, SeatRegistry};

use std::collections::BTreeSet;
use std::fmt;

use crate::device::DeviceId;

/// Name of the reserved default seat.
pub const DEFAULT_SEAT: &str = "seat0";

/// Index of a seat in the [`SeatRegistry`]. Seats are never destroyed, so an
/// id stays valid for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatId(pub(crate) u32);

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat#{}", self.0)
    }
}

/// A Wayland client, as far as focus is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u64);

/// A focusable scene node (a view or a layer surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// What a seat focuses: a node and, when known, the client that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusTarget {
    pub node: NodeId,
    pub client: Option<ClientId>,
}

impl FocusTarget {
    pub fn new(node: NodeId, client: Option<ClientId>) -> Self {
        Self { node, client }
    }

    /// Whether `client` may be focused while `exclusive` holds the seat.
    /// Targets without an owning client are treated as compositor-owned and
    /// refused too.
    pub fn allowed_for(&self, exclusive: Option<ClientId>) -> bool {
        match exclusive {
            None => true,
            Some(exclusive) => self.client == Some(exclusive),
        }
    }
}

/// One seat and the devices attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: SeatId,
    pub name: String,
    pub devices: BTreeSet<DeviceId>,
    pub focus: Option<FocusTarget>,
    pub exclusive_client: Option<ClientId>,
}

impl Seat {
    pub(crate) fn new(id: SeatId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            devices: BTreeSet::new(),
            focus: None,
            exclusive_client: None,
        }
    }

    pub fn has_device(&self, device: DeviceId) -> bool {
        self.devices.contains(&device)
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_SEAT
    }
}
