// novade-input-manager/src/seat/registry.rs

//! Registry of live seats and of the device/seat membership in both
//! directions.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::{ClientId, FocusTarget, Seat, SeatId};
use crate::device::DeviceId;

/// Result of asking a seat to change focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusUpdate {
    Changed { previous: Option<FocusTarget> },
    Unchanged,
    /// The seat has an exclusive client that does not own the target.
    Refused { exclusive: ClientId },
}

/// Owns every [`Seat`].
///
/// Membership is stored twice, `seat -> devices` on the seat itself and
/// `device -> seats` here. Both are only ever changed together through
/// [`SeatRegistry::attach`] and [`SeatRegistry::detach`].
#[derive(Debug, Default)]
pub struct SeatRegistry {
    seats: Vec<Seat>,
    by_name: HashMap<String, SeatId>,
    device_seats: HashMap<DeviceId, BTreeSet<SeatId>>,
}

impl SeatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks a seat up by name, creating it if absent.
    ///
    /// Returns the seat id and whether it was just created.
    pub fn get_or_create(&mut self, name: &str) -> (SeatId, bool) {
        if let Some(id) = self.by_name.get(name) {
            return (*id, false);
        }
        let id = SeatId(self.seats.len() as u32);
        self.seats.push(Seat::new(id, name));
        self.by_name.insert(name.to_string(), id);
        info!("SeatRegistry: created seat '{}' ({})", name, id);
        (id, true)
    }

    pub fn find(&self, name: &str) -> Option<SeatId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: SeatId) -> Option<&Seat> {
        self.seats.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: SeatId) -> Option<&mut Seat> {
        self.seats.get_mut(id.0 as usize)
    }

    /// All seats in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }

    pub fn ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|seat| seat.id).collect()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Attaches `device` to `seat`. Returns `false` if it already was attached
    /// or the seat does not exist.
    pub fn attach(&mut self, seat: SeatId, device: DeviceId) -> bool {
        let Some(target) = self.get_mut(seat) else {
            return false;
        };
        if !target.devices.insert(device) {
            return false;
        }
        debug!("SeatRegistry: attached {} to '{}'", device, target.name);
        self.device_seats.entry(device).or_default().insert(seat);
        true
    }

    /// Detaches `device` from `seat`. Returns `false` if it was not attached.
    pub fn detach(&mut self, seat: SeatId, device: DeviceId) -> bool {
        let Some(target) = self.get_mut(seat) else {
            return false;
        };
        if !target.devices.remove(&device) {
            return false;
        }
        debug!("SeatRegistry: detached {} from '{}'", device, target.name);
        if let Some(seats) = self.device_seats.get_mut(&device) {
            seats.remove(&seat);
            if seats.is_empty() {
                self.device_seats.remove(&device);
            }
        }
        true
    }

    /// Detaches `device` from every seat and returns the seats it left.
    pub fn detach_all(&mut self, device: DeviceId) -> BTreeSet<SeatId> {
        let seats = self.seats_for_device(device);
        for seat in &seats {
            self.detach(*seat, device);
        }
        seats
    }

    /// Seats `device` is currently attached to.
    pub fn seats_for_device(&self, device: DeviceId) -> BTreeSet<SeatId> {
        self.device_seats.get(&device).cloned().unwrap_or_default()
    }

    /// Sets (or clears) the focus of `seat`, honouring its exclusive client.
    pub fn set_focus(&mut self, seat: SeatId, target: Option<FocusTarget>) -> FocusUpdate {
        let Some(seat) = self.get_mut(seat) else {
            return FocusUpdate::Unchanged;
        };
        if let (Some(exclusive), Some(target)) = (seat.exclusive_client, target.as_ref()) {
            if !target.allowed_for(Some(exclusive)) {
                debug!(
                    "SeatRegistry: '{}' refused focus on {:?}, exclusive client is {:?}",
                    seat.name, target.node, exclusive
                );
                return FocusUpdate::Refused { exclusive };
            }
        }
        if seat.focus == target {
            return FocusUpdate::Unchanged;
        }
        let previous = std::mem::replace(&mut seat.focus, target);
        FocusUpdate::Changed { previous }
    }

    /// Sets (or clears) the exclusive client of `seat`. Returns whether it
    /// changed.
    pub fn set_exclusive_client(&mut self, seat: SeatId, client: Option<ClientId>) -> bool {
        let Some(seat) = self.get_mut(seat) else {
            return false;
        };
        if seat.exclusive_client == client {
            return false;
        }
        debug!("SeatRegistry: '{}' exclusive client {:?} -> {:?}", seat.name, seat.exclusive_client, client);
        seat.exclusive_client = client;
        true
    }
}
