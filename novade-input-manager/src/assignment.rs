// novade-input-manager/src/assignment.rs

//! Deciding which seats own a device.
//!
//! For every device the engine computes the set of seats it should be
//! attached to and then makes the [`SeatRegistry`] match that set exactly:
//!
//! 1. every seat whose effective configuration attaches the device by
//!    identifier or through `*`;
//! 2. if there is none, every seat whose effective configuration is a
//!    fallback seat;
//! 3. if there is still none, the device keeps whatever it has (orphaned).

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::{SeatConfig, SeatRuleSet};
use crate::device::{DeviceId, InputDevice};
use crate::seat::{SeatId, SeatRegistry, DEFAULT_SEAT};

/// How a device's seats were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// At least one seat configuration attaches the device.
    Explicit,
    /// Nothing attaches it; it went to the fallback seat(s).
    Fallback,
    /// Neither attachments nor a fallback seat exist. Attachments were left
    /// as they were.
    Orphaned,
}

/// The result of assigning one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub device: DeviceId,
    pub outcome: AssignmentOutcome,
    pub attached: Vec<SeatId>,
    pub detached: Vec<SeatId>,
}

impl Assignment {
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// Stateless; every input is passed in per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeatAssignmentEngine;

impl SeatAssignmentEngine {
    pub fn new() -> Self {
        Self
    }

    /// The seats `identifier` should be attached to, and why.
    pub fn desired_seats(
        &self,
        seat_rules: &SeatRuleSet,
        seats: &SeatRegistry,
        identifier: &str,
    ) -> (AssignmentOutcome, BTreeSet<SeatId>) {
        let explicit: BTreeSet<SeatId> = seats
            .iter()
            .filter(|seat| seat_rules.effective(&seat.name).is_some_and(|config| config.claims(identifier)))
            .map(|seat| seat.id)
            .collect();
        if !explicit.is_empty() {
            return (AssignmentOutcome::Explicit, explicit);
        }

        let fallback: BTreeSet<SeatId> = seats
            .iter()
            .filter(|seat| seat_rules.effective(&seat.name).is_some_and(SeatConfig::is_fallback))
            .map(|seat| seat.id)
            .collect();
        if !fallback.is_empty() {
            return (AssignmentOutcome::Fallback, fallback);
        }

        (AssignmentOutcome::Orphaned, BTreeSet::new())
    }

    /// Reconciles the seat membership of `device` with its desired seats.
    ///
    /// The device ends up attached to exactly the desired seats; it is never
    /// merged with its previous attachments. An orphaned device is left
    /// untouched.
    pub fn assign(&self, seat_rules: &SeatRuleSet, seats: &mut SeatRegistry, device: &InputDevice) -> Assignment {
        let (outcome, desired) = self.desired_seats(seat_rules, seats, &device.identifier);
        let current = seats.seats_for_device(device.id);

        if outcome == AssignmentOutcome::Orphaned {
            debug!(
                "SeatAssignmentEngine: '{}' ({}) matches no seat and no fallback seat exists, leaving it on {} seat(s)",
                device.identifier,
                device.id,
                current.len()
            );
            return Assignment {
                device: device.id,
                outcome,
                attached: Vec::new(),
                detached: Vec::new(),
            };
        }

        let detached: Vec<SeatId> = current.difference(&desired).copied().collect();
        let attached: Vec<SeatId> = desired.difference(&current).copied().collect();
        for seat in &detached {
            seats.detach(*seat, device.id);
        }
        for seat in &attached {
            seats.attach(*seat, device.id);
        }
        debug!(
            "SeatAssignmentEngine: '{}' ({:?}): +{} -{} seat(s)",
            device.identifier,
            outcome,
            attached.len(),
            detached.len()
        );

        Assignment {
            device: device.id,
            outcome,
            attached,
            detached,
        }
    }

    /// True if some named seat configuration sets the fallback flag at all,
    /// to either value. The `*` configuration does not count.
    pub fn has_fallback_configuration(&self, seat_rules: &SeatRuleSet) -> bool {
        seat_rules.specific_configs().any(|config| config.fallback.is_some())
    }

    /// The configuration synthesized when no seat declares a fallback.
    pub fn fallback_seat_config(&self) -> SeatConfig {
        SeatConfig::new(DEFAULT_SEAT).with_fallback(true)
    }
}
