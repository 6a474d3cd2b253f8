// novade-input-manager/src/manager.rs

//! The input manager: the single entry point for device events and
//! configuration changes.
//!
//! Every call runs to completion before returning. Seat-side effects are
//! queued as [`SeatNotification`]s and only become visible through
//! [`InputManager::drain_notifications`], so a consumer never sees a device
//! that is registered but not yet assigned.

use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

use crate::apply::{ApplyReport, ConfigOrchestrator};
use crate::assignment::{Assignment, AssignmentOutcome, SeatAssignmentEngine};
use crate::config::{InputConfig, InputManagerConfig, InputRuleSet, RuleSelector, SeatConfig, SeatRuleSet};
use crate::device::{DeviceId, DeviceKind, DeviceRegistry, DriverHandle, InputDevice, RawInputDevice};
use crate::driver::{DeviceDriver, InputBackend};
use crate::error::InputError;
use crate::notification::SeatNotification;
use crate::resolver::{merge_rules, ConfigResolver};
use crate::seat::{ClientId, FocusTarget, FocusUpdate, Seat, SeatId, SeatRegistry, DEFAULT_SEAT};

/// Events delivered by the device backend and the Wayland protocols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    DeviceAdded(RawInputDevice),
    DeviceRemoved(DriverHandle),
    /// A client created a keyboard through the virtual keyboard protocol.
    VirtualKeyboardAdded(RawInputDevice),
    /// A client (typically a screen locker) took exclusive input.
    InhibitActivated(ClientId),
    InhibitDeactivated,
}

/// Owns the device and seat registries and both rule sets.
#[derive(Debug, Default)]
pub struct InputManager {
    devices: DeviceRegistry,
    seats: SeatRegistry,
    input_rules: InputRuleSet,
    seat_rules: SeatRuleSet,
    resolver: ConfigResolver,
    orchestrator: ConfigOrchestrator,
    engine: SeatAssignmentEngine,
    notifications: Vec<SeatNotification>,
    handler_seat: Option<SeatId>,
    /// Client holding exclusive input; applied to seats created later too.
    inhibitor: Option<ClientId>,
}

impl InputManager {
    /// A manager with no rules and no seats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager from a parsed configuration document.
    ///
    /// Seats named by seat configurations are created immediately.
    ///
    /// # Errors
    ///
    /// `InputError::Config` if a rule pattern or seat entry is invalid.
    pub fn with_config(config: &InputManagerConfig) -> Result<Self, InputError> {
        let mut manager = Self::new();
        manager.input_rules.replace_all(config.inputs.iter().cloned())?;
        manager.seat_rules.replace_all(config.seats.iter().cloned())?;
        manager.configure_seats();
        info!(
            "InputManager: initialized with {} input rule(s) and {} seat rule(s)",
            config.inputs.len(),
            config.seats.len()
        );
        Ok(manager)
    }

    /// Processes one event to completion.
    ///
    /// # Errors
    ///
    /// Lookup and allocation failures abort the event. They are logged here
    /// and returned; the manager stays usable.
    pub fn handle_event<B: InputBackend>(&mut self, event: InputEvent, backend: &mut B) -> Result<(), InputError> {
        let result = match event {
            InputEvent::DeviceAdded(raw) => self.add_device(&raw, backend).map(|_| ()),
            InputEvent::DeviceRemoved(handle) => self.remove_device(handle).map(|_| ()),
            InputEvent::VirtualKeyboardAdded(raw) => self.add_virtual_keyboard(&raw).map(|_| ()),
            InputEvent::InhibitActivated(client) => {
                self.inhibit_activate(client);
                Ok(())
            }
            InputEvent::InhibitDeactivated => {
                self.inhibit_deactivate();
                Ok(())
            }
        };
        if let Err(e) = &result {
            error!("InputManager: event dropped: {}", e);
        }
        result
    }

    fn add_device<B: InputBackend>(&mut self, raw: &RawInputDevice, backend: &mut B) -> Result<DeviceId, InputError> {
        let tap_finger_count = backend.driver_mut(raw.handle).map(|driver| driver.tap_finger_count());
        let kind = DeviceKind::classify(raw.device_type, tap_finger_count);
        let id = self.devices.register(raw, kind, false)?;
        debug!("InputManager: adding device '{}' ({})", raw.identifier(), id);

        self.configure_device(id, backend)?;
        self.verify_fallback_seat()?;

        let device = self.devices.get(id).ok_or(InputError::UnknownDevice(id))?;
        let assignment = self.engine.assign(&self.seat_rules, &mut self.seats, device);
        if assignment.outcome == AssignmentOutcome::Orphaned {
            debug!("InputManager: device '{}' is not configured on any seats", device.identifier);
        }
        self.queue_assignment(&assignment);
        Ok(id)
    }

    fn add_virtual_keyboard(&mut self, raw: &RawInputDevice) -> Result<DeviceId, InputError> {
        let id = self.devices.register(raw, DeviceKind::Keyboard, true)?;
        let seat = self.default_seat();
        info!("InputManager: adding virtual keyboard '{}' ({}) to '{}'", raw.identifier(), id, DEFAULT_SEAT);
        if self.seats.attach(seat, id) {
            self.notifications.push(SeatNotification::DeviceAttached { seat, device: id });
        }
        Ok(id)
    }

    /// Detaches the device from every seat, then forgets it.
    fn remove_device(&mut self, handle: DriverHandle) -> Result<InputDevice, InputError> {
        let id = self
            .devices
            .find_by_handle(handle)
            .ok_or(InputError::DeviceNotFound { handle })?;
        for seat in self.seats.detach_all(id) {
            self.notifications.push(SeatNotification::DeviceDetached { seat, device: id });
        }
        let device = self.devices.unregister(id).ok_or(InputError::UnknownDevice(id))?;
        debug!("InputManager: removed device '{}' ({})", device.identifier, id);
        Ok(device)
    }

    fn inhibit_activate(&mut self, client: ClientId) {
        info!("InputManager: input inhibited for client {:?}", client);
        self.inhibitor = Some(client);
        for seat in self.seats.ids() {
            if self.seats.set_exclusive_client(seat, Some(client)) {
                self.notifications.push(SeatNotification::ExclusiveClientChanged {
                    seat,
                    client: Some(client),
                });
            }
        }
    }

    /// Clears the exclusive client and refocuses each seat's current target,
    /// so consumers see the focus again.
    fn inhibit_deactivate(&mut self) {
        info!("InputManager: input inhibitor deactivated");
        self.inhibitor = None;
        for seat in self.seats.ids() {
            if self.seats.set_exclusive_client(seat, None) {
                self.notifications.push(SeatNotification::ExclusiveClientChanged { seat, client: None });
            }
            let Some(previous) = self.seats.get(seat).and_then(|s| s.focus) else {
                continue;
            };
            self.update_focus(seat, None);
            self.update_focus(seat, Some(previous));
        }
    }

    fn update_focus(&mut self, seat: SeatId, target: Option<FocusTarget>) -> bool {
        match self.seats.set_focus(seat, target) {
            FocusUpdate::Changed { previous } => {
                self.notifications.push(SeatNotification::FocusChanged {
                    seat,
                    previous,
                    current: target,
                });
                true
            }
            FocusUpdate::Unchanged | FocusUpdate::Refused { .. } => false,
        }
    }

    /// Resolves and pushes the effective configuration of one device.
    ///
    /// Returns `None` when nothing was pushed: no rule applies, the device is
    /// virtual, or the backend has no driver for it.
    fn configure_device<B: InputBackend>(&mut self, id: DeviceId, backend: &mut B) -> Result<Option<ApplyReport>, InputError> {
        let device = self.devices.get(id).ok_or(InputError::UnknownDevice(id))?;
        if device.is_virtual {
            return Ok(None);
        }
        let Some(config) = self.resolver.resolve(&self.input_rules, device) else {
            return Ok(None);
        };
        let Some(driver) = backend.driver_mut(device.handle) else {
            debug!("InputManager: '{}' has no configurable driver, skipping", device.identifier);
            return Ok(None);
        };
        Ok(Some(self.orchestrator.apply(device, &config, driver)))
    }

    fn reconfigure_device<B: InputBackend>(&mut self, id: DeviceId, backend: &mut B) -> Result<(), InputError> {
        if self.configure_device(id, backend)?.is_some() {
            for seat in self.seats.seats_for_device(id) {
                self.notifications.push(SeatNotification::DeviceConfigured { seat, device: id });
            }
        }
        Ok(())
    }

    /// Makes sure some seat receives unclaimed devices.
    ///
    /// If no named seat configuration sets the fallback flag (to either
    /// value), `seat0` is configured as the fallback seat. Returns whether a
    /// configuration was synthesized.
    pub fn verify_fallback_seat(&mut self) -> Result<bool, InputError> {
        Ok(self.synthesize_fallback_seat()?.is_some())
    }

    /// Configures `seat0` as the fallback seat if nothing else is, returning
    /// the assignments that configuration produced.
    fn synthesize_fallback_seat(&mut self) -> Result<Option<Vec<Assignment>>, InputError> {
        if self.engine.has_fallback_configuration(&self.seat_rules) {
            return Ok(None);
        }
        info!("InputManager: no fallback seat configured, making '{}' the fallback seat", DEFAULT_SEAT);
        let fallback = self.engine.fallback_seat_config();
        self.apply_seat_config(fallback).map(Some)
    }

    /// Stores a device configuration rule and re-applies configuration to
    /// every device it matches.
    ///
    /// A rule with an already known pattern is merged into it; fields set in
    /// `rule` win.
    pub fn apply_input_config<B: InputBackend>(&mut self, rule: InputConfig, backend: &mut B) -> Result<(), InputError> {
        let (selector, _) = self.input_rules.store(rule)?;
        info!("InputManager: applying input config '{}'", selector);
        for id in self.matching_devices(&selector) {
            self.reconfigure_device(id, backend)?;
        }
        Ok(())
    }

    /// Removes the rule stored under `pattern`, resets the devices it matched
    /// and re-applies whatever the remaining rules resolve to.
    ///
    /// Returns whether a rule was removed.
    pub fn remove_input_config<B: InputBackend>(&mut self, pattern: &str, backend: &mut B) -> Result<bool, InputError> {
        let selector = RuleSelector::parse(pattern)?;
        if self.input_rules.remove(&selector).is_none() {
            debug!("InputManager: no input config stored under '{}'", selector);
            return Ok(false);
        }
        info!("InputManager: removed input config '{}'", selector);
        for id in self.matching_devices(&selector) {
            self.reset_input(id, backend)?;
            self.reconfigure_device(id, backend)?;
        }
        Ok(true)
    }

    fn matching_devices(&self, selector: &RuleSelector) -> Vec<DeviceId> {
        self.devices
            .iter()
            .filter(|device| selector.matches(device))
            .map(|device| device.id)
            .collect()
    }

    /// Stores (merging) and applies a seat configuration, then reassigns
    /// every device.
    ///
    /// A `*` configuration only applies to seats without one of their own.
    pub fn apply_seat_config(&mut self, config: SeatConfig) -> Result<Vec<Assignment>, InputError> {
        let stored = self.seat_rules.store(config)?.clone();
        debug!("InputManager: applying seat config for seat '{}'", stored.name);
        self.configure_seat(&stored);
        Ok(self.reconcile_all())
    }

    /// Drops the configuration of seat `name` (or `*`) and reassigns every
    /// device. The seat itself stays.
    ///
    /// Returns `None` if no such configuration was stored. When devices are
    /// present and the removed configuration was the only fallback, `seat0`
    /// becomes the fallback seat again before devices are reassigned.
    ///
    /// # Errors
    ///
    /// Propagates a failure to store the synthesized fallback configuration.
    pub fn remove_seat_config(&mut self, name: &str) -> Result<Option<Vec<Assignment>>, InputError> {
        if self.seat_rules.remove(name).is_none() {
            return Ok(None);
        }
        info!("InputManager: removed seat config '{}'", name);
        if !self.devices.is_empty() {
            if let Some(assignments) = self.synthesize_fallback_seat()? {
                return Ok(Some(assignments));
            }
        }
        Ok(Some(self.reconcile_all()))
    }

    fn configure_seat(&mut self, config: &SeatConfig) {
        if config.is_wildcard() {
            let unconfigured: Vec<SeatId> = self
                .seats
                .iter()
                .filter(|seat| self.seat_rules.specific(&seat.name).is_none())
                .map(|seat| seat.id)
                .collect();
            for seat in unconfigured {
                self.notifications.push(SeatNotification::SeatConfigured { seat });
            }
        } else {
            let seat = self.create_seat(&config.name);
            self.notifications.push(SeatNotification::SeatConfigured { seat });
        }
    }

    /// Applies every stored seat configuration, `*` first.
    fn configure_seats(&mut self) {
        let mut configs: Vec<SeatConfig> = self.seat_rules.wildcard().cloned().into_iter().collect();
        configs.extend(self.seat_rules.specific_configs().cloned());
        for config in &configs {
            self.configure_seat(config);
        }
    }

    /// Replaces all input and seat rules and re-derives everything from them.
    ///
    /// # Errors
    ///
    /// `InputError::Config` if the new configuration is invalid. The current
    /// rules are kept in that case.
    pub fn reload<B: InputBackend>(&mut self, config: &InputManagerConfig, backend: &mut B) -> Result<(), InputError> {
        config.validate()?;
        self.input_rules.replace_all(config.inputs.iter().cloned())?;
        self.seat_rules.replace_all(config.seats.iter().cloned())?;
        info!(
            "InputManager: reloaded {} input rule(s) and {} seat rule(s)",
            config.inputs.len(),
            config.seats.len()
        );

        self.reset_all_inputs(backend);
        for id in self.devices.ids() {
            self.reconfigure_device(id, backend)?;
        }
        self.configure_seats();
        if !self.devices.is_empty() {
            self.verify_fallback_seat()?;
        }
        self.reconcile_all();
        Ok(())
    }

    /// Reassigns every live device to its seats.
    pub fn reconcile_all(&mut self) -> Vec<Assignment> {
        let mut assignments = Vec::with_capacity(self.devices.len());
        for device in self.devices.iter() {
            let assignment = self.engine.assign(&self.seat_rules, &mut self.seats, device);
            for seat in &assignment.detached {
                self.notifications.push(SeatNotification::DeviceDetached {
                    seat: *seat,
                    device: device.id,
                });
            }
            for seat in &assignment.attached {
                self.notifications.push(SeatNotification::DeviceAttached {
                    seat: *seat,
                    device: device.id,
                });
            }
            assignments.push(assignment);
        }
        assignments
    }

    fn queue_assignment(&mut self, assignment: &Assignment) {
        for seat in &assignment.detached {
            self.notifications.push(SeatNotification::DeviceDetached {
                seat: *seat,
                device: assignment.device,
            });
        }
        for seat in &assignment.attached {
            self.notifications.push(SeatNotification::DeviceAttached {
                seat: *seat,
                device: assignment.device,
            });
        }
    }

    /// Resets one device to its driver defaults.
    ///
    /// # Errors
    ///
    /// `InputError::UnknownDevice` if `id` is not registered.
    pub fn reset_input<B: InputBackend>(&mut self, id: DeviceId, backend: &mut B) -> Result<ApplyReport, InputError> {
        let device = self.devices.get(id).ok_or_else(|| {
            error!("InputManager: cannot reset unknown device {}", id);
            InputError::UnknownDevice(id)
        })?;
        let Some(driver) = backend.driver_mut(device.handle) else {
            debug!("InputManager: '{}' has no configurable driver, nothing to reset", device.identifier);
            return Ok(ApplyReport::default());
        };
        let report = self.orchestrator.reset(device, driver);
        for seat in self.seats.seats_for_device(id) {
            self.notifications.push(SeatNotification::DeviceReset { seat, device: id });
        }
        Ok(report)
    }

    /// Resets every device to its driver defaults.
    pub fn reset_all_inputs<B: InputBackend>(&mut self, backend: &mut B) {
        for id in self.devices.ids() {
            if let Err(e) = self.reset_input(id, backend) {
                warn!("InputManager: reset of {} failed: {}", id, e);
            }
        }
    }

    /// Focuses `target` on every seat that allows it and asks each of those
    /// seats to warp its cursor there.
    pub fn set_focus(&mut self, target: FocusTarget) {
        for seat in self.seats.ids() {
            if self.update_focus(seat, Some(target)) {
                self.notifications.push(SeatNotification::CursorWarpRequested { seat, target });
            }
        }
    }

    /// True if any seat currently focuses `target`.
    pub fn has_focus(&self, target: &FocusTarget) -> bool {
        self.seats.iter().any(|seat| seat.focus.as_ref() == Some(target))
    }

    /// Sets the seat that the command or binding being handled came from.
    pub fn set_handler_seat(&mut self, seat: Option<SeatId>) {
        self.handler_seat = seat;
    }

    /// The seat of the current handler context, else the default seat.
    pub fn current_seat(&mut self) -> SeatId {
        let handler = self.handler_seat;
        match handler {
            Some(seat) if self.seats.get(seat).is_some() => seat,
            _ => self.default_seat(),
        }
    }

    /// Looks a seat up by name, creating it when `create` is set.
    pub fn get_seat(&mut self, name: &str, create: bool) -> Option<SeatId> {
        if create {
            Some(self.create_seat(name))
        } else {
            self.seats.find(name)
        }
    }

    /// The default seat, `seat0`, created if absent.
    pub fn default_seat(&mut self) -> SeatId {
        self.create_seat(DEFAULT_SEAT)
    }

    /// Looks up or creates seat `name`. A new seat created while input is
    /// inhibited starts out with the inhibiting client as its exclusive client.
    fn create_seat(&mut self, name: &str) -> SeatId {
        let (seat, created) = self.seats.get_or_create(name);
        if let (true, Some(client)) = (created, self.inhibitor) {
            if self.seats.set_exclusive_client(seat, Some(client)) {
                self.notifications.push(SeatNotification::ExclusiveClientChanged {
                    seat,
                    client: Some(client),
                });
            }
        }
        seat
    }

    /// Asks every seat to reload its cursor theme.
    pub fn configure_xcursor(&mut self) {
        for seat in self.seats.ids() {
            self.notifications.push(SeatNotification::XcursorReconfigured { seat });
        }
    }

    /// Takes every notification queued since the last call.
    pub fn drain_notifications(&mut self) -> Vec<SeatNotification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn device(&self, id: DeviceId) -> Option<&InputDevice> {
        self.devices.get(id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &InputDevice> {
        self.devices.iter()
    }

    pub fn find_device(&self, handle: DriverHandle) -> Option<DeviceId> {
        self.devices.find_by_handle(handle)
    }

    /// The effective configuration of a device, without touching its driver.
    pub fn device_config(&self, id: DeviceId) -> Option<InputConfig> {
        let device = self.devices.get(id)?;
        merge_rules(&self.input_rules, &device.identifier, device.kind)
    }

    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.seats.get(id)
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }

    pub fn seats_for_device(&self, id: DeviceId) -> BTreeSet<SeatId> {
        self.seats.seats_for_device(id)
    }

    pub fn seat_devices(&self, seat: SeatId) -> Option<&BTreeSet<DeviceId>> {
        self.seats.get(seat).map(|seat| &seat.devices)
    }

    pub fn input_rules(&self) -> &InputRuleSet {
        &self.input_rules
    }

    pub fn seat_rules(&self) -> &SeatRuleSet {
        &self.seat_rules
    }
}
