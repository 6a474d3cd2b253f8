// novade-input-manager/src/lib.rs

//! NovaDE Input Manager.
//!
//! Tracks the input devices of a multi-seat compositor, resolves the
//! effective driver configuration of each device from layered rules
//! (`*`, `type:<kind>`, exact identifier) and decides which seats own each
//! device.
//!
//! The crate does not talk to any device backend directly. Backends implement
//! [`driver::InputBackend`] (with `backend_libinput`, an implementation for
//! libinput devices is provided) and feed [`InputEvent`]s to the
//! [`InputManager`]. Seat management consumes the queued
//! [`SeatNotification`]s.
//!
//! ```no_run
//! use novade_input_manager::{InputEvent, InputManager, InputManagerConfig};
//! # fn run<B: novade_input_manager::driver::InputBackend>(backend: &mut B, events: Vec<InputEvent>) -> Result<(), novade_input_manager::InputError> {
//! let config = InputManagerConfig::load_from_file(std::path::Path::new("/etc/novade/input.toml"))?;
//! novade_input_manager::logging::init_logging(&config.logging);
//!
//! let mut manager = InputManager::with_config(&config)?;
//! for event in events {
//!     let _ = manager.handle_event(event, backend);
//!     for notification in manager.drain_notifications() {
//!         println!("{:?}", notification);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod assignment;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod logging;
pub mod manager;
pub mod notification;
pub mod resolver;
pub mod seat;

pub use apply::{ApplyReport, ConfigOrchestrator};
pub use assignment::{Assignment, AssignmentOutcome, SeatAssignmentEngine};
pub use config::{InputConfig, InputManagerConfig, LoggingConfig, SeatConfig};
pub use device::{device_identifier, BackendDeviceType, DeviceId, DeviceKind, DriverHandle, InputDevice, RawInputDevice};
pub use error::{ConfigError, DriverError, InputError};
pub use manager::{InputEvent, InputManager};
pub use notification::SeatNotification;
pub use resolver::ConfigResolver;
pub use seat::{ClientId, FocusTarget, NodeId, Seat, SeatId, DEFAULT_SEAT};
