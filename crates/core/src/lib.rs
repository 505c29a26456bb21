//! # Vetdesk Core
//!
//! Core business logic for the vetdesk veterinary back office.
//!
//! This crate contains the three components with real design content:
//! - the appointment status state machine and its role-checked transition
//!   paths ([`lifecycle`]),
//! - the veterinarian double-booking guard ([`conflict`]),
//! - the owner-dashboard reminder aggregation ([`reminders`]).
//!
//! Entity persistence sits behind the narrow traits in [`store`]; an
//! in-process [`store::MemoryStore`] backs the server binary and tests.
//!
//! **No API concerns**: authentication, HTTP servers, or service interfaces
//! belong in `api-rest` or `api-shared`.

#![warn(rust_2018_idioms)]

pub mod appointment;
pub mod config;
pub mod conflict;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod medical;
pub mod pet;
pub mod reminders;
pub mod store;
pub mod user;

pub use appointment::{
    allowed_transitions, Appointment, AppointmentPatch, AppointmentStatus, TimeWindow,
};
pub use config::CoreConfig;
pub use conflict::ConflictDetector;
pub use error::{ClinicError, ClinicResult};
pub use lifecycle::{AppointmentLifecycle, CreateAppointment};
pub use medical::{MedicationCourse, Vaccine};
pub use pet::Pet;
pub use reminders::{
    ReminderAggregator, ReminderItem, ReminderKind, ReminderPriority, ReminderReport,
    ReminderSummary,
};
pub use store::{
    AppointmentStore, MedicationStore, MemoryStore, PetStore, UserStore, VaccineStore,
};
pub use user::{User, UserRole};

// Re-export the validated value types so downstream crates do not need a
// direct vetdesk-types dependency for common signatures.
pub use vetdesk_types::{DurationMinutes, NonEmptyText};
