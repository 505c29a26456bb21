//! Appointment lifecycle management.
//!
//! Owns the status state machine and exposes the only legal mutation paths
//! for an appointment: creation, role-checked status transitions and
//! bounded field updates. Status never changes anywhere else.

use crate::appointment::{
    allowed_transitions, Appointment, AppointmentPatch, AppointmentStatus, TimeWindow,
};
use crate::conflict::ConflictDetector;
use crate::error::{ClinicError, ClinicResult};
use crate::store::{AppointmentStore, PetStore, UserStore};
use crate::user::UserRole;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;
use vetdesk_types::DurationMinutes;

/// Parameters for booking a new appointment.
///
/// `owner_id` is the owner the appointment is booked for; staff may book on
/// an owner's behalf, so it is not necessarily the caller.
#[derive(Debug, Clone)]
pub struct CreateAppointment {
    pub pet_id: Uuid,
    pub owner_id: Uuid,
    pub veterinarian_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration: DurationMinutes,
    pub reason: String,
    pub notes: Option<String>,
}

/// Validates and applies appointment mutations.
#[derive(Clone)]
pub struct AppointmentLifecycle {
    appointments: Arc<dyn AppointmentStore>,
    pets: Arc<dyn PetStore>,
    users: Arc<dyn UserStore>,
    conflicts: ConflictDetector,
}

impl AppointmentLifecycle {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        pets: Arc<dyn PetStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let conflicts = ConflictDetector::new(appointments.clone());
        Self {
            appointments,
            pets,
            users,
            conflicts,
        }
    }

    /// Books a new appointment in `Scheduled` status.
    ///
    /// Validates that the pet exists, belongs to the requesting owner and is
    /// active; that the veterinarian exists, holds the veterinary role and
    /// is active; and that the requested window is free. The store repeats
    /// the conflict check atomically with the insert.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing pet or veterinarian, `Forbidden` when the
    /// pet belongs to someone else, `InvalidInput` for inactive records or a
    /// wrong role, `SchedulingConflict` when the window is taken.
    pub fn create(&self, request: CreateAppointment, now: DateTime<Utc>) -> ClinicResult<Appointment> {
        let pet = self
            .pets
            .find(request.pet_id)?
            .ok_or(ClinicError::not_found("pet", request.pet_id))?;
        if pet.owner_id != request.owner_id {
            return Err(ClinicError::Forbidden(
                "pet does not belong to the requesting owner",
            ));
        }
        if !pet.active {
            return Err(ClinicError::InvalidInput(
                "pet record is inactive".into(),
            ));
        }

        let veterinarian = self
            .users
            .find(request.veterinarian_id)?
            .ok_or(ClinicError::not_found(
                "veterinarian",
                request.veterinarian_id,
            ))?;
        if veterinarian.role != UserRole::Veterinary {
            return Err(ClinicError::InvalidInput(
                "assigned user is not a veterinarian".into(),
            ));
        }
        if !veterinarian.active {
            return Err(ClinicError::InvalidInput(
                "veterinarian account is inactive".into(),
            ));
        }

        let window = TimeWindow::from_start_duration(request.start_time, request.duration);
        if self.conflicts.has_conflict(request.veterinarian_id, &window)? {
            return Err(ClinicError::SchedulingConflict);
        }

        let appointment = Appointment::new_scheduled(
            request.pet_id,
            request.owner_id,
            request.veterinarian_id,
            request.start_time,
            request.duration,
            request.reason,
            request.notes,
            now,
        );

        let appointment = self.appointments.insert_scheduled(appointment)?;
        tracing::info!(
            appointment_id = %appointment.id,
            veterinarian_id = %request.veterinarian_id,
            start = %appointment.start_time,
            "appointment scheduled"
        );
        Ok(appointment)
    }

    /// Applies a status transition on behalf of a caller.
    ///
    /// Owners may only cancel, only their own appointments, and only while
    /// the appointment is still scheduled or confirmed. Staff transitions
    /// are validated against the fine-grained table. Terminal statuses have
    /// no outgoing edges, so repeating a terminal transition also fails.
    ///
    /// # Errors
    ///
    /// `NotFound` if the appointment is missing, `Forbidden` for role or
    /// ownership violations, `InvalidTransition` carrying the offending
    /// `(from, to)` pair for edges not in the table.
    pub fn transition(
        &self,
        appointment_id: Uuid,
        requested: AppointmentStatus,
        caller_id: Uuid,
        caller_role: UserRole,
        now: DateTime<Utc>,
    ) -> ClinicResult<Appointment> {
        let mut appointment = self
            .appointments
            .find(appointment_id)?
            .ok_or(ClinicError::not_found("appointment", appointment_id))?;

        if caller_role == UserRole::Owner {
            if requested != AppointmentStatus::Cancelled {
                return Err(ClinicError::Forbidden(
                    "owners may only cancel appointments",
                ));
            }
            if appointment.owner_id != caller_id {
                return Err(ClinicError::Forbidden(
                    "appointment belongs to another owner",
                ));
            }
        }

        if !allowed_transitions(caller_role, appointment.status).contains(&requested) {
            tracing::warn!(
                appointment_id = %appointment_id,
                from = %appointment.status,
                to = %requested,
                role = %caller_role,
                "rejected status transition"
            );
            return Err(ClinicError::InvalidTransition {
                from: appointment.status,
                to: requested,
            });
        }

        appointment.apply_status(requested, now);
        let appointment = self.appointments.save(appointment)?;
        tracing::info!(
            appointment_id = %appointment_id,
            status = %requested,
            "appointment status updated"
        );
        Ok(appointment)
    }

    /// Applies a bounded field update.
    ///
    /// The caller must be the appointment's owner or its assigned
    /// veterinarian, and the record must still be editable
    /// ([`Appointment::can_be_modified`]).
    ///
    /// # Errors
    ///
    /// `NotFound` if the appointment is missing, `Forbidden` for other
    /// callers, `InvalidState` once the appointment has left an editable
    /// status.
    pub fn update_fields(
        &self,
        appointment_id: Uuid,
        caller_id: Uuid,
        patch: AppointmentPatch,
        now: DateTime<Utc>,
    ) -> ClinicResult<Appointment> {
        let mut appointment = self
            .appointments
            .find(appointment_id)?
            .ok_or(ClinicError::not_found("appointment", appointment_id))?;

        let is_owner = appointment.owner_id == caller_id;
        let is_veterinarian = appointment.veterinarian_id == Some(caller_id);
        if !is_owner && !is_veterinarian {
            return Err(ClinicError::Forbidden(
                "only the owner or the assigned veterinarian may edit an appointment",
            ));
        }

        if !appointment.can_be_modified() {
            return Err(ClinicError::InvalidState(appointment.status));
        }

        patch.apply(&mut appointment, now);
        self.appointments.save(appointment)
    }
}
