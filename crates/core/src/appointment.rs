//! Appointment entity, status state machine and time-window arithmetic.
//!
//! The status graph is the one piece of the booking flow with real design
//! content. It is kept as a single explicit table parameterised by caller
//! role, so the veterinarian-facing and owner-facing rules cannot drift
//! apart. All other mutation paths go through bounded field updates guarded
//! by [`Appointment::can_be_modified`].

use crate::user::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetdesk_types::DurationMinutes;

/// Status of an appointment.
///
/// `Completed`, `Cancelled`, `NoShow` and `Rescheduled` are terminal: they
/// have no outgoing edges, including self-loops. `Rescheduled` additionally
/// has no incoming edges in the current transition tables, so requesting it
/// always fails; the variant is kept because it appears in persisted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    /// Returns true if this status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::NoShow | Self::Rescheduled
        )
    }

    /// Returns true if an appointment in this status occupies its
    /// veterinarian's time for conflict-detection purposes.
    ///
    /// Cancelled and no-show slots do not block the schedule; the window
    /// they used to occupy can be booked again.
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::NoShow)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scheduled => "SCHEDULED",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
            Self::Rescheduled => "RESCHEDULED",
        };
        f.write_str(name)
    }
}

/// Allowed successor statuses for a caller role and current status.
///
/// Single source of truth for the state machine: staff get the fine-grained
/// table, owners may only cancel and only while the appointment is still
/// scheduled or confirmed. Terminal statuses map to the empty set for every
/// role.
pub fn allowed_transitions(role: UserRole, from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;

    match role {
        UserRole::Veterinary | UserRole::Admin => match from {
            Scheduled => &[Confirmed, Cancelled],
            Confirmed => &[InProgress, Cancelled, NoShow],
            InProgress => &[Completed, NoShow],
            Completed | Cancelled | NoShow | Rescheduled => &[],
        },
        UserRole::Owner => match from {
            Scheduled | Confirmed => &[Cancelled],
            InProgress | Completed | Cancelled | NoShow | Rescheduled => &[],
        },
    }
}

/// A half-open time interval `[start, end)`.
///
/// The end instant is excluded so that back-to-back bookings do not falsely
/// conflict: an appointment ending at 10:30 and another starting at 10:30
/// share no instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window from explicit bounds. An `end` at or before `start`
    /// yields an empty window, which overlaps nothing.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Creates a window from a start instant and a positive duration.
    pub fn from_start_duration(start: DateTime<Utc>, duration: DurationMinutes) -> Self {
        Self {
            start,
            end: start + duration.to_chrono(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Standard half-open interval intersection: `[s1,e1)` and `[s2,e2)`
    /// overlap iff `s1 < e2 && s2 < e1`. Touching endpoints do not overlap,
    /// and an empty window overlaps nothing under the strict inequalities.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A veterinary appointment.
///
/// Appointments are never physically deleted; cancellation is a status, not
/// a row removal. Status is mutated only through the lifecycle service, and
/// clinical fields only through [`AppointmentPatch`] while the record is
/// still editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_id: Uuid,
    /// Nullable until a veterinarian is assigned in walk-in flows.
    pub veterinarian_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub duration: DurationMinutes,
    pub status: AppointmentStatus,
    pub reason: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescriptions: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub paid: bool,
    pub next_appointment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Creates a new appointment in `Scheduled` status.
    pub fn new_scheduled(
        pet_id: Uuid,
        owner_id: Uuid,
        veterinarian_id: Uuid,
        start_time: DateTime<Utc>,
        duration: DurationMinutes,
        reason: String,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id,
            owner_id,
            veterinarian_id: Some(veterinarian_id),
            start_time,
            duration,
            status: AppointmentStatus::Scheduled,
            reason,
            symptoms: None,
            diagnosis: None,
            treatment: None,
            prescriptions: None,
            notes,
            price: None,
            paid: false,
            next_appointment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration.to_chrono()
    }

    /// The `[start, end)` window this appointment occupies.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_start_duration(self.start_time, self.duration)
    }

    /// Field updates are allowed exactly while the appointment is scheduled
    /// or in progress. This guards against mutating clinical fields of a
    /// cancelled or completed record.
    pub fn can_be_modified(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Scheduled | AppointmentStatus::InProgress
        )
    }

    /// Sets the status and stamps `updated_at`. Transition validity is the
    /// lifecycle service's responsibility; this only records the outcome.
    pub fn apply_status(&mut self, status: AppointmentStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

/// Bounded field update for an appointment.
///
/// Every field is optional; absent fields are left untouched. Status is
/// deliberately not part of the patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub reason: Option<String>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescriptions: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub paid: Option<bool>,
    pub next_appointment_id: Option<Uuid>,
}

impl AppointmentPatch {
    /// Applies the present fields to `appointment` and stamps `updated_at`.
    pub fn apply(&self, appointment: &mut Appointment, now: DateTime<Utc>) {
        if let Some(reason) = &self.reason {
            appointment.reason = reason.clone();
        }
        if let Some(symptoms) = &self.symptoms {
            appointment.symptoms = Some(symptoms.clone());
        }
        if let Some(diagnosis) = &self.diagnosis {
            appointment.diagnosis = Some(diagnosis.clone());
        }
        if let Some(treatment) = &self.treatment {
            appointment.treatment = Some(treatment.clone());
        }
        if let Some(prescriptions) = &self.prescriptions {
            appointment.prescriptions = Some(prescriptions.clone());
        }
        if let Some(notes) = &self.notes {
            appointment.notes = Some(notes.clone());
        }
        if let Some(price) = self.price {
            appointment.price = Some(price);
        }
        if let Some(paid) = self.paid {
            appointment.paid = paid;
        }
        if let Some(next) = self.next_appointment_id {
            appointment.next_appointment_id = Some(next);
        }
        appointment.updated_at = now;
    }
}
