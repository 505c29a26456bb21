use crate::appointment::AppointmentStatus;
use uuid::Uuid;

/// Error taxonomy for the clinic core.
///
/// All variants are terminal, user-visible failures; nothing here is retried
/// internally. The REST layer maps each variant to an HTTP status code.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("appointment cannot be modified while in status {0}")]
    InvalidState(AppointmentStatus),
    #[error("veterinarian already has an appointment overlapping the requested window")]
    SchedulingConflict,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClinicError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<vetdesk_types::TextError> for ClinicError {
    fn from(err: vetdesk_types::TextError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<vetdesk_types::DurationError> for ClinicError {
    fn from(err: vetdesk_types::DurationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
