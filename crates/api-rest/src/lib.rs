//! # API REST
//!
//! REST API implementation for the vetdesk back office.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON DTOs, CORS, error-to-status mapping)
//!
//! Caller identity arrives in `x-caller-id` / `x-caller-role` headers set by
//! the upstream gateway; see `api-shared::auth`.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::{CallerIdentity, HealthRes, HealthService, CALLER_ID_HEADER, CALLER_ROLE_HEADER};
use vetdesk_core::{
    Appointment, AppointmentLifecycle, AppointmentPatch, AppointmentStatus, AppointmentStore,
    ClinicError, CoreConfig, CreateAppointment, DurationMinutes, MedicationStore, MemoryStore,
    PetStore, ReminderAggregator, ReminderItem, ReminderKind, ReminderPriority, ReminderSummary,
    UserRole, UserStore, VaccineStore,
};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    lifecycle: AppointmentLifecycle,
    reminders: ReminderAggregator,
}

impl AppState {
    /// Wires the services over explicit store handles.
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        pets: Arc<dyn PetStore>,
        users: Arc<dyn UserStore>,
        vaccines: Arc<dyn VaccineStore>,
        medications: Arc<dyn MedicationStore>,
        cfg: Arc<CoreConfig>,
    ) -> Self {
        let lifecycle = AppointmentLifecycle::new(appointments.clone(), pets.clone(), users);
        let reminders = ReminderAggregator::new(appointments, pets, vaccines, medications, cfg);
        Self {
            lifecycle,
            reminders,
        }
    }

    /// Convenience constructor over one in-process store.
    pub fn in_memory(store: Arc<MemoryStore>, cfg: Arc<CoreConfig>) -> Self {
        Self::new(
            store.clone() as Arc<dyn AppointmentStore>,
            store.clone() as Arc<dyn PetStore>,
            store.clone() as Arc<dyn UserStore>,
            store.clone() as Arc<dyn VaccineStore>,
            store as Arc<dyn MedicationStore>,
            cfg,
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        create_appointment,
        transition_status,
        update_appointment,
        get_reminders,
    ),
    components(schemas(
        HealthRes,
        CreateAppointmentReq,
        TransitionStatusReq,
        UpdateAppointmentReq,
        AppointmentRes,
        RemindersRes,
        ReminderItemRes,
        ReminderSummaryRes,
    ))
)]
struct ApiDoc;

/// Builds the REST router with Swagger UI mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/appointments", post(create_appointment))
        .route("/appointments/:id/status", put(transition_status))
        .route("/appointments/:id", patch(update_appointment))
        .route("/owners/:id/reminders", get(get_reminders))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type HandlerError = (StatusCode, String);

/// Maps a core error to an HTTP status and message.
fn error_response(err: &ClinicError) -> HandlerError {
    let status = match err {
        ClinicError::NotFound { .. } => StatusCode::NOT_FOUND,
        ClinicError::Forbidden(_) => StatusCode::FORBIDDEN,
        ClinicError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ClinicError::InvalidTransition { .. }
        | ClinicError::InvalidState(_)
        | ClinicError::SchedulingConflict => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}

fn caller_from_headers(headers: &HeaderMap) -> Result<CallerIdentity, HandlerError> {
    let value = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
    };
    CallerIdentity::from_header_values(value(CALLER_ID_HEADER), value(CALLER_ROLE_HEADER))
        .map_err(|e| {
            tracing::warn!("caller identity rejected: {e}");
            (StatusCode::UNAUTHORIZED, e.to_string())
        })
}

// ============================================================================
// DTOS
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAppointmentReq {
    pub pet_id: Uuid,
    /// Owner the appointment is booked for; staff may book on an owner's
    /// behalf.
    pub owner_id: Uuid,
    pub veterinarian_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Whole minutes, strictly positive.
    pub duration_minutes: u32,
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionStatusReq {
    /// Requested status, e.g. `CONFIRMED` or `CANCELLED`.
    #[schema(value_type = String, example = "CONFIRMED")]
    pub status: AppointmentStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAppointmentReq {
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

impl From<UpdateAppointmentReq> for AppointmentPatch {
    fn from(req: UpdateAppointmentReq) -> Self {
        Self {
            reason: req.reason,
            symptoms: req.symptoms,
            diagnosis: req.diagnosis,
            treatment: req.treatment,
            prescriptions: req.prescriptions,
            notes: req.notes,
            price: req.price,
            paid: req.paid,
            next_appointment_id: req.next_appointment_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentRes {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    #[schema(value_type = String, example = "SCHEDULED")]
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

impl From<Appointment> for AppointmentRes {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            pet_id: a.pet_id,
            owner_id: a.owner_id,
            veterinarian_id: a.veterinarian_id,
            start_time: a.start_time,
            end_time: a.end_time(),
            duration_minutes: a.duration.minutes(),
            status: a.status,
            reason: a.reason,
            symptoms: a.symptoms,
            diagnosis: a.diagnosis,
            treatment: a.treatment,
            prescriptions: a.prescriptions,
            notes: a.notes,
            price: a.price,
            paid: a.paid,
            next_appointment_id: a.next_appointment_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderItemRes {
    #[schema(value_type = String, example = "VACCINE")]
    pub kind: ReminderKind,
    pub title: String,
    pub message: String,
    pub due: DateTime<Utc>,
    #[schema(value_type = String, example = "HIGH")]
    pub priority: ReminderPriority,
    pub pet_id: Uuid,
    pub source_id: Option<Uuid>,
}

impl From<ReminderItem> for ReminderItemRes {
    fn from(item: ReminderItem) -> Self {
        Self {
            kind: item.kind,
            title: item.title,
            message: item.message,
            due: item.due,
            priority: item.priority,
            pet_id: item.pet_id,
            source_id: item.source_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderSummaryRes {
    pub overdue: usize,
    pub due_today: usize,
    pub due_this_week: usize,
    pub due_this_month: usize,
    pub critical: usize,
}

impl From<ReminderSummary> for ReminderSummaryRes {
    fn from(s: ReminderSummary) -> Self {
        Self {
            overdue: s.overdue,
            due_today: s.due_today,
            due_this_week: s.due_this_week,
            due_this_month: s.due_this_month,
            critical: s.critical,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemindersRes {
    pub reminders: Vec<ReminderItemRes>,
    pub summary: ReminderSummaryRes,
}

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint, used by monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentReq,
    responses(
        (status = 201, description = "Appointment scheduled", body = AppointmentRes),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 403, description = "Caller may not book for this owner or pet"),
        (status = 404, description = "Pet or veterinarian not found"),
        (status = 409, description = "Veterinarian already booked in that window")
    )
)]
/// Books a new appointment.
///
/// Owners may only book for themselves; veterinary and admin callers may
/// book on any owner's behalf. The proposed window is checked against the
/// veterinarian's calendar before the appointment is persisted.
#[axum::debug_handler]
async fn create_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAppointmentReq>,
) -> Result<(StatusCode, Json<AppointmentRes>), HandlerError> {
    let caller = caller_from_headers(&headers)?;
    if caller.role == UserRole::Owner && caller.user_id != req.owner_id {
        return Err((
            StatusCode::FORBIDDEN,
            "owners may only book appointments for themselves".into(),
        ));
    }

    let duration = DurationMinutes::new(req.duration_minutes)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let request = CreateAppointment {
        pet_id: req.pet_id,
        owner_id: req.owner_id,
        veterinarian_id: req.veterinarian_id,
        start_time: req.start_time,
        duration,
        reason: req.reason,
        notes: req.notes,
    };

    match state.lifecycle.create(request, Utc::now()) {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(appointment.into()))),
        Err(e) => {
            tracing::error!("create appointment error: {e}");
            Err(error_response(&e))
        }
    }
}

#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    request_body = TransitionStatusReq,
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Status updated", body = AppointmentRes),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 403, description = "Caller lacks the role or ownership required"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
/// Applies a status transition on behalf of the caller.
#[axum::debug_handler]
async fn transition_status(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    headers: HeaderMap,
    Json(req): Json<TransitionStatusReq>,
) -> Result<Json<AppointmentRes>, HandlerError> {
    let caller = caller_from_headers(&headers)?;

    match state
        .lifecycle
        .transition(id, req.status, caller.user_id, caller.role, Utc::now())
    {
        Ok(appointment) => Ok(Json(appointment.into())),
        Err(e) => {
            tracing::error!("transition status error: {e}");
            Err(error_response(&e))
        }
    }
}

#[utoipa::path(
    patch,
    path = "/appointments/{id}",
    request_body = UpdateAppointmentReq,
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentRes),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 403, description = "Caller is neither the owner nor the assigned veterinarian"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is no longer editable")
    )
)]
/// Updates clinical and business fields of an editable appointment.
#[axum::debug_handler]
async fn update_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateAppointmentReq>,
) -> Result<Json<AppointmentRes>, HandlerError> {
    let caller = caller_from_headers(&headers)?;

    match state
        .lifecycle
        .update_fields(id, caller.user_id, req.into(), Utc::now())
    {
        Ok(appointment) => Ok(Json(appointment.into())),
        Err(e) => {
            tracing::error!("update appointment error: {e}");
            Err(error_response(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/owners/{id}/reminders",
    params(("id" = Uuid, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Ranked reminders for the owner", body = RemindersRes),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 403, description = "Owners may only read their own reminders")
    )
)]
/// Builds the reminder dashboard for an owner.
#[axum::debug_handler]
async fn get_reminders(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    headers: HeaderMap,
) -> Result<Json<RemindersRes>, HandlerError> {
    let caller = caller_from_headers(&headers)?;
    if caller.role == UserRole::Owner && caller.user_id != id {
        return Err((
            StatusCode::FORBIDDEN,
            "owners may only read their own reminders".into(),
        ));
    }

    match state.reminders.build(id, Utc::now()) {
        Ok(report) => Ok(Json(RemindersRes {
            reminders: report.reminders.into_iter().map(Into::into).collect(),
            summary: report.summary.into(),
        })),
        Err(e) => {
            tracing::error!("build reminders error: {e}");
            Err(error_response(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_expected_status_codes() {
        let cases = [
            (
                ClinicError::not_found("appointment", Uuid::new_v4()),
                StatusCode::NOT_FOUND,
            ),
            (ClinicError::Forbidden("nope"), StatusCode::FORBIDDEN),
            (
                ClinicError::InvalidInput("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ClinicError::SchedulingConflict, StatusCode::CONFLICT),
            (
                ClinicError::InvalidState(AppointmentStatus::Completed),
                StatusCode::CONFLICT,
            ),
            (
                ClinicError::InvalidTransition {
                    from: AppointmentStatus::Scheduled,
                    to: AppointmentStatus::Completed,
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(error_response(&err).0, expected, "{err}");
        }
    }

    #[test]
    fn invalid_transition_message_names_both_statuses() {
        let err = ClinicError::InvalidTransition {
            from: AppointmentStatus::Scheduled,
            to: AppointmentStatus::Completed,
        };
        let (_, message) = error_response(&err);
        assert!(message.contains("SCHEDULED"));
        assert!(message.contains("COMPLETED"));
    }
}
