//! Workspace runner for the vetdesk back office.
//!
//! Resolves configuration from the environment, wires the in-memory store
//! and serves the REST API. With `VETDESK_SEED_DEMO=1` a demo owner,
//! veterinarian and pet are inserted at startup so the endpoints can be
//! exercised straight from the Swagger UI.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use vetdesk_core::config::days_from_env_value;
use vetdesk_core::constants::{
    DEFAULT_APPOINTMENT_HORIZON_DAYS, DEFAULT_DEWORMING_GRACE_DAYS,
    DEFAULT_DEWORMING_INTERVAL_DAYS, DEFAULT_MEDICATION_URGENCY_DAYS,
};
use vetdesk_core::{
    CoreConfig, MedicationCourse, MemoryStore, NonEmptyText, Pet, User, UserRole, Vaccine,
};

/// # Environment Variables
/// - `VETDESK_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `VETDESK_APPOINTMENT_HORIZON_DAYS`: reminder horizon for appointments
/// - `VETDESK_DEWORMING_INTERVAL_DAYS`: days between deworming treatments
/// - `VETDESK_DEWORMING_GRACE_DAYS`: lead time on synthesized reminders
/// - `VETDESK_MEDICATION_URGENCY_DAYS`: high-priority window for courses
/// - `VETDESK_SEED_DEMO`: set to "1" to insert demo records at startup
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vetdesk=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("VETDESK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting vetdesk REST on {}", addr);

    let cfg = Arc::new(CoreConfig::new(
        days_from_env_value(
            "VETDESK_APPOINTMENT_HORIZON_DAYS",
            std::env::var("VETDESK_APPOINTMENT_HORIZON_DAYS").ok(),
            DEFAULT_APPOINTMENT_HORIZON_DAYS,
        )?,
        days_from_env_value(
            "VETDESK_DEWORMING_INTERVAL_DAYS",
            std::env::var("VETDESK_DEWORMING_INTERVAL_DAYS").ok(),
            DEFAULT_DEWORMING_INTERVAL_DAYS,
        )?,
        days_from_env_value(
            "VETDESK_DEWORMING_GRACE_DAYS",
            std::env::var("VETDESK_DEWORMING_GRACE_DAYS").ok(),
            DEFAULT_DEWORMING_GRACE_DAYS,
        )?,
        days_from_env_value(
            "VETDESK_MEDICATION_URGENCY_DAYS",
            std::env::var("VETDESK_MEDICATION_URGENCY_DAYS").ok(),
            DEFAULT_MEDICATION_URGENCY_DAYS,
        )?,
    )?);

    let store = Arc::new(MemoryStore::new());
    if std::env::var("VETDESK_SEED_DEMO").as_deref() == Ok("1") {
        seed_demo_records(&store)?;
    }

    let app = router(AppState::in_memory(store, cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Inserts a demo owner, veterinarian, pet, pending vaccine dose and a
/// running medication course, logging the generated ids.
fn seed_demo_records(store: &Arc<MemoryStore>) -> anyhow::Result<()> {
    use chrono::{Duration, Utc};
    use vetdesk_core::{MedicationStore, PetStore, UserStore, VaccineStore};

    let now = Utc::now();

    let owner = User::new(
        NonEmptyText::new("Demo Owner")?,
        "owner@example.com".into(),
        UserRole::Owner,
        now,
    );
    let veterinarian = User::new(
        NonEmptyText::new("Demo Veterinarian")?,
        "vet@example.com".into(),
        UserRole::Veterinary,
        now,
    );
    UserStore::save(store.as_ref(), owner.clone())?;
    UserStore::save(store.as_ref(), veterinarian.clone())?;

    let pet = Pet::new(owner.id, NonEmptyText::new("Luna")?, "dog".into(), now);
    PetStore::save(store.as_ref(), pet.clone())?;

    let mut vaccine = Vaccine::new(pet.id, "rabies".into(), now - Duration::days(300));
    vaccine.next_dose_date = Some(now + Duration::days(2));
    VaccineStore::save(store.as_ref(), vaccine)?;

    let course = MedicationCourse::new(
        pet.id,
        "amoxicillin".into(),
        "250mg twice daily".into(),
        now - Duration::days(3),
        now + Duration::days(4),
    );
    MedicationStore::save(store.as_ref(), course)?;

    tracing::info!(
        owner_id = %owner.id,
        veterinarian_id = %veterinarian.id,
        pet_id = %pet.id,
        "seeded demo records"
    );
    Ok(())
}
