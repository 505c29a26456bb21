//! Vaccine doses and medication courses.
//!
//! Both are read by the reminder aggregator; their CRUD surfaces live in
//! the persistence layer behind the store traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded vaccine dose for a pet.
///
/// A dose with `next_dose_date` present is a pending dose: the follow-up
/// has been planned but not yet administered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub next_dose_date: Option<DateTime<Utc>>,
}

impl Vaccine {
    pub fn new(pet_id: Uuid, name: String, applied_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id,
            name,
            applied_at,
            next_dose_date: None,
        }
    }
}

/// A course of medication prescribed to a pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationCourse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub active: bool,
}

impl MedicationCourse {
    pub fn new(
        pet_id: Uuid,
        name: String,
        dosage: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id,
            name,
            dosage,
            start_date,
            end_date,
            active: true,
        }
    }
}
