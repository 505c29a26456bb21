//! Pet records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetdesk_types::NonEmptyText;

/// A pet registered with the practice.
///
/// `last_deworming` feeds the synthesized deworming reminder; `None` means
/// no treatment has ever been recorded, which also makes the reminder due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: NonEmptyText,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub active: bool,
    pub last_deworming: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    pub fn new(
        owner_id: Uuid,
        name: NonEmptyText,
        species: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            species,
            breed: None,
            birth_date: None,
            active: true,
            last_deworming: None,
            created_at: now,
        }
    }
}
