//! User accounts as seen by the clinic core.
//!
//! Authentication and identity resolution live outside this crate; core
//! services only receive a caller id and role and look the user up through
//! the store when a record-level check is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vetdesk_types::NonEmptyText;

/// Caller role supplied by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Owner,
    Veterinary,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Owner => "OWNER",
            Self::Veterinary => "VETERINARY",
            Self::Admin => "ADMIN",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = s.trim();
        if role.eq_ignore_ascii_case("OWNER") {
            Ok(Self::Owner)
        } else if role.eq_ignore_ascii_case("VETERINARY") {
            Ok(Self::Veterinary)
        } else if role.eq_ignore_ascii_case("ADMIN") {
            Ok(Self::Admin)
        } else {
            Err(format!("unknown role: {role:?}"))
        }
    }
}

/// A user record: pet owner, veterinarian or practice admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: NonEmptyText,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: NonEmptyText, email: String, role: UserRole, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            active: true,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(UserRole::from_str("VETERINARY").unwrap(), UserRole::Veterinary);
        assert_eq!(UserRole::from_str("owner").unwrap(), UserRole::Owner);
        assert_eq!(UserRole::from_str(" Admin ").unwrap(), UserRole::Admin);
        assert!(UserRole::from_str("RECEPTION").is_err());
    }

    #[test]
    fn role_display_round_trips_through_from_str() {
        for role in [UserRole::Owner, UserRole::Veterinary, UserRole::Admin] {
            assert_eq!(UserRole::from_str(&role.to_string()).unwrap(), role);
        }
    }
}
