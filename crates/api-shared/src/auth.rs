//! Caller identity, as resolved by the upstream identity layer.
//!
//! Authentication itself is out of scope for this back office: a gateway is
//! expected to have verified the caller and to forward their user id and
//! role in plain headers. This module only parses those values so handlers
//! receive a typed [`CallerIdentity`].

use std::str::FromStr;
use uuid::Uuid;
use vetdesk_core::UserRole;

/// Header carrying the authenticated caller's user id.
pub const CALLER_ID_HEADER: &str = "x-caller-id";

/// Header carrying the authenticated caller's role.
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Who is making the request, as asserted by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, thiserror::Error)]
pub enum CallerIdentityError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("invalid {0} header: {1}")]
    InvalidHeader(&'static str, String),
}

impl CallerIdentity {
    /// Parses a caller identity from raw header values.
    ///
    /// # Errors
    ///
    /// Returns `CallerIdentityError` when either header is absent, the id is
    /// not a UUID, or the role is not a known role name.
    pub fn from_header_values(
        id: Option<&str>,
        role: Option<&str>,
    ) -> Result<Self, CallerIdentityError> {
        let id = id.ok_or(CallerIdentityError::MissingHeader(CALLER_ID_HEADER))?;
        let role = role.ok_or(CallerIdentityError::MissingHeader(CALLER_ROLE_HEADER))?;

        let user_id = Uuid::parse_str(id.trim())
            .map_err(|e| CallerIdentityError::InvalidHeader(CALLER_ID_HEADER, e.to_string()))?;
        let role = UserRole::from_str(role)
            .map_err(|e| CallerIdentityError::InvalidHeader(CALLER_ROLE_HEADER, e))?;

        Ok(Self { user_id, role })
    }
}
