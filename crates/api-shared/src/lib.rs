//! # API Shared
//!
//! Shared utilities and definitions for the vetdesk APIs.
//!
//! Contains:
//! - Caller-identity extraction (`auth` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the workspace runner binary.

pub mod auth;
pub mod health;

pub use auth::{CallerIdentity, CallerIdentityError, CALLER_ID_HEADER, CALLER_ROLE_HEADER};
pub use health::{HealthRes, HealthService};
