//! Workspace-wide constants for the clinic core.

/// How far ahead (in days) the reminder aggregator looks for upcoming
/// appointments.
pub const DEFAULT_APPOINTMENT_HORIZON_DAYS: i64 = 14;

/// Days since the last recorded deworming after which a new treatment is due.
pub const DEFAULT_DEWORMING_INTERVAL_DAYS: i64 = 90;

/// Synthesized deworming reminders are given a due date this many days ahead.
pub const DEFAULT_DEWORMING_GRACE_DAYS: i64 = 7;

/// A medication course ending within this many days is flagged high priority.
pub const DEFAULT_MEDICATION_URGENCY_DAYS: i64 = 3;
