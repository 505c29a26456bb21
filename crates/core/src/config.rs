//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::constants::{
    DEFAULT_APPOINTMENT_HORIZON_DAYS, DEFAULT_DEWORMING_GRACE_DAYS,
    DEFAULT_DEWORMING_INTERVAL_DAYS, DEFAULT_MEDICATION_URGENCY_DAYS,
};
use crate::{ClinicError, ClinicResult};
use chrono::Duration;

/// Core configuration resolved at startup.
///
/// All values are day counts feeding the reminder aggregator; the
/// appointment state machine and conflict detector take no tunables.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    appointment_horizon_days: i64,
    deworming_interval_days: i64,
    deworming_grace_days: i64,
    medication_urgency_days: i64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if any day count is not strictly
    /// positive.
    pub fn new(
        appointment_horizon_days: i64,
        deworming_interval_days: i64,
        deworming_grace_days: i64,
        medication_urgency_days: i64,
    ) -> ClinicResult<Self> {
        for (name, value) in [
            ("appointment_horizon_days", appointment_horizon_days),
            ("deworming_interval_days", deworming_interval_days),
            ("deworming_grace_days", deworming_grace_days),
            ("medication_urgency_days", medication_urgency_days),
        ] {
            if value <= 0 {
                return Err(ClinicError::InvalidInput(format!(
                    "{name} must be a positive day count, got {value}"
                )));
            }
        }

        Ok(Self {
            appointment_horizon_days,
            deworming_interval_days,
            deworming_grace_days,
            medication_urgency_days,
        })
    }

    pub fn appointment_horizon(&self) -> Duration {
        Duration::days(self.appointment_horizon_days)
    }

    pub fn deworming_interval(&self) -> Duration {
        Duration::days(self.deworming_interval_days)
    }

    pub fn deworming_grace(&self) -> Duration {
        Duration::days(self.deworming_grace_days)
    }

    pub fn medication_urgency_days(&self) -> i64 {
        self.medication_urgency_days
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            appointment_horizon_days: DEFAULT_APPOINTMENT_HORIZON_DAYS,
            deworming_interval_days: DEFAULT_DEWORMING_INTERVAL_DAYS,
            deworming_grace_days: DEFAULT_DEWORMING_GRACE_DAYS,
            medication_urgency_days: DEFAULT_MEDICATION_URGENCY_DAYS,
        }
    }
}

/// Parse a day-count override from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn days_from_env_value(
    name: &'static str,
    value: Option<String>,
    default: i64,
) -> ClinicResult<i64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => v.parse::<i64>().map_err(|_| {
            ClinicError::InvalidInput(format!("{name} must be an integer day count, got {v:?}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.appointment_horizon(), Duration::days(14));
        assert_eq!(cfg.deworming_interval(), Duration::days(90));
        assert_eq!(cfg.deworming_grace(), Duration::days(7));
        assert_eq!(cfg.medication_urgency_days(), 3);
    }

    #[test]
    fn new_rejects_non_positive_day_counts() {
        assert!(CoreConfig::new(0, 90, 7, 3).is_err());
        assert!(CoreConfig::new(14, -1, 7, 3).is_err());
    }

    #[test]
    fn days_from_env_value_falls_back_to_default() {
        assert_eq!(days_from_env_value("X", None, 14).unwrap(), 14);
        assert_eq!(days_from_env_value("X", Some("  ".into()), 14).unwrap(), 14);
        assert_eq!(days_from_env_value("X", Some("21".into()), 14).unwrap(), 21);
        assert!(days_from_env_value("X", Some("soon".into()), 14).is_err());
    }
}
