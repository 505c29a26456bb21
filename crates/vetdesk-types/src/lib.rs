//! Validated value types shared across the vetdesk workspace.
//!
//! These types push input validation to construction time so that core
//! services can rely on their invariants instead of re-checking strings
//! and numbers at every call site.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating validated duration types.
#[derive(Debug, thiserror::Error)]
pub enum DurationError {
    /// A duration of zero minutes was supplied
    #[error("Duration must be at least one minute")]
    Zero,
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures at least one non-whitespace character is
/// present. Leading and trailing whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input has no content.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A strictly positive appointment duration in whole minutes.
///
/// The scheduling core normalises every appointment to a half-open
/// `[start, start + duration)` window. A zero-minute window would be empty
/// and could never conflict with anything under the strict interval
/// intersection test, so zero is rejected here at the type boundary rather
/// than silently producing an unbookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationMinutes(u32);

impl DurationMinutes {
    /// Creates a new `DurationMinutes`.
    ///
    /// # Errors
    ///
    /// Returns `DurationError::Zero` if `minutes` is zero.
    pub fn new(minutes: u32) -> Result<Self, DurationError> {
        if minutes == 0 {
            return Err(DurationError::Zero);
        }
        Ok(Self(minutes))
    }

    /// Returns the duration as a raw minute count.
    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Returns the duration as a `chrono::Duration`.
    pub fn to_chrono(self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.0))
    }
}

impl std::fmt::Display for DurationMinutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl serde::Serialize for DurationMinutes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DurationMinutes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let minutes = u32::deserialize(deserializer)?;
        DurationMinutes::new(minutes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_whitespace() {
        let text = NonEmptyText::new("  Luna  ").unwrap();
        assert_eq!(text.as_str(), "Luna");
    }

    #[test]
    fn non_empty_text_rejects_blank_input() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
    }

    #[test]
    fn duration_rejects_zero_minutes() {
        assert!(matches!(DurationMinutes::new(0), Err(DurationError::Zero)));
    }

    #[test]
    fn duration_converts_to_chrono() {
        let thirty = DurationMinutes::new(30).unwrap();
        assert_eq!(thirty.to_chrono(), chrono::Duration::minutes(30));
        assert_eq!(thirty.minutes(), 30);
    }

    #[test]
    fn duration_deserialize_rejects_zero() {
        let parsed: Result<DurationMinutes, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
        let parsed: DurationMinutes = serde_json::from_str("45").unwrap();
        assert_eq!(parsed.minutes(), 45);
    }
}
