//! Checkout runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into checkout sessions.
//! Nothing in the engine reads environment variables while a session is running.

use crate::{CheckoutError, CheckoutResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Checkout configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutConfig {
    clinic_offset: FixedOffset,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self::new(utc())
    }
}

impl CheckoutConfig {
    /// Create a new `CheckoutConfig` for a clinic at the given UTC offset.
    pub fn new(clinic_offset: FixedOffset) -> Self {
        Self { clinic_offset }
    }

    pub fn clinic_offset(&self) -> FixedOffset {
        self.clinic_offset
    }

    /// The calendar date at the clinic for the instant `now`.
    ///
    /// Date-of-service checks compare against this, not the UTC date, so an evening visit
    /// on the US east coast is not treated as tomorrow's.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.clinic_offset).date_naive()
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse the clinic UTC offset from an optional string value.
///
/// Accepts `+HH:MM`, `-HH:MM`, `Z` or `UTC`. `None` or blank input yields UTC.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidInput`] for malformed input or offsets beyond ±14:00.
pub fn clinic_offset_from_env_value(value: Option<String>) -> CheckoutResult<FixedOffset> {
    const MAX_OFFSET_MINUTES: i32 = 14 * 60;

    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let Some(value) = value else {
        return Ok(utc());
    };

    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let invalid = || {
        CheckoutError::InvalidInput(format!(
            "clinic UTC offset must look like +HH:MM or -HH:MM, got '{}'",
            value
        ))
    };

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let total_minutes = hours * 60 + minutes;
    if total_minutes > MAX_OFFSET_MINUTES {
        return Err(CheckoutError::InvalidInput(format!(
            "clinic UTC offset '{}' exceeds ±14:00",
            value
        )));
    }

    FixedOffset::east_opt(sign * total_minutes * 60).ok_or_else(invalid)
}
