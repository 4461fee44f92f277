//! Implementation of the session dose identifier.

use crate::{IdError, IdResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Identifier of one dose line item within a checkout session.
///
/// Once constructed the contained UUID is guaranteed to be rendered in canonical form
/// (32 lowercase hex characters, no hyphens).
///
/// # Construction
/// - [`SessionDoseId::new`] generates a fresh identifier for a new line item.
/// - [`SessionDoseId::parse`] validates an identifier read back from storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionDoseId(Uuid);

impl Default for SessionDoseId {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionDoseId {
    /// Generates a new random identifier (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not 32 lowercase hex characters.
    pub fn parse(input: &str) -> IdResult<Self> {
        if !Self::is_canonical(input) {
            return Err(IdError::InvalidInput(format!(
                "dose id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| IdError::InvalidInput(format!("dose id '{}': {}", input, e)))
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for SessionDoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionDoseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionDoseId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SessionDoseId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SessionDoseId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SessionDoseId::parse(&s).map_err(serde::de::Error::custom)
    }
}
