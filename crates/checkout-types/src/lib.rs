//! Validated text types shared across the checkout crates.
//!
//! Each type guarantees its invariant once constructed, so downstream code can compare and
//! display values without re-validating them:
//! - [`NonEmptyText`]: trimmed, at least one non-whitespace character
//! - [`LotNumber`]: trimmed, non-empty, no interior whitespace
//! - [`Antigen`]: non-empty, stored exactly as supplied

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// A lot number contained whitespace between its characters
    #[error("Lot number cannot contain whitespace: '{0}'")]
    LotNumberWhitespace(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A manufacturer lot number as printed on the vial or box.
///
/// Scanners sometimes pad the value, so surrounding whitespace is trimmed. Interior
/// whitespace is rejected because no manufacturer format uses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LotNumber(String);

impl LotNumber {
    /// Parses a lot number.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input and [`TextError::LotNumberWhitespace`]
    /// when whitespace appears inside the value.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(TextError::LotNumberWhitespace(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The antigen a product protects against (for example `Tdap` or `Zoster`).
///
/// Antigens are matched against eligibility responses by exact string equality, so the
/// value is stored verbatim: no trimming and no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Antigen(String);

impl Antigen {
    /// Creates an antigen name.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the input is blank.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let value = input.into();
        if value.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! text_type_impls {
    ($ty:ident, $ctor:expr) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ctor(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

text_type_impls!(NonEmptyText, NonEmptyText::new);
text_type_impls!(LotNumber, LotNumber::new);
text_type_impls!(Antigen, Antigen::new);
