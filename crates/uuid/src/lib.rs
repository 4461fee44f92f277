//! Session-scoped identifiers for checkout line items.
//!
//! Every dose line item added during a checkout session gets an identifier that is stable for
//! the lifetime of the session and independent of any server-assigned id. Orders surfaced
//! from the server, administered doses reloaded from storage, and duplicates cloned during a
//! payment split all receive a fresh one.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the value produced by `Uuid::new_v4().simple().to_string()`. Identifiers coming
//! back from the persistence layer must already be canonical; [`SessionDoseId::parse`]
//! rejects hyphenated or uppercase input instead of normalising it.

mod dose_id;

pub use dose_id::{SessionDoseId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
