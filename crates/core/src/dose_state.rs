use serde::{Deserialize, Serialize};

/// Lifecycle state of a dose line item within a checkout session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoseState {
    /// Added to the cart during this session.
    Added,
    /// Added during this session, then removed by the user.
    Removed,
    /// Administered in an earlier save of this visit.
    Administered,
    /// Administered earlier, then removed.
    AdministeredRemoved,
    /// A clinical order surfaced in the cart but not yet fulfilled by a scanned dose.
    Ordered,
}

impl DoseState {
    /// Initial state for a line item rebuilt from a persisted administered record.
    pub fn from_administered(is_deleted: bool) -> Self {
        if is_deleted {
            DoseState::AdministeredRemoved
        } else {
            DoseState::Administered
        }
    }

    /// State after the user removes the line item.
    ///
    /// Removed states are fixed points. An unfulfilled order stays `Ordered`; only the line
    /// item's deleted flag records that it was dismissed.
    pub fn after_removal(self) -> Self {
        match self {
            DoseState::Added => DoseState::Removed,
            DoseState::Administered => DoseState::AdministeredRemoved,
            DoseState::Removed | DoseState::AdministeredRemoved | DoseState::Ordered => self,
        }
    }

    /// State after a removal is undone.
    pub fn after_undo_removal(self) -> Self {
        match self {
            DoseState::Removed => DoseState::Added,
            DoseState::AdministeredRemoved => DoseState::Administered,
            DoseState::Added | DoseState::Administered | DoseState::Ordered => self,
        }
    }

    /// Whether the dose currently counts towards the visit.
    pub fn is_active(&self) -> bool {
        match self {
            DoseState::Added | DoseState::Administered => true,
            DoseState::Removed | DoseState::AdministeredRemoved | DoseState::Ordered => false,
        }
    }
}
