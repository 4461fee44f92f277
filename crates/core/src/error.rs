use crate::dose_state::DoseState;
use checkout_uuid::SessionDoseId;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    InvalidText(#[from] checkout_types::TextError),

    #[error("dose {0} is not part of this checkout session")]
    DoseNotFound(SessionDoseId),
    #[error("lot {0} is not in the product catalog")]
    LotNotFound(String),
    #[error("order {0} has no open line item in this checkout session")]
    OrderNotFound(String),
    #[error("appointment {0} not found")]
    AppointmentNotFound(i64),

    #[error("dose {dose_id} has no saved payment revert values to restore")]
    MissingRevertSnapshot { dose_id: SessionDoseId },
    #[error("dose {0} is not a duplicate of another line item")]
    NotADuplicate(SessionDoseId),
    #[error("cannot {operation} dose {dose_id} while it is {state:?}")]
    InvalidDoseState {
        dose_id: SessionDoseId,
        state: DoseState,
        operation: &'static str,
    },
}

pub type CheckoutResult<T> = std::result::Result<T, CheckoutError>;
