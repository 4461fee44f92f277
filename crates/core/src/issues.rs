use serde::{Deserialize, Serialize};

/// A problem detected with a product or lot when it was added to the cart.
///
/// A dose may carry any number of these at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductIssue {
    Expired,
    OutOfAgeIndication,
    RestrictedProduct,
    WrongStock,
    MissingLotNumber,
}

impl ProductIssue {
    /// Issues that must be surfaced to the user as a warning on the dose.
    pub const DISPLAY_ISSUES: [ProductIssue; 4] = [
        ProductIssue::Expired,
        ProductIssue::OutOfAgeIndication,
        ProductIssue::RestrictedProduct,
        ProductIssue::WrongStock,
    ];

    pub fn is_display_issue(&self) -> bool {
        match self {
            ProductIssue::Expired
            | ProductIssue::OutOfAgeIndication
            | ProductIssue::RestrictedProduct
            | ProductIssue::WrongStock => true,
            ProductIssue::MissingLotNumber => false,
        }
    }
}
