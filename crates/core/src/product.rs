//! Product and lot records resolved from the product catalog.

use checkout_types::{Antigen, LotNumber, NonEmptyText};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A vaccine product as known to the clinic's inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub display_name: NonEmptyText,
    pub antigen: Antigen,
    /// Number of doses in the full series, if the product is given as a series.
    #[serde(default)]
    pub series_size: Option<u32>,
}

/// Self-pay pricing attached to a lot by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTouchPricing {
    pub self_pay_rate: Decimal,
}

/// A scanned or searched lot together with the product it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotWithProduct {
    pub lot_number: LotNumber,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    pub product: Product,
    #[serde(default)]
    pub one_touch: Option<OneTouchPricing>,
}

impl LotWithProduct {
    /// True when the lot has an expiration date strictly before `today`.
    ///
    /// A lot is usable through the last day printed on it.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|exp| exp < today)
    }
}
