//! Med D copay aggregation.
//!
//! The eligibility service answers a Med D check with one copay entry per antigen. The cart
//! total is the sum, over every dose supplied, of the copays whose antigen equals the dose's
//! antigen.
//!
//! Matching is exact string equality. `"Tdap"` and `"TDAP"` are different antigens here;
//! upstream naming has to agree with the product catalog.

use crate::dose::DoseLineItem;
use checkout_types::Antigen;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One antigen's entry in a Med D eligibility response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCopayInfo {
    pub antigen: Antigen,
    pub copay: Decimal,
    #[serde(default)]
    pub eligible: bool,
}

/// The fields of a Med D eligibility response the checkout engine reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedDCheckResponse {
    #[serde(default)]
    pub copays: Vec<ProductCopayInfo>,
}

impl MedDCheckResponse {
    /// The first copay entry for `antigen`, if any.
    pub fn copay_for(&self, antigen: &Antigen) -> Option<&ProductCopayInfo> {
        self.copays.iter().find(|c| &c.antigen == antigen)
    }
}

/// Sum copays for a list of antigens.
///
/// Each antigen contributes every matching copay entry, so an antigen listed twice is
/// counted twice.
pub fn copay_total_for_antigens<'a>(
    response: &MedDCheckResponse,
    antigens: impl IntoIterator<Item = &'a Antigen>,
) -> Decimal {
    antigens
        .into_iter()
        .map(|antigen| {
            response
                .copays
                .iter()
                .filter(|c| &c.antigen == antigen)
                .map(|c| c.copay)
                .sum::<Decimal>()
        })
        .sum()
}

/// Total copay for the supplied doses.
///
/// The caller decides which doses count; removed or deleted line items are not filtered here.
pub fn get_copay_total_value(response: &MedDCheckResponse, doses: &[DoseLineItem]) -> Decimal {
    copay_total_for_antigens(response, doses.iter().map(|d| d.antigen()))
}
