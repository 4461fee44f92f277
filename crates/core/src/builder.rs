//! Staged construction of dose line items.
//!
//! Scanning screens accumulate a lot lookup, detected issues and payer choices in several
//! steps. [`DoseBuilder`] collects them in any order and lowers onto
//! [`DoseLineItem::from_params`] once a lot has been attached.

use crate::copay::ProductCopayInfo;
use crate::dose::{DoseLineItem, DoseParams, DoseSource};
use crate::dose_state::DoseState;
use crate::issues::ProductIssue;
use crate::payment::{PaymentMethod, PaymentMode, PaymentModeReason};
use crate::product::{LotWithProduct, OneTouchPricing};
use checkout_types::NonEmptyText;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct DoseBuilder {
    lot: Option<LotWithProduct>,
    issues: BTreeSet<ProductIssue>,
    payment_mode: Option<PaymentMode>,
    payment_mode_reason: Option<PaymentModeReason>,
    payment_method: Option<PaymentMethod>,
    dose_series: Option<u32>,
    sources: BTreeSet<DoseSource>,
    dose_state: Option<DoseState>,
    order_number: Option<NonEmptyText>,
    copay: Option<ProductCopayInfo>,
    one_touch: Option<OneTouchPricing>,
}

impl DoseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the lot and product. Required before [`Self::build`].
    pub fn lot_number_with_product(mut self, lot: LotWithProduct) -> Self {
        self.lot = Some(lot);
        self
    }

    /// Add detected issues to the accumulated set.
    pub fn issues(mut self, issues: impl IntoIterator<Item = ProductIssue>) -> Self {
        self.issues.extend(issues);
        self
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = Some(mode);
        self
    }

    pub fn payment_mode_reason(mut self, reason: PaymentModeReason) -> Self {
        self.payment_mode_reason = Some(reason);
        self
    }

    /// The visit-level payment method, used when no explicit mode is given.
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn dose_series(mut self, series: u32) -> Self {
        self.dose_series = Some(series);
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = DoseSource>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Override the default `Added` state.
    pub fn dose_state(mut self, state: DoseState) -> Self {
        self.dose_state = Some(state);
        self
    }

    pub fn order_number(mut self, order_number: NonEmptyText) -> Self {
        self.order_number = Some(order_number);
        self
    }

    pub fn copay(mut self, copay: ProductCopayInfo) -> Self {
        self.copay = Some(copay);
        self
    }

    pub fn one_touch(mut self, pricing: OneTouchPricing) -> Self {
        self.one_touch = Some(pricing);
        self
    }

    /// Lower the accumulated values into a parameter set, or `None` without a lot.
    pub fn into_params(self) -> Option<DoseParams> {
        let lot = self.lot?;
        Some(DoseParams {
            lot,
            issues: self.issues,
            payment_mode: self.payment_mode,
            payment_mode_reason: self.payment_mode_reason,
            payment_method: self.payment_method,
            dose_series: self.dose_series,
            sources: self.sources,
            dose_state: self.dose_state.unwrap_or(DoseState::Added),
            order_number: self.order_number,
            copay: self.copay,
            one_touch: self.one_touch,
        })
    }

    /// Build the line item. Returns `None` when no lot/product was attached.
    pub fn build(self) -> Option<DoseLineItem> {
        let params = self.into_params();
        if params.is_none() {
            tracing::debug!("dose build skipped: no lot attached");
        }
        params.map(DoseLineItem::from_params)
    }
}
