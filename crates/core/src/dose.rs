//! Dose line items and their payment mutations.
//!
//! A [`DoseLineItem`] is one vaccine dose (or one unfulfilled order) in the cart of an active
//! checkout session. It owns two independent axes of state:
//! - lifecycle: [`DoseState`] plus the `is_deleted` flag
//! - payment classification: mode, reason, the rollback target `original_payment_mode`, and
//!   the issue (`mark_condition`) that forced the classification
//!
//! Payment operations never touch the lifecycle axis and lifecycle operations never touch
//! the payment axis.
//!
//! Invariants:
//! - `original_payment_mode` is set at construction and changed only by
//!   [`DoseLineItem::override_payment_mode_and_original_payment_mode`]
//! - every flip can be undone back to `original_payment_mode`
//! - an `Ordered` item has no payment classification until it is fulfilled
//! - line items are never dropped during a session; removal sets `is_deleted`

use crate::appointment::{AdministeredVaccine, ClinicalOrder};
use crate::copay::ProductCopayInfo;
use crate::dose_state::DoseState;
use crate::issues::ProductIssue;
use crate::payment::{classify, PaymentMethod, PaymentMode, PaymentModeReason};
use crate::product::{LotWithProduct, OneTouchPricing, Product};
use crate::{CheckoutError, CheckoutResult};
use checkout_types::{Antigen, LotNumber, NonEmptyText};
use checkout_uuid::SessionDoseId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a line item entered the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DoseSource {
    /// Barcode scan of a vial or box.
    Scanned,
    /// Lot typed or picked from a search list.
    ManualLotEntry,
    /// Surfaced from, or fulfilling, a clinical order.
    Order,
    /// Cloned from another line item to split its payment.
    Duplicate,
    /// Rebuilt from a dose saved earlier in this visit.
    AdministeredRecord,
}

/// Payment values saved immediately before a line item is duplicated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRevertSnapshot {
    pub original_payment_mode: Option<PaymentMode>,
    pub payment_mode: Option<PaymentMode>,
    pub payment_mode_reason: Option<PaymentModeReason>,
    pub mark_condition: Option<ProductIssue>,
}

/// Capture the revert values of `item` without storing them.
pub fn snapshot(item: &DoseLineItem) -> PaymentRevertSnapshot {
    PaymentRevertSnapshot {
        original_payment_mode: item.original_payment_mode,
        payment_mode: item.payment_mode,
        payment_mode_reason: item.payment_mode_reason,
        mark_condition: item.mark_condition,
    }
}

/// Apply `snapshot` to `item` and return it.
pub fn restore(mut item: DoseLineItem, snapshot: &PaymentRevertSnapshot) -> DoseLineItem {
    item.apply_revert_values(snapshot);
    item
}

/// Everything needed to construct a line item from a catalog lot.
#[derive(Clone, Debug)]
pub struct DoseParams {
    pub lot: LotWithProduct,
    pub issues: BTreeSet<ProductIssue>,
    /// Explicit payer for this dose. Falls back to `payment_method` when absent.
    pub payment_mode: Option<PaymentMode>,
    pub payment_mode_reason: Option<PaymentModeReason>,
    /// The visit-level payment method.
    pub payment_method: Option<PaymentMethod>,
    pub dose_series: Option<u32>,
    pub sources: BTreeSet<DoseSource>,
    pub dose_state: DoseState,
    pub order_number: Option<NonEmptyText>,
    pub copay: Option<ProductCopayInfo>,
    /// Overrides the pricing carried on the lot.
    pub one_touch: Option<OneTouchPricing>,
}

impl DoseParams {
    pub fn new(lot: LotWithProduct) -> Self {
        Self {
            lot,
            issues: BTreeSet::new(),
            payment_mode: None,
            payment_mode_reason: None,
            payment_method: None,
            dose_series: None,
            sources: BTreeSet::new(),
            dose_state: DoseState::Added,
            order_number: None,
            copay: None,
            one_touch: None,
        }
    }
}

/// One vaccine dose or unfulfilled order in the checkout cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseLineItem {
    id: SessionDoseId,
    product: Product,
    lot_number: Option<LotNumber>,
    expiration_date: Option<NaiveDate>,
    dose_series: Option<u32>,
    dose_state: DoseState,
    payment_mode: Option<PaymentMode>,
    payment_mode_reason: Option<PaymentModeReason>,
    original_payment_mode: Option<PaymentMode>,
    mark_condition: Option<ProductIssue>,
    missing_insurance_self_pay: bool,
    missing_insurance_partner_bill: bool,
    issues: BTreeSet<ProductIssue>,
    is_deleted: bool,
    order_number: Option<NonEmptyText>,
    copay: Option<ProductCopayInfo>,
    one_touch: Option<OneTouchPricing>,
    sources: BTreeSet<DoseSource>,
    duplicate_of: Option<SessionDoseId>,
    revert_snapshot: Option<PaymentRevertSnapshot>,
}

impl DoseLineItem {
    /// Construct a line item from a fully populated parameter set.
    ///
    /// The payment classification is resolved with [`classify`]; an `Ordered` dose state
    /// leaves it empty.
    pub fn from_params(params: DoseParams) -> Self {
        let DoseParams {
            lot,
            issues,
            payment_mode,
            payment_mode_reason,
            payment_method,
            dose_series,
            sources,
            dose_state,
            order_number,
            copay,
            one_touch,
        } = params;

        let (payment_mode, payment_mode_reason, mark_condition) = match dose_state {
            DoseState::Ordered => (None, None, None),
            DoseState::Added
            | DoseState::Removed
            | DoseState::Administered
            | DoseState::AdministeredRemoved => {
                let c = classify(payment_mode, payment_mode_reason, payment_method, &issues);
                (Some(c.payment_mode), c.payment_mode_reason, c.mark_condition)
            }
        };

        let is_deleted = matches!(
            dose_state,
            DoseState::Removed | DoseState::AdministeredRemoved
        );

        Self {
            id: SessionDoseId::new(),
            product: lot.product,
            lot_number: Some(lot.lot_number),
            expiration_date: lot.expiration_date,
            dose_series,
            dose_state,
            payment_mode,
            payment_mode_reason,
            original_payment_mode: payment_mode,
            mark_condition,
            missing_insurance_self_pay: false,
            missing_insurance_partner_bill: false,
            issues,
            is_deleted,
            order_number,
            copay,
            one_touch: one_touch.or(lot.one_touch),
            sources,
            duplicate_of: None,
            revert_snapshot: None,
        }
    }

    /// Rebuild a line item from a dose persisted earlier in the visit.
    pub fn from_administered(record: &AdministeredVaccine) -> Self {
        let dose_state = DoseState::from_administered(record.is_deleted);
        Self {
            id: SessionDoseId::new(),
            product: record.product.clone(),
            lot_number: Some(record.lot_number.clone()),
            expiration_date: record.expiration_date,
            dose_series: record.dose_series,
            dose_state,
            payment_mode: Some(record.payment_mode),
            payment_mode_reason: record.payment_mode_reason,
            original_payment_mode: Some(record.payment_mode),
            mark_condition: None,
            missing_insurance_self_pay: false,
            missing_insurance_partner_bill: false,
            issues: BTreeSet::new(),
            is_deleted: record.is_deleted,
            order_number: record.order_number.clone(),
            copay: None,
            one_touch: None,
            sources: BTreeSet::from([DoseSource::AdministeredRecord]),
            duplicate_of: None,
            revert_snapshot: None,
        }
    }

    /// Surface an unfulfilled clinical order as an `Ordered` line item.
    pub fn from_order(order: &ClinicalOrder) -> Self {
        Self {
            id: SessionDoseId::new(),
            product: order.product.clone(),
            lot_number: None,
            expiration_date: None,
            dose_series: None,
            dose_state: DoseState::Ordered,
            payment_mode: None,
            payment_mode_reason: None,
            original_payment_mode: None,
            mark_condition: None,
            missing_insurance_self_pay: false,
            missing_insurance_partner_bill: false,
            issues: BTreeSet::new(),
            is_deleted: false,
            order_number: Some(order.order_number.clone()),
            copay: None,
            one_touch: None,
            sources: BTreeSet::from([DoseSource::Order]),
            duplicate_of: None,
            revert_snapshot: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> SessionDoseId {
        self.id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn antigen(&self) -> &Antigen {
        &self.product.antigen
    }

    pub fn lot_number(&self) -> Option<&LotNumber> {
        self.lot_number.as_ref()
    }

    pub fn expiration_date(&self) -> Option<NaiveDate> {
        self.expiration_date
    }

    pub fn dose_series(&self) -> Option<u32> {
        self.dose_series
    }

    pub fn dose_state(&self) -> DoseState {
        self.dose_state
    }

    pub fn payment_mode(&self) -> Option<PaymentMode> {
        self.payment_mode
    }

    pub fn payment_mode_reason(&self) -> Option<PaymentModeReason> {
        self.payment_mode_reason
    }

    pub fn original_payment_mode(&self) -> Option<PaymentMode> {
        self.original_payment_mode
    }

    pub fn mark_condition(&self) -> Option<ProductIssue> {
        self.mark_condition
    }

    pub fn missing_insurance_self_pay(&self) -> bool {
        self.missing_insurance_self_pay
    }

    pub fn missing_insurance_partner_bill(&self) -> bool {
        self.missing_insurance_partner_bill
    }

    pub fn issues(&self) -> &BTreeSet<ProductIssue> {
        &self.issues
    }

    /// Whether any issue on this dose must be shown to the user.
    pub fn has_display_issue(&self) -> bool {
        self.issues.iter().any(ProductIssue::is_display_issue)
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn order_number(&self) -> Option<&NonEmptyText> {
        self.order_number.as_ref()
    }

    pub fn copay(&self) -> Option<&ProductCopayInfo> {
        self.copay.as_ref()
    }

    pub fn one_touch(&self) -> Option<&OneTouchPricing> {
        self.one_touch.as_ref()
    }

    pub fn sources(&self) -> &BTreeSet<DoseSource> {
        &self.sources
    }

    pub fn duplicate_of(&self) -> Option<SessionDoseId> {
        self.duplicate_of
    }

    pub fn revert_snapshot(&self) -> Option<&PaymentRevertSnapshot> {
        self.revert_snapshot.as_ref()
    }

    /// Whether the dose counts towards the visit: active state and not deleted.
    pub fn is_active(&self) -> bool {
        !self.is_deleted && self.dose_state.is_active()
    }

    // ------------------------------------------------------------------------
    // Payment mutations
    // ------------------------------------------------------------------------

    /// Switch the dose to self-pay because insurance is missing, or back to its original
    /// payer.
    ///
    /// The two missing-insurance flips are exclusive: either call clears the partner-bill
    /// flag, so the flags always agree with the current mode. Idempotent. A no-op on
    /// `Ordered` items.
    pub fn flip_self_pay(&mut self, active: bool) {
        if self.dose_state == DoseState::Ordered {
            tracing::debug!("ignoring self-pay flip on ordered dose {}", self.id);
            return;
        }
        if active {
            self.payment_mode = Some(PaymentMode::SelfPay);
        } else {
            self.payment_mode = self.original_payment_mode;
        }
        self.missing_insurance_self_pay = active;
        self.missing_insurance_partner_bill = false;
        tracing::debug!(
            "dose {} self-pay flip {} -> {:?}",
            self.id,
            active,
            self.payment_mode
        );
    }

    /// Switch the dose to partner billing because insurance is missing, or back to its
    /// original payer.
    ///
    /// Clears the self-pay flag, see [`Self::flip_self_pay`]. Idempotent. A no-op on
    /// `Ordered` items.
    pub fn flip_partner_bill(&mut self, active: bool) {
        if self.dose_state == DoseState::Ordered {
            tracing::debug!("ignoring partner-bill flip on ordered dose {}", self.id);
            return;
        }
        if active {
            self.payment_mode = Some(PaymentMode::PartnerBill);
        } else {
            self.payment_mode = self.original_payment_mode;
        }
        self.missing_insurance_partner_bill = active;
        self.missing_insurance_self_pay = false;
        tracing::debug!(
            "dose {} partner-bill flip {} -> {:?}",
            self.id,
            active,
            self.payment_mode
        );
    }

    /// Replace both the current payer and the rollback target.
    ///
    /// Used when a new canonical answer (for example a later server response) supersedes
    /// the classification the dose was created with.
    pub fn override_payment_mode_and_original_payment_mode(&mut self, mode: PaymentMode) {
        self.payment_mode = Some(mode);
        self.original_payment_mode = Some(mode);
        tracing::debug!("dose {} payment mode overridden to {:?}", self.id, mode);
    }

    /// [`Self::override_payment_mode_and_original_payment_mode`] plus the audit reason.
    pub fn override_payment_mode_with_reason(
        &mut self,
        mode: PaymentMode,
        reason: PaymentModeReason,
    ) {
        self.override_payment_mode_and_original_payment_mode(mode);
        self.payment_mode_reason = Some(reason);
    }

    /// Save the payment values this dose will need back if its duplicate is deleted.
    pub fn save_payment_mode_revert_values_before_duplicating(&mut self) -> PaymentRevertSnapshot {
        let saved = snapshot(self);
        self.revert_snapshot = Some(saved);
        saved
    }

    /// Put back the payment values saved before duplicating and clear the saved slot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingRevertSnapshot`] when nothing was saved; the payment
    /// fields are left untouched.
    pub fn restore_payment_mode_revert_values_after_deleting_duplicate(
        &mut self,
    ) -> CheckoutResult<()> {
        let Some(saved) = self.revert_snapshot.take() else {
            tracing::warn!("no payment revert values saved for dose {}", self.id);
            return Err(CheckoutError::MissingRevertSnapshot { dose_id: self.id });
        };
        self.apply_revert_values(&saved);
        Ok(())
    }

    fn apply_revert_values(&mut self, saved: &PaymentRevertSnapshot) {
        self.original_payment_mode = saved.original_payment_mode;
        self.payment_mode = saved.payment_mode;
        self.payment_mode_reason = saved.payment_mode_reason;
        self.mark_condition = saved.mark_condition;
    }

    /// Attach the Med D copay resolved for this dose's antigen.
    pub fn set_copay(&mut self, copay: Option<ProductCopayInfo>) {
        self.copay = copay;
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Mark the dose removed. The line item stays in the cart for audit.
    pub fn mark_removed(&mut self) {
        self.is_deleted = true;
        self.dose_state = self.dose_state.after_removal();
    }

    /// Undo [`Self::mark_removed`].
    pub fn undo_removal(&mut self) {
        self.is_deleted = false;
        self.dose_state = self.dose_state.after_undo_removal();
    }

    /// Fulfil an `Ordered` line item with a scanned lot.
    ///
    /// The line item keeps its id and order number; it takes the lot's product and gets its
    /// first payment classification.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidDoseState`] unless the item is an open order.
    pub fn fulfil_order(
        &mut self,
        lot: LotWithProduct,
        issues: BTreeSet<ProductIssue>,
        payment_method: Option<PaymentMethod>,
    ) -> CheckoutResult<()> {
        if self.dose_state != DoseState::Ordered || self.is_deleted {
            return Err(CheckoutError::InvalidDoseState {
                dose_id: self.id,
                state: self.dose_state,
                operation: "fulfil",
            });
        }

        let c = classify(None, None, payment_method, &issues);
        self.product = lot.product;
        self.lot_number = Some(lot.lot_number);
        self.expiration_date = lot.expiration_date;
        self.one_touch = lot.one_touch;
        self.issues = issues;
        self.dose_state = DoseState::Added;
        self.payment_mode = Some(c.payment_mode);
        self.original_payment_mode = Some(c.payment_mode);
        self.payment_mode_reason = c.payment_mode_reason;
        self.mark_condition = c.mark_condition;
        tracing::debug!("order dose {} fulfilled as {:?}", self.id, c.payment_mode);
        Ok(())
    }

    /// Clone this line item as a new cart entry for a payment split.
    ///
    /// The clone gets a fresh id, records which item it was cloned from, and starts without
    /// a revert snapshot.
    pub fn duplicate(&self) -> Self {
        let mut clone = self.clone();
        clone.id = SessionDoseId::new();
        clone.sources.insert(DoseSource::Duplicate);
        clone.duplicate_of = Some(self.id);
        clone.revert_snapshot = None;
        clone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copay::{get_copay_total_value, MedDCheckResponse};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn lot(antigen: &str) -> LotWithProduct {
        LotWithProduct {
            lot_number: LotNumber::new("J0021A").unwrap(),
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 31),
            product: Product {
                id: 7,
                display_name: NonEmptyText::new("Boostrix").unwrap(),
                antigen: Antigen::new(antigen).unwrap(),
                series_size: None,
            },
            one_touch: None,
        }
    }

    fn insurance_dose() -> DoseLineItem {
        let mut params = DoseParams::new(lot("Tdap"));
        params.payment_method = Some(PaymentMethod::InsuranceBilled);
        DoseLineItem::from_params(params)
    }

    fn order() -> ClinicalOrder {
        ClinicalOrder {
            order_id: 11,
            order_number: NonEmptyText::new("ORD-11").unwrap(),
            patient_visit_id: None,
            product: lot("Tdap").product,
            expiration_date: Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn new_dose_starts_added_with_original_mode() {
        let dose = insurance_dose();
        assert_eq!(dose.dose_state(), DoseState::Added);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::InsurancePay));
        assert_eq!(dose.original_payment_mode(), Some(PaymentMode::InsurancePay));
        assert!(!dose.is_deleted());
    }

    #[test]
    fn self_pay_flip_round_trips_to_original() {
        let mut dose = insurance_dose();
        dose.flip_self_pay(true);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::SelfPay));
        assert!(dose.missing_insurance_self_pay());

        dose.flip_self_pay(false);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::InsurancePay));
        assert!(!dose.missing_insurance_self_pay());
    }

    #[test]
    fn flips_are_idempotent() {
        let mut dose = insurance_dose();
        dose.flip_partner_bill(true);
        let once = dose.clone();
        dose.flip_partner_bill(true);
        assert_eq!(dose, once);

        dose.flip_partner_bill(false);
        let once = dose.clone();
        dose.flip_partner_bill(false);
        assert_eq!(dose, once);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::InsurancePay));
    }

    #[test]
    fn switching_flips_keeps_flags_in_line_with_mode() {
        let mut dose = insurance_dose();
        dose.flip_partner_bill(true);
        dose.flip_self_pay(true);
        assert!(dose.missing_insurance_self_pay());
        assert!(!dose.missing_insurance_partner_bill());

        dose.flip_self_pay(false);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::InsurancePay));
        assert!(!dose.missing_insurance_self_pay());
        assert!(!dose.missing_insurance_partner_bill());
    }

    #[test]
    fn flips_never_change_dose_state() {
        let mut dose = insurance_dose();
        dose.mark_removed();
        dose.flip_self_pay(true);
        dose.flip_partner_bill(true);
        dose.override_payment_mode_and_original_payment_mode(PaymentMode::EmployerPay);
        assert_eq!(dose.dose_state(), DoseState::Removed);
    }

    #[test]
    fn override_moves_the_rollback_target() {
        let mut dose = insurance_dose();
        dose.override_payment_mode_with_reason(
            PaymentMode::PartnerBill,
            PaymentModeReason::PartnerOverride,
        );
        dose.flip_self_pay(true);
        dose.flip_self_pay(false);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::PartnerBill));
        assert_eq!(dose.original_payment_mode(), Some(PaymentMode::PartnerBill));
        assert_eq!(
            dose.payment_mode_reason(),
            Some(PaymentModeReason::PartnerOverride)
        );
    }

    #[test]
    fn save_then_restore_is_a_no_op() {
        let mut params = DoseParams::new(lot("Tdap"));
        params.issues.insert(ProductIssue::OutOfAgeIndication);
        let mut dose = DoseLineItem::from_params(params);
        dose.flip_partner_bill(true);
        let before = snapshot(&dose);

        let saved = dose.save_payment_mode_revert_values_before_duplicating();
        assert_eq!(saved, before);
        dose.restore_payment_mode_revert_values_after_deleting_duplicate()
            .expect("snapshot was saved");

        assert_eq!(snapshot(&dose), before);
        assert!(dose.revert_snapshot().is_none());
    }

    #[test]
    fn restore_undoes_changes_made_after_saving() {
        let mut dose = insurance_dose();
        dose.save_payment_mode_revert_values_before_duplicating();
        dose.override_payment_mode_with_reason(PaymentMode::SelfPay, PaymentModeReason::RiskFlip);

        dose.restore_payment_mode_revert_values_after_deleting_duplicate()
            .expect("snapshot was saved");
        assert_eq!(dose.payment_mode(), Some(PaymentMode::InsurancePay));
        assert_eq!(dose.original_payment_mode(), Some(PaymentMode::InsurancePay));
        assert_eq!(dose.payment_mode_reason(), None);
    }

    #[test]
    fn restore_without_snapshot_fails_and_keeps_fields() {
        let mut dose = insurance_dose();
        dose.flip_self_pay(true);
        let before = snapshot(&dose);

        let err = dose
            .restore_payment_mode_revert_values_after_deleting_duplicate()
            .expect_err("nothing was saved");
        assert!(matches!(err, CheckoutError::MissingRevertSnapshot { dose_id } if dose_id == dose.id()));
        assert_eq!(snapshot(&dose), before);
    }

    #[test]
    fn pure_restore_applies_snapshot() {
        let dose = insurance_dose();
        let saved = snapshot(&dose);
        let mut changed = dose.clone();
        changed.override_payment_mode_and_original_payment_mode(PaymentMode::NoPay);

        let restored = restore(changed, &saved);
        assert_eq!(restored, dose);
    }

    #[test]
    fn issue_override_records_mark_condition() {
        let mut params = DoseParams::new(lot("Tdap"));
        params.payment_mode = Some(PaymentMode::InsurancePay);
        params.issues.insert(ProductIssue::WrongStock);
        let dose = DoseLineItem::from_params(params);

        assert_eq!(dose.payment_mode(), Some(PaymentMode::PartnerBill));
        assert_eq!(dose.original_payment_mode(), Some(PaymentMode::PartnerBill));
        assert_eq!(
            dose.payment_mode_reason(),
            Some(PaymentModeReason::InvalidStockSelected)
        );
        assert_eq!(dose.mark_condition(), Some(ProductIssue::WrongStock));
        assert!(dose.has_display_issue());
    }

    #[test]
    fn ordered_dose_has_no_classification_and_ignores_flips() {
        let mut dose = DoseLineItem::from_order(&order());
        assert_eq!(dose.dose_state(), DoseState::Ordered);
        assert_eq!(dose.payment_mode(), None);

        dose.flip_self_pay(true);
        assert_eq!(dose.payment_mode(), None);
        assert!(!dose.missing_insurance_self_pay());
    }

    #[test]
    fn fulfilling_an_order_classifies_it() {
        let mut dose = DoseLineItem::from_order(&order());
        let id = dose.id();
        dose.fulfil_order(lot("Tdap"), BTreeSet::new(), Some(PaymentMethod::SelfPay))
            .expect("open order");

        assert_eq!(dose.id(), id);
        assert_eq!(dose.dose_state(), DoseState::Added);
        assert_eq!(dose.payment_mode(), Some(PaymentMode::SelfPay));
        assert_eq!(dose.order_number().map(|o| o.as_str()), Some("ORD-11"));
        assert!(dose.lot_number().is_some());
    }

    #[test]
    fn fulfilling_a_non_order_is_rejected() {
        let mut dose = insurance_dose();
        let err = dose
            .fulfil_order(lot("Tdap"), BTreeSet::new(), None)
            .expect_err("not an order");
        assert!(matches!(
            err,
            CheckoutError::InvalidDoseState { state: DoseState::Added, .. }
        ));
    }

    #[test]
    fn administered_record_builds_administered_item() {
        let record = AdministeredVaccine {
            id: 3,
            product: lot("Tdap").product,
            lot_number: LotNumber::new("J0021A").unwrap(),
            expiration_date: None,
            dose_series: Some(1),
            payment_mode: PaymentMode::EmployerPay,
            payment_mode_reason: None,
            order_number: None,
            is_deleted: true,
        };
        let dose = DoseLineItem::from_administered(&record);
        assert_eq!(dose.dose_state(), DoseState::AdministeredRemoved);
        assert!(dose.is_deleted());
        assert_eq!(dose.original_payment_mode(), Some(PaymentMode::EmployerPay));
    }

    #[test]
    fn duplicate_gets_new_identity() {
        let mut dose = insurance_dose();
        dose.save_payment_mode_revert_values_before_duplicating();
        let clone = dose.duplicate();

        assert_ne!(clone.id(), dose.id());
        assert_eq!(clone.duplicate_of(), Some(dose.id()));
        assert!(clone.sources().contains(&DoseSource::Duplicate));
        assert!(clone.revert_snapshot().is_none());
    }

    #[test]
    fn copay_total_counts_only_cart_antigens() {
        let response: MedDCheckResponse = serde_json::from_str(
            r#"{"copays": [
                {"antigen": "Tdap", "copay": "24.00", "eligible": true},
                {"antigen": "Zoster", "copay": "60.00", "eligible": true}
            ]}"#,
        )
        .expect("valid response");

        let doses = vec![insurance_dose()];
        assert_eq!(
            get_copay_total_value(&response, &doses),
            Decimal::new(2400, 2)
        );
    }
}
