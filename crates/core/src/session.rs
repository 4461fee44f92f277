//! Checkout session: the cart of dose line items for one appointment.
//!
//! A session is opened from an [`Appointment`], seeded with the doses already administered
//! in the visit and the open clinical orders, and then mutated by scans, payer changes,
//! payment splits and removals until it is committed.
//!
//! Line items are never dropped. Removal only flags them, so the committed cart is a full
//! audit of what happened during checkout.
//!
//! The session reads no clock. The instant it was opened at is fixed at construction and the
//! clinic-local "today" is derived from it through [`CheckoutConfig`].

use crate::appointment::{Appointment, MedDGate};
use crate::builder::DoseBuilder;
use crate::config::CheckoutConfig;
use crate::copay::{copay_total_for_antigens, MedDCheckResponse};
use crate::dose::{DoseLineItem, DoseSource};
use crate::dose_state::DoseState;
use crate::issues::ProductIssue;
use crate::payment::{PaymentMode, PaymentModeReason};
use crate::product::LotWithProduct;
use crate::repositories::{AppointmentStore, ProductCatalog};
use crate::{CheckoutError, CheckoutResult};
use checkout_types::LotNumber;
use checkout_uuid::SessionDoseId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
pub struct CheckoutSession {
    appointment: Appointment,
    config: CheckoutConfig,
    opened_at: DateTime<Utc>,
    doses: Vec<DoseLineItem>,
    med_d_response: Option<MedDCheckResponse>,
}

impl CheckoutSession {
    /// Open a session for `appointment` at the instant `now`.
    ///
    /// The cart starts with one line item per administered dose and one `Ordered` line item
    /// per open order the visit surfaces.
    pub fn new(appointment: Appointment, config: CheckoutConfig, now: DateTime<Utc>) -> Self {
        let mut doses = appointment.administered_line_items();
        doses.extend(
            appointment
                .surfaced_orders(now)
                .into_iter()
                .map(DoseLineItem::from_order),
        );
        tracing::debug!(
            "opened checkout session for appointment {} with {} line items",
            appointment.id,
            doses.len()
        );

        Self {
            appointment,
            config,
            opened_at: now,
            doses,
            med_d_response: None,
        }
    }

    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// The clinic-local date the session was opened on.
    pub fn today(&self) -> NaiveDate {
        self.config.local_date(self.opened_at)
    }

    /// Every line item, removed ones included, in cart order.
    pub fn doses(&self) -> &[DoseLineItem] {
        &self.doses
    }

    /// Line items that count towards the visit.
    pub fn active_doses(&self) -> impl Iterator<Item = &DoseLineItem> {
        self.doses.iter().filter(|d| d.is_active())
    }

    pub fn dose(&self, id: SessionDoseId) -> CheckoutResult<&DoseLineItem> {
        self.doses
            .iter()
            .find(|d| d.id() == id)
            .ok_or(CheckoutError::DoseNotFound(id))
    }

    pub fn dose_mut(&mut self, id: SessionDoseId) -> CheckoutResult<&mut DoseLineItem> {
        self.doses
            .iter_mut()
            .find(|d| d.id() == id)
            .ok_or(CheckoutError::DoseNotFound(id))
    }

    pub fn med_d_gate(&self) -> MedDGate {
        self.appointment.med_d_gate(self.today())
    }

    pub fn non_expired_orders_count(&self) -> usize {
        self.appointment.non_expired_orders_count(self.opened_at)
    }

    // ------------------------------------------------------------------------
    // Adding doses
    // ------------------------------------------------------------------------

    /// Add a dose built from `builder`.
    ///
    /// The visit's payment method is used when the builder carries neither a mode nor a
    /// method. An expired lot gets [`ProductIssue::Expired`] added.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidInput`] when no lot was attached to the builder.
    pub fn add_dose(&mut self, builder: DoseBuilder) -> CheckoutResult<SessionDoseId> {
        let mut params = builder
            .into_params()
            .ok_or_else(|| CheckoutError::InvalidInput("dose has no lot or product".into()))?;

        if params.payment_method.is_none() {
            params.payment_method = Some(self.appointment.payment_method);
        }
        if params.lot.is_expired(self.today()) {
            params.issues.insert(ProductIssue::Expired);
        }

        let mut dose = DoseLineItem::from_params(params);
        if let Some(response) = &self.med_d_response {
            dose.set_copay(response.copay_for(dose.antigen()).cloned());
        }
        let id = dose.id();
        tracing::debug!(
            "added dose {} ({}) as {:?}",
            id,
            dose.product().display_name,
            dose.payment_mode()
        );
        self.doses.push(dose);
        Ok(id)
    }

    /// Resolve a scanned lot through `catalog` and add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidText`] for a malformed lot number and
    /// [`CheckoutError::LotNotFound`] when the catalog does not know it.
    pub fn scan_lot(
        &mut self,
        catalog: &impl ProductCatalog,
        lot_number: &str,
        issues: impl IntoIterator<Item = ProductIssue>,
    ) -> CheckoutResult<SessionDoseId> {
        let lot = resolve_lot(catalog, lot_number)?;
        let series = lot.product.series_size.map(|_| 1);
        let mut builder = DoseBuilder::new()
            .lot_number_with_product(lot)
            .issues(issues)
            .sources([DoseSource::Scanned]);
        if let Some(series) = series {
            builder = builder.dose_series(series);
        }
        self.add_dose(builder)
    }

    /// Fulfil the open order `order_number` with a scanned lot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::OrderNotFound`] when no open `Ordered` line item carries the
    /// order number, plus the lot resolution errors of [`Self::scan_lot`].
    pub fn fulfil_order(
        &mut self,
        catalog: &impl ProductCatalog,
        order_number: &str,
        lot_number: &str,
        issues: impl IntoIterator<Item = ProductIssue>,
    ) -> CheckoutResult<SessionDoseId> {
        let lot = resolve_lot(catalog, lot_number)?;
        let mut issues: BTreeSet<ProductIssue> = issues.into_iter().collect();
        if lot.is_expired(self.today()) {
            issues.insert(ProductIssue::Expired);
        }
        let payment_method = Some(self.appointment.payment_method);
        let copay = self
            .med_d_response
            .as_ref()
            .and_then(|response| response.copay_for(&lot.product.antigen).cloned());

        let dose = self
            .doses
            .iter_mut()
            .find(|d| {
                d.dose_state() == DoseState::Ordered
                    && !d.is_deleted()
                    && d.order_number().map(|o| o.as_str()) == Some(order_number)
            })
            .ok_or_else(|| CheckoutError::OrderNotFound(order_number.to_string()))?;

        dose.fulfil_order(lot, issues, payment_method)?;
        if copay.is_some() {
            dose.set_copay(copay);
        }
        Ok(dose.id())
    }

    // ------------------------------------------------------------------------
    // Payment changes
    // ------------------------------------------------------------------------

    pub fn flip_self_pay(&mut self, id: SessionDoseId, active: bool) -> CheckoutResult<()> {
        self.dose_mut(id)?.flip_self_pay(active);
        Ok(())
    }

    pub fn flip_partner_bill(&mut self, id: SessionDoseId, active: bool) -> CheckoutResult<()> {
        self.dose_mut(id)?.flip_partner_bill(active);
        Ok(())
    }

    /// Flip every active dose to self-pay, or back, because the patient has no insurance.
    pub fn flip_all_self_pay(&mut self, active: bool) {
        for dose in self.doses.iter_mut().filter(|d| d.is_active()) {
            dose.flip_self_pay(active);
        }
    }

    /// Flip every active dose to partner billing, or back.
    pub fn flip_all_partner_bill(&mut self, active: bool) {
        for dose in self.doses.iter_mut().filter(|d| d.is_active()) {
            dose.flip_partner_bill(active);
        }
    }

    pub fn override_payment_mode(
        &mut self,
        id: SessionDoseId,
        mode: PaymentMode,
        reason: PaymentModeReason,
    ) -> CheckoutResult<()> {
        self.dose_mut(id)?
            .override_payment_mode_with_reason(mode, reason);
        Ok(())
    }

    /// Split a dose's payment by cloning it under a different payer.
    ///
    /// The original's payment values are saved before its first split so deleting the last
    /// clone later restores them. Further splits of the same dose keep that first snapshot.
    /// Returns the id of the clone.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidDoseState`] unless the dose is active.
    pub fn duplicate_dose(
        &mut self,
        id: SessionDoseId,
        mode: PaymentMode,
        reason: PaymentModeReason,
    ) -> CheckoutResult<SessionDoseId> {
        let original = self.dose_mut(id)?;
        if !original.is_active() {
            return Err(CheckoutError::InvalidDoseState {
                dose_id: id,
                state: original.dose_state(),
                operation: "duplicate",
            });
        }

        if original.revert_snapshot().is_none() {
            original.save_payment_mode_revert_values_before_duplicating();
        }
        let mut clone = original.duplicate();
        clone.override_payment_mode_with_reason(mode, reason);
        let clone_id = clone.id();
        tracing::debug!("duplicated dose {} as {} paid by {:?}", id, clone_id, mode);
        self.doses.push(clone);
        Ok(clone_id)
    }

    /// Remove a duplicate created by [`Self::duplicate_dose`].
    ///
    /// When it was the original's last active clone, the original's payment values are
    /// restored and its snapshot cleared. Deleting an already removed clone is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotADuplicate`] for a line item that was not cloned, and
    /// [`CheckoutError::MissingRevertSnapshot`] when the original has nothing saved. Nothing
    /// is changed on error.
    pub fn delete_duplicate(&mut self, id: SessionDoseId) -> CheckoutResult<()> {
        let duplicate = self.dose(id)?;
        let original_id = duplicate
            .duplicate_of()
            .ok_or(CheckoutError::NotADuplicate(id))?;
        if !duplicate.is_active() {
            return Ok(());
        }

        if self.active_clones_of(original_id).all(|clone| clone == id) {
            self.dose_mut(original_id)?
                .restore_payment_mode_revert_values_after_deleting_duplicate()?;
        }
        self.dose_mut(id)?.mark_removed();
        tracing::debug!("deleted duplicate {} of dose {}", id, original_id);
        Ok(())
    }

    fn active_clones_of(
        &self,
        original_id: SessionDoseId,
    ) -> impl Iterator<Item = SessionDoseId> + '_ {
        self.active_doses()
            .filter(move |d| d.duplicate_of() == Some(original_id))
            .map(|d| d.id())
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    pub fn remove_dose(&mut self, id: SessionDoseId) -> CheckoutResult<()> {
        self.dose_mut(id)?.mark_removed();
        tracing::debug!("removed dose {}", id);
        Ok(())
    }

    /// Undo a removal.
    ///
    /// Reviving a deleted duplicate splits the original again, so the original's payment
    /// values are saved if no snapshot is held.
    pub fn undo_removal(&mut self, id: SessionDoseId) -> CheckoutResult<()> {
        let original_id = self.dose(id)?.duplicate_of();
        if let Some(original_id) = original_id {
            let original = self.dose_mut(original_id)?;
            if original.revert_snapshot().is_none() {
                original.save_payment_mode_revert_values_before_duplicating();
            }
        }
        self.dose_mut(id)?.undo_removal();
        tracing::debug!("restored dose {}", id);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Med D copays
    // ------------------------------------------------------------------------

    /// Attach the Med D response and each active dose's copay entry.
    ///
    /// Doses added or fulfilled afterwards pick up their entry from the stored response.
    pub fn apply_med_d_copays(&mut self, response: MedDCheckResponse) {
        for dose in self.doses.iter_mut().filter(|d| d.is_active()) {
            let copay = response.copay_for(dose.antigen()).cloned();
            dose.set_copay(copay);
        }
        self.med_d_response = Some(response);
    }

    /// Copay owed for the active doses, zero until a Med D response is applied.
    pub fn copay_total(&self) -> Decimal {
        match &self.med_d_response {
            Some(response) => {
                copay_total_for_antigens(response, self.active_doses().map(|d| d.antigen()))
            }
            None => Decimal::ZERO,
        }
    }

    // ------------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------------

    /// Persist the cart and mark the appointment checked out.
    ///
    /// Orders fulfilled by an active dose are linked to this visit. Consumes the session;
    /// the saved appointment is returned.
    pub fn commit(self, store: &mut impl AppointmentStore) -> CheckoutResult<Appointment> {
        let Self {
            mut appointment,
            doses,
            ..
        } = self;

        let fulfilled: BTreeSet<&str> = doses
            .iter()
            .filter(|d| d.is_active())
            .filter_map(|d| d.order_number().map(|o| o.as_str()))
            .collect();
        let visit_id = appointment.id;
        for order in appointment
            .orders
            .iter_mut()
            .filter(|o| fulfilled.contains(o.order_number.as_str()))
        {
            order.patient_visit_id = Some(visit_id);
        }
        appointment.checked_out = true;

        store.save_session_doses(appointment.id, &doses)?;
        store.save_appointment(appointment.clone())?;

        tracing::info!(
            "checked out appointment {}: {} active of {} line items",
            appointment.id,
            doses.iter().filter(|d| d.is_active()).count(),
            doses.len()
        );
        Ok(appointment)
    }
}

fn resolve_lot(catalog: &impl ProductCatalog, lot_number: &str) -> CheckoutResult<LotWithProduct> {
    let lot_number = LotNumber::new(lot_number)?;
    catalog
        .find_lot(&lot_number)
        .ok_or_else(|| CheckoutError::LotNotFound(lot_number.to_string()))
}
