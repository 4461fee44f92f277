//! Appointment aggregate and its derived checkout queries.
//!
//! The appointment is the read model a checkout session starts from. It combines the
//! patient, the visit-level payment method, the vaccine supply the visit draws from, the
//! doses already administered, and clinical orders that are still open.
//!
//! Responsibilities:
//! - Expose supply classification (`is_private`, `is_vfc`, ...)
//! - Decide whether Med D screening applies to this visit and what it asks for next
//! - Count open orders that still need resolving before checkout completes
//!
//! All time-dependent queries take the current instant or date as an argument; nothing here
//! reads a clock.

use crate::call_to_action::CallToAction;
use crate::constants::{SUPPLY_PRIVATE, SUPPLY_SECTION_317, SUPPLY_STATE, SUPPLY_VFC};
use crate::dose::DoseLineItem;
use crate::payment::{PaymentMethod, PaymentMode, PaymentModeReason};
use crate::product::Product;
use checkout_types::{LotNumber, NonEmptyText};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Records
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

/// A dose saved against this visit in an earlier checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministeredVaccine {
    pub id: i64,
    pub product: Product,
    pub lot_number: LotNumber,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub dose_series: Option<u32>,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub payment_mode_reason: Option<PaymentModeReason>,
    #[serde(default)]
    pub order_number: Option<NonEmptyText>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// A clinical instruction to administer a product, not yet fulfilled by a scanned dose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalOrder {
    pub order_id: i64,
    pub order_number: NonEmptyText,
    /// The visit this order was consumed by, if any.
    #[serde(default)]
    pub patient_visit_id: Option<i64>,
    pub product: Product,
    pub expiration_date: DateTime<Utc>,
}

/// Status message attached to the encounter by the eligibility service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterMessage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub call_to_action: Option<CallToAction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterState {
    #[serde(default)]
    pub med_d_message: Option<EncounterMessage>,
}

/// Funding source of the stock a visit draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaccineSupply {
    Private,
    Vfc,
    State,
    Section317,
}

impl VaccineSupply {
    /// Case-insensitive exact match against the known supply labels.
    pub fn from_label(label: &str) -> Option<Self> {
        [
            (SUPPLY_PRIVATE, VaccineSupply::Private),
            (SUPPLY_VFC, VaccineSupply::Vfc),
            (SUPPLY_STATE, VaccineSupply::State),
            (SUPPLY_SECTION_317, VaccineSupply::Section317),
        ]
        .into_iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(label))
        .map(|(_, supply)| supply)
    }
}

/// What the Med D workflow should do next for a visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MedDGate {
    /// Med D screening does not apply (non-private stock, no Med D status, or not today).
    NotApplicable,
    /// The check has run; only collection steps remain.
    Completed,
    /// Patient or payer data must be corrected before the check can run.
    MissingInfo,
    /// The check can be run now.
    CanRun,
    /// Med D applies but nothing is required of the clinic.
    NoActionRequired,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    /// Scheduled time in the clinic's local time.
    pub appointment_time: NaiveDateTime,
    pub patient: Patient,
    pub payment_method: PaymentMethod,
    pub vaccine_supply: String,
    #[serde(default)]
    pub checked_out: bool,
    #[serde(default)]
    pub administered_vaccines: Vec<AdministeredVaccine>,
    #[serde(default)]
    pub orders: Vec<ClinicalOrder>,
    #[serde(default)]
    pub encounter_state: Option<EncounterState>,
}

// ============================================================================
// Derived queries
// ============================================================================

impl Appointment {
    pub fn supply(&self) -> Option<VaccineSupply> {
        VaccineSupply::from_label(&self.vaccine_supply)
    }

    pub fn is_private(&self) -> bool {
        self.supply() == Some(VaccineSupply::Private)
    }

    pub fn is_vfc(&self) -> bool {
        self.supply() == Some(VaccineSupply::Vfc)
    }

    pub fn is_state(&self) -> bool {
        self.supply() == Some(VaccineSupply::State)
    }

    pub fn is_section_317(&self) -> bool {
        self.supply() == Some(VaccineSupply::Section317)
    }

    pub fn date_of_service(&self) -> NaiveDate {
        self.appointment_time.date()
    }

    fn med_d_message(&self) -> Option<&EncounterMessage> {
        self.encounter_state
            .as_ref()
            .and_then(|state| state.med_d_message.as_ref())
    }

    /// Med D screening applies only to privately billed stock with a Med D status.
    pub fn is_med_d_tag_shown(&self) -> bool {
        let has_status = self
            .med_d_message()
            .is_some_and(|message| message.status.is_some());
        has_status && self.is_private()
    }

    /// [`Self::is_med_d_tag_shown`] restricted to visits happening on `today`.
    ///
    /// Backdated visits never prompt for Med D.
    pub fn is_med_d_and_date_of_service(&self, today: NaiveDate) -> bool {
        self.is_med_d_tag_shown() && self.date_of_service() == today
    }

    pub fn get_med_d_cta(&self) -> CallToAction {
        self.med_d_message()
            .and_then(|message| message.call_to_action)
            .unwrap_or_default()
    }

    /// Number of open orders that still count for this visit at `now`.
    ///
    /// Only orders expiring after `now` count. Before checkout only orders not yet linked
    /// to any visit count; after checkout, orders linked to this visit count as well.
    pub fn non_expired_orders_count(&self, now: DateTime<Utc>) -> usize {
        self.orders
            .iter()
            .filter(|order| order.expiration_date > now)
            .filter(|order| match order.patient_visit_id {
                None => true,
                Some(visit_id) => self.checked_out && visit_id == self.id,
            })
            .count()
    }

    /// Next Med D step for this visit on `today`.
    pub fn med_d_gate(&self, today: NaiveDate) -> MedDGate {
        if !self.is_med_d_and_date_of_service(today) {
            return MedDGate::NotApplicable;
        }

        let cta = self.get_med_d_cta();
        if cta.is_med_d_completed() {
            return MedDGate::Completed;
        }
        if cta.is_missing_info() {
            return MedDGate::MissingInfo;
        }
        match cta {
            CallToAction::MedDCanRun => MedDGate::CanRun,
            _ => MedDGate::NoActionRequired,
        }
    }

    /// Doses saved earlier in this visit, as cart line items.
    pub fn administered_line_items(&self) -> Vec<DoseLineItem> {
        self.administered_vaccines
            .iter()
            .map(DoseLineItem::from_administered)
            .collect()
    }

    /// Orders to surface in a new checkout cart at `now`.
    ///
    /// An order is surfaced when it has not expired, is not linked to any visit, and no
    /// live administered dose already carries its order number.
    pub fn surfaced_orders(&self, now: DateTime<Utc>) -> Vec<&ClinicalOrder> {
        self.orders
            .iter()
            .filter(|order| order.expiration_date > now && order.patient_visit_id.is_none())
            .filter(|order| {
                !self.administered_vaccines.iter().any(|dose| {
                    !dose.is_deleted && dose.order_number.as_ref() == Some(&order.order_number)
                })
            })
            .collect()
    }
}
