//! Payment classification value types.
//!
//! A dose's payment classification is a pair: the [`PaymentMode`] (who pays) and the
//! [`PaymentModeReason`] (why that payer was chosen when it differs from the default).
//! [`PaymentMethod`] is the visit-level default the clinic selected for the appointment.

use crate::issues::ProductIssue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Payer category for a single dose.
///
/// Assigned per dose rather than per visit: one dose in a visit may be self-pay while
/// another is billed to insurance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    InsurancePay,
    PartnerBill,
    SelfPay,
    EmployerPay,
    NoPay,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::InsurancePay => "InsurancePay",
            PaymentMode::PartnerBill => "PartnerBill",
            PaymentMode::SelfPay => "SelfPay",
            PaymentMode::EmployerPay => "EmployerPay",
            PaymentMode::NoPay => "NoPay",
        }
    }
}

/// Audit tag recording why a dose's payment mode was set or changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentModeReason {
    /// Patient declined to use insurance and chose to pay.
    SelfPayOptOut,
    /// Patient asked for the Med D copay to be collected.
    RequestedMedDCopay,
    /// The partner organisation overrode the payer.
    PartnerOverride,
    /// Rules supplied by the clinic's EMR integration.
    EmrRules,
    /// A user changed the payer by hand.
    ManualOverride,
    /// Product is outside its labelled age indication for this patient.
    OutOfAgeIndication,
    /// Stock selected does not match the patient's eligibility.
    InvalidStockSelected,
    /// Payer flipped after a risk assessment.
    RiskFlip,
    /// Demographic data needed for billing is missing.
    MissingPatientInfo,
    /// Payer data needed for billing is missing.
    MissingPayerInfo,
    /// Product lot is past its expiration date.
    ExpiredProduct,
    /// Product is restricted for this clinic or payer.
    RestrictedProduct,
    /// Patient accepted the Med D copay.
    MedDCopayAccepted,
    /// Patient declined the Med D copay.
    MedDCopayDeclined,
    /// Eligibility service reported the patient is responsible.
    PatientResponsibility,
}

/// Visit-level payment method chosen for the appointment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    InsuranceBilled,
    PartnerBill,
    SelfPay,
    EmployerPay,
    NoPay,
}

impl PaymentMethod {
    /// Per-dose payment mode implied by this visit-level method.
    pub fn payment_mode(&self) -> PaymentMode {
        match self {
            PaymentMethod::InsuranceBilled => PaymentMode::InsurancePay,
            PaymentMethod::PartnerBill => PaymentMode::PartnerBill,
            PaymentMethod::SelfPay => PaymentMode::SelfPay,
            PaymentMethod::EmployerPay => PaymentMode::EmployerPay,
            PaymentMethod::NoPay => PaymentMode::NoPay,
        }
    }
}

/// Outcome of classifying a dose: the mode plus, when an issue forced it, the reason and
/// the issue that drove it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub payment_mode: PaymentMode,
    pub payment_mode_reason: Option<PaymentModeReason>,
    pub mark_condition: Option<ProductIssue>,
}

/// Resolve a dose's payment classification.
///
/// The requested mode (or the visit method's mode, or `InsurancePay`) is used unless a
/// display issue forces a different payer. Forced overrides follow a fixed precedence so
/// that a dose with several issues always resolves the same way:
///
/// | issue                | mode          | reason                 |
/// |----------------------|---------------|------------------------|
/// | `Expired`            | `NoPay`       | `ExpiredProduct`       |
/// | `WrongStock`         | `PartnerBill` | `InvalidStockSelected` |
/// | `RestrictedProduct`  | `PartnerBill` | `RestrictedProduct`    |
/// | `OutOfAgeIndication` | `SelfPay`     | `OutOfAgeIndication`   |
pub fn classify(
    requested: Option<PaymentMode>,
    requested_reason: Option<PaymentModeReason>,
    payment_method: Option<PaymentMethod>,
    issues: &BTreeSet<ProductIssue>,
) -> Classification {
    const PRECEDENCE: [(ProductIssue, PaymentMode, PaymentModeReason); 4] = [
        (
            ProductIssue::Expired,
            PaymentMode::NoPay,
            PaymentModeReason::ExpiredProduct,
        ),
        (
            ProductIssue::WrongStock,
            PaymentMode::PartnerBill,
            PaymentModeReason::InvalidStockSelected,
        ),
        (
            ProductIssue::RestrictedProduct,
            PaymentMode::PartnerBill,
            PaymentModeReason::RestrictedProduct,
        ),
        (
            ProductIssue::OutOfAgeIndication,
            PaymentMode::SelfPay,
            PaymentModeReason::OutOfAgeIndication,
        ),
    ];

    if let Some((issue, mode, reason)) = PRECEDENCE
        .iter()
        .find(|(issue, _, _)| issues.contains(issue))
    {
        return Classification {
            payment_mode: *mode,
            payment_mode_reason: Some(*reason),
            mark_condition: Some(*issue),
        };
    }

    let payment_mode = requested
        .or_else(|| payment_method.map(|m| m.payment_mode()))
        .unwrap_or(PaymentMode::InsurancePay);

    Classification {
        payment_mode,
        payment_mode_reason: requested_reason,
        mark_condition: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issues(list: &[ProductIssue]) -> BTreeSet<ProductIssue> {
        list.iter().copied().collect()
    }

    #[test]
    fn requested_mode_wins_without_issues() {
        let c = classify(
            Some(PaymentMode::EmployerPay),
            Some(PaymentModeReason::ManualOverride),
            Some(PaymentMethod::InsuranceBilled),
            &issues(&[]),
        );
        assert_eq!(c.payment_mode, PaymentMode::EmployerPay);
        assert_eq!(c.payment_mode_reason, Some(PaymentModeReason::ManualOverride));
        assert_eq!(c.mark_condition, None);
    }

    #[test]
    fn falls_back_to_visit_method_then_insurance() {
        let from_method = classify(None, None, Some(PaymentMethod::SelfPay), &issues(&[]));
        assert_eq!(from_method.payment_mode, PaymentMode::SelfPay);

        let default = classify(None, None, None, &issues(&[]));
        assert_eq!(default.payment_mode, PaymentMode::InsurancePay);
        assert_eq!(default.payment_mode_reason, None);
    }

    #[test]
    fn out_of_age_forces_self_pay() {
        let c = classify(
            Some(PaymentMode::InsurancePay),
            None,
            None,
            &issues(&[ProductIssue::OutOfAgeIndication]),
        );
        assert_eq!(c.payment_mode, PaymentMode::SelfPay);
        assert_eq!(c.payment_mode_reason, Some(PaymentModeReason::OutOfAgeIndication));
        assert_eq!(c.mark_condition, Some(ProductIssue::OutOfAgeIndication));
    }

    #[test]
    fn expired_takes_precedence_over_other_issues() {
        let c = classify(
            None,
            None,
            Some(PaymentMethod::InsuranceBilled),
            &issues(&[
                ProductIssue::OutOfAgeIndication,
                ProductIssue::WrongStock,
                ProductIssue::Expired,
            ]),
        );
        assert_eq!(c.payment_mode, PaymentMode::NoPay);
        assert_eq!(c.mark_condition, Some(ProductIssue::Expired));
    }

    #[test]
    fn wrong_stock_beats_restricted_product() {
        let c = classify(
            None,
            None,
            None,
            &issues(&[ProductIssue::RestrictedProduct, ProductIssue::WrongStock]),
        );
        assert_eq!(c.payment_mode, PaymentMode::PartnerBill);
        assert_eq!(c.payment_mode_reason, Some(PaymentModeReason::InvalidStockSelected));
    }

    #[test]
    fn missing_lot_number_does_not_override() {
        let c = classify(
            Some(PaymentMode::InsurancePay),
            None,
            None,
            &issues(&[ProductIssue::MissingLotNumber]),
        );
        assert_eq!(c.payment_mode, PaymentMode::InsurancePay);
        assert_eq!(c.mark_condition, None);
    }

    #[test]
    fn every_method_maps_to_a_mode() {
        for (method, mode) in [
            (PaymentMethod::InsuranceBilled, PaymentMode::InsurancePay),
            (PaymentMethod::PartnerBill, PaymentMode::PartnerBill),
            (PaymentMethod::SelfPay, PaymentMode::SelfPay),
            (PaymentMethod::EmployerPay, PaymentMode::EmployerPay),
            (PaymentMethod::NoPay, PaymentMode::NoPay),
        ] {
            assert_eq!(method.payment_mode(), mode);
        }
    }
}
