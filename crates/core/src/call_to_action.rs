//! Med D / missing-information call-to-action values.
//!
//! The eligibility service tells the clinic what to do next for a visit with a
//! [`CallToAction`]. Downstream gating never inspects individual values; it asks whether a
//! CTA belongs to one of the buckets defined here:
//! - [`CTA_MED_D_COMPLETED`]: the Med D check has run and only collection steps remain
//! - [`CTA_MISSING_DEMO_INFO`]: patient demographics must be fixed first
//! - [`CTA_MISSING_PAYER_INFO`]: payer details must be fixed first
//! - [`cta_missing_info`]: anything that blocks the Med D check on missing data
//!
//! Ids are server-controlled and serialized as integers. Unknown ids decode to
//! [`CallToAction::None`] so a newer server cannot fail an older client's checkout.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallToAction {
    #[default]
    None,
    MissingPatientData,
    PatientResponsibility,
    MissingOrInvalidSsn,
    MissingOrInvalidGender,
    MissingOrInvalidDoB,
    MissingOrInvalidPayerName,
    MissingOrInvalidGroupId,
    MissingOrInvalidMemberId,
    MissingOrInvalidMbi,
    MedDCanRun,
    MedDDidRun,
    MedDCollectCreditCard,
    MedDCollectSignature,
    PatientAndInsuranceData,
}

/// Med D has run; remaining steps are collection only.
pub const CTA_MED_D_COMPLETED: &[CallToAction] = &[
    CallToAction::MedDDidRun,
    CallToAction::MedDCollectCreditCard,
    CallToAction::MedDCollectSignature,
];

/// Patient demographics are missing or invalid.
pub const CTA_MISSING_DEMO_INFO: &[CallToAction] = &[
    CallToAction::MissingPatientData,
    CallToAction::MissingOrInvalidSsn,
    CallToAction::MissingOrInvalidGender,
    CallToAction::MissingOrInvalidDoB,
];

/// Payer details are missing or invalid.
pub const CTA_MISSING_PAYER_INFO: &[CallToAction] = &[
    CallToAction::MissingOrInvalidPayerName,
    CallToAction::MissingOrInvalidGroupId,
    CallToAction::MissingOrInvalidMemberId,
    CallToAction::MissingOrInvalidMbi,
];

/// Values that belong to the missing-info bucket without being demographic or payer fields.
const CTA_MISSING_INFO_EXTRA: &[CallToAction] = &[
    CallToAction::MissingOrInvalidSsn,
    CallToAction::MissingOrInvalidGender,
    CallToAction::MissingOrInvalidDoB,
    CallToAction::PatientAndInsuranceData,
];

/// Every CTA that means the Med D check cannot proceed until data is corrected.
///
/// Union of [`CTA_MISSING_DEMO_INFO`], [`CTA_MISSING_PAYER_INFO`] and the SSN / gender /
/// date of birth / patient-and-insurance values, without duplicates. Built on first use.
pub fn cta_missing_info() -> &'static [CallToAction] {
    static MISSING_INFO: OnceLock<Vec<CallToAction>> = OnceLock::new();
    MISSING_INFO.get_or_init(|| {
        let mut all: Vec<CallToAction> = Vec::new();
        for cta in CTA_MISSING_DEMO_INFO
            .iter()
            .chain(CTA_MISSING_PAYER_INFO)
            .chain(CTA_MISSING_INFO_EXTRA)
        {
            if !all.contains(cta) {
                all.push(*cta);
            }
        }
        all
    })
}

impl CallToAction {
    pub const ALL: [CallToAction; 15] = [
        CallToAction::None,
        CallToAction::MissingPatientData,
        CallToAction::PatientResponsibility,
        CallToAction::MissingOrInvalidSsn,
        CallToAction::MissingOrInvalidGender,
        CallToAction::MissingOrInvalidDoB,
        CallToAction::MissingOrInvalidPayerName,
        CallToAction::MissingOrInvalidGroupId,
        CallToAction::MissingOrInvalidMemberId,
        CallToAction::MissingOrInvalidMbi,
        CallToAction::MedDCanRun,
        CallToAction::MedDDidRun,
        CallToAction::MedDCollectCreditCard,
        CallToAction::MedDCollectSignature,
        CallToAction::PatientAndInsuranceData,
    ];

    /// Stable wire id.
    pub fn id(&self) -> i32 {
        match self {
            CallToAction::None => 0,
            CallToAction::MissingPatientData => 1,
            CallToAction::PatientResponsibility => 2,
            CallToAction::MissingOrInvalidSsn => 3,
            CallToAction::MissingOrInvalidGender => 4,
            CallToAction::MissingOrInvalidDoB => 5,
            CallToAction::MissingOrInvalidPayerName => 6,
            CallToAction::MissingOrInvalidGroupId => 7,
            CallToAction::MissingOrInvalidMemberId => 8,
            CallToAction::MissingOrInvalidMbi => 9,
            CallToAction::MedDCanRun => 10,
            CallToAction::MedDDidRun => 11,
            CallToAction::MedDCollectCreditCard => 12,
            CallToAction::MedDCollectSignature => 13,
            CallToAction::PatientAndInsuranceData => 14,
        }
    }

    /// Looks up the CTA with the given id.
    ///
    /// Total over every integer: unrecognised ids return [`CallToAction::None`].
    pub fn from_int(id: i64) -> Self {
        match Self::ALL.iter().find(|cta| i64::from(cta.id()) == id) {
            Some(cta) => *cta,
            None => {
                tracing::warn!("unknown call to action id {}, treating as none", id);
                CallToAction::None
            }
        }
    }

    pub fn is_med_d_completed(&self) -> bool {
        CTA_MED_D_COMPLETED.contains(self)
    }

    pub fn is_missing_info(&self) -> bool {
        cta_missing_info().contains(self)
    }

    pub fn is_missing_demo_info(&self) -> bool {
        CTA_MISSING_DEMO_INFO.contains(self)
    }

    pub fn is_missing_payer_info(&self) -> bool {
        CTA_MISSING_PAYER_INFO.contains(self)
    }
}

impl Serialize for CallToAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.id())
    }
}

impl<'de> Deserialize<'de> for CallToAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i64::deserialize(deserializer)?;
        Ok(CallToAction::from_int(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_int_round_trips_every_known_id() {
        for cta in CallToAction::ALL {
            assert_eq!(CallToAction::from_int(i64::from(cta.id())), cta);
        }
    }

    #[test]
    fn from_int_is_total() {
        for id in [-1, 15, 99, i64::from(i32::MAX) + 1, i64::MIN, i64::MAX] {
            assert_eq!(CallToAction::from_int(id), CallToAction::None);
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<i32> = CallToAction::ALL.iter().map(|c| c.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CallToAction::ALL.len());
    }

    #[test]
    fn mbi_is_missing_info_not_completed() {
        assert!(cta_missing_info().contains(&CallToAction::MissingOrInvalidMbi));
        assert!(!CTA_MED_D_COMPLETED.contains(&CallToAction::MissingOrInvalidMbi));
    }

    #[test]
    fn completed_and_missing_info_are_disjoint() {
        for cta in CallToAction::ALL {
            assert!(
                !(cta.is_med_d_completed() && cta.is_missing_info()),
                "{cta:?} is in both buckets"
            );
        }
    }

    #[test]
    fn missing_info_is_exact_union() {
        let expected = [
            CallToAction::MissingPatientData,
            CallToAction::MissingOrInvalidSsn,
            CallToAction::MissingOrInvalidGender,
            CallToAction::MissingOrInvalidDoB,
            CallToAction::MissingOrInvalidPayerName,
            CallToAction::MissingOrInvalidGroupId,
            CallToAction::MissingOrInvalidMemberId,
            CallToAction::MissingOrInvalidMbi,
            CallToAction::PatientAndInsuranceData,
        ];
        assert_eq!(cta_missing_info(), expected.as_slice());

        for cta in CTA_MISSING_DEMO_INFO.iter().chain(CTA_MISSING_PAYER_INFO) {
            assert!(cta.is_missing_info(), "{cta:?} missing from union");
        }
    }

    #[test]
    fn demo_and_payer_buckets_are_disjoint() {
        for cta in CTA_MISSING_DEMO_INFO {
            assert!(!cta.is_missing_payer_info(), "{cta:?} in both buckets");
        }
    }

    #[test]
    fn action_values_outside_every_bucket() {
        for cta in [
            CallToAction::None,
            CallToAction::PatientResponsibility,
            CallToAction::MedDCanRun,
        ] {
            assert!(!cta.is_missing_info());
            assert!(!cta.is_med_d_completed());
        }
    }

    #[test]
    fn serializes_as_integer_id() {
        let json = serde_json::to_string(&CallToAction::MedDCollectSignature).expect("serialize");
        assert_eq!(json, "13");
    }

    #[test]
    fn unknown_wire_id_deserializes_to_none() {
        let cta: CallToAction = serde_json::from_str("42").expect("deserialize");
        assert_eq!(cta, CallToAction::None);

        let cta: CallToAction = serde_json::from_str("9").expect("deserialize");
        assert_eq!(cta, CallToAction::MissingOrInvalidMbi);
    }
}
