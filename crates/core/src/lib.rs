//! # Checkout Core
//!
//! Payment-state reconciliation for vaccine clinic checkout.
//!
//! This crate contains the pure checkout engine:
//! - Dose line items and their reversible payment mutations
//! - The staged [`DoseBuilder`] used by scanning flows
//! - Appointment-level Med D gating and open-order queries
//! - Call-to-action classification and copay aggregation
//! - The [`CheckoutSession`] cart tying these together
//!
//! **No I/O**: persistence and catalog lookups sit behind the traits in [`repositories`];
//! the host application supplies implementations and the current time.

pub mod appointment;
pub mod builder;
pub mod call_to_action;
pub mod config;
pub mod constants;
pub mod copay;
pub mod dose;
pub mod dose_state;
pub mod error;
pub mod issues;
pub mod payment;
pub mod product;
pub mod repositories;
pub mod session;

pub use appointment::{
    AdministeredVaccine, Appointment, ClinicalOrder, EncounterMessage, EncounterState, MedDGate,
    Patient, VaccineSupply,
};
pub use builder::DoseBuilder;
pub use call_to_action::{
    cta_missing_info, CallToAction, CTA_MED_D_COMPLETED, CTA_MISSING_DEMO_INFO,
    CTA_MISSING_PAYER_INFO,
};
pub use config::{clinic_offset_from_env_value, CheckoutConfig};
pub use copay::{
    copay_total_for_antigens, get_copay_total_value, MedDCheckResponse, ProductCopayInfo,
};
pub use dose::{restore, snapshot, DoseLineItem, DoseParams, DoseSource, PaymentRevertSnapshot};
pub use dose_state::DoseState;
pub use error::{CheckoutError, CheckoutResult};
pub use issues::ProductIssue;
pub use payment::{classify, Classification, PaymentMethod, PaymentMode, PaymentModeReason};
pub use product::{LotWithProduct, OneTouchPricing, Product};
pub use repositories::{
    AppointmentStore, InMemoryAppointmentStore, InMemoryProductCatalog, ProductCatalog,
};
pub use session::CheckoutSession;

pub use checkout_types::{Antigen, LotNumber, NonEmptyText, TextError};
pub use checkout_uuid::SessionDoseId;
