//! Collaborator interfaces for checkout persistence and catalog lookups.
//!
//! The engine never performs I/O itself. A host application supplies an
//! [`AppointmentStore`] and a [`ProductCatalog`]; the in-memory implementations here back the
//! tests and the inspection CLI.

use crate::appointment::Appointment;
use crate::dose::DoseLineItem;
use crate::product::LotWithProduct;
use crate::{CheckoutError, CheckoutResult};
use checkout_types::LotNumber;
use std::collections::HashMap;

/// Loads and persists appointments and the doses a checkout session produced.
pub trait AppointmentStore {
    fn load_appointment(&self, appointment_id: i64) -> CheckoutResult<Appointment>;

    fn save_appointment(&mut self, appointment: Appointment) -> CheckoutResult<()>;

    /// Persist every line item of a committed session, removed ones included.
    fn save_session_doses(
        &mut self,
        appointment_id: i64,
        doses: &[DoseLineItem],
    ) -> CheckoutResult<()>;
}

/// Resolves a lot number to the lot and product it belongs to.
pub trait ProductCatalog {
    fn find_lot(&self, lot_number: &LotNumber) -> Option<LotWithProduct>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryAppointmentStore {
    appointments: HashMap<i64, Appointment>,
    session_doses: HashMap<i64, Vec<DoseLineItem>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_appointments(appointments: impl IntoIterator<Item = Appointment>) -> Self {
        Self {
            appointments: appointments.into_iter().map(|a| (a.id, a)).collect(),
            session_doses: HashMap::new(),
        }
    }

    /// Doses saved for an appointment by the last commit, if any.
    pub fn session_doses(&self, appointment_id: i64) -> Option<&[DoseLineItem]> {
        self.session_doses.get(&appointment_id).map(Vec::as_slice)
    }
}

impl AppointmentStore for InMemoryAppointmentStore {
    fn load_appointment(&self, appointment_id: i64) -> CheckoutResult<Appointment> {
        self.appointments
            .get(&appointment_id)
            .cloned()
            .ok_or(CheckoutError::AppointmentNotFound(appointment_id))
    }

    fn save_appointment(&mut self, appointment: Appointment) -> CheckoutResult<()> {
        self.appointments.insert(appointment.id, appointment);
        Ok(())
    }

    fn save_session_doses(
        &mut self,
        appointment_id: i64,
        doses: &[DoseLineItem],
    ) -> CheckoutResult<()> {
        self.session_doses.insert(appointment_id, doses.to_vec());
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryProductCatalog {
    lots: HashMap<LotNumber, LotWithProduct>,
}

impl InMemoryProductCatalog {
    pub fn new(lots: impl IntoIterator<Item = LotWithProduct>) -> Self {
        Self {
            lots: lots
                .into_iter()
                .map(|lot| (lot.lot_number.clone(), lot))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn find_lot(&self, lot_number: &LotNumber) -> Option<LotWithProduct> {
        self.lots.get(lot_number).cloned()
    }
}
