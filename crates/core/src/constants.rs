//! Constants used throughout the checkout core crate.

/// Vaccine supply label for privately purchased stock.
pub const SUPPLY_PRIVATE: &str = "Private";

/// Vaccine supply label for Vaccines for Children stock.
pub const SUPPLY_VFC: &str = "VFC";

/// Vaccine supply label for state-funded stock.
pub const SUPPLY_STATE: &str = "State";

/// Vaccine supply label for Section 317 stock.
pub const SUPPLY_SECTION_317: &str = "Section317";

/// Environment variable holding the clinic's UTC offset (for example `-05:00`).
pub const CLINIC_UTC_OFFSET_ENV: &str = "CHECKOUT_CLINIC_UTC_OFFSET";
