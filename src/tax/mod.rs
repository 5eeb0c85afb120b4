//! Tax calculations

pub mod vat;
