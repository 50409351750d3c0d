//! Request preparation for the backend calculators.
//!
//! Form input is collected as raw strings in a [`FormState`] and turned into
//! a [`CalculationPayload`] right before submission, either through the
//! catalogue-driven [`build_payload`] or one of the calculator-specific
//! builders.

pub mod catalog;
mod form;
pub mod paye;
pub mod vat;

pub use catalog::{ResponseKind, TaxType, UnknownCalculator, build_payload};
pub use form::{CalculationPayload, FormState};
pub use paye::{PayeMode, PayeRequest, PeriodType, prepare_paye_payload};
pub use vat::{VatRate, vat_payload};
