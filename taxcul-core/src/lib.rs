pub mod api;
pub mod calculators;
pub mod format;
pub mod models;
pub mod rates;
pub mod validate;

pub use api::{ApiError, Session, TaxculApi};
pub use calculators::{CalculationPayload, FormState, TaxType};
pub use models::*;
