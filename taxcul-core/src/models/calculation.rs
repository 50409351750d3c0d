use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calculators::{CalculationPayload, ResponseKind, TaxType};

/// Body returned by a `/calculate/...` endpoint.
///
/// Only `taxDue` and `vat` are interpreted; every other field is kept as-is
/// for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_due: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalculationResponse {
    pub fn amount(
        &self,
        kind: ResponseKind,
    ) -> Option<f64> {
        match kind {
            ResponseKind::TaxDue => self.tax_due,
            ResponseKind::Vat => self.vat,
        }
    }

    /// Additional numeric fields, in key order.
    pub fn extra_numbers(&self) -> impl Iterator<Item = (&str, f64)> {
        self.extra
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|n| (k.as_str(), n)))
    }
}

/// A submitted calculation together with what the backend returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub tax_type: TaxType,
    pub payload: CalculationPayload,
    pub response: CalculationResponse,
}

impl CalculationResult {
    pub fn amount(&self) -> Option<f64> {
        self.response.amount(self.tax_type.response_kind())
    }

    /// Gross input less the calculated amount, for calculators that have a
    /// gross field.
    pub fn net_amount(&self) -> Option<f64> {
        let gross = self.payload.number(self.tax_type.gross_field()?)?;
        Some(gross - self.amount()?)
    }
}
