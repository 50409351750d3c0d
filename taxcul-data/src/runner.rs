use taxcul_core::api::{ApiError, TaxculApi};
use taxcul_core::calculators::{TaxType, build_payload};
use taxcul_core::models::CalculationResult;
use tracing::{info, warn};

use crate::loader::BatchRow;

/// What happened to one batch row.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub row: usize,
    pub tax_type: TaxType,
    pub result: Result<CalculationResult, ApiError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Submits batch rows one at a time.
pub struct BatchRunner;

impl BatchRunner {
    /// Builds each row's payload and sends it to the calculator it names.
    ///
    /// Every row gets an outcome in input order. A failing row is recorded
    /// and the remaining rows are still submitted.
    pub async fn submit(
        api: &dyn TaxculApi,
        rows: &[BatchRow],
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in rows {
            let payload = build_payload(row.tax_type, &row.form);
            let result = api
                .calculate(row.tax_type, &payload)
                .await
                .map(|response| CalculationResult {
                    tax_type: row.tax_type,
                    payload,
                    response,
                });

            if let Err(e) = &result {
                warn!(row = row.row, calculator = %row.tax_type, error = %e, "row failed");
            }

            outcomes.push(BatchOutcome {
                row: row.row,
                tax_type: row.tax_type,
                result,
            });
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(rows = outcomes.len(), failed, "batch submitted");
        outcomes
    }
}
