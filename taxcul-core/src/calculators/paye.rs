//! PAYE request preparation.
//!
//! The PAYE endpoint expects a fixed-shape body: every individual-mode field
//! and every business-mode field is always present. Fields belonging to the
//! mode that is not selected are sent as `0` rather than omitted, whatever
//! the form holds for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CalculationPayload, FormState};
use crate::format::parse_float_or_zero;

/// Inputs read when calculating PAYE for one employee.
pub const INDIVIDUAL_FIELDS: [&str; 15] = [
    "currentSalary",
    "bonus",
    "overtime",
    "commission",
    "housingAllowance",
    "transportAllowance",
    "otherAllowances",
    "vehicleBenefit",
    "otherBenefits",
    "pensionContribution",
    "nssaContribution",
    "medicalAidContribution",
    "medicalExpenses",
    "projectedIncrease",
    "taxWithheld",
];

/// Inputs read when calculating PAYE for a whole payroll.
pub const BUSINESS_FIELDS: [&str; 8] = [
    "employeeCount",
    "totalGrossPayroll",
    "averageSalary",
    "totalBonuses",
    "totalAllowances",
    "totalBenefits",
    "totalPensionContributions",
    "totalNssaContributions",
];

/// Default business type when a business-mode form leaves it blank.
pub const DEFAULT_BUSINESS_TYPE: &str = "company";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Monthly,
    Annual,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Some(Self::Monthly),
            "annual" | "annually" | "yearly" => Some(Self::Annual),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which calculator the PAYE form is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayeMode {
    Individual,
    Business {
        business_type: String,
        projection_years: u32,
    },
}

impl PayeMode {
    pub fn calculator_type(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Business { .. } => "business",
        }
    }

    fn active_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Individual => &INDIVIDUAL_FIELDS,
            Self::Business { .. } => &BUSINESS_FIELDS,
        }
    }

    fn inactive_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Individual => &BUSINESS_FIELDS,
            Self::Business { .. } => &INDIVIDUAL_FIELDS,
        }
    }
}

/// Mode selectors for a PAYE submission, separated from the numeric inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayeRequest {
    pub mode: PayeMode,
    pub period: PeriodType,
}

impl PayeRequest {
    /// Reads the selectors stored alongside the numeric inputs
    /// (`calculatorType`, `businessType`, `projectionYears`, `periodType`).
    ///
    /// Anything other than `calculatorType = business` selects individual
    /// mode; an unknown period selects monthly.
    pub fn from_form(form: &FormState) -> Self {
        let mode = if form.get("calculatorType").trim().eq_ignore_ascii_case("business") {
            let business_type = match form.get("businessType").trim() {
                "" => DEFAULT_BUSINESS_TYPE.to_string(),
                other => other.to_string(),
            };
            let years = parse_float_or_zero(form.get("projectionYears"));
            PayeMode::Business {
                business_type,
                projection_years: if years >= 1.0 { years as u32 } else { 1 },
            }
        } else {
            PayeMode::Individual
        };

        let period = PeriodType::parse(form.get("periodType")).unwrap_or_default();

        Self { mode, period }
    }

    pub fn prepare(
        &self,
        form: &FormState,
    ) -> CalculationPayload {
        prepare_paye_payload(form, &self.mode, self.period)
    }
}

/// Flattens `form` and the selected mode into the PAYE request body.
///
/// `businessType` and `projectionYears` are `null` in individual mode.
/// Active-mode fields are coerced with [`parse_float_or_zero`]; no
/// validation happens here.
pub fn prepare_paye_payload(
    form: &FormState,
    mode: &PayeMode,
    period: PeriodType,
) -> CalculationPayload {
    let mut payload = CalculationPayload::new();

    payload.insert_text("calculatorType", Some(mode.calculator_type()));
    payload.insert_text("periodType", Some(period.as_str()));

    match mode {
        PayeMode::Business {
            business_type,
            projection_years,
        } => {
            payload.insert_text("businessType", Some(business_type.as_str()));
            payload.insert_number("projectionYears", f64::from(*projection_years));
        }
        PayeMode::Individual => {
            payload.insert_text("businessType", None);
            payload.insert_text("projectionYears", None);
        }
    }

    for field in mode.active_fields() {
        payload.insert_number(*field, parse_float_or_zero(form.get(field)));
    }
    for field in mode.inactive_fields() {
        payload.insert_number(*field, 0.0);
    }

    tracing::debug!(
        calculator_type = mode.calculator_type(),
        period = %period,
        fields = payload.len(),
        "prepared PAYE payload"
    );

    payload
}
