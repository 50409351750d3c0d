//! The calculators the backend exposes under `/calculate/`.
//!
//! | Slug                    | Response | Gross field          |
//! |-------------------------|----------|----------------------|
//! | `agriculture`           | taxDue   | `grossIncome`        |
//! | `paye`                  | taxDue   | none                 |
//! | `corporate-income-tax`  | taxDue   | `taxableIncome`      |
//! | `vat/taxable-supplies`  | vat      | `amount`             |
//! | `vat/imports`           | vat      | `customsValue`       |
//! | `withholding/interest`  | taxDue   | `value`              |
//! | `withholding/dividends` | taxDue   | `value`              |
//! | `withholding/royalties` | taxDue   | `value`              |
//! | `withholding/fees`      | taxDue   | `value`              |
//! | `withholding/tenders`   | taxDue   | `value`              |
//! | `capital-gains`         | taxDue   | `salePrice`          |
//! | `imtt`                  | taxDue   | `transactionAmount`  |
//! | `mining-royalties`      | taxDue   | `grossValue`         |
//! | `presumptive`           | taxDue   | none                 |
//! | `rental-income`         | taxDue   | `rentalIncome`       |
//! | `tobacco-levy`          | taxDue   | `saleValue`          |
//! | `carbon-tax`            | taxDue   | none                 |
//! | `customs-duty`          | taxDue   | none                 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paye::{INDIVIDUAL_FIELDS, PayeRequest};
use super::vat::{VatRate, vat_payload};
use super::{CalculationPayload, FormState};
use crate::format::parse_float_or_zero;

/// Which number in the response body is the calculated amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// `{ "taxDue": number }`
    TaxDue,
    /// `{ "vat": number }`
    Vat,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown calculator '{0}'")]
pub struct UnknownCalculator(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    Agriculture,
    Paye,
    CorporateIncomeTax,
    VatTaxableSupplies,
    VatImports,
    WithholdingInterest,
    WithholdingDividends,
    WithholdingRoyalties,
    WithholdingFees,
    WithholdingTenders,
    CapitalGains,
    Imtt,
    MiningRoyalties,
    Presumptive,
    RentalIncome,
    TobaccoLevy,
    CarbonTax,
    CustomsDuty,
}

impl TaxType {
    pub fn all() -> &'static [TaxType] {
        &[
            TaxType::Agriculture,
            TaxType::Paye,
            TaxType::CorporateIncomeTax,
            TaxType::VatTaxableSupplies,
            TaxType::VatImports,
            TaxType::WithholdingInterest,
            TaxType::WithholdingDividends,
            TaxType::WithholdingRoyalties,
            TaxType::WithholdingFees,
            TaxType::WithholdingTenders,
            TaxType::CapitalGains,
            TaxType::Imtt,
            TaxType::MiningRoyalties,
            TaxType::Presumptive,
            TaxType::RentalIncome,
            TaxType::TobaccoLevy,
            TaxType::CarbonTax,
            TaxType::CustomsDuty,
        ]
    }

    /// Path segment(s) after `/calculate/`.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Agriculture => "agriculture",
            Self::Paye => "paye",
            Self::CorporateIncomeTax => "corporate-income-tax",
            Self::VatTaxableSupplies => "vat/taxable-supplies",
            Self::VatImports => "vat/imports",
            Self::WithholdingInterest => "withholding/interest",
            Self::WithholdingDividends => "withholding/dividends",
            Self::WithholdingRoyalties => "withholding/royalties",
            Self::WithholdingFees => "withholding/fees",
            Self::WithholdingTenders => "withholding/tenders",
            Self::CapitalGains => "capital-gains",
            Self::Imtt => "imtt",
            Self::MiningRoyalties => "mining-royalties",
            Self::Presumptive => "presumptive",
            Self::RentalIncome => "rental-income",
            Self::TobaccoLevy => "tobacco-levy",
            Self::CarbonTax => "carbon-tax",
            Self::CustomsDuty => "customs-duty",
        }
    }

    pub fn parse(slug: &str) -> Option<Self> {
        let slug = slug.trim().trim_matches('/');
        let slug = slug.strip_prefix("calculate/").unwrap_or(slug);
        Self::all().iter().copied().find(|t| t.slug() == slug)
    }

    pub fn endpoint(&self) -> String {
        format!("/calculate/{}", self.slug())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Agriculture => "agricultural income tax",
            Self::Paye => "PAYE",
            Self::CorporateIncomeTax => "corporate income tax",
            Self::VatTaxableSupplies => "VAT on taxable supplies",
            Self::VatImports => "VAT on imports",
            Self::WithholdingInterest => "withholding tax on interest",
            Self::WithholdingDividends => "withholding tax on dividends",
            Self::WithholdingRoyalties => "withholding tax on royalties",
            Self::WithholdingFees => "withholding tax on fees",
            Self::WithholdingTenders => "withholding tax on tenders",
            Self::CapitalGains => "capital gains tax",
            Self::Imtt => "intermediated money transfer tax",
            Self::MiningRoyalties => "mining royalties",
            Self::Presumptive => "presumptive tax",
            Self::RentalIncome => "rental income tax",
            Self::TobaccoLevy => "tobacco levy",
            Self::CarbonTax => "carbon tax",
            Self::CustomsDuty => "customs duty",
        }
    }

    /// Numeric inputs sent to the endpoint, in form order.
    ///
    /// PAYE lists its individual-mode inputs here; its business-mode inputs
    /// and selectors are handled by [`super::paye`].
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Agriculture => &[
                "grossIncome",
                "allowableDeductions",
                "capitalAllowances",
                "assessedLosses",
            ],
            Self::Paye => &INDIVIDUAL_FIELDS,
            Self::CorporateIncomeTax => &[
                "taxableIncome",
                "capitalAllowances",
                "assessedLosses",
                "taxCredits",
            ],
            Self::VatTaxableSupplies => &["amount", "rate"],
            Self::VatImports => &["customsValue", "customsDuty", "exciseDuty", "rate"],
            Self::WithholdingInterest
            | Self::WithholdingDividends
            | Self::WithholdingRoyalties
            | Self::WithholdingFees
            | Self::WithholdingTenders => &["value"],
            Self::CapitalGains => &[
                "salePrice",
                "costPrice",
                "improvementCosts",
                "sellingExpenses",
                "inflationAllowance",
            ],
            Self::Imtt => &["transactionAmount"],
            Self::MiningRoyalties => &["grossValue", "royaltyRate"],
            Self::Presumptive => &["turnover", "months"],
            Self::RentalIncome => &["rentalIncome", "expenses", "capitalAllowances"],
            Self::TobaccoLevy => &["saleValue"],
            Self::CarbonTax => &["litres", "ratePerLitre"],
            Self::CustomsDuty => &["customsValue", "dutyRate"],
        }
    }

    pub fn response_kind(&self) -> ResponseKind {
        match self {
            Self::VatTaxableSupplies | Self::VatImports => ResponseKind::Vat,
            _ => ResponseKind::TaxDue,
        }
    }

    /// Input the calculated amount is deducted from to show a net figure.
    pub fn gross_field(&self) -> Option<&'static str> {
        match self {
            Self::Agriculture => Some("grossIncome"),
            Self::CorporateIncomeTax => Some("taxableIncome"),
            Self::VatTaxableSupplies => Some("amount"),
            Self::VatImports => Some("customsValue"),
            Self::WithholdingInterest
            | Self::WithholdingDividends
            | Self::WithholdingRoyalties
            | Self::WithholdingFees
            | Self::WithholdingTenders => Some("value"),
            Self::CapitalGains => Some("salePrice"),
            Self::Imtt => Some("transactionAmount"),
            Self::MiningRoyalties => Some("grossValue"),
            Self::RentalIncome => Some("rentalIncome"),
            Self::TobaccoLevy => Some("saleValue"),
            Self::Paye | Self::Presumptive | Self::CarbonTax | Self::CustomsDuty => None,
        }
    }

    /// The message shown when a calculation request fails for any reason.
    pub fn failure_message(&self) -> String {
        format!(
            "Failed to calculate {}. Please check your inputs and try again.",
            self.name()
        )
    }
}

impl fmt::Display for TaxType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TaxType {
    type Err = UnknownCalculator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCalculator(s.to_string()))
    }
}

/// Builds the request body for `tax_type` from raw form input.
///
/// PAYE goes through [`PayeRequest`], reading its selectors from the form.
/// The taxable-supplies `rate` accepts selector values (`standard`,
/// `exempt`, ...). Every other calculator sends each catalogue field through
/// [`parse_float_or_zero`].
pub fn build_payload(
    tax_type: TaxType,
    form: &FormState,
) -> CalculationPayload {
    match tax_type {
        TaxType::Paye => PayeRequest::from_form(form).prepare(form),
        TaxType::VatTaxableSupplies => {
            vat_payload(form.get("amount"), VatRate::parse(form.get("rate")))
        }
        _ => {
            let mut payload = CalculationPayload::new();
            for field in tax_type.fields() {
                payload.insert_number(*field, parse_float_or_zero(form.get(field)));
            }
            payload
        }
    }
}
