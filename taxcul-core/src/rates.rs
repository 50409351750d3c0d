//! Static Zimbabwean tax rates (USD schedules).
//!
//! Reference data only: the backend performs the actual tax arithmetic.
//! Rates are fractions (`0.25` is 25%); band limits are in USD.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::calculators::PeriodType;

/// One PAYE band: income above `min` up to and including `max` is taxed at
/// `rate`, less the fixed `deduct` amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxBand {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub deduct: Decimal,
}

impl TaxBand {
    const fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
        deduct: Decimal,
    ) -> Self {
        Self {
            min,
            max,
            rate,
            deduct,
        }
    }

    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min && self.max.is_none_or(|max| income <= max)
    }
}

/// A named flat rate, keyed for lookup from a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub rate: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TaxRateTable {
    pub paye_monthly: &'static [TaxBand],
    pub paye_annual: &'static [TaxBand],
    /// Charged on the PAYE or income tax payable, not on income.
    pub aids_levy: Decimal,
    pub corporate_income_tax: Decimal,
    pub vat_standard: Decimal,
    pub imtt: Decimal,
    pub withholding: &'static [RateCategory],
    pub capital_gains: &'static [RateCategory],
    pub mining_royalties: &'static [RateCategory],
    pub other: &'static [RateCategory],
}

pub static TAX_RATES: TaxRateTable = TaxRateTable {
    paye_monthly: &[
        TaxBand::new(dec!(0), Some(dec!(100)), dec!(0), dec!(0)),
        TaxBand::new(dec!(100), Some(dec!(300)), dec!(0.20), dec!(20)),
        TaxBand::new(dec!(300), Some(dec!(1000)), dec!(0.25), dec!(35)),
        TaxBand::new(dec!(1000), Some(dec!(2000)), dec!(0.30), dec!(85)),
        TaxBand::new(dec!(2000), Some(dec!(3000)), dec!(0.35), dec!(185)),
        TaxBand::new(dec!(3000), None, dec!(0.40), dec!(335)),
    ],
    paye_annual: &[
        TaxBand::new(dec!(0), Some(dec!(1200)), dec!(0), dec!(0)),
        TaxBand::new(dec!(1200), Some(dec!(3600)), dec!(0.20), dec!(240)),
        TaxBand::new(dec!(3600), Some(dec!(12000)), dec!(0.25), dec!(420)),
        TaxBand::new(dec!(12000), Some(dec!(24000)), dec!(0.30), dec!(1020)),
        TaxBand::new(dec!(24000), Some(dec!(36000)), dec!(0.35), dec!(2220)),
        TaxBand::new(dec!(36000), None, dec!(0.40), dec!(4020)),
    ],
    aids_levy: dec!(0.03),
    corporate_income_tax: dec!(0.24),
    vat_standard: dec!(0.15),
    imtt: dec!(0.02),
    withholding: &[
        RateCategory {
            key: "interest",
            name: "Resident tax on interest",
            rate: dec!(0.15),
        },
        RateCategory {
            key: "dividends-listed",
            name: "Dividends from listed companies",
            rate: dec!(0.10),
        },
        RateCategory {
            key: "dividends",
            name: "Dividends from unlisted companies",
            rate: dec!(0.15),
        },
        RateCategory {
            key: "royalties",
            name: "Non-residents' tax on royalties",
            rate: dec!(0.15),
        },
        RateCategory {
            key: "fees",
            name: "Non-residents' tax on fees",
            rate: dec!(0.15),
        },
        RateCategory {
            key: "tenders",
            name: "Contracts without a tax clearance",
            rate: dec!(0.30),
        },
        RateCategory {
            key: "remittances",
            name: "Non-residents' tax on remittances",
            rate: dec!(0.15),
        },
    ],
    capital_gains: &[
        RateCategory {
            key: "general",
            name: "Capital gain on property or unlisted shares",
            rate: dec!(0.20),
        },
        RateCategory {
            key: "pre-2009",
            name: "Property acquired before February 2009 (on gross price)",
            rate: dec!(0.05),
        },
        RateCategory {
            key: "listed-securities",
            name: "Listed marketable securities (on gross price)",
            rate: dec!(0.01),
        },
    ],
    mining_royalties: &[
        RateCategory {
            key: "gold",
            name: "Gold",
            rate: dec!(0.05),
        },
        RateCategory {
            key: "platinum",
            name: "Platinum",
            rate: dec!(0.07),
        },
        RateCategory {
            key: "diamonds",
            name: "Diamonds",
            rate: dec!(0.15),
        },
        RateCategory {
            key: "lithium",
            name: "Lithium",
            rate: dec!(0.07),
        },
        RateCategory {
            key: "chrome",
            name: "Chrome",
            rate: dec!(0.05),
        },
        RateCategory {
            key: "coal",
            name: "Coal",
            rate: dec!(0.01),
        },
    ],
    other: &[
        RateCategory {
            key: "tobacco-levy",
            name: "Tobacco levy (buyer)",
            rate: dec!(0.015),
        },
        RateCategory {
            key: "agriculture",
            name: "Agricultural income (individual, above top band)",
            rate: dec!(0.40),
        },
        RateCategory {
            key: "rental-income",
            name: "Rental income of a company",
            rate: dec!(0.24),
        },
    ],
};

/// PAYE bands for the given pay period.
pub fn paye_bands(period: PeriodType) -> &'static [TaxBand] {
    match period {
        PeriodType::Monthly => TAX_RATES.paye_monthly,
        PeriodType::Annual => TAX_RATES.paye_annual,
    }
}

/// The band `income` falls into; bands are checked in ascending order so a
/// boundary amount belongs to the lower band.
pub fn band_for(
    bands: &[TaxBand],
    income: Decimal,
) -> Option<&TaxBand> {
    bands.iter().find(|band| band.contains(income))
}

pub fn category<'a>(
    categories: &'a [RateCategory],
    key: &str,
) -> Option<&'a RateCategory> {
    categories.iter().find(|c| c.key == key)
}
