use std::fmt;

use super::CalculationPayload;
use crate::format::parse_float_or_zero;

/// Standard VAT rate, in percent.
pub const STANDARD_VAT_PERCENT: f64 = 15.0;

/// Rate choice offered by the VAT calculator's rate selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VatRate {
    Standard,
    ZeroRated,
    /// Exempt supplies carry no VAT and are sent with a rate of `0`.
    Exempt,
    /// A rate typed in by the user, in percent.
    Custom(f64),
}

impl VatRate {
    /// Reads a selector value: `standard`, `zero-rated`, `exempt`, or a
    /// number taken as a custom percentage.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Self::Standard,
            "zero-rated" | "zero" | "zero_rated" => Self::ZeroRated,
            "exempt" => Self::Exempt,
            other => Self::Custom(parse_float_or_zero(other)),
        }
    }

    pub fn percent(&self) -> f64 {
        match self {
            Self::Standard => STANDARD_VAT_PERCENT,
            Self::ZeroRated | Self::Exempt => 0.0,
            Self::Custom(rate) => *rate,
        }
    }
}

impl fmt::Display for VatRate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard ({STANDARD_VAT_PERCENT}%)"),
            Self::ZeroRated => f.write_str("Zero-rated (0%)"),
            Self::Exempt => f.write_str("Exempt"),
            Self::Custom(rate) => write!(f, "Custom ({rate}%)"),
        }
    }
}

/// Builds `{ amount, rate }` for the taxable-supplies calculator.
pub fn vat_payload(
    amount: &str,
    rate: VatRate,
) -> CalculationPayload {
    let mut payload = CalculationPayload::new();
    payload.insert_number("amount", parse_float_or_zero(amount));
    payload.insert_number("rate", rate.percent());
    payload
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn custom_rate_is_sent_as_entered() {
        let payload = vat_payload("1500", VatRate::Custom(15.5));

        assert_eq!(payload.number("amount"), Some(1500.0));
        assert_eq!(payload.number("rate"), Some(15.5));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn exempt_rate_maps_to_zero() {
        let payload = vat_payload("1500", VatRate::Exempt);

        assert_eq!(payload.number("amount"), Some(1500.0));
        assert_eq!(payload.number("rate"), Some(0.0));
    }

    #[test]
    fn selector_values_parse() {
        assert_eq!(VatRate::parse("Standard"), VatRate::Standard);
        assert_eq!(VatRate::parse("zero-rated"), VatRate::ZeroRated);
        assert_eq!(VatRate::parse(" exempt "), VatRate::Exempt);
        assert_eq!(VatRate::parse("15.5"), VatRate::Custom(15.5));
        assert_eq!(VatRate::parse("n/a"), VatRate::Custom(0.0));
    }

    #[test]
    fn standard_rate_is_fifteen_percent() {
        assert_eq!(VatRate::Standard.percent(), 15.0);
        assert_eq!(VatRate::Standard.to_string(), "Standard (15%)");
    }
}
