//! Display formatting for calculator inputs and results.
//!
//! Every function here is total: absent, `NaN` or otherwise unusable input
//! produces a zero-valued (or empty) string instead of an error, so callers
//! can render backend responses without guarding each field.

use chrono::{DateTime, Datelike, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency code used when a caller does not supply one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Largest number of fractional digits a [`Decimal`] can carry.
const MAX_DECIMALS: u32 = 28;

/// Rounds a decimal value to `decimals` places using half-up rounding.
///
/// Values exactly at the midpoint are rounded away from zero, which is the
/// convention used for every monetary amount shown to a user.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxcul_core::format::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46));
/// ```
pub fn round_half_up(
    value: Decimal,
    decimals: u32,
) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a float into a decimal, rejecting `NaN`, infinities and values
/// outside the decimal range (about ±7.9e28).
fn finite_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Renders `value` with exactly `decimals` fractional digits and no grouping.
fn fixed(
    value: Option<f64>,
    decimals: u32,
) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let Some(value) = value.filter(|v| v.is_finite()) else {
        let mut zero = Decimal::ZERO;
        zero.rescale(decimals);
        return zero.to_string();
    };
    match finite_decimal(value).map(|d| round_half_up(d, decimals)) {
        Some(mut rounded) => {
            if rounded.is_zero() {
                rounded.set_sign_positive(true);
            }
            rounded.rescale(decimals);
            // Near the top of the range the scale is capped below `decimals`.
            if rounded.scale() == decimals {
                rounded.to_string()
            } else {
                float_fixed(value, decimals)
            }
        }
        None => float_fixed(value, decimals),
    }
}

/// Float rendering for magnitudes outside the decimal range, where every
/// digit is integral and no rounding is needed.
fn float_fixed(
    value: f64,
    decimals: u32,
) -> String {
    format!("{value:.prec$}", prec = decimals as usize)
}

/// Inserts `,` between every group of three integer digits.
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats `amount` as `"<currency> 1,234.50"`.
///
/// Absent or non-finite amounts render as `"<currency> 0.00"`.
pub fn format_currency(
    amount: Option<f64>,
    currency: &str,
) -> String {
    format!("{currency} {}", format_number(amount, 2))
}

/// Formats `number` with thousands separators and exactly `decimals`
/// fractional digits.
pub fn format_number(
    number: Option<f64>,
    decimals: u32,
) -> String {
    group_thousands(&fixed(number, decimals))
}

/// Formats `value` with `decimals` fractional digits followed by `%`.
///
/// The value is taken as already expressed in percent: `12.5` renders as
/// `"12.50%"`.
pub fn format_percentage(
    value: Option<f64>,
    decimals: u32,
) -> String {
    format!("{}%", fixed(value, decimals))
}

/// Keeps only digits, `.` and `-` from free-text numeric input.
///
/// The result is not guaranteed to be a well-formed number (`"1.2.3"` and
/// `"--5"` pass through); it may also be empty.
pub fn parse_numeric_input(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Length of the longest numeric literal at the start of `s`.
///
/// Accepts an optional sign, digits with an optional fractional part and an
/// optional exponent. Returns 0 when no digit is present.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        let frac_digits = end - frac_start;
        if digits > 0 || frac_digits > 0 {
            pos = end;
            digits += frac_digits;
        }
    }

    if digits == 0 {
        return 0;
    }

    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        let mut end = pos + 1;
        if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
            end += 1;
        }
        let exp_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > exp_start {
            pos = end;
        }
    }

    pos
}

/// Coerces form text into a finite float, falling back to `0`.
///
/// Reads the longest numeric prefix after leading whitespace, so `"12abc"`
/// yields `12.0`. Empty text, text without a numeric prefix, zero
/// (including `-0`) and values that overflow to infinity all yield `0.0`;
/// the caller cannot tell these cases apart.
pub fn parse_float_or_zero(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let len = numeric_prefix_len(trimmed);
    if len == 0 {
        return 0.0;
    }

    match trimmed[..len].parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => v,
        _ => 0.0,
    }
}

/// How a date should be rendered by [`format_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `Jan 5, 2025`
    #[default]
    Short,
    /// `January 5, 2025`
    Long,
    /// `1/5/2025`
    Numeric,
}

impl DateStyle {
    /// Maps a style name onto a style; names other than `short` and `long`
    /// select the numeric form.
    pub fn from_name(name: &str) -> Self {
        match name {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::Numeric,
        }
    }
}

/// Formats a date for display; `None` renders as an empty string.
pub fn format_date(
    date: Option<NaiveDate>,
    style: DateStyle,
) -> String {
    let Some(date) = date else {
        return String::new();
    };

    match style {
        DateStyle::Short => format!("{} {}, {}", date.format("%b"), date.day(), date.year()),
        DateStyle::Long => format!("{} {}, {}", date.format("%B"), date.day(), date.year()),
        DateStyle::Numeric => format!("{}/{}/{}", date.month(), date.day(), date.year()),
    }
}

/// Parses an ISO date (`2025-01-05`) or an RFC 3339 timestamp.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// String front end to [`format_date`].
///
/// Empty or unparsable text renders as an empty string.
pub fn format_date_str(
    text: &str,
    style: &str,
) -> String {
    let date = parse_date(text);
    if date.is_none() && !text.trim().is_empty() {
        tracing::warn!(input = %text, "unparsable date");
    }
    format_date(date, DateStyle::from_name(style))
}
