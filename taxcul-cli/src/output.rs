//! Plain-text rendering of command results.

use std::fmt::Write;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use taxcul_core::calculators::{PeriodType, ResponseKind, TaxType};
use taxcul_core::format::{DateStyle, format_currency, format_date, format_number, format_percentage};
use taxcul_core::models::{
    CalculationResult, Company, Employee, PayrollRecord, PayrollStats, User,
};
use taxcul_core::rates::{RateCategory, TAX_RATES, TaxBand, band_for, paye_bands};
use taxcul_core::validate::ValidationResult;

fn money(
    value: Decimal,
    currency: &str,
) -> String {
    format_currency(value.to_f64(), currency)
}

/// A fractional rate (`0.25`) as a percentage (`25.00%`).
fn percent(rate: Decimal) -> String {
    format_percentage((rate * Decimal::ONE_HUNDRED).to_f64(), 2)
}

pub fn calculation(
    result: &CalculationResult,
    currency: &str,
) -> String {
    let label = match result.tax_type.response_kind() {
        ResponseKind::TaxDue => "Tax due",
        ResponseKind::Vat => "VAT",
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", capitalise(result.tax_type.name()));
    let _ = writeln!(out, "  {label:<24}{}", format_currency(result.amount(), currency));
    if let Some(net) = result.net_amount() {
        let _ = writeln!(out, "  {:<24}{}", "Net amount", format_currency(Some(net), currency));
    }
    if let Some(band) = salary_band(result) {
        let _ = writeln!(out, "  {:<24}{}", "PAYE band", band_label(band, currency));
    }
    for (key, value) in result.response.extra_numbers() {
        let _ = writeln!(out, "  {key:<24}{}", format_number(Some(value), 2));
    }
    out
}

/// The PAYE band an individual's salary falls in, for the period it was
/// entered for.
fn salary_band(result: &CalculationResult) -> Option<&'static TaxBand> {
    let payload = &result.payload;
    if result.tax_type != TaxType::Paye || payload.text("calculatorType") != Some("individual") {
        return None;
    }
    let period = payload
        .text("periodType")
        .and_then(PeriodType::parse)
        .unwrap_or_default();
    let salary = Decimal::from_f64(payload.number("currentSalary")?)?;
    band_for(paye_bands(period), salary)
}

fn band_label(
    band: &TaxBand,
    currency: &str,
) -> String {
    match band.max {
        Some(max) => format!(
            "{} ({} - {})",
            percent(band.rate),
            money(band.min, currency),
            money(max, currency)
        ),
        None => format!(
            "{} ({} and above)",
            percent(band.rate),
            money(band.min, currency)
        ),
    }
}

/// One line per failing field, in field order.
pub fn validation(result: &ValidationResult) -> String {
    result
        .errors
        .iter()
        .fold(String::new(), |mut out, (field, message)| {
            let _ = writeln!(out, "  {field}: {message}");
            out
        })
}

fn bands(
    bands: &[TaxBand],
    currency: &str,
) -> String {
    let mut out = String::new();
    for band in bands {
        let upper = match band.max {
            Some(max) => money(max, currency),
            None => "and above".to_string(),
        };
        let _ = writeln!(
            out,
            "  {:>16} - {:<16} {:>7}   less {}",
            money(band.min, currency),
            upper,
            percent(band.rate),
            money(band.deduct, currency),
        );
    }
    out
}

fn categories(
    title: &str,
    categories: &[RateCategory],
) -> String {
    let mut out = format!("{title}\n");
    for category in categories {
        let _ = writeln!(out, "  {:<56} {:>7}", category.name, percent(category.rate));
    }
    out
}

pub fn rates(
    period: PeriodType,
    currency: &str,
) -> String {
    let mut out = format!("PAYE bands ({period})\n");
    out.push_str(&bands(paye_bands(period), currency));
    out.push('\n');

    let _ = writeln!(out, "Flat rates");
    for (name, rate) in [
        ("AIDS levy (on tax payable)", TAX_RATES.aids_levy),
        ("Corporate income tax", TAX_RATES.corporate_income_tax),
        ("VAT standard rate", TAX_RATES.vat_standard),
        ("IMTT", TAX_RATES.imtt),
    ] {
        let _ = writeln!(out, "  {name:<56} {:>7}", percent(rate));
    }
    out.push('\n');

    out.push_str(&categories("Withholding taxes", TAX_RATES.withholding));
    out.push('\n');
    out.push_str(&categories("Capital gains tax", TAX_RATES.capital_gains));
    out.push('\n');
    out.push_str(&categories("Mining royalties", TAX_RATES.mining_royalties));
    out.push('\n');
    out.push_str(&categories("Other", TAX_RATES.other));
    out
}

pub fn catalog() -> String {
    TaxType::all()
        .iter()
        .fold(String::new(), |mut out, tax_type| {
            let _ = writeln!(
                out,
                "{:<24} {:<34} {}",
                tax_type.slug(),
                tax_type.name(),
                tax_type.fields().join(", ")
            );
            out
        })
}

pub fn user(user: &User) -> String {
    format!("{} <{}> (id {})\n", user.name, user.email, user.id)
}

pub fn company(company: &Company) -> String {
    let mut out = format!("#{} {}\n", company.id, company.name);
    for (label, value) in [
        ("Tax number", &company.tax_number),
        ("Registration", &company.registration_number),
        ("Address", &company.address),
        ("Email", &company.email),
        ("Phone", &company.phone),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "  {label:<14}{value}");
        }
    }
    out
}

pub fn companies(companies: &[Company]) -> String {
    if companies.is_empty() {
        return "No companies.\n".to_string();
    }
    companies.iter().fold(String::new(), |mut out, c| {
        let _ = writeln!(
            out,
            "{:>6}  {:<32} {}",
            c.id,
            c.name,
            c.tax_number.as_deref().unwrap_or("")
        );
        out
    })
}

pub fn employee(
    employee: &Employee,
    currency: &str,
) -> String {
    let mut out = format!(
        "#{} {} (company {})\n",
        employee.id,
        employee.full_name(),
        employee.company_id
    );
    let _ = writeln!(
        out,
        "  {:<14}{}",
        "Basic salary",
        format_currency(Some(employee.basic_salary), currency)
    );
    for (label, value) in [
        ("Position", &employee.position),
        ("Email", &employee.email),
        ("National ID", &employee.national_id),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "  {label:<14}{value}");
        }
    }
    if employee.start_date.is_some() {
        let _ = writeln!(
            out,
            "  {:<14}{}",
            "Started",
            format_date(employee.start_date, DateStyle::Long)
        );
    }
    out
}

pub fn employees(
    employees: &[Employee],
    currency: &str,
) -> String {
    if employees.is_empty() {
        return "No employees.\n".to_string();
    }
    employees.iter().fold(String::new(), |mut out, e| {
        let _ = writeln!(
            out,
            "{:>6}  {:<32} {:>18}",
            e.id,
            e.full_name(),
            format_currency(Some(e.basic_salary), currency)
        );
        out
    })
}

pub fn payroll_record(
    record: &PayrollRecord,
    currency: &str,
) -> String {
    let mut out = format!(
        "#{} period {} (employee {}, company {})\n",
        record.id, record.period, record.employee_id, record.company_id
    );
    for (label, value) in [
        ("Gross salary", record.gross_salary),
        ("Allowances", record.allowances),
        ("Deductions", record.deductions),
        ("PAYE", record.paye),
        ("AIDS levy", record.aids_levy),
        ("NSSA", record.nssa),
        ("Net salary", record.net_salary),
    ] {
        let _ = writeln!(out, "  {label:<14}{}", format_currency(Some(value), currency));
    }
    out
}

pub fn payroll(
    records: &[PayrollRecord],
    currency: &str,
) -> String {
    if records.is_empty() {
        return "No payroll records.\n".to_string();
    }
    records.iter().fold(String::new(), |mut out, r| {
        let _ = writeln!(
            out,
            "{:>6}  {:<8} employee {:<6} gross {:>16}  net {:>16}",
            r.id,
            r.period,
            r.employee_id,
            format_currency(Some(r.gross_salary), currency),
            format_currency(Some(r.net_salary), currency)
        );
        out
    })
}

pub fn payroll_stats(
    stats: &PayrollStats,
    currency: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:<20}{}", "Companies", stats.total_companies);
    let _ = writeln!(out, "  {:<20}{}", "Employees", stats.total_employees);
    for (label, value) in [
        ("Gross payroll", stats.total_gross_payroll),
        ("PAYE", stats.total_paye),
        ("Net pay", stats.total_net_pay),
    ] {
        let _ = writeln!(out, "  {label:<20}{}", format_currency(Some(value), currency));
    }
    out
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
