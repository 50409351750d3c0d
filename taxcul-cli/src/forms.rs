//! Validation rules for each command's input.

use taxcul_core::calculators::{FormState, PayeMode, TaxType};
use taxcul_core::calculators::paye::{BUSINESS_FIELDS, INDIVIDUAL_FIELDS};
use taxcul_core::validate::{
    Rule, Rules, ValidationResult, range_rule, rule, validate_email, validate_form,
    validate_numeric, validate_positive, validate_required,
};

fn required() -> Rule {
    rule(validate_required)
}

fn numeric() -> Rule {
    rule(validate_numeric)
}

fn positive() -> Rule {
    rule(validate_positive)
}

fn email() -> Rule {
    rule(validate_email)
}

/// Rejects fractional input such as `2.5`. Empty input passes.
fn whole_number() -> Rule {
    rule(|value, field| match value.trim().parse::<f64>() {
        Ok(v) if v.fract() != 0.0 => Some(format!("{field} must be a whole number")),
        _ => None,
    })
}

/// Every catalogue field must be numeric; the gross field is also required
/// and positive. The taxable-supplies `rate` is a selector and is checked
/// when it is turned into a `VatRate`.
pub fn calculator_rules(tax_type: TaxType) -> Rules {
    let gross = tax_type.gross_field();
    tax_type
        .fields()
        .iter()
        .filter(|field| !(tax_type == TaxType::VatTaxableSupplies && **field == "rate"))
        .fold(Rules::new(), |rules, field| {
            if Some(*field) == gross {
                rules.field(*field, [required(), numeric(), positive()])
            } else {
                rules.field(*field, [numeric()])
            }
        })
}

pub fn paye_rules(mode: &PayeMode) -> Rules {
    match mode {
        PayeMode::Individual => INDIVIDUAL_FIELDS.iter().fold(
            Rules::new().field("currentSalary", [required(), numeric(), positive()]),
            |rules, field| match *field {
                "currentSalary" => rules,
                field => rules.field(field, [numeric()]),
            },
        ),
        PayeMode::Business { .. } => BUSINESS_FIELDS.iter().fold(
            Rules::new()
                .field("employeeCount", [required(), positive()])
                .field("totalGrossPayroll", [required(), numeric(), positive()])
                .field("projectionYears", [range_rule(1.0, 10.0)]),
            |rules, field| match *field {
                "employeeCount" | "totalGrossPayroll" => rules,
                field => rules.field(field, [numeric()]),
            },
        ),
    }
}

pub fn vat_rules() -> Rules {
    Rules::new().field("amount", [required(), numeric(), positive()])
}

pub fn contact_rules() -> Rules {
    Rules::new()
        .field("name", [required()])
        .field("email", [required(), email()])
        .field("message", [required()])
}

pub fn feedback_rules() -> Rules {
    Rules::new()
        .field("email", [email()])
        .field("rating", [required(), whole_number(), range_rule(1.0, 5.0)])
}

pub fn login_rules() -> Rules {
    Rules::new()
        .field("email", [required(), email()])
        .field("password", [required()])
}

pub fn registration_rules() -> Rules {
    Rules::new()
        .field("name", [required()])
        .field("email", [required(), email()])
        .field("password", [required()])
        .field("passwordConfirmation", [required()])
}

pub fn company_rules() -> Rules {
    Rules::new()
        .field("name", [required()])
        .field("email", [email()])
}

pub fn employee_rules() -> Rules {
    Rules::new()
        .field("firstName", [required()])
        .field("lastName", [required()])
        .field("basicSalary", [required(), numeric(), positive()])
        .field("email", [email()])
}

pub fn payroll_rules() -> Rules {
    Rules::new()
        .field("period", [required()])
        .field("grossSalary", [required(), numeric(), positive()])
        .field("allowances", [numeric()])
        .field("deductions", [numeric()])
}

/// Registration also needs the two passwords to agree; that check spans two
/// fields so it runs after the per-field rules.
pub fn validate_registration(form: &FormState) -> ValidationResult {
    let mut result = validate_form(form, &registration_rules());
    if result.error("passwordConfirmation").is_none()
        && form.get("password") != form.get("passwordConfirmation")
    {
        result.errors.insert(
            "passwordConfirmation".to_string(),
            "Passwords do not match".to_string(),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn gross_field_is_required() {
        let result = validate_form(
            &FormState::new().with("costPrice", "abc"),
            &calculator_rules(TaxType::CapitalGains),
        );

        assert_eq!(result.error("salePrice"), Some("salePrice is required"));
        assert_eq!(
            result.error("costPrice"),
            Some("costPrice must be a valid number")
        );
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn calculators_without_gross_field_accept_blank_input() {
        let result = validate_form(&FormState::new(), &calculator_rules(TaxType::CarbonTax));

        assert!(result.is_valid());
    }

    #[test]
    fn vat_rate_selector_is_not_numeric_checked() {
        let form = FormState::new()
            .with("amount", "1500")
            .with("rate", "zero-rated");

        assert!(validate_form(&form, &calculator_rules(TaxType::VatTaxableSupplies)).is_valid());
    }

    #[test]
    fn individual_paye_needs_positive_salary() {
        let result = validate_form(
            &FormState::new()
                .with("currentSalary", "-5")
                .with("bonus", "lots"),
            &paye_rules(&PayeMode::Individual),
        );

        assert_eq!(
            result.error("currentSalary"),
            Some("currentSalary must be a positive number")
        );
        assert_eq!(result.error("bonus"), Some("bonus must be a valid number"));
    }

    #[test]
    fn business_paye_checks_projection_years() {
        let mode = PayeMode::Business {
            business_type: "company".to_string(),
            projection_years: 1,
        };
        let form = FormState::new()
            .with("employeeCount", "12")
            .with("totalGrossPayroll", "18000")
            .with("projectionYears", "25");

        let result = validate_form(&form, &paye_rules(&mode));

        assert_eq!(
            result.error("projectionYears"),
            Some("projectionYears must be between 1 and 10")
        );
        assert!(result.error("currentSalary").is_none());
    }

    #[test]
    fn first_failure_per_field_only() {
        let result = validate_form(&FormState::new(), &contact_rules());

        assert_eq!(result.error("email"), Some("email is required"));
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn feedback_rating_range() {
        let result = validate_form(&FormState::new().with("rating", "6"), &feedback_rules());

        assert_eq!(
            result.error("rating"),
            Some("rating must be between 1 and 5")
        );
    }

    #[test]
    fn feedback_rating_must_be_whole() {
        let result = validate_form(&FormState::new().with("rating", "2.5"), &feedback_rules());

        assert_eq!(
            result.error("rating"),
            Some("rating must be a whole number")
        );
        assert!(validate_form(&FormState::new().with("rating", "4"), &feedback_rules()).is_valid());
    }

    #[test]
    fn registration_passwords_must_match() {
        let form = FormState::new()
            .with("name", "Rudo")
            .with("email", "rudo@example.co.zw")
            .with("password", "secret1")
            .with("passwordConfirmation", "secret2");

        let result = validate_registration(&form);

        assert_eq!(
            result.error("passwordConfirmation"),
            Some("Passwords do not match")
        );

        let matching = form.with("passwordConfirmation", "secret1");
        assert!(validate_registration(&matching).is_valid());
    }

    #[test]
    fn employee_email_is_optional_but_checked() {
        let base = FormState::new()
            .with("firstName", "Tariro")
            .with("lastName", "Moyo")
            .with("basicSalary", "850");

        assert!(validate_form(&base, &employee_rules()).is_valid());

        let result = validate_form(&base.with("email", "tariro@"), &employee_rules());
        assert_eq!(
            result.error("email"),
            Some("Please enter a valid email address")
        );
    }
}
