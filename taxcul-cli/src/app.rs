//! Command dispatch: input → validation → payload → backend → text.

use std::fmt::Write;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use taxcul_core::api::{ApiError, TaxculApi};
use taxcul_core::calculators::{
    CalculationPayload, FormState, PayeRequest, PeriodType, TaxType, VatRate, build_payload,
    vat_payload,
};
use taxcul_core::format::{format_currency, parse_date, parse_float_or_zero};
use taxcul_core::models::{
    CalculationResult, ContactMessage, Credentials, Feedback, NewCompany, NewEmployee,
    NewPayrollRecord, Registration,
};
use taxcul_core::validate::{Rules, ValidationResult, validate_form};
use taxcul_data::{BatchError, BatchLoader, BatchRunner};
use thiserror::Error;
use tracing::{debug, error};

use crate::cli::{
    Command, CompanyAction, CompanyArgs, ContactArgs, EmployeeAction, EmployeeArgs,
    FeedbackArgs, PayeArgs, PayrollAction, PayrollArgs, RegisterArgs,
};
use crate::{forms, output};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("please correct the highlighted fields")]
    Invalid(ValidationResult),

    #[error("unknown calculator '{0}'; run `taxcul calculators` for the list")]
    UnknownCalculator(String),

    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("cannot open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("{failed} of {total} submissions failed")]
    BatchFailed {
        report: String,
        failed: usize,
        total: usize,
    },
}

/// Maps a backend failure onto what the user is told.
///
/// A rejected token always reads as a request to log in; anything else uses
/// `message`. The underlying error is logged and kept as the source.
fn failed(message: impl Into<String>) -> impl FnOnce(ApiError) -> CommandError {
    let message = message.into();
    move |source| {
        error!(error = %source, "{message}");
        let message = match source {
            ApiError::Unauthorized => "Please log in to continue.".to_string(),
            _ => message,
        };
        CommandError::Api { message, source }
    }
}

fn check(
    form: &FormState,
    rules: &Rules,
) -> Result<(), CommandError> {
    let result = validate_form(form, rules);
    if result.is_valid() {
        Ok(())
    } else {
        Err(CommandError::Invalid(result))
    }
}

fn invalid(
    field: &str,
    message: &str,
) -> CommandError {
    let mut result = ValidationResult::default();
    result.errors.insert(field.to_string(), message.to_string());
    CommandError::Invalid(result)
}

/// Blank optional text is sent as absent.
fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn optional_date(
    field: &str,
    value: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, CommandError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(text) => parse_date(text)
            .map(Some)
            .ok_or_else(|| invalid(field, &format!("{field} must be a date (YYYY-MM-DD)"))),
    }
}

async fn submit(
    api: &dyn TaxculApi,
    tax_type: TaxType,
    payload: CalculationPayload,
) -> Result<CalculationResult, CommandError> {
    debug!(calculator = %tax_type, "submitting");
    let response = api
        .calculate(tax_type, &payload)
        .await
        .map_err(failed(tax_type.failure_message()))?;
    Ok(CalculationResult {
        tax_type,
        payload,
        response,
    })
}

async fn calc(
    api: &dyn TaxculApi,
    slug: &str,
    fields: Vec<(String, String)>,
    currency: &str,
) -> Result<String, CommandError> {
    let tax_type =
        TaxType::parse(slug).ok_or_else(|| CommandError::UnknownCalculator(slug.to_string()))?;
    let form: FormState = fields.into_iter().collect();
    check(&form, &forms::calculator_rules(tax_type))?;

    let result = submit(api, tax_type, build_payload(tax_type, &form)).await?;
    Ok(output::calculation(&result, currency))
}

async fn paye(
    api: &dyn TaxculApi,
    args: PayeArgs,
    currency: &str,
) -> Result<String, CommandError> {
    let period = PeriodType::parse(&args.period)
        .ok_or_else(|| invalid("periodType", "periodType must be monthly or annual"))?;

    let mut form: FormState = args.fields.into_iter().collect();
    form.set("periodType", period.as_str());
    if args.business {
        form.set("calculatorType", "business");
        form.set("businessType", args.business_type.unwrap_or_default());
        form.set("projectionYears", args.projection_years.unwrap_or_default());
    } else {
        form.set("calculatorType", "individual");
    }

    let request = PayeRequest::from_form(&form);
    check(&form, &forms::paye_rules(&request.mode))?;

    let result = submit(api, TaxType::Paye, request.prepare(&form)).await?;
    Ok(output::calculation(&result, currency))
}

async fn vat(
    api: &dyn TaxculApi,
    amount: &str,
    rate: &str,
    currency: &str,
) -> Result<String, CommandError> {
    check(
        &FormState::new().with("amount", amount),
        &forms::vat_rules(),
    )?;
    let rate = VatRate::parse(rate);

    let result = submit(api, TaxType::VatTaxableSupplies, vat_payload(amount, rate)).await?;
    let mut out = output::calculation(&result, currency);
    let _ = writeln!(out, "  {:<24}{rate}", "Rate");
    Ok(out)
}

async fn contact(
    api: &dyn TaxculApi,
    args: ContactArgs,
) -> Result<String, CommandError> {
    let form = FormState::new()
        .with("name", args.name.as_str())
        .with("email", args.email.as_str())
        .with("message", args.message.as_str());
    check(&form, &forms::contact_rules())?;

    let message = ContactMessage {
        name: args.name,
        email: args.email,
        subject: optional(args.subject),
        message: args.message,
    };
    api.contact(&message)
        .await
        .map_err(failed("Failed to send your message. Please try again."))?;
    Ok("Message sent. We'll get back to you soon.\n".to_string())
}

async fn feedback(
    api: &dyn TaxculApi,
    args: FeedbackArgs,
) -> Result<String, CommandError> {
    let form = FormState::new()
        .with("email", args.email.clone().unwrap_or_default())
        .with("rating", args.rating.as_str());
    check(&form, &forms::feedback_rules())?;

    let feedback = Feedback {
        name: optional(args.name),
        email: optional(args.email),
        rating: Some(parse_float_or_zero(&args.rating) as u8),
        message: args.message.unwrap_or_default(),
    };
    api.feedback(&feedback)
        .await
        .map_err(failed("Failed to send feedback. Please try again."))?;
    Ok("Thank you for your feedback.\n".to_string())
}

async fn login(
    api: &dyn TaxculApi,
    email: String,
    password: String,
) -> Result<String, CommandError> {
    let form = FormState::new()
        .with("email", email.as_str())
        .with("password", password.as_str());
    check(&form, &forms::login_rules())?;

    let auth = api
        .login(&Credentials { email, password })
        .await
        .map_err(|e| match e {
            // A 401 here means wrong credentials, not an expired session.
            ApiError::Unauthorized => CommandError::Api {
                message: "Invalid email or password.".to_string(),
                source: ApiError::Unauthorized,
            },
            other => failed("Login failed. Please try again.")(other),
        })?;
    Ok(match auth.user {
        Some(user) => format!("Signed in as {}.\n", user.name),
        None => "Signed in.\n".to_string(),
    })
}

async fn register(
    api: &dyn TaxculApi,
    args: RegisterArgs,
) -> Result<String, CommandError> {
    let form = FormState::new()
        .with("name", args.name.as_str())
        .with("email", args.email.as_str())
        .with("password", args.password.as_str())
        .with("passwordConfirmation", args.password_confirmation.as_str());
    let result = forms::validate_registration(&form);
    if !result.is_valid() {
        return Err(CommandError::Invalid(result));
    }

    let registration = Registration {
        name: args.name,
        email: args.email,
        password: args.password,
        password_confirmation: args.password_confirmation,
    };
    let auth = api
        .register(&registration)
        .await
        .map_err(failed("Registration failed. Please try again."))?;
    Ok(match auth.user {
        Some(user) => format!("Account created. Signed in as {}.\n", user.name),
        None => "Account created.\n".to_string(),
    })
}

fn new_company(args: CompanyArgs) -> Result<NewCompany, CommandError> {
    let form = FormState::new()
        .with("name", args.name.as_str())
        .with("email", args.email.clone().unwrap_or_default());
    check(&form, &forms::company_rules())?;

    Ok(NewCompany {
        name: args.name,
        tax_number: optional(args.tax_number),
        registration_number: optional(args.registration_number),
        address: optional(args.address),
        email: optional(args.email),
        phone: optional(args.phone),
    })
}

async fn companies(
    api: &dyn TaxculApi,
    action: CompanyAction,
) -> Result<String, CommandError> {
    match action {
        CompanyAction::List => {
            let companies = api
                .list_companies()
                .await
                .map_err(failed("Failed to load companies."))?;
            Ok(output::companies(&companies))
        }
        CompanyAction::Get { id } => {
            let company = api
                .get_company(id)
                .await
                .map_err(failed(format!("Company {id} could not be loaded.")))?;
            Ok(output::company(&company))
        }
        CompanyAction::Create(args) => {
            let company = api
                .create_company(&new_company(args)?)
                .await
                .map_err(failed("Failed to create the company."))?;
            Ok(format!("Created company:\n{}", output::company(&company)))
        }
        CompanyAction::Update { id, company } => {
            let company = api
                .update_company(id, &new_company(company)?)
                .await
                .map_err(failed(format!("Failed to update company {id}.")))?;
            Ok(format!("Updated company:\n{}", output::company(&company)))
        }
        CompanyAction::Delete { id } => {
            api.delete_company(id)
                .await
                .map_err(failed(format!("Failed to delete company {id}.")))?;
            Ok(format!("Deleted company {id}.\n"))
        }
    }
}

fn new_employee(args: EmployeeArgs) -> Result<NewEmployee, CommandError> {
    let form = FormState::new()
        .with("firstName", args.first_name.as_str())
        .with("lastName", args.last_name.as_str())
        .with("basicSalary", args.basic_salary.as_str())
        .with("email", args.email.clone().unwrap_or_default());
    check(&form, &forms::employee_rules())?;

    Ok(NewEmployee {
        company_id: args.company_id,
        first_name: args.first_name,
        last_name: args.last_name,
        email: optional(args.email),
        national_id: optional(args.national_id),
        position: optional(args.position),
        basic_salary: parse_float_or_zero(&args.basic_salary),
        start_date: optional_date("startDate", args.start_date.as_deref())?,
    })
}

async fn employees(
    api: &dyn TaxculApi,
    action: EmployeeAction,
    currency: &str,
) -> Result<String, CommandError> {
    match action {
        EmployeeAction::List { company } => {
            let employees = api
                .list_employees(company)
                .await
                .map_err(failed("Failed to load employees."))?;
            Ok(output::employees(&employees, currency))
        }
        EmployeeAction::Get { id } => {
            let employee = api
                .get_employee(id)
                .await
                .map_err(failed(format!("Employee {id} could not be loaded.")))?;
            Ok(output::employee(&employee, currency))
        }
        EmployeeAction::Create(args) => {
            let employee = api
                .create_employee(&new_employee(args)?)
                .await
                .map_err(failed("Failed to create the employee."))?;
            Ok(format!(
                "Created employee:\n{}",
                output::employee(&employee, currency)
            ))
        }
        EmployeeAction::Update { id, employee } => {
            let employee = api
                .update_employee(id, &new_employee(employee)?)
                .await
                .map_err(failed(format!("Failed to update employee {id}.")))?;
            Ok(format!(
                "Updated employee:\n{}",
                output::employee(&employee, currency)
            ))
        }
        EmployeeAction::Delete { id } => {
            api.delete_employee(id)
                .await
                .map_err(failed(format!("Failed to delete employee {id}.")))?;
            Ok(format!("Deleted employee {id}.\n"))
        }
    }
}

fn new_payroll_record(args: PayrollArgs) -> Result<NewPayrollRecord, CommandError> {
    let form = FormState::new()
        .with("period", args.period.as_str())
        .with("grossSalary", args.gross_salary.as_str())
        .with("allowances", args.allowances.as_str())
        .with("deductions", args.deductions.as_str());
    check(&form, &forms::payroll_rules())?;

    Ok(NewPayrollRecord {
        company_id: args.company_id,
        employee_id: args.employee_id,
        period: args.period.trim().to_string(),
        gross_salary: parse_float_or_zero(&args.gross_salary),
        allowances: parse_float_or_zero(&args.allowances),
        deductions: parse_float_or_zero(&args.deductions),
    })
}

async fn payroll(
    api: &dyn TaxculApi,
    action: PayrollAction,
    currency: &str,
) -> Result<String, CommandError> {
    match action {
        PayrollAction::List { period } => {
            let records = api
                .list_payroll(period.as_deref())
                .await
                .map_err(failed("Failed to load payroll records."))?;
            Ok(output::payroll(&records, currency))
        }
        PayrollAction::Get { id } => {
            let record = api
                .get_payroll(id)
                .await
                .map_err(failed(format!("Payroll record {id} could not be loaded.")))?;
            Ok(output::payroll_record(&record, currency))
        }
        PayrollAction::Create(args) => {
            let record = api
                .create_payroll(&new_payroll_record(args)?)
                .await
                .map_err(failed("Failed to create the payroll record."))?;
            Ok(format!(
                "Created payroll record:\n{}",
                output::payroll_record(&record, currency)
            ))
        }
        PayrollAction::Update { id, record } => {
            let record = api
                .update_payroll(id, &new_payroll_record(record)?)
                .await
                .map_err(failed(format!("Failed to update payroll record {id}.")))?;
            Ok(format!(
                "Updated payroll record:\n{}",
                output::payroll_record(&record, currency)
            ))
        }
        PayrollAction::Delete { id } => {
            api.delete_payroll(id)
                .await
                .map_err(failed(format!("Failed to delete payroll record {id}.")))?;
            Ok(format!("Deleted payroll record {id}.\n"))
        }
    }
}

async fn batch(
    api: &dyn TaxculApi,
    path: PathBuf,
    currency: &str,
) -> Result<String, CommandError> {
    let file = File::open(&path).map_err(|source| CommandError::Io {
        path: path.clone(),
        source,
    })?;
    let rows = BatchLoader::parse(file)?;
    let outcomes = BatchRunner::submit(api, &rows).await;

    let mut report = String::new();
    let mut failed = 0;
    for outcome in &outcomes {
        let status = match &outcome.result {
            Ok(result) => format_currency(result.amount(), currency),
            Err(_) => {
                failed += 1;
                outcome.tax_type.failure_message()
            }
        };
        let _ = writeln!(
            report,
            "row {:>3}  {:<34} {status}",
            outcome.row,
            outcome.tax_type.name()
        );
    }

    if failed > 0 {
        return Err(CommandError::BatchFailed {
            report,
            failed,
            total: outcomes.len(),
        });
    }
    let _ = writeln!(report, "Submitted {} calculations.", outcomes.len());
    Ok(report)
}

/// Runs one command and returns the text to print on success.
pub async fn run(
    command: Command,
    api: &dyn TaxculApi,
    currency: &str,
) -> Result<String, CommandError> {
    match command {
        Command::Calc { slug, fields } => calc(api, &slug, fields, currency).await,
        Command::Paye(args) => paye(api, args, currency).await,
        Command::Vat { amount, rate } => vat(api, &amount, &rate, currency).await,
        Command::Rates { annual } => {
            let period = if annual {
                PeriodType::Annual
            } else {
                PeriodType::Monthly
            };
            Ok(output::rates(period, currency))
        }
        Command::Calculators => Ok(output::catalog()),
        Command::Chat { query } => {
            let reply = api
                .chat(&query.join(" "))
                .await
                .map_err(failed("The assistant is unavailable right now. Please try again."))?;
            Ok(format!("{reply}\n"))
        }
        Command::Contact(args) => contact(api, args).await,
        Command::Feedback(args) => feedback(api, args).await,
        Command::Login { email, password } => login(api, email, password).await,
        Command::Register(args) => register(api, args).await,
        Command::Logout => match api.logout().await {
            // The token had already expired; the local copy is gone either way.
            Ok(()) | Err(ApiError::Unauthorized) => Ok("Signed out.\n".to_string()),
            Err(e) => Err(failed("Signed out locally; the server could not be reached.")(e)),
        },
        Command::Whoami => {
            let user = api
                .current_user()
                .await
                .map_err(failed("Could not load your account."))?;
            Ok(output::user(&user))
        }
        Command::Companies { action } => companies(api, action).await,
        Command::Employees { action } => employees(api, action, currency).await,
        Command::Payroll { action } => payroll(api, action, currency).await,
        Command::PayrollStats => {
            let stats = api
                .payroll_stats()
                .await
                .map_err(failed("Failed to load payroll statistics."))?;
            Ok(output::payroll_stats(&stats, currency))
        }
        Command::Batch { file } => batch(api, file, currency).await,
    }
}

