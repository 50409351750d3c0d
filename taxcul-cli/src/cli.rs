use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taxcul_core::format::DEFAULT_CURRENCY;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Zimbabwean tax calculators and payroll records, backed by the TaxCul API.
///
/// Input is validated locally, sent to the backend calculator and the
/// result printed with the shared formatters.
#[derive(Debug, Parser)]
#[command(name = "taxcul", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.taxcul/taxcul.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. `https://api.taxcul.co.zw/api`.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log filter: a bare level or any EnvFilter directive.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Currency code printed in front of amounts.
    #[arg(long, global = true, default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit any calculator by its endpoint slug.
    Calc {
        /// e.g. `withholding/interest`, `capital-gains`
        slug: String,
        /// Field input as `name=value`; repeat for each field.
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// PAYE for an individual or a business payroll.
    Paye(PayeArgs),
    /// VAT on taxable supplies.
    Vat {
        #[arg(long)]
        amount: String,
        /// `standard`, `zero-rated`, `exempt` or a percentage.
        #[arg(long, default_value = "standard")]
        rate: String,
    },
    /// Print the reference rate tables.
    Rates {
        /// Show annual PAYE bands instead of monthly.
        #[arg(long)]
        annual: bool,
    },
    /// List the available calculators and their fields.
    Calculators,
    /// Ask the tax assistant a question.
    Chat {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Send a message to the TaxCul team.
    Contact(ContactArgs),
    /// Rate the service.
    Feedback(FeedbackArgs),
    /// Sign in and keep the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TAXCUL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Sign out and discard the session token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    Companies {
        #[command(subcommand)]
        action: CompanyAction,
    },
    Employees {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    Payroll {
        #[command(subcommand)]
        action: PayrollAction,
    },
    /// Dashboard totals across companies and payroll.
    PayrollStats,
    /// Submit every row of a CSV file (needs a `calculator` column).
    Batch { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct PayeArgs {
    /// Payroll-level calculation instead of a single employee.
    #[arg(long)]
    pub business: bool,
    /// Business type for business mode.
    #[arg(long, requires = "business")]
    pub business_type: Option<String>,
    /// Years to project for business mode.
    #[arg(long, requires = "business")]
    pub projection_years: Option<String>,
    /// `monthly` or `annual`.
    #[arg(long, default_value = "monthly")]
    pub period: String,
    /// Field input as `name=value`, e.g. `currentSalary=1200`.
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub message: String,
}

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// 1 to 5.
    #[arg(long)]
    pub rating: String,
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "TAXCUL_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub password_confirmation: String,
}

#[derive(Debug, Subcommand)]
pub enum CompanyAction {
    List,
    Get { id: i64 },
    Create(CompanyArgs),
    Update {
        id: i64,
        #[command(flatten)]
        company: CompanyArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct CompanyArgs {
    #[arg(long)]
    pub name: String,
    /// ZIMRA business partner number.
    #[arg(long)]
    pub tax_number: Option<String>,
    #[arg(long)]
    pub registration_number: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum EmployeeAction {
    List {
        /// Only employees of this company.
        #[arg(long)]
        company: Option<i64>,
    },
    Get { id: i64 },
    Create(EmployeeArgs),
    Update {
        id: i64,
        #[command(flatten)]
        employee: EmployeeArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct EmployeeArgs {
    #[arg(long)]
    pub company_id: i64,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub basic_salary: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub national_id: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    /// `YYYY-MM-DD`
    #[arg(long)]
    pub start_date: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PayrollAction {
    List {
        /// Pay period, e.g. `2025-01`.
        #[arg(long)]
        period: Option<String>,
    },
    Get { id: i64 },
    Create(PayrollArgs),
    Update {
        id: i64,
        #[command(flatten)]
        record: PayrollArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct PayrollArgs {
    #[arg(long)]
    pub company_id: i64,
    #[arg(long)]
    pub employee_id: i64,
    /// Pay period, e.g. `2025-01`.
    #[arg(long)]
    pub period: String,
    #[arg(long)]
    pub gross_salary: String,
    #[arg(long, default_value = "0")]
    pub allowances: String,
    #[arg(long, default_value = "0")]
    pub deductions: String,
}

/// Splits `name=value`; the value may be empty or contain further `=`.
fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}
