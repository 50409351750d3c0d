//! Command dispatch against a recording backend.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::Value;
use taxcul_cli::app::{self, CommandError};
use taxcul_cli::cli::Cli;
use taxcul_core::api::{ApiError, TaxculApi};
use taxcul_core::calculators::{CalculationPayload, TaxType};
use taxcul_core::models::{
    AuthResponse, CalculationResponse, Company, ContactMessage, Credentials, Employee, Feedback,
    NewCompany, NewEmployee, NewPayrollRecord, PayrollRecord, PayrollStats, Registration, User,
};

/// Records what was sent; calculations return 10% of the gross field.
#[derive(Default)]
struct RecordingBackend {
    calculations: Mutex<Vec<(TaxType, CalculationPayload)>>,
    employees: Mutex<Vec<NewEmployee>>,
    feedback: Mutex<Vec<Feedback>>,
    reject_with: Option<ApiError>,
}

impl RecordingBackend {
    fn rejecting(err: ApiError) -> Self {
        Self {
            reject_with: Some(err),
            ..Default::default()
        }
    }

    fn outcome<T>(
        &self,
        value: T,
    ) -> Result<T, ApiError> {
        match &self.reject_with {
            Some(err) => Err(err.clone()),
            None => Ok(value),
        }
    }

    fn calculation_count(&self) -> usize {
        self.calculations.lock().unwrap().len()
    }

    fn last_payload(&self) -> CalculationPayload {
        self.calculations.lock().unwrap().last().unwrap().1.clone()
    }
}

fn company(id: i64) -> Company {
    serde_json::from_value(serde_json::json!({ "id": id, "name": "Msasa Farms" })).unwrap()
}

#[async_trait]
impl TaxculApi for RecordingBackend {
    async fn calculate(
        &self,
        tax_type: TaxType,
        payload: &CalculationPayload,
    ) -> Result<CalculationResponse, ApiError> {
        self.calculations
            .lock()
            .unwrap()
            .push((tax_type, payload.clone()));
        let gross = tax_type
            .gross_field()
            .and_then(|field| payload.number(field))
            .unwrap_or(1000.0);
        self.outcome(CalculationResponse {
            tax_due: Some(gross * 0.1),
            vat: Some(gross * 0.15),
            ..Default::default()
        })
    }

    async fn chat(&self, query: &str) -> Result<String, ApiError> {
        self.outcome(format!("echo: {query}"))
    }
    async fn contact(&self, _message: &ContactMessage) -> Result<(), ApiError> {
        self.outcome(())
    }
    async fn feedback(&self, feedback: &Feedback) -> Result<(), ApiError> {
        self.feedback.lock().unwrap().push(feedback.clone());
        self.outcome(())
    }
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.outcome(AuthResponse {
            token: "tok".to_string(),
            user: Some(User {
                id: 1,
                name: "Rudo".to_string(),
                email: credentials.email.clone(),
            }),
        })
    }
    async fn register(&self, _registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.outcome(AuthResponse {
            token: "tok".to_string(),
            user: None,
        })
    }
    async fn logout(&self) -> Result<(), ApiError> {
        self.outcome(())
    }
    async fn current_user(&self) -> Result<User, ApiError> {
        self.outcome(User {
            id: 1,
            name: "Rudo".to_string(),
            email: "rudo@example.co.zw".to_string(),
        })
    }
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.outcome(vec![company(7)])
    }
    async fn get_company(&self, id: i64) -> Result<Company, ApiError> {
        self.outcome(company(id))
    }
    async fn create_company(&self, _company: &NewCompany) -> Result<Company, ApiError> {
        self.outcome(company(9))
    }
    async fn update_company(&self, id: i64, _company: &NewCompany) -> Result<Company, ApiError> {
        self.outcome(company(id))
    }
    async fn delete_company(&self, _id: i64) -> Result<(), ApiError> {
        self.outcome(())
    }
    async fn list_employees(&self, _company_id: Option<i64>) -> Result<Vec<Employee>, ApiError> {
        self.outcome(Vec::new())
    }
    async fn get_employee(&self, _id: i64) -> Result<Employee, ApiError> {
        Err(ApiError::NotFound)
    }
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError> {
        self.employees.lock().unwrap().push(employee.clone());
        self.outcome(Employee {
            id: 3,
            company_id: employee.company_id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            national_id: None,
            position: None,
            basic_salary: employee.basic_salary,
            start_date: employee.start_date,
        })
    }
    async fn update_employee(
        &self,
        _id: i64,
        _employee: &NewEmployee,
    ) -> Result<Employee, ApiError> {
        Err(ApiError::NotFound)
    }
    async fn delete_employee(&self, _id: i64) -> Result<(), ApiError> {
        self.outcome(())
    }
    async fn list_payroll(&self, _period: Option<&str>) -> Result<Vec<PayrollRecord>, ApiError> {
        self.outcome(Vec::new())
    }
    async fn get_payroll(&self, _id: i64) -> Result<PayrollRecord, ApiError> {
        Err(ApiError::NotFound)
    }
    async fn create_payroll(&self, _record: &NewPayrollRecord) -> Result<PayrollRecord, ApiError> {
        Err(ApiError::NotFound)
    }
    async fn update_payroll(
        &self,
        _id: i64,
        _record: &NewPayrollRecord,
    ) -> Result<PayrollRecord, ApiError> {
        Err(ApiError::NotFound)
    }
    async fn delete_payroll(&self, _id: i64) -> Result<(), ApiError> {
        self.outcome(())
    }
    async fn payroll_stats(&self) -> Result<PayrollStats, ApiError> {
        self.outcome(PayrollStats {
            total_employees: 12,
            total_companies: 2,
            total_gross_payroll: 18500.0,
            total_paye: 2310.25,
            total_net_pay: 15634.75,
        })
    }
}

async fn run(
    backend: &RecordingBackend,
    args: &[&str],
) -> Result<String, CommandError> {
    let cli = Cli::try_parse_from(std::iter::once("taxcul").chain(args.iter().copied()))
        .expect("arguments should parse");
    app::run(cli.command, backend, &cli.currency).await
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

#[tokio::test]
async fn grouped_digits_are_not_a_number() {
    let backend = RecordingBackend::default();

    let result = run(
        &backend,
        &["calc", "withholding/interest", "--field", "value=2,500"],
    )
    .await;

    assert!(matches!(result, Err(CommandError::Invalid(_))));
    assert_eq!(backend.calculation_count(), 0);
}

#[tokio::test]
async fn calc_prints_tax_due_and_net() {
    let backend = RecordingBackend::default();

    let text = run(
        &backend,
        &["calc", "withholding/interest", "--field", "value=2500"],
    )
    .await
    .unwrap();

    assert!(text.contains("Tax due                 USD 250.00"), "got: {text}");
    assert!(text.contains("Net amount              USD 2,250.00"), "got: {text}");
}

#[tokio::test]
async fn calc_reports_first_failure_per_field() {
    let backend = RecordingBackend::default();

    let err = run(&backend, &["calc", "capital-gains", "-f", "costPrice=x"])
        .await
        .unwrap_err();

    let CommandError::Invalid(result) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(result.error("salePrice"), Some("salePrice is required"));
    assert_eq!(
        result.error("costPrice"),
        Some("costPrice must be a valid number")
    );
}

#[tokio::test]
async fn unknown_calculator_is_rejected_before_submission() {
    let backend = RecordingBackend::default();

    let err = run(&backend, &["calc", "estate-duty"]).await.unwrap_err();

    assert!(matches!(err, CommandError::UnknownCalculator(ref slug) if slug == "estate-duty"));
    assert_eq!(backend.calculation_count(), 0);
}

#[tokio::test]
async fn paye_individual_payload_zeroes_business_fields() {
    let backend = RecordingBackend::default();

    run(
        &backend,
        &[
            "paye",
            "--period",
            "annual",
            "-f",
            "currentSalary=14400",
            "-f",
            "employeeCount=40",
        ],
    )
    .await
    .unwrap();

    let payload = backend.last_payload();
    assert_eq!(payload.text("calculatorType"), Some("individual"));
    assert_eq!(payload.text("periodType"), Some("annual"));
    assert_eq!(payload.get("businessType"), Some(&Value::Null));
    assert_eq!(payload.get("projectionYears"), Some(&Value::Null));
    assert_eq!(payload.number("currentSalary"), Some(14400.0));
    assert_eq!(payload.number("employeeCount"), Some(0.0));
    assert_eq!(payload.len(), 27);
}

#[tokio::test]
async fn paye_business_mode_sends_selectors() {
    let backend = RecordingBackend::default();

    run(
        &backend,
        &[
            "paye",
            "--business",
            "--projection-years",
            "3",
            "-f",
            "employeeCount=12",
            "-f",
            "totalGrossPayroll=18000",
            "-f",
            "currentSalary=900",
        ],
    )
    .await
    .unwrap();

    let payload = backend.last_payload();
    assert_eq!(payload.text("calculatorType"), Some("business"));
    assert_eq!(payload.text("businessType"), Some("company"));
    assert_eq!(payload.number("projectionYears"), Some(3.0));
    assert_eq!(payload.number("totalGrossPayroll"), Some(18000.0));
    assert_eq!(payload.number("currentSalary"), Some(0.0));
}

#[tokio::test]
async fn paye_rejects_unknown_period() {
    let backend = RecordingBackend::default();

    let err = run(
        &backend,
        &["paye", "--period", "weekly", "-f", "currentSalary=100"],
    )
    .await
    .unwrap_err();

    let CommandError::Invalid(result) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(result.error("periodType").is_some());
}

#[tokio::test]
async fn vat_maps_rate_option() {
    let backend = RecordingBackend::default();

    let text = run(&backend, &["vat", "--amount", "1000", "--rate", "exempt"])
        .await
        .unwrap();

    let payload = backend.last_payload();
    assert_eq!(payload.number("amount"), Some(1000.0));
    assert_eq!(payload.number("rate"), Some(0.0));
    assert!(text.contains("VAT                     USD 150.00"), "got: {text}");
    assert!(text.contains("Exempt"));
}

#[tokio::test]
async fn backend_failure_uses_calculator_message() {
    let backend = RecordingBackend::rejecting(ApiError::Http {
        status: 500,
        body: "boom".to_string(),
    });

    let err = run(&backend, &["calc", "imtt", "-f", "transactionAmount=100"])
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to calculate intermediated money transfer tax. Please check your inputs and try again."
    );
}

#[tokio::test]
async fn expired_session_asks_for_login() {
    let backend = RecordingBackend::rejecting(ApiError::Unauthorized);

    let err = run(&backend, &["payroll-stats"]).await.unwrap_err();

    assert_eq!(err.to_string(), "Please log in to continue.");
}

#[tokio::test]
async fn wrong_password_is_not_reported_as_expired_session() {
    let backend = RecordingBackend::rejecting(ApiError::Unauthorized);

    let err = run(
        &backend,
        &["login", "--email", "rudo@example.co.zw", "--password", "nope"],
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Invalid email or password.");
}

#[tokio::test]
async fn login_checks_email_shape() {
    let backend = RecordingBackend::default();

    let err = run(&backend, &["login", "--email", "rudo", "--password", "x"])
        .await
        .unwrap_err();

    let CommandError::Invalid(result) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(
        result.error("email"),
        Some("Please enter a valid email address")
    );

    let text = run(
        &backend,
        &["login", "--email", "rudo@example.co.zw", "--password", "x"],
    )
    .await
    .unwrap();
    assert_eq!(text, "Signed in as Rudo.\n");
}

#[tokio::test]
async fn feedback_sends_rating() {
    let backend = RecordingBackend::default();

    run(&backend, &["feedback", "--rating", "4", "--message", "Useful"])
        .await
        .unwrap();

    let sent = backend.feedback.lock().unwrap();
    assert_eq!(sent[0].rating, Some(4));
    assert_eq!(sent[0].message, "Useful");
    assert_eq!(sent[0].email, None);
}

#[tokio::test]
async fn fractional_rating_is_rejected() {
    let backend = RecordingBackend::default();

    let err = run(&backend, &["feedback", "--rating", "2.5"])
        .await
        .unwrap_err();

    let CommandError::Invalid(result) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(result.error("rating"), Some("rating must be a whole number"));
    assert!(backend.feedback.lock().unwrap().is_empty());
}

#[tokio::test]
async fn logout_with_expired_token_still_signs_out() {
    let backend = RecordingBackend::rejecting(ApiError::Unauthorized);

    let text = run(&backend, &["logout"]).await.unwrap();

    assert_eq!(text, "Signed out.\n");
}

#[tokio::test]
async fn logout_reports_unreachable_server() {
    let backend = RecordingBackend::rejecting(ApiError::Transport("refused".to_string()));

    let err = run(&backend, &["logout"]).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Signed out locally; the server could not be reached."
    );
}

#[tokio::test]
async fn employee_create_parses_salary_and_date() {
    let backend = RecordingBackend::default();

    let text = run(
        &backend,
        &[
            "employees",
            "create",
            "--company-id",
            "7",
            "--first-name",
            "Tariro",
            "--last-name",
            "Moyo",
            "--basic-salary",
            "850.50",
            "--start-date",
            "2025-01-06",
        ],
    )
    .await
    .unwrap();

    let sent = backend.employees.lock().unwrap();
    assert_eq!(sent[0].basic_salary, 850.5);
    assert_eq!(
        sent[0].start_date.map(|d| d.to_string()).as_deref(),
        Some("2025-01-06")
    );
    assert!(text.contains("Tariro Moyo"));
    assert!(text.contains("January 6, 2025"));
}

#[tokio::test]
async fn employee_bad_date_is_a_field_error() {
    let backend = RecordingBackend::default();

    let err = run(
        &backend,
        &[
            "employees",
            "create",
            "--company-id",
            "7",
            "--first-name",
            "Tariro",
            "--last-name",
            "Moyo",
            "--basic-salary",
            "850",
            "--start-date",
            "06/01/2025",
        ],
    )
    .await
    .unwrap_err();

    let CommandError::Invalid(result) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(result.error("startDate").is_some());
    assert!(backend.employees.lock().unwrap().is_empty());
}

#[tokio::test]
async fn payroll_stats_are_formatted() {
    let backend = RecordingBackend::default();

    let text = run(&backend, &["payroll-stats", "--currency", "ZWG"])
        .await
        .unwrap();

    assert!(text.contains("ZWG 18,500.00"), "got: {text}");
    assert!(text.contains("ZWG 2,310.25"), "got: {text}");
}

#[tokio::test]
async fn rates_need_no_backend() {
    let backend = RecordingBackend::rejecting(ApiError::Transport("offline".to_string()));

    let text = run(&backend, &["rates", "--annual"]).await.unwrap();

    assert!(text.starts_with("PAYE bands (annual)"));
}

#[tokio::test]
async fn batch_submits_each_row() {
    let backend = RecordingBackend::default();

    let text = run(&backend, &["batch", &fixture("batch.csv")])
        .await
        .unwrap();

    assert_eq!(backend.calculation_count(), 3);
    assert!(text.contains("USD 500.00"), "got: {text}");
    assert!(text.contains("USD 120.00"), "got: {text}");
    assert!(text.contains("USD 5,000.00"), "got: {text}");
    assert!(text.ends_with("Submitted 3 calculations.\n"));
}

#[tokio::test]
async fn batch_failures_keep_the_report() {
    let backend = RecordingBackend::rejecting(ApiError::Http {
        status: 503,
        body: String::new(),
    });

    let err = run(&backend, &["batch", &fixture("batch.csv")])
        .await
        .unwrap_err();

    let CommandError::BatchFailed {
        report,
        failed,
        total,
    } = err
    else {
        panic!("expected a batch failure, got {err:?}");
    };
    assert_eq!((failed, total), (3, 3));
    assert_eq!(report.lines().count(), 3);
}

#[tokio::test]
async fn missing_batch_file() {
    let backend = RecordingBackend::default();

    let err = run(&backend, &["batch", &fixture("missing.csv")])
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Io { .. }));
}
