use async_trait::async_trait;
use thiserror::Error;

use super::session::SessionError;
use crate::calculators::{CalculationPayload, TaxType};
use crate::models::{
    AuthResponse, CalculationResponse, Company, ContactMessage, Credentials, Employee, Feedback,
    NewCompany, NewEmployee, NewPayrollRecord, PayrollRecord, PayrollStats, Registration, User,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend answered 401; the stored token has been discarded.
    #[error("not authenticated")]
    Unauthorized,

    #[error("record not found")]
    NotFound,

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("session store error: {0}")]
    Session(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err.to_string())
    }
}

/// Every operation the TaxCul backend offers.
///
/// Each call is an independent request: nothing is retried, cancelled or
/// ordered relative to other calls.
#[async_trait]
pub trait TaxculApi: Send + Sync {
    // Calculators
    async fn calculate(
        &self,
        tax_type: TaxType,
        payload: &CalculationPayload,
    ) -> Result<CalculationResponse, ApiError>;

    // Assistant and public forms
    async fn chat(&self, query: &str) -> Result<String, ApiError>;
    async fn contact(&self, message: &ContactMessage) -> Result<(), ApiError>;
    async fn feedback(&self, feedback: &Feedback) -> Result<(), ApiError>;

    // Authentication
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;

    // Companies
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError>;
    async fn get_company(&self, id: i64) -> Result<Company, ApiError>;
    async fn create_company(&self, company: &NewCompany) -> Result<Company, ApiError>;
    async fn update_company(&self, id: i64, company: &NewCompany) -> Result<Company, ApiError>;
    async fn delete_company(&self, id: i64) -> Result<(), ApiError>;

    // Employees
    async fn list_employees(&self, company_id: Option<i64>) -> Result<Vec<Employee>, ApiError>;
    async fn get_employee(&self, id: i64) -> Result<Employee, ApiError>;
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError>;
    async fn update_employee(
        &self,
        id: i64,
        employee: &NewEmployee,
    ) -> Result<Employee, ApiError>;
    async fn delete_employee(&self, id: i64) -> Result<(), ApiError>;

    // Payroll
    async fn list_payroll(&self, period: Option<&str>) -> Result<Vec<PayrollRecord>, ApiError>;
    async fn get_payroll(&self, id: i64) -> Result<PayrollRecord, ApiError>;
    async fn create_payroll(&self, record: &NewPayrollRecord) -> Result<PayrollRecord, ApiError>;
    async fn update_payroll(
        &self,
        id: i64,
        record: &NewPayrollRecord,
    ) -> Result<PayrollRecord, ApiError>;
    async fn delete_payroll(&self, id: i64) -> Result<(), ApiError>;
    async fn payroll_stats(&self) -> Result<PayrollStats, ApiError>;
}
