use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One employee's payslip figures for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: i64,
    pub company_id: i64,
    pub employee_id: i64,
    /// Pay period, e.g. `2025-01`.
    pub period: String,
    #[serde(default)]
    pub gross_salary: f64,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub deductions: f64,
    #[serde(default)]
    pub paye: f64,
    #[serde(default)]
    pub aids_levy: f64,
    #[serde(default)]
    pub nssa: f64,
    #[serde(default)]
    pub net_salary: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// For creating or replacing a payroll record (no id or timestamps)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayrollRecord {
    pub company_id: i64,
    pub employee_id: i64,
    pub period: String,
    pub gross_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
}

/// Dashboard totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayrollStats {
    pub total_employees: u64,
    pub total_companies: u64,
    pub total_gross_payroll: f64,
    pub total_paye: f64,
    pub total_net_pay: f64,
}
