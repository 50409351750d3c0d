mod auth;
mod calculation;
mod company;
mod employee;
mod messages;
mod payroll;

pub use auth::{AuthResponse, Credentials, Registration, User};
pub use calculation::{CalculationResponse, CalculationResult};
pub use company::{Company, NewCompany};
pub use employee::{Employee, NewEmployee};
pub use messages::{ChatReply, ChatRequest, ContactMessage, Feedback};
pub use payroll::{NewPayrollRecord, PayrollRecord, PayrollStats};
