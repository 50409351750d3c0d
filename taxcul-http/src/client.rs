use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use taxcul_core::api::{ApiError, Session, TaxculApi};
use taxcul_core::calculators::{CalculationPayload, TaxType};
use taxcul_core::models::{
    AuthResponse, CalculationResponse, ChatReply, ChatRequest, Company, ContactMessage,
    Credentials, Employee, Feedback, NewCompany, NewEmployee, NewPayrollRecord, PayrollRecord,
    PayrollStats, Registration, User,
};

/// Accepts both bare bodies and bodies wrapped as `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Plain(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Plain(value) => value,
        }
    }
}

/// [`TaxculApi`] over HTTP/JSON.
///
/// The bearer token is read from the [`Session`] before every request. A 401
/// from any endpoint clears it. Requests are sent once: no retries and no
/// timeout beyond the HTTP client's defaults.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
    session: Session,
}

impl HttpApi {
    /// Build a client for `base_url` (e.g. `https://api.taxcul.co.zw/api`).
    ///
    /// # Errors
    /// [`ApiError::Configuration`] when the URL is not an absolute
    /// `http`/`https` URL or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        session: Session,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| ApiError::Configuration(format!("invalid API URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Configuration(format!(
                "API URL '{base_url}' must use http or https"
            )));
        }

        let http = Client::builder()
            .user_agent(concat!("taxcul/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(
        &self,
        path: &str,
    ) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(bearer) = self.session.bearer() {
            request = request.header(AUTHORIZATION, bearer);
        }
        request
    }

    /// Sends the request and maps non-success statuses onto [`ApiError`].
    async fn execute(
        &self,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!(%url, "backend rejected credentials; signing out");
                if let Err(e) = self.session.clear() {
                    error!(error = %e, "cannot clear session token");
                }
                Err(ApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => {
                debug!(%url, "record not found");
                Err(ApiError::NotFound)
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!(%url, status = status.as_u16(), %body, "backend returned an error");
                Err(ApiError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        response
            .json::<Envelope<T>>()
            .await
            .map(Envelope::into_inner)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_empty(
        &self,
        request: RequestBuilder,
    ) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        self.fetch(self.request(Method::GET, path)).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.fetch(self.request(method, path).json(body)).await
    }

    async fn delete(
        &self,
        path: &str,
    ) -> Result<(), ApiError> {
        self.fetch_empty(self.request(Method::DELETE, path)).await
    }

    async fn authenticate(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self.send_json(Method::POST, path, body).await?;
        self.session.set_token(&auth.token)?;
        Ok(auth)
    }
}

#[async_trait]
impl TaxculApi for HttpApi {
    async fn calculate(
        &self,
        tax_type: TaxType,
        payload: &CalculationPayload,
    ) -> Result<CalculationResponse, ApiError> {
        debug!(calculator = %tax_type, fields = payload.len(), "submitting calculation");
        self.send_json(Method::POST, &tax_type.endpoint(), payload)
            .await
    }

    async fn chat(
        &self,
        query: &str,
    ) -> Result<String, ApiError> {
        let request = ChatRequest {
            query: query.to_string(),
        };
        let reply: ChatReply = self.send_json(Method::POST, "/chatbot", &request).await?;
        Ok(reply.response)
    }

    async fn contact(
        &self,
        message: &ContactMessage,
    ) -> Result<(), ApiError> {
        self.fetch_empty(self.request(Method::POST, "/contact").json(message))
            .await
    }

    async fn feedback(
        &self,
        feedback: &Feedback,
    ) -> Result<(), ApiError> {
        self.fetch_empty(self.request(Method::POST, "/feedback").json(feedback))
            .await
    }

    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ApiError> {
        self.authenticate("/login", credentials).await
    }

    async fn register(
        &self,
        registration: &Registration,
    ) -> Result<AuthResponse, ApiError> {
        self.authenticate("/register", registration).await
    }

    /// The local token is discarded even when the backend call fails.
    async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .fetch_empty(self.request(Method::POST, "/logout"))
            .await;
        self.session.clear()?;
        result
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/user").await
    }

    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.get("/companies").await
    }

    async fn get_company(
        &self,
        id: i64,
    ) -> Result<Company, ApiError> {
        self.get(&format!("/companies/{id}")).await
    }

    async fn create_company(
        &self,
        company: &NewCompany,
    ) -> Result<Company, ApiError> {
        self.send_json(Method::POST, "/companies", company).await
    }

    async fn update_company(
        &self,
        id: i64,
        company: &NewCompany,
    ) -> Result<Company, ApiError> {
        self.send_json(Method::PUT, &format!("/companies/{id}"), company)
            .await
    }

    async fn delete_company(
        &self,
        id: i64,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/companies/{id}")).await
    }

    async fn list_employees(
        &self,
        company_id: Option<i64>,
    ) -> Result<Vec<Employee>, ApiError> {
        let mut request = self.request(Method::GET, "/employees");
        if let Some(company_id) = company_id {
            request = request.query(&[("companyId", company_id)]);
        }
        self.fetch(request).await
    }

    async fn get_employee(
        &self,
        id: i64,
    ) -> Result<Employee, ApiError> {
        self.get(&format!("/employees/{id}")).await
    }

    async fn create_employee(
        &self,
        employee: &NewEmployee,
    ) -> Result<Employee, ApiError> {
        self.send_json(Method::POST, "/employees", employee).await
    }

    async fn update_employee(
        &self,
        id: i64,
        employee: &NewEmployee,
    ) -> Result<Employee, ApiError> {
        self.send_json(Method::PUT, &format!("/employees/{id}"), employee)
            .await
    }

    async fn delete_employee(
        &self,
        id: i64,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/employees/{id}")).await
    }

    async fn list_payroll(
        &self,
        period: Option<&str>,
    ) -> Result<Vec<PayrollRecord>, ApiError> {
        let mut request = self.request(Method::GET, "/payroll");
        if let Some(period) = period {
            request = request.query(&[("period", period)]);
        }
        self.fetch(request).await
    }

    async fn get_payroll(
        &self,
        id: i64,
    ) -> Result<PayrollRecord, ApiError> {
        self.get(&format!("/payroll/{id}")).await
    }

    async fn create_payroll(
        &self,
        record: &NewPayrollRecord,
    ) -> Result<PayrollRecord, ApiError> {
        self.send_json(Method::POST, "/payroll", record).await
    }

    async fn update_payroll(
        &self,
        id: i64,
        record: &NewPayrollRecord,
    ) -> Result<PayrollRecord, ApiError> {
        self.send_json(Method::PUT, &format!("/payroll/{id}"), record)
            .await
    }

    async fn delete_payroll(
        &self,
        id: i64,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/payroll/{id}")).await
    }

    async fn payroll_stats(&self) -> Result<PayrollStats, ApiError> {
        self.get("/payroll-stats").await
    }
}
