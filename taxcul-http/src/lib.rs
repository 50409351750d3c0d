//! HTTP implementation of [`taxcul_core::TaxculApi`].
//!
//! ```rust,no_run
//! use taxcul_core::api::{StoreConfig, TokenStoreRegistry};
//! use taxcul_http::{ClientConfig, connect};
//!
//! let config = ClientConfig {
//!     api_url: "http://localhost:8000/api".to_string(),
//!     session: StoreConfig::default(),
//! };
//! let api = connect(&config, &TokenStoreRegistry::with_builtin()).unwrap();
//! ```

mod client;

pub use client::HttpApi;

use taxcul_core::api::{ApiError, Session, StoreConfig, TokenStoreRegistry};

/// Where the backend lives and where the session token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session: StoreConfig,
}

/// Open the configured token store and build an [`HttpApi`] around it.
pub fn connect(
    config: &ClientConfig,
    registry: &TokenStoreRegistry,
) -> Result<HttpApi, ApiError> {
    let store = registry.create(&config.session)?;
    tracing::debug!(
        api_url = %config.api_url,
        session_backend = %config.session.backend,
        "connecting"
    );
    HttpApi::new(&config.api_url, Session::new(store))
}
