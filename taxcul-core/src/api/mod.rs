pub mod client;
pub mod factory;
pub mod session;

pub use client::{ApiError, TaxculApi};
pub use factory::{StoreConfig, TokenStoreFactory, TokenStoreRegistry};
pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};
