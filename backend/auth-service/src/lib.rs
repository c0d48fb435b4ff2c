//! Auth Service Library
//!
//! Provides credential verification, token issuance, and session lifecycle
//! management for the API.
//!
//! ## Modules
//!
//! - `config`: Service configuration
//! - `error`: Error types
//! - `http`: HTTP router, handlers, and auth middleware
//! - `models`: Data models and request/response types
//! - `security`: Password hashing and token issuing/validation
//! - `service`: Session lifecycle orchestration (login, refresh, revoke-all)
//! - `store`: Storage contracts and Postgres implementations
//! - `validators`: Input validation

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod security;
pub mod service;
pub mod store;
pub mod validators;

// Re-export commonly used types
pub use error::{AuthError, Result};
pub use service::SessionService;
