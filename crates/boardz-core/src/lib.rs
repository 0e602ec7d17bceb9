//! Core library for the BoardZ client login.
//!
//! Posts credentials to the OAuth2-style token endpoint, keeps the resulting
//! access token and its expiry in a token store, and sends the user back to
//! the login view when the session ends.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiClient, ApiError, TokenData, TokenTransport};
pub use auth::{Authentication, LoginError, LoginService, Router, SessionData, TokenDataStore};
pub use config::Config;
