//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `LoginService`: password-grant login against the token endpoint
//! - `TokenDataStore`: the session state (token, username, expiry)
//! - `Router`: the navigation seam used on de-authentication
//!
//! Sessions can be persisted to disk and expire after the `expires_in`
//! lifetime returned by the server.

pub mod login;
pub mod router;
pub mod store;

pub use login::{Authentication, LoginError, LoginService};
pub use router::{Router, LOGIN_ROUTE};
pub use store::{SessionData, TokenDataStore};
