//! HTTP client module for the BoardZ token endpoint.
//!
//! This module provides the `TokenTransport` seam the login service talks
//! through, and `ApiClient`, its reqwest implementation. The endpoint speaks
//! `application/x-www-form-urlencoded` in and JSON out.

pub mod client;
pub mod error;

pub use client::{ApiClient, TokenData, TokenTransport};
pub use error::ApiError;
