//! API client for the BoardZ token endpoint.
//!
//! `TokenTransport` is the narrow HTTP capability the login service needs:
//! post a form body, get the raw success body back. `ApiClient` implements it
//! over a pooled `reqwest::Client`.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

use super::ApiError;

/// Content type of the token request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds, relative to issuance.
    pub expires_in: i64,
}

impl TokenData {
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse token response: {}", e)))
    }
}

/// Posts form-encoded bodies and returns the body of a successful response.
///
/// The returned future owns everything it needs so that it can be shared and
/// spawned independently of the transport.
pub trait TokenTransport: Send + Sync {
    fn post_form(&self, url: &str, body: String) -> BoxFuture<'static, Result<String, ApiError>>;
}

/// HTTP client for the BoardZ API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

impl TokenTransport for ApiClient {
    fn post_form(&self, url: &str, body: String) -> BoxFuture<'static, Result<String, ApiError>> {
        let client = self.client.clone();
        let url = url.to_string();

        async move {
            debug!(url = %url, "Sending form POST");
            let response = client
                .post(&url)
                .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .header(header::ACCEPT, "application/json")
                .body(body)
                .send()
                .await?;

            let response = Self::check_response(response).await?;
            Ok(response.text().await?)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{"access_token":"abc","token_type":"bearer","expires_in":3600}"#;
        let data = TokenData::parse(json).expect("Failed to parse token test JSON");
        assert_eq!(data.access_token, "abc");
        assert_eq!(data.token_type, "bearer");
        assert_eq!(data.expires_in, 3600);
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let json = r#"{"access_token":"abc","token_type":"bearer","expires_in":60,"userName":"alice",".issued":"now"}"#;
        let data = TokenData::parse(json).expect("Failed to parse token test JSON");
        assert_eq!(data.expires_in, 60);
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(matches!(TokenData::parse("<html>"), Err(ApiError::InvalidResponse(_))));
        assert!(matches!(
            TokenData::parse(r#"{"access_token":"abc"}"#),
            Err(ApiError::InvalidResponse(_))
        ));
    }
}
