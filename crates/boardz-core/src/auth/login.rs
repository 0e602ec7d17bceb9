//! Password-grant login against the BoardZ token endpoint.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, trace};

use crate::api::{ApiError, TokenData, TokenTransport};
use crate::config::Config;

use super::router::{Router, LOGIN_ROUTE};
use super::store::{SessionData, TokenDataStore};

#[derive(Error, Debug, Clone)]
pub enum LoginError {
    /// Network failure, non-2xx status and malformed responses alike.
    #[error("Authentication request failed: {0}")]
    RequestFailed(#[source] Arc<ApiError>),
}

impl From<ApiError> for LoginError {
    fn from(error: ApiError) -> Self {
        LoginError::RequestFailed(Arc::new(error))
    }
}

type Relay = Shared<BoxFuture<'static, Result<TokenData, LoginError>>>;

/// Outcome of one `LoginService::authenticate` call.
///
/// The request is issued once. Every clone resolves to the same result and
/// awaiting never re-sends it.
#[derive(Clone)]
pub struct Authentication {
    relay: Relay,
}

impl Authentication {
    /// The result, if the request has already completed.
    pub fn peek(&self) -> Option<&Result<TokenData, LoginError>> {
        self.relay.peek()
    }
}

impl Future for Authentication {
    type Output = Result<TokenData, LoginError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().relay.poll_unpin(cx)
    }
}

struct LoginState {
    store: TokenDataStore,
    last_login_unsuccessful: bool,
}

/// Logs users in and out and owns the session's token store.
///
/// Cloning is cheap and every clone shares the same session.
#[derive(Clone)]
pub struct LoginService {
    token_url: String,
    transport: Arc<dyn TokenTransport>,
    router: Arc<dyn Router>,
    state: Arc<Mutex<LoginState>>,
}

impl LoginService {
    /// Build the service around an existing store. A store whose session is
    /// missing or expired is cleared and the user is sent to the login view.
    pub fn new(
        config: &Config,
        transport: Arc<dyn TokenTransport>,
        router: Arc<dyn Router>,
        store: TokenDataStore,
    ) -> Self {
        let alive = store.check();
        let service = Self {
            token_url: config.token_url(),
            transport,
            router,
            state: Arc::new(Mutex::new(LoginState {
                store,
                last_login_unsuccessful: false,
            })),
        };

        if !alive {
            service.unauthenticate();
        }
        service
    }

    fn state(&self) -> MutexGuard<'_, LoginState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn authenticated(&self) -> bool {
        self.state().store.token().is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().store.token().is_some()
    }

    pub fn username(&self) -> String {
        self.state().store.username().to_string()
    }

    pub fn last_login_unsuccessful(&self) -> bool {
        self.state().last_login_unsuccessful
    }

    pub fn token(&self) -> Option<String> {
        self.state().store.token().map(str::to_string)
    }

    pub fn session(&self) -> SessionData {
        self.state().store.data().clone()
    }

    /// Drop the current session and navigate to the login view.
    ///
    /// The failure flag goes back to `false`, not to "no attempt yet".
    pub fn unauthenticate(&self) {
        debug!("Unauthenticating");
        {
            let mut state = self.state();
            state.last_login_unsuccessful = false;
            state.store.set_token(None);
        }

        self.router.navigate(LOGIN_ROUTE);
    }

    /// Tear down any current session and request a new token.
    ///
    /// The request starts immediately when called inside a tokio runtime,
    /// otherwise on the first poll of the returned handle. The store is
    /// updated when the response arrives, whether or not anyone awaits it.
    ///
    /// Credentials are concatenated into the form body as given; reserved
    /// characters such as `&` or `=` are not percent-encoded.
    pub fn authenticate(&self, username: &str, password: &str) -> Authentication {
        self.unauthenticate();

        let body = format!("grant_type=password&username={}&password={}", username, password);
        let request = self.transport.post_form(&self.token_url, body);

        let service = self.clone();
        let username = username.to_string();
        let relay = async move {
            let result = match request.await {
                Ok(body) => TokenData::parse(&body),
                Err(e) => Err(e),
            };

            match result {
                Ok(token_data) => {
                    service.complete_login(username, &token_data);
                    Ok(token_data)
                }
                Err(e) => {
                    let error = LoginError::from(e);
                    service.handle_error(&error);
                    Err(error)
                }
            }
        }
        .boxed()
        .shared();

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(relay.clone());
        }

        Authentication { relay }
    }

    pub fn handle_error(&self, error: &LoginError) {
        debug!(error = %error, "Login request failed");
        self.state().last_login_unsuccessful = true;
    }

    pub fn save_token(&self, token: String) {
        trace!(token_len = token.len(), "Saving token");
        let mut state = self.state();
        state.last_login_unsuccessful = false;
        state.store.set_token(Some(token));
    }

    fn complete_login(&self, username: String, token_data: &TokenData) {
        self.save_token(token_data.access_token.clone());

        let expiry = expiry_from(Utc::now(), token_data.expires_in);
        let mut state = self.state();
        state.store.set_username(username);
        state.store.set_token_expiry(expiry);
        debug!(username = %state.store.username(), %expiry, "Login successful");
    }
}

/// `now + expires_in` seconds, saturating at the representable range.
fn expiry_from(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    Duration::try_seconds(expires_in)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(if expires_in < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_from() {
        let now = Utc::now();
        assert_eq!(expiry_from(now, 3600), now + Duration::hours(1));
        assert_eq!(expiry_from(now, 0), now);
        assert_eq!(expiry_from(now, -60), now - Duration::minutes(1));
    }

    #[test]
    fn test_expiry_from_saturates() {
        let now = Utc::now();
        assert_eq!(expiry_from(now, i64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry_from(now, i64::MIN), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_login_error_keeps_source() {
        use std::error::Error as _;

        let error = LoginError::from(ApiError::Unauthorized);
        assert_eq!(
            error.to_string(),
            "Authentication request failed: Unauthorized - credentials were rejected"
        );
        assert!(error.source().is_some());
    }
}
