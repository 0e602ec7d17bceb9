//! Test doubles for the login service collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use boardz_core::{ApiError, Router, TokenTransport};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::StatusCode;

pub const TOKEN_BODY: &str = r#"{"access_token":"abc","token_type":"bearer","expires_in":3600}"#;

#[derive(Clone)]
pub enum Reply {
    Body(String),
    Status(u16, String),
}

/// Records every form POST and answers with a fixed reply.
/// `sent` counts requests actually executed, not futures created.
pub struct MockTransport {
    reply: Reply,
    sent: Arc<AtomicUsize>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            sent: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(Reply::Body(TOKEN_BODY.to_string()))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Reply::Status(400, r#"{"error":"invalid_grant"}"#.to_string()))
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl TokenTransport for MockTransport {
    fn post_form(&self, url: &str, body: String) -> BoxFuture<'static, Result<String, ApiError>> {
        self.requests.lock().unwrap().push((url.to_string(), body));
        let sent = self.sent.clone();
        let reply = self.reply.clone();

        async move {
            sent.fetch_add(1, Ordering::SeqCst);
            match reply {
                Reply::Body(body) => Ok(body),
                Reply::Status(code, body) => Err(ApiError::from_status(
                    StatusCode::from_u16(code).unwrap(),
                    &body,
                )),
            }
        }
        .boxed()
    }
}

#[derive(Default)]
pub struct RecordingRouter {
    routes: Mutex<Vec<Vec<String>>>,
}

impl RecordingRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<Vec<String>> {
        self.routes.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.routes.lock().unwrap().len()
    }
}

impl Router for RecordingRouter {
    fn navigate(&self, route: &[&str]) {
        self.routes
            .lock()
            .unwrap()
            .push(route.iter().map(|s| s.to_string()).collect());
    }
}
