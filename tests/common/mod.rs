#![allow(dead_code)]

use apiprobe::services::transport::{
    HttpTransport, PreparedRequest, TransportError, TransportResponse,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub enum Step {
    Respond(TransportResponse),
    Fail(TransportError),
    Hang,
}

/// In-memory transport that replays a fixed script and records what it was sent.
pub struct ScriptedTransport {
    script: std::sync::Mutex<VecDeque<Step>>,
    sent: std::sync::Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: std::sync::Mutex::new(steps.into()),
            sent: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(request);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Hang) => futures::future::pending().await,
            None => Err(TransportError::Other("script exhausted".to_string())),
        }
    }
}

pub fn respond(status: u16, body: &str) -> Step {
    Step::Respond(TransportResponse {
        status,
        status_text: String::new(),
        headers: vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("x-request-id".to_string(), format!("req-{}", status)),
        ],
        body: body.to_string(),
    })
}

pub fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
