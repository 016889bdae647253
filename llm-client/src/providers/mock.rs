//! Scripted provider for tests
//!
//! Plays back a fixed script of behaviors: canned text, errors, slow
//! replies, or a reply that never arrives. The last step repeats once the
//! script runs out.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// One scripted reaction to a `complete` call.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Reply with this text
    Respond(String),
    /// Fail with an API error carrying this status and message
    Fail { status: u16, message: String },
    /// Reply with this text after a delay
    Delayed(Duration, String),
    /// Never resolve
    Hang,
}

pub struct MockProvider {
    script: Vec<MockStep>,
    call_count: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
    name: &'static str,
}

impl MockProvider {
    /// Play `script` in order, repeating the last step.
    pub fn scripted(script: Vec<MockStep>) -> Self {
        assert!(!script.is_empty(), "mock script needs at least one step");
        Self {
            script,
            call_count: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            name: "mock",
        }
    }

    pub fn responds(content: &str) -> Self {
        Self::scripted(vec![MockStep::Respond(content.to_string())])
    }

    pub fn fails(status: u16, message: &str) -> Self {
        Self::scripted(vec![MockStep::Fail {
            status,
            message: message.to_string(),
        }])
    }

    pub fn delayed(delay: Duration, content: &str) -> Self {
        Self::scripted(vec![MockStep::Delayed(delay, content.to_string())])
    }

    pub fn hangs() -> Self {
        Self::scripted(vec![MockStep::Hang])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request seen, if any.
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| (*guard).clone())
    }

    fn step(&self, call: usize) -> MockStep {
        let idx = call.min(self.script.len() - 1);
        self.script[idx].clone()
    }

    fn reply(content: String) -> LlmResponse {
        LlmResponse {
            content,
            model: "mock-model".to_string(),
            usage: None,
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request);
        }

        match self.step(call) {
            MockStep::Respond(content) => Ok(Self::reply(content)),
            MockStep::Fail { status, message } => Err(LlmError::ApiError {
                message,
                status_code: Some(status),
            }),
            MockStep::Delayed(delay, content) => {
                tokio::time::sleep(delay).await;
                Ok(Self::reply(content))
            }
            MockStep::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
