use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::base::{Provider, Usage};
use crate::errors::ProviderResult;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};

/// A mock provider that returns pre-configured responses. Used by tests and
/// by `--mock` runs, which never touch the network. Clones share the same
/// script and call counter.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Message>>>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A canned two-step script: list the workspace files, then terminate
    /// with a short summary. Matches what a real model typically does with
    /// a "what is in this directory" task.
    pub fn canned() -> Self {
        Self::new(vec![
            Message::assistant().with_tool_request(
                Uuid::new_v4().to_string(),
                Ok(ToolCall::new("list_files", json!({}))),
            ),
            Message::assistant().with_tool_request(
                Uuid::new_v4().to_string(),
                Ok(ToolCall::new(
                    "terminate",
                    json!({"message": "Listed the files in the workspace."}),
                )),
            ),
        ])
    }

    /// How many completions this provider has served
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> ProviderResult<(Message, Usage)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        match responses.pop_front() {
            // Return an empty response once the script is exhausted
            None => Ok((Message::assistant().with_text(""), Usage::default())),
            Some(response) => Ok((response, Usage::default())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
