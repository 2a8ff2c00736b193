use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::base::{Provider, Usage};
use crate::errors::ProviderResult;
use crate::models::message::Message;
use crate::models::tool::Tool;

/// Deterministic fingerprint of an outgoing request: a SHA-256 over the
/// canonical JSON of (model, system prompt, ordered message list, tool
/// schema set).
pub fn fingerprint(model: &str, system: &str, messages: &[Message], tools: &[Tool]) -> String {
    let key = json!({
        "model": model,
        "system": system,
        "messages": messages,
        "tools": tools,
    });
    let mut hasher = Sha256::new();
    hasher.update(key.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Wraps a provider with an in-memory response cache keyed by request
/// fingerprint, so a repeated identical step costs one network call per
/// process lifetime. Entries are never evicted; the store lives and dies
/// with the run.
pub struct CachingProvider {
    inner: Box<dyn Provider>,
    store: Mutex<HashMap<String, (Message, Usage)>>,
}

impl CachingProvider {
    pub fn new(inner: Box<dyn Provider>) -> Self {
        Self {
            inner,
            store: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Provider for CachingProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> ProviderResult<(Message, Usage)> {
        let key = fingerprint(self.inner.model(), system, messages, tools);

        // The lock is released before awaiting the inner call; the run is a
        // single logical thread, so each fingerprint still reaches the
        // network at most once.
        if let Some(hit) = self.store.lock().unwrap().get(&key) {
            debug!(fingerprint = %&key[..16], "cache hit");
            return Ok(hit.clone());
        }
        debug!(fingerprint = %&key[..16], "cache miss");

        let response = self.inner.complete(system, messages, tools).await?;
        self.store.lock().unwrap().insert(key, response.clone());
        Ok(response)
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
