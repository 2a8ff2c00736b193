use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by tools and the registry. These are recoverable: the
/// orchestrator records them as tool-result payloads so the model can see
/// what went wrong and adapt. They never abort a run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("A tool named '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Errors raised by provider clients. Unlike tool errors these escape the
/// loop to the caller; only rate limits are retried before doing so.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Only rate limits are worth another attempt; any other transport
    /// failure is surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Run-level errors surfaced by the agent loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("The model returned no tool call")]
    NoToolCall,

    #[error("Maximum iterations reached ({limit})")]
    MaxIterationsReached { limit: u32 },
}

pub type AgentResult<T> = Result<T, AgentError>;
