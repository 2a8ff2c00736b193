use async_stream::try_stream;
use futures::stream::BoxStream;
use indoc::formatdoc;
use std::collections::HashSet;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::memory::{Conversation, WindowPolicy};
use crate::models::content::render_contents;
use crate::models::message::{Message, ToolRequest};
use crate::models::role::Role;
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::registry::{Dispatch, ToolRegistry};

pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// What to do when the model answers with plain text instead of a tool
/// call. `AcceptText` treats the text as an implicit terminate; `Strict`
/// ends the run with `AgentError::NoToolCall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    #[default]
    AcceptText,
    Strict,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Upper bound on provider calls per run
    pub max_iterations: u32,
    pub text_policy: TextPolicy,
    pub window: WindowPolicy,
    /// Overrides the generated system prompt when set
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            text_policy: TextPolicy::default(),
            window: WindowPolicy::default(),
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// A terminal tool ran, or the model finished with plain text under
    /// the default policy
    Completed,
    /// The iteration cap was hit before any terminal tool ran
    IterationLimit,
}

/// The collected result of a headless run.
#[derive(Debug)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub summary: Option<String>,
    pub messages: Vec<Message>,
    pub model_calls: u32,
}

/// Agent drives the tool-calling loop: model call, tool dispatch, result
/// append, repeat until a terminal tool or the iteration cap.
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    config: AgentConfig,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            config: AgentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn system_prompt(&self, tools: &[Tool]) -> String {
        match &self.config.system_prompt {
            Some(prompt) => prompt.clone(),
            None => default_system_prompt(tools),
        }
    }

    /// Create a stream that yields each message as it is generated: the
    /// assistant's responses and the tool-response messages that answer
    /// them. The stream ends normally on completion; a run that hits the
    /// iteration cap ends with `AgentError::MaxIterationsReached`.
    pub fn reply(&self, messages: &[Message]) -> BoxStream<'_, AgentResult<Message>> {
        let seed = messages.to_vec();
        let tools = self.registry.tools();
        let system_prompt = self.system_prompt(&tools);
        let config = self.config.clone();

        Box::pin(try_stream! {
            let mut conversation = Conversation::with_window(config.window);
            for message in seed {
                conversation.push(message);
            }

            let mut completed = false;
            for iteration in 1..=config.max_iterations {
                debug!(iteration, max = config.max_iterations, "requesting completion");
                let (response, _usage) = self
                    .provider
                    .complete(&system_prompt, conversation.as_context(), &tools)
                    .await?;
                conversation.push(response.clone());
                yield response.clone();

                let requests: Vec<ToolRequest> =
                    response.tool_requests().into_iter().cloned().collect();
                if requests.is_empty() {
                    match config.text_policy {
                        TextPolicy::AcceptText => {
                            completed = true;
                            break;
                        }
                        TextPolicy::Strict => {
                            Err(AgentError::NoToolCall)?;
                        }
                    }
                }

                // Every request gets exactly one response, success or error,
                // before the next provider call.
                let mut terminal = false;
                let mut tool_message = Message::user();
                for request in &requests {
                    let dispatch = match &request.tool_call {
                        Ok(call) => self.registry.dispatch(call).await,
                        Err(error) => Dispatch {
                            result: Err(error.clone()),
                            terminal: false,
                        },
                    };
                    if dispatch.terminal && dispatch.result.is_ok() {
                        terminal = true;
                    }
                    tool_message =
                        tool_message.with_tool_response(request.id.clone(), dispatch.result);
                }
                conversation.push(tool_message.clone());
                yield tool_message;

                if terminal {
                    completed = true;
                    break;
                }
            }

            if !completed {
                Err(AgentError::MaxIterationsReached {
                    limit: config.max_iterations,
                })?;
            }
        })
    }

    /// Run a task to completion and collect the transcript. The iteration
    /// cap is reported as a distinct run status rather than an error;
    /// provider failures still propagate.
    pub async fn run(&self, task: &str) -> AgentResult<RunOutcome> {
        use futures::StreamExt;

        let seed = vec![Message::user().with_text(task)];
        let mut messages = seed.clone();
        let mut status = RunStatus::Completed;

        {
            let mut stream = self.reply(&seed);
            while let Some(item) = stream.next().await {
                match item {
                    Ok(message) => messages.push(message),
                    Err(AgentError::MaxIterationsReached { .. }) => {
                        status = RunStatus::IterationLimit;
                        break;
                    }
                    Err(error) => return Err(error),
                }
            }
        }

        let model_calls = messages
            .iter()
            .filter(|message| message.role == Role::Assistant)
            .count() as u32;
        let summary = self.summarize(&messages);

        Ok(RunOutcome {
            status,
            summary,
            messages,
            model_calls,
        })
    }

    /// The final summary of a transcript: the successful terminal tool's
    /// payload if there is one, otherwise the last assistant free text.
    pub fn summarize(&self, messages: &[Message]) -> Option<String> {
        let mut terminal_ids = HashSet::new();
        for message in messages {
            for request in message.tool_requests() {
                if let Ok(call) = &request.tool_call {
                    if self.registry.is_terminal(&call.name) {
                        terminal_ids.insert(request.id.clone());
                    }
                }
            }
        }

        for message in messages.iter().rev() {
            for content in &message.content {
                if let Some(response) = content.as_tool_response() {
                    if terminal_ids.contains(&response.id) {
                        if let Ok(contents) = &response.tool_result {
                            return Some(render_contents(contents));
                        }
                    }
                }
            }
        }

        messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
            .and_then(|message| message.text())
            .filter(|text| !text.is_empty())
    }
}

/// The system prompt generated from the registered tool set.
pub fn default_system_prompt(tools: &[Tool]) -> String {
    let tool_list = tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n");

    formatdoc! {"
        You are an autonomous AI agent that completes tasks using the available tools.

        Guidelines:
        1. If the task concerns files or directories, list them first to see what is available
        2. Use search_files when looking for specific file types or patterns
        3. Use read_all_files when several files are needed; it is cheaper than reading them one by one
        4. When the task is complete, call the terminate tool with a comprehensive summary
        5. If a tool reports an error, explain it and try an alternative approach

        Available tools:
        {tools}",
        tools = tool_list,
    }
}
