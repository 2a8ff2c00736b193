use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

/// A local function the model can invoke. Handlers report failures through
/// their `ToolResult`; the registry turns anything else into data as well,
/// so a dispatch can always be fed back to the model.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>>;
}

struct RegisteredTool {
    tool: Tool,
    terminal: bool,
    handler: Box<dyn ToolHandler>,
}

/// The outcome of a dispatch. `terminal` reflects the registered tool's
/// marking; the orchestrator ends the run when a terminal tool succeeds.
pub struct Dispatch {
    pub result: ToolResult<Vec<Content>>,
    pub terminal: bool,
}

/// An explicitly constructed mapping from tool name to handler and wire
/// descriptor. Built by the caller and handed to the agent; there is no
/// process-wide registry.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(
        &mut self,
        tool: Tool,
        terminal: bool,
        handler: Box<dyn ToolHandler>,
    ) -> ToolResult<()> {
        if self.entries.iter().any(|entry| entry.tool.name == tool.name) {
            return Err(ToolError::DuplicateTool(tool.name));
        }
        self.entries.push(RegisteredTool {
            tool,
            terminal,
            handler,
        });
        Ok(())
    }

    /// The descriptors advertised to the provider, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.entries.iter().map(|entry| entry.tool.clone()).collect()
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.tool.name == name && entry.terminal)
    }

    /// Execute a tool call. Total: unknown names, missing required fields
    /// and handler failures all come back as an error payload in `result`,
    /// never as a panic or early return.
    pub async fn dispatch(&self, call: &ToolCall) -> Dispatch {
        let entry = match self.entries.iter().find(|entry| entry.tool.name == call.name) {
            Some(entry) => entry,
            None => {
                return Dispatch {
                    result: Err(ToolError::UnknownTool(call.name.clone())),
                    terminal: false,
                }
            }
        };

        if let Err(error) = check_required_fields(&entry.tool.input_schema, &call.arguments) {
            return Dispatch {
                result: Err(error),
                terminal: entry.terminal,
            };
        }

        debug!(tool = %call.name, "dispatching tool call");
        Dispatch {
            result: entry.handler.call(call.arguments.clone()).await,
            terminal: entry.terminal,
        }
    }
}

/// Validate the schema's `required` list against the supplied arguments
/// before the handler ever sees them.
fn check_required_fields(schema: &Value, arguments: &Value) -> ToolResult<()> {
    let required: HashSet<&str> = schema
        .get("required")
        .and_then(|value| value.as_array())
        .map(|names| names.iter().filter_map(|name| name.as_str()).collect())
        .unwrap_or_default();

    if required.is_empty() {
        return Ok(());
    }

    let supplied = arguments.as_object().ok_or_else(|| {
        ToolError::InvalidArguments("arguments must be a JSON object".to_string())
    })?;

    let missing: Vec<&str> = required
        .into_iter()
        .filter(|name| !supplied.contains_key(*name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        let mut missing = missing;
        missing.sort_unstable();
        Err(ToolError::InvalidArguments(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}
