use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::ToolResult;
use crate::models::content::Content;
use crate::models::tool::Tool;
use crate::registry::{ToolHandler, ToolRegistry};

use super::args::{parse_args, TerminateArgs};

/// Prefix stamped on the terminal tool's payload so the final summary is
/// recognizable in transcripts.
pub const SUMMARY_PREFIX: &str = "AGENT SUMMARY:";

pub struct TerminateTool;

#[async_trait]
impl ToolHandler for TerminateTool {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: TerminateArgs = parse_args(&arguments)?;
        Ok(vec![Content::text(format!(
            "{}\n{}",
            SUMMARY_PREFIX, args.message
        ))])
    }
}

/// Register the terminal tool that ends the agent loop.
pub fn register(registry: &mut ToolRegistry) -> ToolResult<()> {
    registry.register(
        Tool::new(
            "terminate",
            "Terminates the agent loop and provides a final summary. Use this \
            when the task is complete. No further actions are possible after \
            calling this.",
            json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Comprehensive summary of what was accomplished"
                    }
                },
                "required": ["message"]
            }),
        ),
        true,
        Box::new(TerminateTool),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolError;
    use crate::models::tool::ToolCall;

    #[tokio::test]
    async fn test_terminate_formats_summary() {
        let mut registry = ToolRegistry::new();
        register(&mut registry).unwrap();
        assert!(registry.is_terminal("terminate"));

        let dispatch = registry
            .dispatch(&ToolCall::new("terminate", json!({"message": "all done"})))
            .await;
        assert!(dispatch.terminal);
        let contents = dispatch.result.unwrap();
        assert_eq!(contents[0].as_text().unwrap(), "AGENT SUMMARY:\nall done");
    }

    #[tokio::test]
    async fn test_terminate_requires_message() {
        let mut registry = ToolRegistry::new();
        register(&mut registry).unwrap();
        let dispatch = registry.dispatch(&ToolCall::new("terminate", json!({}))).await;
        assert!(dispatch.terminal);
        assert!(matches!(
            dispatch.result.unwrap_err(),
            ToolError::InvalidArguments(_)
        ));
    }
}
