use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::errors::{ProviderError, ProviderResult, ToolError};
use crate::models::content::render_contents;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to OpenAI's API message specification.
///
/// Tool responses whose request parsed cleanly become `tool` role messages
/// keyed by the call id; responses to malformed requests have no tool_call
/// on the wire to refer to, so they travel as plain user text instead.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();
    let mut valid_ids: HashSet<String> = HashSet::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });
        let mut text_parts: Vec<String> = Vec::new();
        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        text_parts.push(text.text.clone());
                    }
                }
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => {
                        valid_ids.insert(request.id.clone());
                        let sanitized_name = sanitize_function_name(&tool_call.name);
                        let tool_calls = converted
                            .as_object_mut()
                            .unwrap()
                            .entry("tool_calls")
                            .or_insert(json!([]));

                        tool_calls.as_array_mut().unwrap().push(json!({
                            "id": request.id,
                            "type": "function",
                            "function": {
                                "name": sanitized_name,
                                "arguments": tool_call.arguments.to_string(),
                            }
                        }));
                    }
                    Err(error) => {
                        text_parts.push(format!("Malformed tool call: {}", error));
                    }
                },
                MessageContent::ToolResponse(response) => {
                    if valid_ids.contains(&response.id) {
                        let body = match &response.tool_result {
                            Ok(contents) => render_contents(contents),
                            Err(error) => format!(
                                "The tool call returned the following error:\n{}",
                                error
                            ),
                        };
                        output.push(json!({
                            "role": "tool",
                            "content": body,
                            "tool_call_id": response.id
                        }));
                    } else {
                        let body = match &response.tool_result {
                            Ok(contents) => render_contents(contents),
                            Err(error) => format!("Error: {}", error),
                        };
                        output.push(json!({
                            "role": "user",
                            "content": body
                        }));
                    }
                }
            }
        }

        if !text_parts.is_empty() {
            converted["content"] = json!(text_parts.join("\n"));
        }
        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> ProviderResult<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ProviderError::InvalidRequest(format!(
                "duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: Value) -> ProviderResult<Message> {
    let original = response["choices"][0]["message"].clone();
    if original.is_null() {
        return Err(ProviderError::InvalidResponse(
            "response carried no choices".to_string(),
        ));
    }

    let mut content = Vec::new();

    if let Some(text) = original.get("content") {
        if let Some(text_str) = text.as_str() {
            content.push(MessageContent::text(text_str));
        }
    }

    if let Some(tool_calls) = original.get("tool_calls") {
        if let Some(tool_calls_array) = tool_calls.as_array() {
            for tool_call in tool_calls_array {
                let id = tool_call["id"].as_str().unwrap_or_default().to_string();
                let function_name = tool_call["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let arguments = tool_call["function"]["arguments"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();

                if !is_valid_function_name(&function_name) {
                    let error = ToolError::UnknownTool(format!(
                        "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                        function_name
                    ));
                    content.push(MessageContent::tool_request(id, Err(error)));
                } else {
                    match serde_json::from_str::<Value>(&arguments) {
                        Ok(params) => {
                            content.push(MessageContent::tool_request(
                                id,
                                Ok(ToolCall::new(&function_name, params)),
                            ));
                        }
                        Err(error) => {
                            let error = ToolError::InvalidArguments(format!(
                                "Could not interpret tool use parameters for id {}: {}",
                                id, error
                            ));
                            content.push(MessageContent::tool_request(id, Err(error)));
                        }
                    }
                }
            }
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::Content;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "role": "assistant",
            "message": {
                "tool_calls": [{
                    "id": "1",
                    "function": {
                        "name": "example_fn",
                        "arguments": "{\"param\": \"value\"}"
                    }
                }]
            }
        }],
        "usage": {
            "input_tokens": 10,
            "output_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let message = Message::user().with_text("Hello");
        let spec = messages_to_openai_spec(&[message]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["content"], "Hello");
    }

    #[test]
    fn test_messages_to_openai_spec_complex() {
        let mut messages = vec![
            Message::assistant().with_text("Hello!"),
            Message::user().with_text("How are you?"),
            Message::assistant().with_tool_request(
                "tool1",
                Ok(ToolCall::new("example", json!({"param1": "value1"}))),
            ),
        ];
        messages.push(
            Message::user().with_tool_response("tool1", Ok(vec![Content::text("Result")])),
        );

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 4);
        assert_eq!(spec[0]["role"], "assistant");
        assert_eq!(spec[0]["content"], "Hello!");
        assert_eq!(spec[1]["role"], "user");
        assert_eq!(spec[2]["role"], "assistant");
        assert!(spec[2]["tool_calls"].is_array());
        assert_eq!(spec[3]["role"], "tool");
        assert_eq!(spec[3]["content"], "Result");
        assert_eq!(spec[3]["tool_call_id"], spec[2]["tool_calls"][0]["id"]);
    }

    #[test]
    fn test_messages_to_openai_spec_error_response() {
        let messages = vec![
            Message::assistant().with_tool_request(
                "tool1",
                Ok(ToolCall::new("read_file", json!({"file_name": "../x"}))),
            ),
            Message::user().with_tool_response(
                "tool1",
                Err(ToolError::AccessDenied("outside the root".into())),
            ),
        ];

        let spec = messages_to_openai_spec(&messages);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec[1]["role"], "tool");
        assert!(spec[1]["content"]
            .as_str()
            .unwrap()
            .contains("Access denied"));
    }

    #[test]
    fn test_messages_to_openai_spec_orphan_response_becomes_user_text() {
        let messages = vec![
            Message::assistant()
                .with_tool_request("bad", Err(ToolError::InvalidArguments("not json".into()))),
            Message::user().with_tool_response(
                "bad",
                Err(ToolError::InvalidArguments("not json".into())),
            ),
        ];

        let spec = messages_to_openai_spec(&messages);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0]["role"], "assistant");
        assert!(spec[0]["content"].as_str().unwrap().contains("Malformed"));
        assert_eq!(spec[1]["role"], "user");
    }

    #[test]
    fn test_tools_to_openai_spec() {
        let tool = Tool::new(
            "test_tool",
            "A test tool",
            json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Test parameter"
                    }
                },
                "required": ["input"]
            }),
        );

        let spec = tools_to_openai_spec(&[tool]).unwrap();

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "test_tool");
        assert_eq!(spec[0]["function"]["parameters"]["required"][0], "input");
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let schema = json!({"type": "object", "properties": {}});
        let tool1 = Tool::new("test_tool", "Test tool", schema.clone());
        let tool2 = Tool::new("test_tool", "Test tool", schema);

        let result = tools_to_openai_spec(&[tool1, tool2]);
        assert!(matches!(
            result.unwrap_err(),
            ProviderError::InvalidRequest(message) if message.contains("duplicate")
        ));
    }

    #[test]
    fn test_sanitize_function_name() {
        assert_eq!(sanitize_function_name("hello-world"), "hello-world");
        assert_eq!(sanitize_function_name("hello world"), "hello_world");
        assert_eq!(sanitize_function_name("hello@world"), "hello_world");
    }

    #[test]
    fn test_is_valid_function_name() {
        assert!(is_valid_function_name("hello-world"));
        assert!(is_valid_function_name("hello_world"));
        assert!(!is_valid_function_name("hello world"));
        assert!(!is_valid_function_name("hello@world"));
    }

    #[test]
    fn test_openai_response_to_message_text() {
        let response = json!({
            "choices": [{
                "role": "assistant",
                "message": {
                    "content": "Hello from the model!"
                }
            }]
        });

        let message = openai_response_to_message(response).unwrap();
        assert_eq!(message.content.len(), 1);
        assert_eq!(message.text().as_deref(), Some("Hello from the model!"));
        assert!(matches!(message.role, Role::Assistant));
    }

    #[test]
    fn test_openai_response_to_message_valid_toolrequest() {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        let message = openai_response_to_message(response).unwrap();

        assert_eq!(message.content.len(), 1);
        let requests = message.tool_requests();
        let tool_call = requests[0].tool_call.as_ref().unwrap();
        assert_eq!(tool_call.name, "example_fn");
        assert_eq!(tool_call.arguments, json!({"param": "value"}));
    }

    #[test]
    fn test_openai_response_to_message_invalid_func_name() {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        response["choices"][0]["message"]["tool_calls"][0]["function"]["name"] =
            json!("invalid fn");

        let message = openai_response_to_message(response).unwrap();
        let requests = message.tool_requests();
        match &requests[0].tool_call {
            Err(ToolError::UnknownTool(message)) => {
                assert!(message.starts_with("The provided function name"));
            }
            other => panic!("expected UnknownTool error, got {:?}", other),
        }
    }

    #[test]
    fn test_openai_response_to_message_json_decode_error() {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        let message = openai_response_to_message(response).unwrap();
        let requests = message.tool_requests();
        match &requests[0].tool_call {
            Err(ToolError::InvalidArguments(message)) => {
                assert!(message.starts_with("Could not interpret tool use parameters"));
            }
            other => panic!("expected InvalidArguments error, got {:?}", other),
        }
    }

    #[test]
    fn test_openai_response_to_message_no_choices() {
        let response = json!({"error": {"message": "nope"}});
        assert!(matches!(
            openai_response_to_message(response).unwrap_err(),
            ProviderError::InvalidResponse(_)
        ));
    }
}
