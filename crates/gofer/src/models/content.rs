use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataContent {
    pub data: Value,
}

/// Content passed to or from a tool. Text is free-form prose for the model;
/// Data carries structured payloads such as file listings or batch reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Content {
    Text(TextContent),
    Data(DataContent),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    pub fn data(data: Value) -> Self {
        Content::Data(DataContent { data })
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    /// Get the structured payload if this is a Data variant
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Content::Data(data) => Some(&data.data),
            _ => None,
        }
    }
}

/// Render a sequence of contents into the single string a provider expects
/// as a tool-result body.
pub fn render_contents(contents: &[Content]) -> String {
    contents
        .iter()
        .map(|content| match content {
            Content::Text(text) => text.text.clone(),
            Content::Data(data) => data.data.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
