use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ToolError, ToolResult};

/// Parse raw JSON arguments into a typed argument struct. Each tool owns one
/// such struct, so malformed shapes are rejected before any handler logic
/// runs.
pub fn parse_args<T: DeserializeOwned>(arguments: &Value) -> ToolResult<T> {
    serde_json::from_value(arguments.clone())
        .map_err(|error| ToolError::InvalidArguments(error.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListFilesArgs {
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadFileArgs {
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadAllFilesArgs {
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchFilesArgs {
    pub pattern: String,
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteFileArgs {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminateArgs {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_defaults() {
        let args: ListFilesArgs = parse_args(&json!({})).unwrap();
        assert!(args.directory.is_none());

        let args: ListFilesArgs = parse_args(&json!({"directory": "src"})).unwrap();
        assert_eq!(args.directory.as_deref(), Some("src"));
    }

    #[test]
    fn test_parse_missing_field() {
        let error = parse_args::<ReadFileArgs>(&json!({})).unwrap_err();
        assert!(matches!(error, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_parse_wrong_type() {
        let error = parse_args::<ReadFileArgs>(&json!({"file_name": 42})).unwrap_err();
        assert!(matches!(error, ToolError::InvalidArguments(_)));
    }
}
