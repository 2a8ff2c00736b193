use async_trait::async_trait;
use glob::Pattern;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::Tool;
use crate::registry::{ToolHandler, ToolRegistry};

use super::args::{
    parse_args, ListFilesArgs, ReadAllFilesArgs, ReadFileArgs, SearchFilesArgs, WriteFileArgs,
};

/// Largest file the read tools will touch. Checked against metadata before
/// any content is read.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// A directory the agent is allowed to operate in. Every path coming from
/// the model resolves inside `root`; parent-directory components and foreign
/// absolute paths are refused outright.
pub struct Workspace {
    root: PathBuf,
    max_file_bytes: u64,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        // Canonicalize so containment checks are not fooled by `.` segments
        // or symlinked roots.
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register the workspace tool set on a registry. The caller usually
    /// adds a terminal tool alongside these.
    pub fn register_all(self: Arc<Self>, registry: &mut ToolRegistry) -> ToolResult<()> {
        registry.register(
            Tool::new(
                "list_files",
                "Lists all files in the specified directory. Returns a sorted list of filenames.",
                json!({
                    "type": "object",
                    "properties": {
                        "directory": {
                            "type": "string",
                            "description": "Directory path to list (default: workspace root)"
                        }
                    },
                    "required": []
                }),
            ),
            false,
            Box::new(ListFilesTool(self.clone())),
        )?;
        registry.register(
            Tool::new(
                "read_file",
                "Reads and returns the complete contents of a text file. \
                For reading multiple files at once, use read_all_files instead.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_name": {
                            "type": "string",
                            "description": "Name or path of the file to read"
                        }
                    },
                    "required": ["file_name"]
                }),
            ),
            false,
            Box::new(ReadFileTool(self.clone())),
        )?;
        registry.register(
            Tool::new(
                "read_all_files",
                "Reads every file in a directory at once and returns a map of \
                filename to contents. More efficient than reading files one by one.",
                json!({
                    "type": "object",
                    "properties": {
                        "directory": {
                            "type": "string",
                            "description": "Directory path to read (default: workspace root)"
                        }
                    },
                    "required": []
                }),
            ),
            false,
            Box::new(ReadAllFilesTool(self.clone())),
        )?;
        registry.register(
            Tool::new(
                "search_files",
                "Searches for files matching a glob pattern (e.g. '*.rs', 'test_*').",
                json!({
                    "type": "object",
                    "properties": {
                        "pattern": {
                            "type": "string",
                            "description": "Glob pattern to match filenames against"
                        },
                        "directory": {
                            "type": "string",
                            "description": "Directory to search in (default: workspace root)"
                        }
                    },
                    "required": ["pattern"]
                }),
            ),
            false,
            Box::new(SearchFilesTool(self.clone())),
        )?;
        registry.register(
            Tool::new(
                "write_file",
                "Writes content to a file inside the workspace, creating or overwriting it.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_name": {
                            "type": "string",
                            "description": "Name or path of the file to write"
                        },
                        "content": {
                            "type": "string",
                            "description": "The content to write to the file"
                        }
                    },
                    "required": ["file_name", "content"]
                }),
            ),
            false,
            Box::new(WriteFileTool(self.clone())),
        )?;
        Ok(())
    }

    /// Resolve a model-supplied path against the workspace root.
    fn resolve(&self, path_str: &str) -> ToolResult<PathBuf> {
        let path = Path::new(path_str);
        if path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(ToolError::AccessDenied(format!(
                "path '{}' contains a parent-directory component",
                path_str
            )));
        }
        if path.is_absolute() {
            if path.starts_with(&self.root) {
                return Ok(path.to_path_buf());
            }
            return Err(ToolError::AccessDenied(format!(
                "absolute path '{}' is outside the workspace root",
                path_str
            )));
        }
        Ok(self.root.join(path))
    }

    pub fn list_files(&self, directory: &str) -> ToolResult<Vec<String>> {
        let dir = self.resolve(directory)?;
        if !dir.is_dir() {
            return Err(ToolError::ExecutionError(format!(
                "Directory '{}' not found",
                directory
            )));
        }
        let mut names = Vec::new();
        let entries = fs::read_dir(&dir)
            .map_err(|error| ToolError::ExecutionError(format!("Failed to read directory: {}", error)))?;
        for entry in entries {
            let entry = entry
                .map_err(|error| ToolError::ExecutionError(format!("Failed to read entry: {}", error)))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read_file(&self, file_name: &str) -> ToolResult<String> {
        let path = self.resolve(file_name)?;
        let metadata = fs::metadata(&path)
            .map_err(|_| ToolError::ExecutionError(format!("File '{}' not found", file_name)))?;
        if !metadata.is_file() {
            return Err(ToolError::ExecutionError(format!(
                "'{}' is not a file",
                file_name
            )));
        }
        if metadata.len() > self.max_file_bytes {
            return Err(ToolError::FileTooLarge {
                size: metadata.len(),
                limit: self.max_file_bytes,
            });
        }
        let bytes = fs::read(&path)
            .map_err(|error| ToolError::ExecutionError(format!("Failed to read file: {}", error)))?;
        String::from_utf8(bytes).map_err(|_| {
            ToolError::ExecutionError(format!("Cannot read '{}' - not a text file", file_name))
        })
    }

    /// Read every plain file in a directory. A failure for one file is
    /// recorded inline as that file's value and does not abort the batch.
    pub fn read_all_files(&self, directory: &str) -> ToolResult<BTreeMap<String, String>> {
        let names = self.list_files(directory)?;
        let mut contents = BTreeMap::new();
        for name in names {
            let relative = if directory == "." {
                name.clone()
            } else {
                format!("{}/{}", directory.trim_end_matches('/'), name)
            };
            let value = match self.read_file(&relative) {
                Ok(content) => content,
                Err(error) => format!("Error: {}", error),
            };
            contents.insert(name, value);
        }
        Ok(contents)
    }

    pub fn search_files(&self, pattern: &str, directory: &str) -> ToolResult<Vec<String>> {
        let matcher = Pattern::new(pattern)
            .map_err(|error| ToolError::InvalidArguments(format!("invalid pattern: {}", error)))?;
        let names = self.list_files(directory)?;
        Ok(names
            .into_iter()
            .filter(|name| matcher.matches(name))
            .collect())
    }

    pub fn write_file(&self, file_name: &str, content: &str) -> ToolResult<String> {
        let path = self.resolve(file_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                ToolError::ExecutionError(format!("Failed to create directory: {}", error))
            })?;
        }
        fs::write(&path, content)
            .map_err(|error| ToolError::ExecutionError(format!("Failed to write file: {}", error)))?;
        Ok(format!(
            "Successfully wrote {} bytes to '{}'",
            content.len(),
            file_name
        ))
    }
}

struct ListFilesTool(Arc<Workspace>);

#[async_trait]
impl ToolHandler for ListFilesTool {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: ListFilesArgs = parse_args(&arguments)?;
        let names = self.0.list_files(args.directory.as_deref().unwrap_or("."))?;
        Ok(vec![Content::data(json!(names))])
    }
}

struct ReadFileTool(Arc<Workspace>);

#[async_trait]
impl ToolHandler for ReadFileTool {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: ReadFileArgs = parse_args(&arguments)?;
        let content = self.0.read_file(&args.file_name)?;
        Ok(vec![Content::text(content)])
    }
}

struct ReadAllFilesTool(Arc<Workspace>);

#[async_trait]
impl ToolHandler for ReadAllFilesTool {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: ReadAllFilesArgs = parse_args(&arguments)?;
        let contents = self
            .0
            .read_all_files(args.directory.as_deref().unwrap_or("."))?;
        Ok(vec![Content::data(json!(contents))])
    }
}

struct SearchFilesTool(Arc<Workspace>);

#[async_trait]
impl ToolHandler for SearchFilesTool {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: SearchFilesArgs = parse_args(&arguments)?;
        let matches = self
            .0
            .search_files(&args.pattern, args.directory.as_deref().unwrap_or("."))?;
        Ok(vec![Content::data(json!(matches))])
    }
}

struct WriteFileTool(Arc<Workspace>);

#[async_trait]
impl ToolHandler for WriteFileTool {
    async fn call(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: WriteFileArgs = parse_args(&arguments)?;
        let report = self.0.write_file(&args.file_name, &args.content)?;
        Ok(vec![Content::text(report)])
    }
}
