//! File write tool — write file contents with path validation.

use async_trait::async_trait;
use covey_core::error::ToolError;
use covey_core::tool::{Tool, ToolResult};

use crate::paths::validate_path;

pub struct FileWriteTool {
    /// Allowed root directories. Empty = allow all.
    pub allowed_roots: Vec<String>,
    /// Forbidden path prefixes.
    pub forbidden_paths: Vec<String>,
}

impl FileWriteTool {
    /// Create a file write tool with no path restrictions.
    pub fn new() -> Self {
        Self {
            allowed_roots: Vec::new(),
            forbidden_paths: Vec::new(),
        }
    }

    /// Create a file write tool with path restrictions.
    pub fn with_restrictions(allowed_roots: Vec<String>, forbidden_paths: Vec<String>) -> Self {
        Self {
            allowed_roots,
            forbidden_paths,
        }
    }
}

impl Default for FileWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file at the given path, creating it if it doesn't exist."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to write"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        if let Err(reason) = validate_path(path, &self.allowed_roots, &self.forbidden_paths) {
            return Err(ToolError::PermissionDenied {
                tool_name: "file_write".into(),
                reason,
            });
        }

        match tokio::fs::write(path, content).await {
            Ok(()) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Wrote {} bytes to {path}", content.len()),
                data: None,
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Failed to write file: {e}"),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("out.txt");

        let tool = FileWriteTool::new();
        let result = tool
            .execute(serde_json::json!({
                "path": file_path.to_str().unwrap(),
                "content": "written by covey"
            }))
            .await
            .unwrap();

        assert!(result.success);
        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "written by covey");
    }

    #[tokio::test]
    async fn missing_content_rejected() {
        let tool = FileWriteTool::new();
        let result = tool
            .execute(serde_json::json!({"path": "/tmp/x.txt"}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn forbidden_path_blocked() {
        let tool = FileWriteTool::with_restrictions(vec![], vec!["/etc".into()]);
        let result = tool
            .execute(serde_json::json!({
                "path": "/etc/evil.conf",
                "content": "nope"
            }))
            .await;
        assert!(matches!(result, Err(ToolError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn write_to_bad_directory_fails_gracefully() {
        let tool = FileWriteTool::new();
        let result = tool
            .execute(serde_json::json!({
                "path": "/nonexistent_dir_covey/file.txt",
                "content": "x"
            }))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Failed to write file"));
    }
}
