//! Image tool — read a local image file and base64-encode it.
//!
//! Used two ways: as a regular tool inside the visual agent's loop, and
//! directly by the workflow driver when it injects an attachment into an
//! image-capable agent's task message.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use covey_core::error::ToolError;
use covey_core::message::ContentPart;
use covey_core::tool::{Tool, ToolResult};

/// Media type from a file extension; `None` for non-image extensions.
pub fn media_type_for(path: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Read an image file and return its media type and base64 payload.
pub async fn encode_image_file(path: &str) -> Result<(String, String), ToolError> {
    let media_type = media_type_for(path).ok_or_else(|| {
        ToolError::InvalidArguments(format!(
            "Not a recognized image file: {path} (supported: png, jpg, gif, webp, bmp)"
        ))
    })?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "read_image".into(),
            reason: format!("Failed to read {path}: {e}"),
        })?;

    Ok((media_type.to_string(), BASE64.encode(bytes)))
}

/// Read an image file and wrap it as a base64 content part.
pub async fn load_image_part(path: &str) -> Result<ContentPart, ToolError> {
    let (media_type, data) = encode_image_file(path).await?;
    Ok(ContentPart::Image { media_type, data })
}

pub struct ReadImageTool;

#[async_trait]
impl Tool for ReadImageTool {
    fn name(&self) -> &str {
        "read_image"
    }

    fn description(&self) -> &str {
        "Read a local image file and return it base64-encoded so a vision model can interpret it."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the image file"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;

        match encode_image_file(file_path).await {
            Ok((media_type, data)) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("data:{media_type};base64,{data}"),
                data: Some(serde_json::json!({
                    "media_type": media_type,
                    "base64_length": data.len(),
                })),
            }),
            // Unreadable file is a tool-level failure the agent can react to
            Err(ToolError::ExecutionFailed { reason, .. }) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: reason,
                data: None,
            }),
            Err(e) => Err(e),
        }
    }
}
