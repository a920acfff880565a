//! Audio tools — transcription and YouTube transcript extraction.
//!
//! Both are stubs with deterministic outputs: in production `transcribe_audio`
//! would post the file to a speech-to-text endpoint and `youtube_transcript`
//! would fetch the video's caption track.

use async_trait::async_trait;
use covey_core::error::ToolError;
use covey_core::tool::{Tool, ToolResult};

/// Transcribe a local audio file.
pub struct TranscribeAudioTool;

#[async_trait]
impl Tool for TranscribeAudioTool {
    fn name(&self) -> &str {
        "transcribe_audio"
    }

    fn description(&self) -> &str {
        "Transcribe a local audio file (mp3, wav, m4a) to text."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the audio file to transcribe"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;

        let extension = std::path::Path::new(file_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !matches!(extension.as_str(), "mp3" | "wav" | "m4a" | "flac" | "ogg") {
            return Err(ToolError::InvalidArguments(format!(
                "Unsupported audio format: '{extension}'. Supported: mp3, wav, m4a, flac, ogg"
            )));
        }

        if !std::path::Path::new(file_path).exists() {
            return Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Audio file not found: {file_path}"),
                data: None,
            });
        }

        // Deterministic mock transcript keyed by the file name.
        let stem = std::path::Path::new(file_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("recording");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("Transcript of {stem}: [mock transcription of the audio content]"),
            data: None,
        })
    }
}

/// Fetch the transcript of a YouTube video.
pub struct YoutubeTranscriptTool;

#[async_trait]
impl Tool for YoutubeTranscriptTool {
    fn name(&self) -> &str {
        "youtube_transcript"
    }

    fn description(&self) -> &str {
        "Fetch the transcript (captions) of a YouTube video given its URL."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The YouTube video URL"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let url = arguments["url"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'url' argument".into()))?;

        let Some(video_id) = extract_video_id(url) else {
            return Err(ToolError::InvalidArguments(format!(
                "Not a recognizable YouTube URL: {url}"
            )));
        };

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("Transcript of video {video_id}: [mock caption track text]"),
            data: Some(serde_json::json!({ "video_id": video_id })),
        })
    }
}

/// Pull the video id out of watch/short-form YouTube URLs.
fn extract_video_id(url: &str) -> Option<String> {
    if let Some(rest) = url.split("youtube.com/watch?v=").nth(1) {
        let id: String = rest.chars().take_while(|c| *c != '&' && *c != '#').collect();
        if !id.is_empty() {
            return Some(id);
        }
    }
    if let Some(rest) = url.split("youtu.be/").nth(1) {
        let id: String = rest.chars().take_while(|c| *c != '?' && *c != '#').collect();
        if !id.is_empty() {
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn transcribe_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interview.mp3");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"fake audio bytes").unwrap();

        let tool = TranscribeAudioTool;
        let result = tool
            .execute(serde_json::json!({"file_path": path.to_str().unwrap()}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("interview"));
    }

    #[tokio::test]
    async fn transcribe_missing_file_fails_gracefully() {
        let tool = TranscribeAudioTool;
        let result = tool
            .execute(serde_json::json!({"file_path": "/tmp/covey_missing_98765.mp3"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("not found"));
    }

    #[tokio::test]
    async fn unsupported_format_rejected() {
        let tool = TranscribeAudioTool;
        let result = tool
            .execute(serde_json::json!({"file_path": "/tmp/file.pdf"}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn youtube_watch_url() {
        let tool = YoutubeTranscriptTool;
        let result = tool
            .execute(serde_json::json!({"url": "https://www.youtube.com/watch?v=abc123&t=10s"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data.unwrap()["video_id"], "abc123");
    }

    #[tokio::test]
    async fn youtube_short_url() {
        let tool = YoutubeTranscriptTool;
        let result = tool
            .execute(serde_json::json!({"url": "https://youtu.be/xyz789"}))
            .await
            .unwrap();

        assert_eq!(result.data.unwrap()["video_id"], "xyz789");
    }

    #[tokio::test]
    async fn non_youtube_url_rejected() {
        let tool = YoutubeTranscriptTool;
        let result = tool
            .execute(serde_json::json!({"url": "https://vimeo.com/12345"}))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn video_id_extraction() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("https://example.com"), None);
    }
}
