//! Built-in collaborator tools for Covey agents.
//!
//! Tools give sub-agents the ability to act in the world: search the web,
//! read Wikipedia and Arxiv, transcribe audio, decode images, and run code.
//! The network-facing tools ship with deterministic mock transports so agent
//! loops can be exercised end-to-end without credentials or connectivity;
//! the filesystem and process tools are real and carry their own guards.

pub mod arxiv;
pub mod audio;
pub mod file_read;
pub mod file_write;
pub mod image;
pub mod paths;
pub mod python;
pub mod shell;
pub mod web_scrape;
pub mod web_search;
pub mod wikipedia;

pub use image::{encode_image_file, load_image_part, media_type_for};

use covey_core::tool::ToolRegistry;
use tracing::warn;

/// Shell commands considered safe enough for the code agent's allowlist.
fn safe_shell_commands() -> Vec<String> {
    [
        "ls", "dir", "cat", "head", "tail", "echo", "pwd", "date", "whoami", "wc", "grep", "find",
        "which", "git", "python", "python3", "pip", "pip3",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Build a single tool by name.
fn build_tool(name: &str) -> Option<Box<dyn covey_core::Tool>> {
    match name {
        "web_search" => Some(Box::new(web_search::WebSearchTool)),
        "web_scrape" => Some(Box::new(web_scrape::WebScrapeTool)),
        "wikipedia_search" => Some(Box::new(wikipedia::WikipediaSearchTool)),
        "arxiv_search" => Some(Box::new(arxiv::ArxivSearchTool)),
        "transcribe_audio" => Some(Box::new(audio::TranscribeAudioTool)),
        "youtube_transcript" => Some(Box::new(audio::YoutubeTranscriptTool)),
        "read_image" => Some(Box::new(image::ReadImageTool)),
        "file_read" => Some(Box::new(file_read::FileReadTool::new())),
        "file_write" => Some(Box::new(file_write::FileWriteTool::new())),
        "run_shell_command" => Some(Box::new(shell::ShellTool::new(safe_shell_commands()))),
        "run_python_script" => Some(Box::new(python::PythonScriptTool::new())),
        _ => None,
    }
}

/// Build a registry holding the named tools. Unknown names are logged and
/// skipped so a typo in an agent's config degrades rather than aborts.
pub fn registry_for(names: &[String]) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for name in names {
        match build_tool(name) {
            Some(tool) => registry.register(tool),
            None => warn!(tool = %name, "Unknown tool name in agent config, skipping"),
        }
    }
    registry
}

/// Create a registry with every built-in tool.
pub fn default_registry() -> ToolRegistry {
    let all = [
        "web_search",
        "web_scrape",
        "wikipedia_search",
        "arxiv_search",
        "transcribe_audio",
        "youtube_transcript",
        "read_image",
        "file_read",
        "file_write",
        "run_shell_command",
        "run_python_script",
    ];
    let names: Vec<String> = all.iter().map(|s| s.to_string()).collect();
    registry_for(&names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_tools() {
        let registry = default_registry();
        assert_eq!(registry.names().len(), 11);
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("read_image").is_some());
        assert!(registry.get("run_python_script").is_some());
    }

    #[test]
    fn registry_for_subset() {
        let registry = registry_for(&["web_search".into(), "web_scrape".into()]);
        assert_eq!(registry.names(), vec!["web_scrape", "web_search"]);
    }

    #[test]
    fn unknown_names_skipped() {
        let registry = registry_for(&["web_search".into(), "time_machine".into()]);
        assert_eq!(registry.names().len(), 1);
    }
}
