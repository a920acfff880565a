//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API (DuckDuckGo, Brave, etc.).
//! The stub returns plausible results so the agent loops and the delegation
//! round-trip can be tested end-to-end without network access.

use async_trait::async_trait;
use covey_core::error::ToolError;
use covey_core::tool::{Tool, ToolResult};

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let max_results = arguments["max_results"].as_u64().unwrap_or(3).min(5) as usize;

        let results = generate_mock_results(query, max_results);
        let payload = serde_json::json!({ "web_results": results });
        let output = serde_json::to_string_pretty(&payload).unwrap_or_default();

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(payload),
        })
    }
}

#[derive(Clone, serde::Serialize)]
struct SearchResult {
    title: String,
    url: String,
    body: String,
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    // Context-aware mock results for common topics.
    let templates: Vec<(&str, Vec<SearchResult>)> = vec![
        ("rust", vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                url: "https://doc.rust-lang.org/book/".into(),
                body: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchResult {
                title: "Rust by Example".into(),
                url: "https://doc.rust-lang.org/rust-by-example/".into(),
                body: "A collection of runnable examples that illustrate Rust concepts and standard library usage.".into(),
            },
            SearchResult {
                title: "crates.io: Rust Package Registry".into(),
                url: "https://crates.io/".into(),
                body: "The Rust community's crate registry for sharing and discovering Rust libraries.".into(),
            },
        ]),
        ("capital", vec![
            SearchResult {
                title: "List of national capitals - Wikipedia".into(),
                url: "https://en.wikipedia.org/wiki/List_of_national_capitals".into(),
                body: "A list of capital cities of the countries of the world, including Paris, the capital of France.".into(),
            },
        ]),
    ];

    for (keyword, results) in &templates {
        if q.contains(keyword) {
            return results.iter().take(count).cloned().collect();
        }
    }

    // Generic fallback.
    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", urlencod(query), i + 1),
            body: format!(
                "This is a mock search result for the query '{}'. In production, this would contain real content.",
                query
            ),
        })
        .collect()
}

fn urlencod(s: &str) -> String {
    s.replace(' ', "+")
}
