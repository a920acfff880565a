//! Arxiv search tool — stub returning mock paper metadata.

use async_trait::async_trait;
use covey_core::error::ToolError;
use covey_core::tool::{Tool, ToolResult};

pub struct ArxivSearchTool;

#[async_trait]
impl Tool for ArxivSearchTool {
    fn name(&self) -> &str {
        "arxiv_search"
    }

    fn description(&self) -> &str {
        "Search Arxiv for scientific papers and return metadata (title, authors, summary, publication date)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for Arxiv"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of papers to return (default 2)",
                    "default": 2
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let max_results = arguments["max_results"].as_u64().unwrap_or(2).min(5) as usize;

        let results: Vec<serde_json::Value> = (0..max_results)
            .map(|i| {
                serde_json::json!({
                    "published": "2024-01-15",
                    "title": format!("Paper {} on {query}", i + 1),
                    "authors": "A. Researcher, B. Scientist",
                    "summary": format!("Abstract of a paper about {query}."),
                    "content": format!(
                        "Body of a paper about {query}. In production this would be the paper text."
                    ),
                })
            })
            .collect();

        let payload = serde_json::json!({ "arxiv_results": results });

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: serde_json::to_string_pretty(&payload).unwrap_or_default(),
            data: Some(payload),
        })
    }
}
