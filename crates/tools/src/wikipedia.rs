//! Wikipedia search tool — stub returning mock article summaries.

use async_trait::async_trait;
use covey_core::error::ToolError;
use covey_core::tool::{Tool, ToolResult};

pub struct WikipediaSearchTool;

#[async_trait]
impl Tool for WikipediaSearchTool {
    fn name(&self) -> &str {
        "wikipedia_search"
    }

    fn description(&self) -> &str {
        "Search Wikipedia and return structured details of relevant articles (title, summary, content, source URL)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for Wikipedia"
                },
                "max_docs": {
                    "type": "integer",
                    "description": "Maximum number of articles to load (default 3)",
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

        let max_docs = arguments["max_docs"].as_u64().unwrap_or(3).min(5) as usize;

        let slug = query.trim().replace(' ', "_");
        let results: Vec<serde_json::Value> = (0..max_docs)
            .map(|i| {
                serde_json::json!({
                    "page": if i == 0 { query.to_string() } else { format!("{query} (disambiguation {i})") },
                    "source": format!("https://en.wikipedia.org/wiki/{slug}"),
                    "summary": format!("Summary of the Wikipedia article about {query}."),
                    "content": format!(
                        "Full article text about {query}. In production this would be the page content."
                    ),
                })
            })
            .collect();

        let payload = serde_json::json!({ "wiki_results": results });

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: serde_json::to_string_pretty(&payload).unwrap_or_default(),
            data: Some(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_wiki_results() {
        let tool = WikipediaSearchTool;
        let result = tool
            .execute(serde_json::json!({"query": "Alan Turing"}))
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        let results = data["wiki_results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["page"], "Alan Turing");
        assert!(
            results[0]["source"]
                .as_str()
                .unwrap()
                .contains("Alan_Turing")
        );
    }

    #[tokio::test]
    async fn respects_max_docs() {
        let tool = WikipediaSearchTool;
        let result = tool
            .execute(serde_json::json!({"query": "x", "max_docs": 1}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["wiki_results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_query_rejected() {
        let tool = WikipediaSearchTool;
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }
}
