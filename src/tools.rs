//! Built-in tools and the tool manifest.
//!
//! | Tool | Source |
//! |------|--------|
//! | `hn_get_top_posts` | Hacker News front page |
//! | `ph_get_top_products` | Product Hunt front page |
//! | `reddit_get_top_posts` | r/all (hot) |
//! | `get_feed` | any of the above, chosen by `source` |
//!
//! All four share one handler contract: read `limit` through the context's
//! [`LimitPolicy`](crate::limit::LimitPolicy), fetch, normalize, and turn a
//! fetch failure into an `{error, details}` value.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::SourceKind;
use crate::traits::{Tool, ToolContext, ToolError, ToolOutcome, ToolRegistry};

/// Manifest format version.
pub const MANIFEST_VERSION: &str = "0.1";

/// Headline of the error envelope when fetching `source` fails.
pub fn fetch_failure_message(source: SourceKind) -> &'static str {
    match source {
        SourceKind::HackerNews => "Failed to fetch Hacker News posts",
        SourceKind::ProductHunt => "Failed to fetch Product Hunt products",
        SourceKind::Reddit => "Failed to fetch Reddit posts",
    }
}

fn limit_schema(noun: &str) -> Value {
    json!({
        "type": "integer",
        "description": format!("Maximum number of {} to return.", noun),
        "default": 10
    })
}

/// Per-source fetch-top tool.
pub struct FeedTool {
    source: SourceKind,
}

impl FeedTool {
    pub fn for_source(source: SourceKind) -> Self {
        Self { source }
    }

    fn noun(&self) -> &'static str {
        match self.source {
            SourceKind::ProductHunt => "products",
            _ => "posts",
        }
    }
}

#[async_trait]
impl Tool for FeedTool {
    fn name(&self) -> &str {
        match self.source {
            SourceKind::HackerNews => "hn_get_top_posts",
            SourceKind::ProductHunt => "ph_get_top_products",
            SourceKind::Reddit => "reddit_get_top_posts",
        }
    }

    fn description(&self) -> &str {
        match self.source {
            SourceKind::HackerNews => "Fetch top posts from the Hacker News front page.",
            SourceKind::ProductHunt => "Fetch top products from the Product Hunt front page.",
            SourceKind::Reddit => "Fetch top posts from r/all (hot) on Reddit.",
        }
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": limit_schema(self.noun())
            },
            "required": []
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let limit = ctx.limits().resolve(params.get("limit"));
        ctx.fetch_feed(self.source, limit, fetch_failure_message(self.source))
            .await
    }
}

/// Unified feed tool; `source` picks the adapter.
pub struct GetFeedTool;

#[async_trait]
impl Tool for GetFeedTool {
    fn name(&self) -> &str {
        "get_feed"
    }

    fn description(&self) -> &str {
        "Fetch normalized top items from one source: hackernews, producthunt, or reddit."
    }

    fn parameters_schema(&self) -> Value {
        let keys: Vec<&str> = SourceKind::ALL.iter().map(|s| s.key()).collect();
        json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "enum": keys,
                    "description": "Which feed to fetch."
                },
                "limit": limit_schema("items")
            },
            "required": ["source"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let source: SourceKind = params
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or("")
            .parse()?;
        let limit = ctx.limits().resolve(params.get("limit"));
        ctx.fetch_feed(source, limit, fetch_failure_message(source))
            .await
    }
}

/// Serializable tool descriptor for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Tool discovery document.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub version: String,
    pub tools: Vec<ToolInfo>,
}

/// Describe every registered tool.
pub fn manifest(registry: &ToolRegistry) -> Manifest {
    Manifest {
        version: MANIFEST_VERSION.to_string(),
        tools: registry
            .tools()
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.parameters_schema(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lists_every_tool_with_schema() {
        let registry = ToolRegistry::with_builtins();
        let m = manifest(&registry);
        assert_eq!(m.version, "0.1");
        assert_eq!(m.tools.len(), 4);
        for tool in &m.tools {
            assert_eq!(tool.input_schema["type"], "object");
            assert_eq!(tool.input_schema["properties"]["limit"]["default"], 10);
        }
        let feed = m.tools.iter().find(|t| t.name == "get_feed").unwrap();
        assert_eq!(feed.input_schema["required"], json!(["source"]));
        assert_eq!(
            feed.input_schema["properties"]["source"]["enum"],
            json!(["hackernews", "producthunt", "reddit"])
        );
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            fetch_failure_message(SourceKind::ProductHunt),
            "Failed to fetch Product Hunt products"
        );
    }
}
