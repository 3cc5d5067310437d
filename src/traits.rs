//! Extension traits for source adapters and tools.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │             AdapterRegistry              │
//! │  ┌──────────┐ ┌───────────┐ ┌─────────┐  │
//! │  │HackerNews│ │ProductHunt│ │ Reddit  │  │
//! │  │  (HTML)  │ │  (HTML)   │ │ (JSON)  │  │
//! │  └──────────┘ └───────────┘ └─────────┘  │
//! └──────────────┬───────────────────────────┘
//!                ▼ RawItem
//!           normalize() → CanonicalItem
//!                ▼
//! ┌──────────────────────────────────────────┐
//! │              ToolRegistry                │
//! │ hn_get_top_posts  ph_get_top_products    │
//! │ reddit_get_top_posts        get_feed     │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!      CLI · stdio · MCP · HTTP/browser
//! ```
//!
//! Registries are built once at startup and shared read-only (`Arc`) by
//! every front end.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::http::{FetchError, Transport};
use crate::limit::LimitPolicy;
use crate::models::{CanonicalItem, RawItem, SourceKind, UnknownSource};
use crate::normalize::normalize;

// ═══════════════════════════════════════════════════════════════════════
// Adapter Trait
// ═══════════════════════════════════════════════════════════════════════

/// A feed source that turns one upstream response into [`RawItem`]s.
///
/// Implementations make exactly one outbound call per
/// [`fetch_top`](Adapter::fetch_top). A failed call is terminal for that
/// invocation. Individual records that cannot be extracted are dropped
/// (see [`Skip`]) without failing the rest.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Which source this adapter serves.
    fn kind(&self) -> SourceKind;

    /// One-line description, shown by `web2api sources`.
    fn description(&self) -> &str;

    /// The upstream URL this adapter fetches.
    fn url(&self) -> &str;

    /// Fetch the front page and return at most `limit` records in
    /// acceptance order. A non-positive `limit` means "use the default".
    async fn fetch_top(&self, limit: i64) -> Result<Vec<RawItem>, FetchError>;
}

/// Why a single record was dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Skip {
    #[error("no title element")]
    MissingTitle,
    #[error("title is blank")]
    BlankTitle,
    #[error("score element has no text")]
    EmptyScoreText,
    #[error("vote element has no text")]
    EmptyVoteText,
}

/// Keep accepted records (in order) up to `limit`, logging each skip.
pub fn accept_records<I>(source: SourceKind, records: I, limit: usize) -> Vec<RawItem>
where
    I: IntoIterator<Item = Result<RawItem, Skip>>,
{
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match record {
            Ok(item) => Some(item),
            Err(reason) => {
                tracing::debug!(source = source.key(), index, %reason, "skipping record");
                None
            }
        })
        .take(limit)
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// A callable operation exposed to every front end.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores, e.g. `"hn_get_top_posts"`.
    fn name(&self) -> &str;

    /// One-line description for agent discovery.
    fn description(&self) -> &str;

    /// JSON Schema (`type: "object"`) describing the accepted arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool.
    ///
    /// Fetch failures come back as `Ok(ToolOutcome::Error(..))`; `Err` is
    /// reserved for dispatch problems such as an invalid `source`.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutcome, ToolError>;
}

/// Structured error value returned instead of a list when a fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// What a tool call produced: a list of items or an error envelope.
///
/// Serializes untagged, so callers branch on the presence of an `error` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    Items(Vec<CanonicalItem>),
    Error(ErrorEnvelope),
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Error(_))
    }

    pub fn into_result(self) -> Result<Vec<CanonicalItem>, ErrorEnvelope> {
        match self {
            ToolOutcome::Items(items) => Ok(items),
            ToolOutcome::Error(envelope) => Err(envelope),
        }
    }
}

/// Dispatch-time failures. Never raised for a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Unknown tool '{name}'")]
    UnknownTool {
        name: String,
        available: Vec<String>,
    },

    #[error("no adapter registered for source '{0}'")]
    Unavailable(SourceKind),
}

impl From<UnknownSource> for ToolError {
    fn from(e: UnknownSource) -> Self {
        ToolError::InvalidArgument(e.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Everything a tool needs for one invocation.
///
/// Cheap to clone. Each front end builds one with the [`LimitPolicy`] it
/// applies to incoming `limit` arguments.
#[derive(Clone)]
pub struct ToolContext {
    adapters: Arc<AdapterRegistry>,
    limits: LimitPolicy,
}

impl ToolContext {
    pub fn new(adapters: Arc<AdapterRegistry>, limits: LimitPolicy) -> Self {
        Self { adapters, limits }
    }

    /// Same adapters, different limit policy.
    pub fn with_limits(&self, limits: LimitPolicy) -> Self {
        Self {
            adapters: self.adapters.clone(),
            limits,
        }
    }

    pub fn limits(&self) -> LimitPolicy {
        self.limits
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Fetch and normalize one source.
    ///
    /// This is the handler boundary: a [`FetchError`] is logged and turned
    /// into an [`ErrorEnvelope`] headed by `failure_message`.
    pub async fn fetch_feed(
        &self,
        source: SourceKind,
        limit: usize,
        failure_message: &str,
    ) -> Result<ToolOutcome, ToolError> {
        let adapter = self
            .adapters
            .find(source)
            .ok_or(ToolError::Unavailable(source))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        match adapter.fetch_top(limit).await {
            Ok(raw) => {
                tracing::info!(source = source.key(), count = raw.len(), "fetched feed");
                Ok(ToolOutcome::Items(normalize(source, &raw)))
            }
            Err(e) => {
                tracing::warn!(source = source.key(), error = %e, "fetch failed");
                Ok(ToolOutcome::Error(ErrorEnvelope {
                    error: failure_message.to_string(),
                    details: Some(e.to_string()),
                }))
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registries
// ═══════════════════════════════════════════════════════════════════════

/// Registry of source adapters, at most one per [`SourceKind`].
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Create an empty adapter registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry holding the three built-in adapters, all sharing
    /// `transport`.
    ///
    /// Fails if a configured selector does not compile.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        use crate::adapter_hackernews::HackerNewsAdapter;
        use crate::adapter_producthunt::ProductHuntAdapter;
        use crate::adapter_reddit::RedditAdapter;

        let mut registry = Self::new();
        registry.register(Box::new(HackerNewsAdapter::new(
            &config.sources.hackernews,
            transport.clone(),
        )?));
        registry.register(Box::new(ProductHuntAdapter::new(
            &config.sources.producthunt,
            transport.clone(),
        )?));
        registry.register(Box::new(RedditAdapter::new(
            &config.sources.reddit,
            transport,
        )));
        Ok(registry)
    }

    /// Register an adapter, replacing any existing one for the same source.
    pub fn register(&mut self, adapter: Box<dyn Adapter>) {
        self.adapters.retain(|a| a.kind() != adapter.kind());
        self.adapters.push(adapter);
    }

    /// Get all registered adapters.
    pub fn adapters(&self) -> &[Box<dyn Adapter>] {
        &self.adapters
    }

    /// Find the adapter serving `kind`.
    pub fn find(&self, kind: SourceKind) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|a| a.kind() == kind)
            .map(|a| a.as_ref())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Return the count of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry for tools. Built once, then shared by reference.
///
/// ```rust
/// use web2api::traits::ToolRegistry;
///
/// let tools = ToolRegistry::with_builtins();
/// assert!(tools.find("get_feed").is_some());
/// ```
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a tool registry pre-loaded with the per-source tools and
    /// the unified `get_feed` tool.
    pub fn with_builtins() -> Self {
        use crate::tools::{FeedTool, GetFeedTool};

        let mut registry = Self::new();
        for source in SourceKind::ALL {
            registry.register(Box::new(FeedTool::for_source(source)));
        }
        registry.register(Box::new(GetFeedTool));
        registry
    }

    /// Register a tool.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Get all registered tools.
    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Find a tool by name.
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Resolve `name` and execute it.
    pub async fn call(
        &self,
        name: &str,
        params: Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutcome, ToolError> {
        let tool = self.find(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
            available: self.names(),
        })?;
        tool.execute(params, ctx).await
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Return the count of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawKey;
    use serde_json::json;

    #[test]
    fn test_accept_records_drops_skips_and_truncates() {
        let records = vec![
            Ok(RawItem::new().with(RawKey::Title, "a")),
            Err(Skip::MissingTitle),
            Ok(RawItem::new().with(RawKey::Title, "b")),
            Ok(RawItem::new().with(RawKey::Title, "c")),
        ];
        let kept = accept_records(SourceKind::HackerNews, records, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].get(RawKey::Title), Some(&json!("b")));
    }

    #[test]
    fn test_outcome_serializes_untagged() {
        let err = ToolOutcome::Error(ErrorEnvelope {
            error: "Failed".to_string(),
            details: Some("boom".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "error": "Failed", "details": "boom" })
        );
        assert_eq!(
            serde_json::to_value(ToolOutcome::Items(vec![])).unwrap(),
            json!([])
        );
    }

    #[test]
    fn test_builtin_tool_names() {
        let tools = ToolRegistry::with_builtins();
        assert_eq!(
            tools.names(),
            vec![
                "hn_get_top_posts",
                "ph_get_top_products",
                "reddit_get_top_posts",
                "get_feed"
            ]
        );
    }

    #[test]
    fn test_adapter_registry_from_default_config() {
        let transport: Arc<dyn Transport> = Arc::new(
            crate::http::HttpTransport::new(std::time::Duration::from_secs(
                crate::http::DEFAULT_TIMEOUT_SECS,
            ))
            .unwrap(),
        );
        let registry = AdapterRegistry::from_config(&Config::minimal(), transport).unwrap();
        assert_eq!(registry.len(), 3);
        for kind in SourceKind::ALL {
            assert_eq!(registry.find(kind).unwrap().kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_available() {
        let tools = ToolRegistry::with_builtins();
        let ctx = ToolContext::new(Arc::new(AdapterRegistry::new()), LimitPolicy::HANDLER);
        let err = tools.call("nope", json!({}), &ctx).await.unwrap_err();
        match err {
            ToolError::UnknownTool { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available.len(), 4);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_adapter_is_unavailable() {
        let ctx = ToolContext::new(Arc::new(AdapterRegistry::new()), LimitPolicy::HANDLER);
        let err = ctx
            .fetch_feed(SourceKind::Reddit, 5, "Failed to fetch Reddit posts")
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::Unavailable(SourceKind::Reddit));
    }
}
