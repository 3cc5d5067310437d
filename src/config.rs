use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::extract::{ExtractorSpec, SelectorChain};
use crate::parse::selector;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    crate::http::DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
    #[serde(default)]
    pub producthunt: ProductHuntConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HackerNewsConfig {
    #[serde(default = "default_hn_url")]
    pub url: String,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            url: default_hn_url(),
        }
    }
}

fn default_hn_url() -> String {
    "https://news.ycombinator.com/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductHuntConfig {
    #[serde(default = "default_ph_url")]
    pub url: String,
    /// Prefix for site-relative links.
    #[serde(default = "default_ph_origin")]
    pub origin: String,
    #[serde(default)]
    pub selectors: ProductHuntSelectors,
}

impl Default for ProductHuntConfig {
    fn default() -> Self {
        Self {
            url: default_ph_url(),
            origin: default_ph_origin(),
            selectors: ProductHuntSelectors::default(),
        }
    }
}

fn default_ph_url() -> String {
    "https://www.producthunt.com/".to_string()
}
fn default_ph_origin() -> String {
    "https://www.producthunt.com".to_string()
}

/// Container selectors and per-field extractor chains for the
/// product-launch page. Each list is tried in order.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ProductHuntSelectors {
    #[serde(default = "default_ph_containers")]
    pub containers: String,
    /// Used only when `containers` matches nothing. Broad on purpose.
    #[serde(default = "default_ph_fallback_containers")]
    pub fallback_containers: String,
    #[serde(default = "default_ph_title")]
    pub title: Vec<ExtractorSpec>,
    #[serde(default = "default_ph_tagline")]
    pub tagline: Vec<ExtractorSpec>,
    #[serde(default = "default_ph_votes")]
    pub votes: Vec<ExtractorSpec>,
    #[serde(default = "default_ph_comments")]
    pub comments: Vec<ExtractorSpec>,
}

impl Default for ProductHuntSelectors {
    fn default() -> Self {
        Self {
            containers: default_ph_containers(),
            fallback_containers: default_ph_fallback_containers(),
            title: default_ph_title(),
            tagline: default_ph_tagline(),
            votes: default_ph_votes(),
            comments: default_ph_comments(),
        }
    }
}

fn default_ph_containers() -> String {
    "article[data-test='post-item'], div[data-test='post-item']".to_string()
}
fn default_ph_fallback_containers() -> String {
    "article, div".to_string()
}
fn default_ph_title() -> Vec<ExtractorSpec> {
    vec![
        ExtractorSpec::css("[data-test='post-name']"),
        ExtractorSpec::css("h3 a"),
        ExtractorSpec::css("h3"),
        ExtractorSpec::css("a[data-test='post-name']"),
    ]
}
fn default_ph_tagline() -> Vec<ExtractorSpec> {
    vec![
        ExtractorSpec::css("[data-test='post-tagline']"),
        ExtractorSpec::css("p"),
    ]
}
fn default_ph_votes() -> Vec<ExtractorSpec> {
    vec![
        ExtractorSpec::css("[data-test='post-vote-count']"),
        ExtractorSpec::css("button span"),
    ]
}
fn default_ph_comments() -> Vec<ExtractorSpec> {
    vec![
        ExtractorSpec::css("[data-test='post-comments-count']"),
        ExtractorSpec::matching("a", "comment"),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedditConfig {
    #[serde(default = "default_reddit_url")]
    pub url: String,
    /// Prefix for relative permalinks.
    #[serde(default = "default_reddit_origin")]
    pub origin: String,
    /// Sent with every request as a courtesy to the upstream API.
    #[serde(default = "default_reddit_user_agent")]
    pub user_agent: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            url: default_reddit_url(),
            origin: default_reddit_origin(),
            user_agent: default_reddit_user_agent(),
        }
    }
}

fn default_reddit_url() -> String {
    "https://www.reddit.com/r/all/hot.json".to_string()
}
fn default_reddit_origin() -> String {
    "https://www.reddit.com".to_string()
}
fn default_reddit_user_agent() -> String {
    "web2api-mcp-agent/0.1 (demo script)".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be > 0");
        }

        let urls = [
            ("sources.hackernews.url", &self.sources.hackernews.url),
            ("sources.producthunt.url", &self.sources.producthunt.url),
            ("sources.reddit.url", &self.sources.reddit.url),
        ];
        for (field, url) in urls {
            if url.trim().is_empty() {
                bail!("{} must not be empty", field);
            }
        }

        let origins = [
            ("sources.producthunt.origin", &self.sources.producthunt.origin),
            ("sources.reddit.origin", &self.sources.reddit.origin),
        ];
        for (field, origin) in origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                bail!("{} must be an absolute http(s) URL, got '{}'", field, origin);
            }
        }

        if self.sources.reddit.user_agent.trim().is_empty() {
            bail!("sources.reddit.user_agent must not be empty");
        }

        let sel = &self.sources.producthunt.selectors;
        selector(&sel.containers).context("sources.producthunt.selectors.containers")?;
        selector(&sel.fallback_containers)
            .context("sources.producthunt.selectors.fallback_containers")?;
        let chains = [
            ("title", &sel.title),
            ("tagline", &sel.tagline),
            ("votes", &sel.votes),
            ("comments", &sel.comments),
        ];
        for (field, specs) in chains {
            SelectorChain::compile(specs)
                .with_context(|| format!("sources.producthunt.selectors.{}", field))?;
        }
        if sel.title.is_empty() {
            bail!("sources.producthunt.selectors.title must list at least one extractor");
        }

        Ok(())
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, or the built-in defaults if the file does not
/// exist. A file that exists but is invalid is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::minimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_all_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.http.timeout_secs, 5);
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
        assert_eq!(cfg.sources.hackernews.url, "https://news.ycombinator.com/");
        assert_eq!(cfg.sources.producthunt.origin, "https://www.producthunt.com");
        assert_eq!(
            cfg.sources.reddit.user_agent,
            "web2api-mcp-agent/0.1 (demo script)"
        );
        assert_eq!(cfg.sources.producthunt.selectors, ProductHuntSelectors::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let cfg = parse_config(
            r#"
[http]
timeout_secs = 2

[sources.producthunt.selectors]
title = ["h2 a"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.http.timeout(), Duration::from_secs(2));
        assert_eq!(
            cfg.sources.producthunt.selectors.title,
            vec![ExtractorSpec::css("h2 a")]
        );
        assert_eq!(cfg.sources.producthunt.selectors.votes, default_ph_votes());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse_config("[http]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_relative_origin_rejected() {
        let err = parse_config("[sources.reddit]\norigin = \"www.reddit.com\"\n").unwrap_err();
        assert!(err.to_string().contains("sources.reddit.origin"));
    }

    #[test]
    fn test_bad_selector_rejected() {
        let err = parse_config("[sources.producthunt.selectors]\nvotes = [\"button[\"]\n")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("selectors.votes"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = load_config_or_default(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let cfg = parse_config(include_str!("../config/web2api.example.toml")).unwrap();
        let defaults = Config::minimal();
        assert_eq!(cfg.sources.producthunt.selectors, defaults.sources.producthunt.selectors);
        assert_eq!(cfg.sources.reddit.user_agent, defaults.sources.reddit.user_agent);
        assert_eq!(cfg.server.bind, defaults.server.bind);
    }
}
