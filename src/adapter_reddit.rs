//! Reddit `r/all` (hot) adapter, backed by the public JSON listing.
//!
//! Unlike the HTML adapters, missing numbers default to `0` and a missing
//! `over_18` to `false`; that is this adapter's own policy and the
//! normalizer does not second-guess it.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::RedditConfig;
use crate::http::{FetchError, FetchRequest, Transport};
use crate::limit::LimitPolicy;
use crate::models::{RawItem, RawKey, SourceKind};
use crate::parse::absolutize;
use crate::traits::{accept_records, Adapter, Skip};

pub struct RedditAdapter {
    url: String,
    origin: String,
    user_agent: String,
    transport: Arc<dyn Transport>,
}

impl RedditAdapter {
    pub fn new(config: &RedditConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: config.url.clone(),
            origin: config.origin.clone(),
            user_agent: config.user_agent.clone(),
            transport,
        }
    }
}

#[async_trait]
impl Adapter for RedditAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Reddit
    }

    fn description(&self) -> &str {
        "Hot posts from r/all (JSON API)"
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_top(&self, limit: i64) -> Result<Vec<RawItem>, FetchError> {
        let limit = LimitPolicy::API.clamp(limit);
        let request = FetchRequest::get(&self.url)
            .query("limit", limit)
            .header("User-Agent", self.user_agent.clone());

        let body = self.transport.get_text(&request).await?;
        parse_listing(&body, &self.origin, limit).map_err(|e| FetchError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Option<Vec<Child>>,
}

#[derive(Debug, Default, Deserialize)]
struct Child {
    #[serde(default)]
    data: Option<Post>,
}

#[derive(Debug, Default, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    subreddit: Option<String>,
    #[serde(default)]
    ups: Option<i64>,
    #[serde(default)]
    num_comments: Option<i64>,
    #[serde(default)]
    over_18: Option<bool>,
    #[serde(default)]
    id: Option<String>,
}

/// Decode a listing body into at most `limit` ranked records.
pub fn parse_listing(body: &str, origin: &str, limit: usize) -> serde_json::Result<Vec<RawItem>> {
    let listing: Listing = serde_json::from_str(body)?;
    let posts = listing
        .data
        .and_then(|d| d.children)
        .unwrap_or_default()
        .into_iter()
        .map(|child| post_to_item(child.data.unwrap_or_default(), origin));

    Ok(accept_records(SourceKind::Reddit, posts, limit)
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.with(RawKey::Rank, i as i64 + 1))
        .collect())
}

fn post_to_item(post: Post, origin: &str) -> Result<RawItem, Skip> {
    let title = post.title.unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return Err(Skip::BlankTitle);
    }

    let link = match post.permalink {
        Some(p) if p.starts_with('/') => absolutize(p, origin),
        _ => post.url.unwrap_or_default(),
    };

    Ok(RawItem::new()
        .with(RawKey::Title, title)
        .with(RawKey::Link, link)
        .with(RawKey::Subreddit, post.subreddit.unwrap_or_default())
        .with(RawKey::Score, post.ups.unwrap_or(0))
        .with(RawKey::Comments, post.num_comments.unwrap_or(0))
        .with(RawKey::Over18, post.over_18.unwrap_or(false))
        .with(RawKey::Id, post.id.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORIGIN: &str = "https://www.reddit.com";

    fn listing(children: serde_json::Value) -> String {
        json!({ "kind": "Listing", "data": { "children": children } }).to_string()
    }

    #[test]
    fn test_full_record() {
        let body = listing(json!([{ "kind": "t3", "data": {
            "title": "  Hello world  ",
            "permalink": "/r/rust/comments/abc/hello_world/",
            "url": "https://i.redd.it/x.png",
            "subreddit": "rust",
            "ups": 1500,
            "num_comments": 230,
            "over_18": false,
            "id": "abc"
        }}]));
        let items = parse_listing(&body, ORIGIN, 10).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.get(RawKey::Title), Some(&json!("Hello world")));
        assert_eq!(
            item.get(RawKey::Link),
            Some(&json!("https://www.reddit.com/r/rust/comments/abc/hello_world/"))
        );
        assert_eq!(item.get(RawKey::Score), Some(&json!(1500)));
        assert_eq!(item.get(RawKey::Comments), Some(&json!(230)));
        assert_eq!(item.get(RawKey::Subreddit), Some(&json!("rust")));
        assert_eq!(item.get(RawKey::Id), Some(&json!("abc")));
        assert_eq!(item.get(RawKey::Rank), Some(&json!(1)));
    }

    #[test]
    fn test_missing_numbers_default_to_zero() {
        let body = listing(json!([{ "data": { "title": "Sparse", "url": "https://x.y" } }]));
        let item = &parse_listing(&body, ORIGIN, 10).unwrap()[0];
        assert_eq!(item.get(RawKey::Score), Some(&json!(0)));
        assert_eq!(item.get(RawKey::Comments), Some(&json!(0)));
        assert_eq!(item.get(RawKey::Over18), Some(&json!(false)));
        assert_eq!(item.get(RawKey::Link), Some(&json!("https://x.y")));
    }

    #[test]
    fn test_blank_titles_skipped_and_ranks_stay_dense() {
        let body = listing(json!([
            { "data": { "title": "A" } },
            { "data": { "title": "   " } },
            { "data": {} },
            { "data": { "title": null } },
            { "data": { "title": "B" } }
        ]));
        let items = parse_listing(&body, ORIGIN, 10).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get(RawKey::Title), Some(&json!("B")));
        assert_eq!(items[1].get(RawKey::Rank), Some(&json!(2)));
    }

    #[test]
    fn test_missing_envelope_levels_yield_nothing() {
        assert!(parse_listing("{}", ORIGIN, 10).unwrap().is_empty());
        assert!(parse_listing(r#"{"data":{}}"#, ORIGIN, 10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_listing("<html>rate limited</html>", ORIGIN, 10).is_err());
    }

    #[test]
    fn test_truncates_to_limit() {
        let children: Vec<_> = (0..5)
            .map(|i| json!({ "data": { "title": format!("T{}", i) } }))
            .collect();
        let items = parse_listing(&listing(json!(children)), ORIGIN, 3).unwrap();
        assert_eq!(items.len(), 3);
    }
}
