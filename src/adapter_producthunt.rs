//! Product Hunt front page adapter.
//!
//! The markup here changes often and parts of the page are rendered
//! client-side, so every field is read through a configurable
//! [`SelectorChain`]. If the primary container selector matches nothing the
//! adapter falls back to a broad `article, div` sweep, trading precision
//! for staying alive through layout changes.
//!
//! Ranks are not read from the page: accepted items are numbered 1, 2, 3…
//! in document order, skipped items do not consume a rank.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Selector};
use std::sync::Arc;

use crate::config::ProductHuntConfig;
use crate::extract::SelectorChain;
use crate::http::{FetchError, FetchRequest, Transport};
use crate::limit::LimitPolicy;
use crate::models::{RawItem, RawKey, SourceKind};
use crate::parse::{
    absolutize, first_token, href, leading_count, parse_html, safe_int, selector, stripped_text,
};
use crate::traits::{accept_records, Adapter, Skip};

pub struct ProductHuntAdapter {
    url: String,
    page: ProductPage,
    transport: Arc<dyn Transport>,
}

impl ProductHuntAdapter {
    pub fn new(config: &ProductHuntConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            url: config.url.clone(),
            page: ProductPage::new(config)?,
            transport,
        })
    }
}

#[async_trait]
impl Adapter for ProductHuntAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::ProductHunt
    }

    fn description(&self) -> &str {
        "Top products from the Product Hunt front page (HTML)"
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_top(&self, limit: i64) -> Result<Vec<RawItem>, FetchError> {
        let limit = LimitPolicy::PAGE.clamp(limit);
        let html = self.transport.get_text(&FetchRequest::get(&self.url)).await?;
        Ok(self.page.parse(&html, limit))
    }
}

/// Compiled container selectors and field chains.
pub struct ProductPage {
    origin: String,
    containers: Selector,
    fallback_containers: Selector,
    title: SelectorChain,
    tagline: SelectorChain,
    votes: SelectorChain,
    comments: SelectorChain,
}

impl ProductPage {
    pub fn new(config: &ProductHuntConfig) -> Result<Self> {
        let s = &config.selectors;
        Ok(Self {
            origin: config.origin.clone(),
            containers: selector(&s.containers)?,
            fallback_containers: selector(&s.fallback_containers)?,
            title: SelectorChain::compile(&s.title).context("title chain")?,
            tagline: SelectorChain::compile(&s.tagline).context("tagline chain")?,
            votes: SelectorChain::compile(&s.votes).context("votes chain")?,
            comments: SelectorChain::compile(&s.comments).context("comments chain")?,
        })
    }

    /// Extract up to `limit` products, ranked by acceptance order.
    pub fn parse(&self, html: &str, limit: usize) -> Vec<RawItem> {
        let doc = parse_html(html);

        let mut containers: Vec<ElementRef<'_>> = doc.select(&self.containers).collect();
        if containers.is_empty() {
            tracing::debug!("no post-item containers, falling back to generic containers");
            containers = doc.select(&self.fallback_containers).collect();
        }

        let records = containers.iter().map(|el| self.extract_item(el));
        accept_records(SourceKind::ProductHunt, records, limit)
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.with(RawKey::Rank, i as i64 + 1))
            .collect()
    }

    fn extract_item(&self, item: &ElementRef<'_>) -> Result<RawItem, Skip> {
        let title_el = self.title.first_match(item).ok_or(Skip::MissingTitle)?;
        let name = stripped_text(&title_el);
        let link = absolutize(href(&title_el), &self.origin);

        let tagline = self.tagline.first_match(item).map(|el| stripped_text(&el));

        // "123" or "123 votes"; a matched but empty element drops the item.
        let votes = match self.votes.first_match(item) {
            Some(el) => {
                let text = stripped_text(&el);
                safe_int(first_token(&text).ok_or(Skip::EmptyVoteText)?)
            }
            None => None,
        };

        let comments = self
            .comments
            .first_match(item)
            .and_then(|el| leading_count(&stripped_text(&el)));

        Ok(RawItem::new()
            .with(RawKey::Name, name)
            .with_opt(RawKey::Tagline, tagline)
            .with(RawKey::Link, link)
            .with_opt(RawKey::Votes, votes)
            .with_opt(RawKey::Comments, comments))
    }
}
