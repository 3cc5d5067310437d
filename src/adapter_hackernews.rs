//! Hacker News front page adapter.
//!
//! Each story is a `tr.athing` row; its points and comment count live in
//! the next sibling row's `td.subtext`. Only the title anchor is mandatory:
//! a row without one is skipped, everything else degrades to absent.

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Selector};
use std::sync::Arc;

use crate::config::HackerNewsConfig;
use crate::http::{FetchError, FetchRequest, Transport};
use crate::limit::LimitPolicy;
use crate::models::{RawItem, RawKey, SourceKind};
use crate::parse::{first_token, href, is_all_digits, parse_html, safe_int, selector};
use crate::traits::{accept_records, Adapter, Skip};

pub struct HackerNewsAdapter {
    url: String,
    page: FrontPage,
    transport: Arc<dyn Transport>,
}

impl HackerNewsAdapter {
    pub fn new(config: &HackerNewsConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            url: config.url.clone(),
            page: FrontPage::new()?,
            transport,
        })
    }
}

#[async_trait]
impl Adapter for HackerNewsAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::HackerNews
    }

    fn description(&self) -> &str {
        "Top posts from the Hacker News front page (HTML)"
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

/// Compiled selectors for the front page markup.
pub struct FrontPage {
    row: Selector,
    rank: Selector,
    title_link: Selector,
    subtext: Selector,
    score: Selector,
    anchor: Selector,
}

impl FrontPage {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row: selector("tr.athing")?,
            rank: selector("span.rank")?,
            title_link: selector("span.titleline > a")?,
            subtext: selector("td.subtext")?,
            score: selector("span.score")?,
            anchor: selector("a")?,
        })
    }

    /// Extract up to `limit` stories in document order.
    pub fn parse(&self, html: &str, limit: usize) -> Vec<RawItem> {
        let doc = parse_html(html);
        let rows = doc.select(&self.row).map(|row| self.extract_row(row));
        accept_records(SourceKind::HackerNews, rows, limit)
    }

    fn extract_row(&self, row: ElementRef<'_>) -> Result<RawItem, Skip> {
        let rank = row.select(&self.rank).next().and_then(|el| {
            let text: String = el.text().collect();
            let text = text.trim();
            if text.ends_with('.') {
                safe_int(text.trim_end_matches('.'))
            } else {
                None
            }
        });

        let anchor = row
            .select(&self.title_link)
            .next()
            .ok_or(Skip::MissingTitle)?;
        let title = anchor.text().collect::<String>().trim().to_string();
        let link = href(&anchor);

        let subtext = row
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "tr")
            .and_then(|tr| tr.select(&self.subtext).next());

        let (points, comments) = match subtext {
            Some(sub) => (self.points(&sub)?, self.comments(&sub)),
            None => (None, None),
        };

        Ok(RawItem::new()
            .with(RawKey::Title, title)
            .with(RawKey::Link, link)
            .with_opt(RawKey::Rank, rank)
            .with_opt(RawKey::Points, points)
            .with_opt(RawKey::Comments, comments))
    }

    /// `"123 points"` → `123`. A score element holding only whitespace
    /// drops the row.
    fn points(&self, subtext: &ElementRef<'_>) -> Result<Option<i64>, Skip> {
        let Some(score) = subtext.select(&self.score).next() else {
            return Ok(None);
        };
        let text: String = score.text().collect();
        if text.is_empty() {
            return Ok(None);
        }
        let token = first_token(&text).ok_or(Skip::EmptyScoreText)?;
        Ok(safe_int(token))
    }

    /// The last anchor in the subtext is the comments link, e.g.
    /// `"45 comments"`; `"discuss"` means no count.
    fn comments(&self, subtext: &ElementRef<'_>) -> Option<i64> {
        let last = subtext.select(&self.anchor).last()?;
        let text: String = last.text().collect();
        if !text.contains("comment") {
            return None;
        }
        first_token(&text)
            .filter(|t| is_all_digits(t))
            .and_then(safe_int)
    }
}
