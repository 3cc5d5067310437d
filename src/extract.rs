//! Ordered fallback extractor chains.
//!
//! A chain is a prioritized list of extraction strategies evaluated left to
//! right against one container element; the first strategy that matches
//! wins. Chains are built from data ([`ExtractorSpec`], usually read from the
//! config file) so that markup drift on a source site can be patched without
//! touching adapter control flow.
//!
//! # Configuration
//!
//! ```toml
//! [sources.producthunt.selectors]
//! title = ["[data-test='post-name']", "h3 a", "h3"]
//! comments = ["[data-test='post-comments-count']", { css = "a", text_contains = "comment" }]
//! ```

use anyhow::{Context, Result};
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::parse::selector;

/// One strategy, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractorSpec {
    /// First descendant matching a CSS selector.
    Css(String),
    /// First descendant matching `css` whose text contains `text_contains`
    /// (case-insensitive).
    Matching { css: String, text_contains: String },
}

impl ExtractorSpec {
    pub fn css(css: &str) -> Self {
        ExtractorSpec::Css(css.to_string())
    }

    pub fn matching(css: &str, text_contains: &str) -> Self {
        ExtractorSpec::Matching {
            css: css.to_string(),
            text_contains: text_contains.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Extractor {
    Css(Selector),
    Matching { selector: Selector, needle: String },
}

impl Extractor {
    fn compile(spec: &ExtractorSpec) -> Result<Self> {
        Ok(match spec {
            ExtractorSpec::Css(css) => Extractor::Css(selector(css)?),
            ExtractorSpec::Matching { css, text_contains } => Extractor::Matching {
                selector: selector(css)?,
                needle: text_contains.to_lowercase(),
            },
        })
    }

    fn find<'a>(&self, scope: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Extractor::Css(sel) => scope.select(sel).next(),
            Extractor::Matching { selector, needle } => scope.select(selector).find(|el| {
                el.text()
                    .collect::<String>()
                    .to_lowercase()
                    .contains(needle.as_str())
            }),
        }
    }
}

/// A compiled, ordered list of extractors.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    extractors: Vec<Extractor>,
}

impl SelectorChain {
    /// Compile every spec up front; an invalid selector fails the whole chain.
    pub fn compile(specs: &[ExtractorSpec]) -> Result<Self> {
        let extractors = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Extractor::compile(spec).with_context(|| format!("extractor #{} in chain", i + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { extractors })
    }

    /// First element produced by the chain within `scope` (descendants only).
    pub fn first_match<'a>(&self, scope: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.extractors.iter().find_map(|x| x.find(scope))
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_html, stripped_text};

    fn chain(specs: Vec<ExtractorSpec>) -> SelectorChain {
        SelectorChain::compile(&specs).unwrap()
    }

    #[test]
    fn test_first_strategy_wins_when_both_match() {
        let doc = parse_html(r#"<div id="c"><h3>Heading</h3><span class="name">Named</span></div>"#);
        let root = doc.select(&selector("#c").unwrap()).next().unwrap();
        let c = chain(vec![ExtractorSpec::css(".name"), ExtractorSpec::css("h3")]);
        assert_eq!(stripped_text(&c.first_match(&root).unwrap()), "Named");
    }

    #[test]
    fn test_falls_through_to_later_strategy() {
        let doc = parse_html(r#"<div id="c"><h3>Heading</h3></div>"#);
        let root = doc.select(&selector("#c").unwrap()).next().unwrap();
        let c = chain(vec![ExtractorSpec::css(".name"), ExtractorSpec::css("h3")]);
        assert_eq!(stripped_text(&c.first_match(&root).unwrap()), "Heading");
    }

    #[test]
    fn test_matching_is_case_insensitive_and_skips_non_matches() {
        let doc = parse_html(
            r#"<div id="c"><a href="/a">Visit</a><a href="/b">12 Comments</a></div>"#,
        );
        let root = doc.select(&selector("#c").unwrap()).next().unwrap();
        let c = chain(vec![ExtractorSpec::matching("a", "comment")]);
        let hit = c.first_match(&root).unwrap();
        assert_eq!(hit.value().attr("href"), Some("/b"));
    }

    #[test]
    fn test_no_match_returns_none() {
        let doc = parse_html(r#"<div id="c"><p>x</p></div>"#);
        let root = doc.select(&selector("#c").unwrap()).next().unwrap();
        let c = chain(vec![ExtractorSpec::css("h3")]);
        assert!(c.first_match(&root).is_none());
    }

    #[test]
    fn test_invalid_selector_fails_compile() {
        let err = SelectorChain::compile(&[ExtractorSpec::css("h3"), ExtractorSpec::css("a[")])
            .unwrap_err();
        assert!(format!("{:#}", err).contains("extractor #2"));
    }

    #[test]
    fn test_specs_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            chain: Vec<ExtractorSpec>,
        }
        let w: Wrapper = toml::from_str(
            r#"chain = ["h3 a", { css = "a", text_contains = "comment" }]"#,
        )
        .unwrap();
        assert_eq!(
            w.chain,
            vec![
                ExtractorSpec::css("h3 a"),
                ExtractorSpec::matching("a", "comment")
            ]
        );
    }
}
