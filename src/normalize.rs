//! Normalization of adapter output into [`CanonicalItem`]s.
//!
//! Each canonical field is resolved from an ordered list of synonym keys.
//! A key wins when it is present and truthy (JSON-style: `null`, `false`,
//! `0`, `""`, `[]` and `{}` are falsy). Skipping falsy values means a zero
//! count loses to a later non-zero synonym; that matches how the feeds were
//! consumed historically and is kept for compatibility. Whether upstream
//! meant to discard legitimate zeros is unknown.
//!
//! One refinement: when every present count synonym is zero the result is
//! `Some(0)`, not `None`. `None` is reserved for "no synonym present at all".

use serde_json::Value;

use crate::limit::coerce_int;
use crate::models::{CanonicalItem, RawItem, RawKey, SourceKind};

pub const TITLE_KEYS: [RawKey; 2] = [RawKey::Title, RawKey::Name];
pub const LINK_KEYS: [RawKey; 3] = [RawKey::Link, RawKey::Url, RawKey::DiscussionUrl];
pub const POINTS_KEYS: [RawKey; 4] = [
    RawKey::Points,
    RawKey::Score,
    RawKey::Votes,
    RawKey::VotesCount,
];
pub const COMMENTS_KEYS: [RawKey; 3] = [
    RawKey::Comments,
    RawKey::NumComments,
    RawKey::CommentsCount,
];

/// Title used when no title synonym is truthy.
pub const NO_TITLE: &str = "(no title)";

/// Map raw items from one source onto the canonical shape, preserving order.
///
/// `rank` comes from the raw item when it carries one, otherwise from this
/// function's own 1-based position over `raw_items`.
pub fn normalize(source: SourceKind, raw_items: &[RawItem]) -> Vec<CanonicalItem> {
    raw_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let position = i as i64 + 1;
            CanonicalItem {
                rank: item
                    .get(RawKey::Rank)
                    .and_then(coerce_int)
                    .unwrap_or(position),
                title: first_text(item, &TITLE_KEYS).unwrap_or_else(|| NO_TITLE.to_string()),
                link: first_text(item, &LINK_KEYS).unwrap_or_default(),
                points: first_count(item, &POINTS_KEYS),
                comments: first_count(item, &COMMENTS_KEYS),
                source,
            }
        })
        .collect()
}

/// JSON-style truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn first_text(item: &RawItem, keys: &[RawKey]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find(|v| is_truthy(v))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn first_count(item: &RawItem, keys: &[RawKey]) -> Option<i64> {
    let mut saw_zero = false;
    for key in keys {
        match item.get(*key).and_then(coerce_int) {
            Some(0) => saw_zero = true,
            Some(n) => return Some(n),
            None => {}
        }
    }
    saw_zero.then_some(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one(item: RawItem) -> CanonicalItem {
        normalize(SourceKind::HackerNews, &[item]).remove(0)
    }

    #[test]
    fn test_zero_points_loses_to_later_score() {
        let c = one(RawItem::new()
            .with(RawKey::Title, "t")
            .with(RawKey::Points, 0)
            .with(RawKey::Score, 5));
        assert_eq!(c.points, Some(5));
    }

    #[test]
    fn test_all_zero_counts_stay_zero() {
        let c = one(RawItem::new()
            .with(RawKey::Title, "t")
            .with(RawKey::Score, 0)
            .with(RawKey::Comments, 0));
        assert_eq!(c.points, Some(0));
        assert_eq!(c.comments, Some(0));
    }

    #[test]
    fn test_absent_counts_are_none() {
        let c = one(RawItem::new().with(RawKey::Title, "t"));
        assert_eq!(c.points, None);
        assert_eq!(c.comments, None);
    }

    #[test]
    fn test_synonym_order_is_fixed() {
        let c = one(RawItem::new()
            .with(RawKey::Name, "by name")
            .with(RawKey::Url, "https://u")
            .with(RawKey::DiscussionUrl, "https://d")
            .with(RawKey::VotesCount, 9)
            .with(RawKey::Votes, 4)
            .with(RawKey::CommentsCount, 2)
            .with(RawKey::NumComments, 3));
        assert_eq!(c.title, "by name");
        assert_eq!(c.link, "https://u");
        assert_eq!(c.points, Some(4));
        assert_eq!(c.comments, Some(3));
    }

    #[test]
    fn test_empty_title_falls_back() {
        let c = one(RawItem::new().with(RawKey::Title, "").with(RawKey::Link, ""));
        assert_eq!(c.title, NO_TITLE);
        assert_eq!(c.link, "");

        let c = one(RawItem::new());
        assert_eq!(c.title, NO_TITLE);
    }

    #[test]
    fn test_textual_counts_are_coerced() {
        let c = one(RawItem::new()
            .with(RawKey::Votes, "17")
            .with(RawKey::Comments, "n/a")
            .with(RawKey::NumComments, "4"));
        assert_eq!(c.points, Some(17));
        assert_eq!(c.comments, Some(4));
    }

    #[test]
    fn test_rank_prefers_raw_then_position() {
        let items = vec![
            RawItem::new().with(RawKey::Title, "a").with(RawKey::Rank, 7),
            RawItem::new().with(RawKey::Title, "b"),
            RawItem::new().with(RawKey::Title, "c").with(RawKey::Rank, Value::Null),
        ];
        let ranks: Vec<i64> = normalize(SourceKind::ProductHunt, &items)
            .iter()
            .map(|c| c.rank)
            .collect();
        assert_eq!(ranks, vec![7, 2, 3]);
    }

    #[test]
    fn test_source_label_is_stamped() {
        let c = normalize(SourceKind::Reddit, &[RawItem::new()]);
        assert_eq!(c[0].source, SourceKind::Reddit);
        assert_eq!(serde_json::to_value(&c[0]).unwrap()["source"], json!("Reddit"));
    }

    #[test]
    fn test_normalizing_canonical_output_is_stable() {
        let raw = vec![
            RawItem::new()
                .with(RawKey::Title, "First")
                .with(RawKey::Link, "https://a")
                .with(RawKey::Points, 10),
            RawItem::new()
                .with(RawKey::Name, "Second")
                .with(RawKey::Url, "https://b"),
        ];
        let once = normalize(SourceKind::HackerNews, &raw);

        let again_raw: Vec<RawItem> = once
            .iter()
            .map(|c| RawItem::from_json(&serde_json::to_value(c).unwrap()))
            .collect();
        let twice = normalize(SourceKind::HackerNews, &again_raw);

        for (a, b) in once.iter().zip(&twice) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.link, b.link);
            assert_eq!(a.source, b.source);
        }
        let ranks: Vec<i64> = twice.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
    }
}
