//! Core data models used throughout web2api.
//!
//! Adapters produce loosely shaped [`RawItem`]s; the normalizer turns them
//! into fixed-shape [`CanonicalItem`]s tagged with a [`SourceKind`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The three supported feed sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    HackerNews,
    ProductHunt,
    Reddit,
}

impl SourceKind {
    /// All sources, in the order they are registered and listed.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::HackerNews,
        SourceKind::ProductHunt,
        SourceKind::Reddit,
    ];

    /// Lowercase selector key (`"hackernews"`, `"producthunt"`, `"reddit"`).
    pub fn key(self) -> &'static str {
        match self {
            SourceKind::HackerNews => "hackernews",
            SourceKind::ProductHunt => "producthunt",
            SourceKind::Reddit => "reddit",
        }
    }

    /// Display label stamped on every canonical item.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::HackerNews => "HackerNews",
            SourceKind::ProductHunt => "ProductHunt",
            SourceKind::Reddit => "Reddit",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a source selector names none of the supported sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid source. Use one of: hackernews, producthunt, reddit.")]
pub struct UnknownSource(pub String);

impl FromStr for SourceKind {
    type Err = UnknownSource;

    /// Accepts the selector keys, case-insensitively and ignoring
    /// surrounding whitespace. Display labels parse too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|k| k.key() == wanted)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

impl Serialize for SourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for SourceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Every field name any adapter may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawKey {
    Title,
    Name,
    Link,
    Url,
    DiscussionUrl,
    Points,
    Score,
    Votes,
    VotesCount,
    Comments,
    NumComments,
    CommentsCount,
    Rank,
    Tagline,
    Subreddit,
    #[serde(rename = "over_18")]
    Over18,
    Id,
}

impl RawKey {
    pub const ALL: [RawKey; 17] = [
        RawKey::Title,
        RawKey::Name,
        RawKey::Link,
        RawKey::Url,
        RawKey::DiscussionUrl,
        RawKey::Points,
        RawKey::Score,
        RawKey::Votes,
        RawKey::VotesCount,
        RawKey::Comments,
        RawKey::NumComments,
        RawKey::CommentsCount,
        RawKey::Rank,
        RawKey::Tagline,
        RawKey::Subreddit,
        RawKey::Over18,
        RawKey::Id,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RawKey::Title => "title",
            RawKey::Name => "name",
            RawKey::Link => "link",
            RawKey::Url => "url",
            RawKey::DiscussionUrl => "discussion_url",
            RawKey::Points => "points",
            RawKey::Score => "score",
            RawKey::Votes => "votes",
            RawKey::VotesCount => "votes_count",
            RawKey::Comments => "comments",
            RawKey::NumComments => "num_comments",
            RawKey::CommentsCount => "comments_count",
            RawKey::Rank => "rank",
            RawKey::Tagline => "tagline",
            RawKey::Subreddit => "subreddit",
            RawKey::Over18 => "over_18",
            RawKey::Id => "id",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        RawKey::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

/// Source-shaped record produced by an adapter before normalization.
///
/// Values are weakly typed: a count may still be the text scraped from the
/// page. Absent fields are simply not in the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawItem {
    fields: BTreeMap<RawKey, Value>,
}

impl RawItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: RawKey, value: impl Into<Value>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    /// Builder-style insert that leaves the field absent for `None`.
    pub fn with_opt<T: Into<Value>>(self, key: RawKey, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: RawKey) -> Option<&Value> {
        self.fields.get(&key)
    }

    pub fn contains(&self, key: RawKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Build a raw item from a JSON object, keeping only known field names.
    /// Non-object input yields an empty item.
    pub fn from_json(value: &Value) -> Self {
        let fields = value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| RawKey::from_name(k).map(|key| (key, v.clone())))
                    .collect()
            })
            .unwrap_or_default();
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fixed-shape record returned to every front end regardless of source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalItem {
    /// 1-based position within one result list.
    pub rank: i64,
    pub title: String,
    /// Absolute URL, or empty when the source gave none.
    pub link: String,
    pub points: Option<i64>,
    pub comments: Option<i64>,
    pub source: SourceKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_kind_parses_keys_loosely() {
        assert_eq!(
            "  HackerNews ".parse::<SourceKind>().unwrap(),
            SourceKind::HackerNews
        );
        assert_eq!("reddit".parse::<SourceKind>().unwrap(), SourceKind::Reddit);
        assert!("lobsters".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_source_kind_serializes_as_label() {
        let v = serde_json::to_value(SourceKind::ProductHunt).unwrap();
        assert_eq!(v, json!("ProductHunt"));
    }

    #[test]
    fn test_raw_key_names_round_trip() {
        for key in RawKey::ALL {
            assert_eq!(RawKey::from_name(key.as_str()), Some(key));
            let serialized = serde_json::to_value(key).unwrap();
            assert_eq!(serialized, json!(key.as_str()));
        }
    }

    #[test]
    fn test_raw_item_from_json_drops_unknown_keys() {
        let item = RawItem::from_json(&json!({
            "title": "Hello",
            "over_18": true,
            "source": "Reddit",
            "author": "someone"
        }));
        assert_eq!(item.len(), 2);
        assert_eq!(item.get(RawKey::Title), Some(&json!("Hello")));
        assert_eq!(item.get(RawKey::Over18), Some(&json!(true)));
    }

    #[test]
    fn test_with_opt_skips_none() {
        let item = RawItem::new()
            .with(RawKey::Title, "x")
            .with_opt::<i64>(RawKey::Points, None);
        assert!(!item.contains(RawKey::Points));
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({ "title": "x" })
        );
    }
}
