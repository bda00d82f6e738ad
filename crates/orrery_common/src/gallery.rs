//! JWST gallery feed mapper.
//!
//! Turns raw feed items into renderable gallery entries. Mapping is
//! deliberately permissive: an item without a `url` still produces a (likely
//! broken) entry rather than being dropped, so nothing disappears between the
//! feed and the raw-source toggle.

use crate::fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One renderable gallery tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub url: String,
    pub link: String,
    pub caption: String,
}

/// A mapped feed response, produced once per fetch and discarded after
/// rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResult {
    pub items: Vec<GalleryItem>,
    pub source: String,
    pub count: u64,
}

/// Escape a caption for HTML embedding. `<` is the only character that can
/// open markup in this position.
pub fn escape_caption(raw: &str) -> String {
    raw.replace('<', "&lt;")
}

/// Map one raw feed item. `link` falls back to `url`; `caption` falls back
/// to empty and is escaped here so every consumer renders it safely.
pub fn map_item(item: &Value) -> GalleryItem {
    let url = fields::first_of_or_empty(item, &["url"]);
    let link = fields::first_of(item, &["link"]).unwrap_or_else(|| url.clone());
    let caption = fields::first_of_or_empty(item, &["caption"]);

    GalleryItem {
        url,
        link,
        caption: escape_caption(&caption),
    }
}

/// Map a full feed response, passing `source` and `count` through.
pub fn map_feed(items: &[Value], source: &str, count: u64) -> FeedResult {
    FeedResult {
        items: items.iter().map(map_item).collect(),
        source: source.to_string(),
        count,
    }
}
