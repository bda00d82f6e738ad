//! Shared feed-normalization library for the Orrery dashboard.
//!
//! Upstream space-data APIs return loosely-structured JSON; this crate turns
//! those payloads into the uniform shapes the dashboard renders. No I/O
//! happens here - the daemon fetches, this crate normalizes.

pub mod events;
pub mod fields;
pub mod gallery;

pub use events::{normalize_events, structured_rows, NormalizedEvent, DISPLAY_LIMIT};
pub use gallery::{escape_caption, map_feed, FeedResult, GalleryItem};
