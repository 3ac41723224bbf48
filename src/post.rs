//! Defines the [`Post`] type, one entry in the blog listing.

use serde::Deserialize;

/// A single blog entry as it appears in the post document. Every field is
/// optional on the wire; a missing field deserializes to its empty value so a
/// sparse document still loads and simply matches nothing it lacks.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Post {
    /// Unique identifier for the post. Used to build the link to the post's
    /// detail page.
    pub slug: String,

    /// The post title. Stored as authored; lower-cased only when compared
    /// against a query.
    pub title: String,

    /// A one-line description shown below the title.
    pub subtitle: String,

    /// The publication date, already formatted for display.
    pub date: String,

    /// The estimated reading time, already formatted for display.
    #[serde(rename = "readingTime")]
    pub reading_time: String,

    /// A short display string, typically a single emoji.
    pub icon: String,

    /// The post's tags in display order.
    pub tags: Vec<String>,
}

impl Post {
    /// Returns true if `tag` is one of the post's tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
