//! Content entity records as seen through the lookup boundary.
//!
//! A curation references posts and pages it does not own. Everything this
//! service knows about them arrives through [`ContentRecord`] snapshots
//! resolved at read time.

use serde::{Deserialize, Serialize};

/// Kinds of host content entities this service works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A regular post.
    Post,
    /// A page-like entity.
    Page,
    /// A curation — the entity that owns an ordered membership.
    Curation,
}

impl ContentKind {
    /// Machine name as stored in the host content table.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Page => "page",
            ContentKind::Curation => "curation",
        }
    }

    /// Parse a machine name. Unknown kinds yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(ContentKind::Post),
            "page" => Some(ContentKind::Page),
            "curation" => Some(ContentKind::Curation),
            _ => None,
        }
    }
}

/// Content kinds allowed inside a rendered curation.
pub const EMBEDDABLE_KINDS: &[ContentKind] = &[ContentKind::Post, ContentKind::Page];

/// Snapshot of a host content entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Host-assigned primary key.
    pub id: i64,

    /// Entity kind.
    pub kind: ContentKind,

    /// URL slug.
    pub slug: String,

    /// Entity title.
    pub title: String,

    /// Publication status (0 = unpublished, 1 = published).
    pub status: i16,

    /// Unix timestamp when created.
    pub created: i64,

    /// Absolute permalink, built by the lookup implementation.
    pub permalink: String,
}

impl ContentRecord {
    /// Check if this entity is published.
    pub fn is_published(&self) -> bool {
        self.status == 1
    }

    /// Publication date formatted for the editing UI, e.g. "7 August 2026".
    pub fn published_date(&self) -> String {
        chrono::DateTime::from_timestamp(self.created, 0)
            .map(|d| d.format("%-d %B %Y").to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_machine_names() {
        for kind in [ContentKind::Post, ContentKind::Page, ContentKind::Curation] {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ContentKind::parse("menu"), None);
    }

    #[test]
    fn published_date_formats_day_month_year() {
        let record = ContentRecord {
            id: 1,
            kind: ContentKind::Post,
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            status: 1,
            // 2026-08-07 00:00:00 UTC
            created: 1786060800,
            permalink: "/hello".to_string(),
        };
        assert_eq!(record.published_date(), "7 August 2026");
    }
}
