//! Embed rendering: a curation key in, minimal list markup out.
//!
//! Rendering is where existence and visibility filtering happens: stale,
//! deleted, or unpublished references simply produce no list item. Every
//! failure mode renders as an empty string, never an error.

use std::sync::Arc;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::lookup::ContentLookup;
use crate::models::content::EMBEDDABLE_KINDS;
use crate::resolver::CurationResolver;

/// Embed directive: `[curated_posts <idOrSlug>]`.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[curated_posts\s+([^\]\s]+)\s*\]").expect("valid regex literal"));

/// Renders curations into `<ul>` markup and expands embed directives.
#[derive(Clone)]
pub struct EmbedRenderer {
    resolver: CurationResolver,
    lookup: Arc<dyn ContentLookup>,
}

impl EmbedRenderer {
    /// Create a renderer over the given resolver and lookup.
    pub fn new(resolver: CurationResolver, lookup: Arc<dyn ContentLookup>) -> Self {
        Self { resolver, lookup }
    }

    /// Render a curation named by id or slug.
    ///
    /// Entities appear in resolver order, restricted to published posts and
    /// pages. Missing input, an unknown curation, or zero visible entities
    /// all render as an empty string.
    pub async fn render(&self, id_or_slug: &str) -> Result<String> {
        let key = id_or_slug.trim();
        if key.is_empty() {
            return Ok(String::new());
        }

        let ids = self.resolver.curated_ids(key).await?;
        if ids.is_empty() {
            return Ok(String::new());
        }

        let records = self
            .lookup
            .fetch_in_order(&ids, EMBEDDABLE_KINDS, true)
            .await?;
        if records.is_empty() {
            return Ok(String::new());
        }

        let mut markup = format!(
            "<ul class=\"curated-posts\" id=\"curated-posts-{}\">",
            html_escape(key)
        );
        for record in &records {
            let title = html_escape(&record.title);
            markup.push_str(&format!(
                "<li class=\"curated-post\" id=\"curated-post-{}\">\
                 <a href=\"{}\" title=\"{title}\">{title}</a></li>",
                record.id,
                html_escape(&record.permalink),
            ));
        }
        markup.push_str("</ul>");

        Ok(markup)
    }

    /// Expand every embed directive found in free text.
    ///
    /// Applies to content bodies and widget text alike. Directives naming an
    /// unknown curation are consumed and expand to nothing.
    pub async fn expand(&self, text: &str) -> Result<String> {
        // Collect spans up front so no regex state is held across an await.
        let directives: Vec<(std::ops::Range<usize>, String)> = DIRECTIVE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let key = caps.get(1)?.as_str().to_string();
                Some((whole.range(), key))
            })
            .collect();

        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;

        for (range, key) in directives {
            out.push_str(&text[last_end..range.start]);
            out.push_str(&self.render(&key).await?);
            last_end = range.end;
        }

        out.push_str(&text[last_end..]);
        Ok(out)
    }
}

/// Escape text for HTML body and attribute positions.
fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
