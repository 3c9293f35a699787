use crate::types::{AlertsError, FeedEntry, ParsedFeed, Result};
use chrono::Utc;
use feed_rs::parser;
use tracing::debug;

/// Parse RSS/Atom content into a [`ParsedFeed`].
///
/// Every entry in the document is kept: runs are stateless, so there is no
/// seen-before filtering here.
pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
    debug!("Parsing feed content ({} bytes)", content.len());

    let feed = parser::parse(content.as_bytes())
        .map_err(|e| AlertsError::FeedParse(format!("failed to parse feed: {}", e)))?;

    let title = feed.title.map(|t| t.content);
    let entries = feed.entries.into_iter().map(parse_entry).collect();

    Ok(ParsedFeed { title, entries })
}

fn parse_entry(entry: feed_rs::model::Entry) -> FeedEntry {
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled".to_string());
    let link = entry.links.first().map(|l| l.href.clone());
    let published = entry.published.map(|dt| dt.with_timezone(&Utc));
    let summary = entry.summary.map(|s| s.content);

    FeedEntry {
        title,
        link,
        published,
        summary,
    }
}
