//! Extended M3U playlist parser
//!
//! A playlist is a sequence of `#EXTINF:` metadata lines, each followed by the
//! stream address on the next line:
//!
//! ```text
//! #EXTM3U x-tvg-url="http://example.test/epg.xml"
//! #EXTINF:-1 tvg-id="c1" tvg-name="Channel One" tvg-logo="http://example.test/c1.png" group-title="News",Channel One
//! http://example.test/c1.m3u8
//! ```
//!
//! Parsing is total: entries missing an id, a name or a stream line are
//! dropped without error. [`parse_playlist_strict`] reports them instead.
//!
//! Attribute values end at the first `"` after the opening quote; escaped
//! quotes inside values are not supported.

use crate::error::{Error, Result};
use crate::models::ChannelRecord;

const EXTINF: &str = "#EXTINF:";
const EXTM3U: &str = "#EXTM3U";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct M3uPlaylist {
    pub channels: Vec<ChannelRecord>,
    pub epg_url: Option<String>, // From x-tvg-url in header
}

/// Outcome of one metadata line
enum Entry {
    Channel(ChannelRecord),
    Dropped { line: usize, reason: &'static str },
}

/// Parse playlist text into channel records, in document order
pub fn parse_playlist(content: &str) -> Vec<ChannelRecord> {
    scan(content)
        .into_iter()
        .filter_map(|entry| match entry {
            Entry::Channel(record) => Some(record),
            Entry::Dropped { .. } => None,
        })
        .collect()
}

/// Like [`parse_playlist`], but fails on the first incomplete entry
pub fn parse_playlist_strict(content: &str) -> Result<Vec<ChannelRecord>> {
    scan(content)
        .into_iter()
        .map(|entry| match entry {
            Entry::Channel(record) => Ok(record),
            Entry::Dropped { line, reason } => Err(Error::parse(line, reason)),
        })
        .collect()
}

/// Parse playlist and the guide URL from the `#EXTM3U` header
pub fn parse_playlist_document(content: &str) -> M3uPlaylist {
    let content = strip_bom(content);
    let mut playlist = M3uPlaylist::default();

    if let Some(first_line) = content.lines().map(str::trim).find(|l| !l.is_empty()) {
        if first_line.starts_with(EXTM3U) {
            playlist.epg_url = extract_attr(first_line, "x-tvg-url")
                .or_else(|| extract_attr(first_line, "url-tvg"))
                .map(str::to_string);
        }
    }

    playlist.channels = parse_playlist(content);
    playlist
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

fn scan(content: &str) -> Vec<Entry> {
    let content = strip_bom(content);
    // (1-based line number, trimmed text) of every non-empty line
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let mut entries = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let (line_no, line) = lines[cursor];
        cursor += 1;

        if !line.starts_with(EXTINF) {
            continue;
        }

        let info = &line[EXTINF.len()..];
        let id = non_empty(extract_attr(info, "tvg-id"));
        let name = non_empty(extract_attr(info, "tvg-name")).or_else(|| display_name(info));

        let stream_url = match lines.get(cursor) {
            Some((_, next)) if !next.starts_with('#') => {
                cursor += 1;
                Some(*next)
            }
            _ => None,
        };

        let entry = match (id, name, stream_url) {
            (None, _, _) => Entry::Dropped { line: line_no, reason: "missing tvg-id" },
            (_, None, _) => Entry::Dropped { line: line_no, reason: "missing channel name" },
            (_, _, None) => Entry::Dropped { line: line_no, reason: "missing stream URL" },
            (Some(id), Some(name), Some(url)) => Entry::Channel(ChannelRecord {
                id: id.to_string(),
                name: name.to_string(),
                category: non_empty(extract_attr(info, "group-title")).map(str::to_string),
                logo_url: non_empty(extract_attr(info, "tvg-logo")).map(str::to_string),
                stream_url: Some(url.to_string()),
                embed_url: None,
            }),
        };
        entries.push(entry);
    }

    entries
}

/// First `key="value"` occurrence on the line, matched on a word boundary
fn extract_attr<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", key);

    for (pos, _) in line.match_indices(&needle) {
        let boundary = line[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        if !boundary {
            continue;
        }

        let rest = &line[pos + needle.len()..];
        return rest.find('"').map(|end| &rest[..end]);
    }

    None
}

/// Free-text label after the last comma
fn display_name(info: &str) -> Option<&str> {
    let comma_pos = info.rfind(',')?;
    non_empty(Some(info[comma_pos + 1..].trim()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_attr_first_match_wins() {
        let line = r#"-1 tvg-id="first" tvg-id="second",Name"#;
        assert_eq!(extract_attr(line, "tvg-id"), Some("first"));
    }

    #[test]
    fn test_extract_attr_word_boundary() {
        let line = r#"-1 xtvg-id="wrong" tvg-id="right",Name"#;
        assert_eq!(extract_attr(line, "tvg-id"), Some("right"));
    }

    #[test]
    fn test_extract_attr_unterminated() {
        let line = r#"-1 tvg-id="open,Name"#;
        assert_eq!(extract_attr(line, "tvg-id"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(r#"-1 tvg-id="a", Channel A "#), Some("Channel A"));
        assert_eq!(display_name(r#"-1 tvg-id="a""#), None);
        assert_eq!(display_name(r#"-1 tvg-id="a","#), None);
    }
}
