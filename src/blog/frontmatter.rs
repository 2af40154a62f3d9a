//! Frontmatter codec shared by the local repository and the GitHub editor.
//!
//! The block is a fixed-order set of `key: value` lines between `---`
//! delimiters. `updatedDate` is omitted entirely when a post has never been
//! updated; that omission is what distinguishes "never updated" from
//! "updated the same day it was created".

use super::{error::BlogError, types::PostMetadata};
use chrono::{DateTime, NaiveDate};
use std::fmt::Write;

const DELIMITER: &str = "---";

/// Renders the frontmatter block followed by a blank line and the body.
///
/// String values are wrapped in double quotes without escaping, so values
/// must not contain newlines and tag values must not contain commas. That
/// matches the on-disk format this codec has to stay byte-compatible with.
pub fn encode(metadata: &PostMetadata, body: &str) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    let _ = writeln!(out, "title: \"{}\"", metadata.title);
    let _ = writeln!(out, "date: \"{}\"", metadata.date.format("%Y-%m-%d"));
    if let Some(updated) = metadata.updated_date {
        let _ = writeln!(out, "updatedDate: \"{}\"", updated.format("%Y-%m-%d"));
    }
    let _ = writeln!(out, "excerpt: \"{}\"", metadata.excerpt);
    let tags = metadata
        .tags
        .iter()
        .map(|tag| format!("\"{}\"", tag))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "tags: [{}]", tags);
    let _ = writeln!(out, "published: {}", metadata.published);
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body);
    out
}

/// Splits a post file into metadata and body.
///
/// The opening delimiter must be the very first line. Lines are split on the
/// first colon; unknown keys are ignored. `title`, `date` and `excerpt` are
/// required, `tags` defaults to empty and `published` to true.
pub fn decode(text: &str) -> Result<(PostMetadata, String), BlogError> {
    let rest = text.strip_prefix("---\n").ok_or_else(|| {
        BlogError::InvalidFormat("post must start with --- front matter delimiter".to_string())
    })?;

    let (block, remainder) = rest.split_once("\n---").ok_or_else(|| {
        BlogError::InvalidFormat("unterminated front matter block".to_string())
    })?;

    // One newline ends the closing delimiter line, a second one is the blank
    // separator emitted by `encode`.
    let body = remainder.strip_prefix('\n').unwrap_or(remainder);
    let body = body.strip_prefix('\n').unwrap_or(body);

    let mut title = None;
    let mut date = None;
    let mut updated_date = None;
    let mut excerpt = None;
    let mut tags = Vec::new();
    let mut published = true;

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "title" => title = Some(unquote(value).to_string()),
            "date" => date = Some(parse_date(unquote(value))?),
            "updatedDate" => updated_date = Some(parse_date(unquote(value))?),
            "excerpt" => excerpt = Some(unquote(value).to_string()),
            "tags" => tags = parse_tags(value),
            "published" => published = value != "false",
            _ => {}
        }
    }

    let metadata = PostMetadata {
        title: title.ok_or_else(|| BlogError::MissingMetadata("title".to_string()))?,
        date: date.ok_or_else(|| BlogError::MissingMetadata("date".to_string()))?,
        updated_date,
        excerpt: excerpt.ok_or_else(|| BlogError::MissingMetadata("excerpt".to_string()))?,
        tags,
        published,
    };

    Ok((metadata, body.to_string()))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_tags(value: &str) -> Vec<String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    inner
        .split(',')
        .map(|tag| unquote(tag.trim()).to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn parse_date(value: &str) -> Result<NaiveDate, BlogError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    // Older files carry a full RFC 3339 timestamp in the date field.
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.date_naive());
    }

    Err(BlogError::DateParse(format!(
        "unable to parse date: {}",
        value
    )))
}
