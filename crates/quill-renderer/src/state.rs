//! Heading anchors and small text helpers.

use std::collections::{HashMap, HashSet};

/// A heading found while rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Plain heading text.
    pub title: String,
    /// Anchor id written to the heading element.
    pub id: String,
    /// Rendered inner HTML of the heading, inline comments included.
    pub inner_html: String,
    /// Opted out of navigation with a `{.omit-toc}` class or `{omit-toc}`
    /// attribute.
    pub omit_toc: bool,
}

/// Hands out unique anchor ids within one document.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    counts: HashMap<String, usize>,
    used: HashSet<String>,
}

impl HeadingIds {
    /// Id for a heading. An explicit `{#id}` is used as written; otherwise
    /// the slug of `text`, suffixed `-1`, `-2`, ... until it is unused.
    pub(crate) fn claim(&mut self, explicit: Option<&str>, text: &str) -> String {
        if let Some(id) = explicit {
            self.used.insert(id.to_owned());
            return id.to_owned();
        }

        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }
        let count = self.counts.entry(base.clone()).or_default();
        loop {
            let candidate = match *count {
                0 => base.clone(),
                n => format!("{base}-{n}"),
            };
            *count += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Convert text to a URL-safe slug.
///
/// Lowercases ASCII alphanumerics, collapses runs of whitespace, dashes and
/// underscores into one dash and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Normalize a fence info string: `ts`, `js` and `sh` become their full
/// names and an empty language becomes `text`.
pub(crate) fn code_info(info: &str) -> String {
    let info = info.trim();
    let (lang, rest) = info
        .split_once(char::is_whitespace)
        .map_or((info, None), |(lang, rest)| (lang, Some(rest)));
    let lang = match lang {
        "" => "text",
        "ts" => "typescript",
        "js" => "javascript",
        "sh" => "bash",
        other => other,
    };
    match rest {
        Some(rest) => format!("{lang} {rest}"),
        None => lang.to_owned(),
    }
}
