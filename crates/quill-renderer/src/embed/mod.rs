//! Single-line embed directives.
//!
//! Every directive is one row of [`GRAMMAR`]: a name, an argument pattern
//! and a renderer. A single [`EmbedRule`] walks the table, so adding a
//! platform means adding a row.
//!
//! ```text
//! [codesandbox <id> [/file/path] [<width> [<height>]]]
//! [typescript-sandbox <id> [<width>] [<height>]]
//! [youtube <id-or-url> [<width>] [<height>]]
//! [vimeo <id-or-url> [<width>] [<height>]]
//! [twitter <id-or-url>]
//! ```
//!
//! A line that looks like a directive but fails its pattern is left alone
//! and reaches the markdown parser as ordinary text.

mod html;
mod ids;

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::block::{BlockRule, BlockState, Payload, Token};

/// Width used by video embeds when none is given.
pub const DEFAULT_VIDEO_WIDTH: &str = "1024";

/// Height used by video embeds when none is given.
pub const DEFAULT_VIDEO_HEIGHT: &str = "576";

static CODESANDBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[codesandbox\s+([a-zA-Z0-9-]+)(?:\s+([^\s\]]+))?(?:\s+(\d+))?(?:\s+(\d+))?\s*\]$")
        .unwrap()
});

static TYPESCRIPT_SANDBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[typescript-sandbox\s+([a-zA-Z0-9+-]+)(?:\s+(\d+))?(?:\s+(\d+))?\s*\]$").unwrap()
});

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[youtube\s+([^\s\]]+)(?:\s+(\d+))?(?:\s+(\d+))?\s*\]$").unwrap()
});

static VIMEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[vimeo\s+([^\s\]]+)(?:\s+(\d+))?(?:\s+(\d+))?\s*\]$").unwrap()
});

static TWITTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[twitter\s+([^\s\]]+)\s*\]$").unwrap());

/// One row of the directive table.
pub struct Directive {
    /// Name written inside the brackets.
    pub name: &'static str,
    pattern: &'static LazyLock<Regex>,
    build: fn(&Captures<'_>) -> Option<Embed>,
    render: fn(&Embed) -> String,
}

impl Directive {
    /// Token kind emitted for this directive, e.g. `typescript_sandbox_embed`.
    #[must_use]
    pub fn kind(&self) -> String {
        format!("{}_embed", self.name.replace('-', "_"))
    }

    /// Parse a trimmed line.
    #[must_use]
    pub fn parse(&self, line: &str) -> Option<Embed> {
        self.pattern.captures(line).and_then(|caps| (self.build)(&caps))
    }

    #[must_use]
    pub fn render(&self, embed: &Embed) -> String {
        (self.render)(embed)
    }
}

impl std::fmt::Debug for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directive").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The directive table, in matching order.
pub static GRAMMAR: &[Directive] = &[
    Directive {
        name: "codesandbox",
        pattern: &CODESANDBOX,
        build: build_codesandbox,
        render: html::codesandbox,
    },
    Directive {
        name: "typescript-sandbox",
        pattern: &TYPESCRIPT_SANDBOX,
        build: build_sized,
        render: html::typescript_sandbox,
    },
    Directive {
        name: "youtube",
        pattern: &YOUTUBE,
        build: |caps| Some(build_video(caps, ids::youtube)),
        render: html::youtube,
    },
    Directive {
        name: "vimeo",
        pattern: &VIMEO,
        build: |caps| Some(build_video(caps, ids::vimeo)),
        render: html::vimeo,
    },
    Directive {
        name: "twitter",
        pattern: &TWITTER,
        build: |caps| {
            Some(Embed {
                id: resolve_id(&caps[1], ids::twitter),
                ..Embed::default()
            })
        },
        render: html::twitter,
    },
];

/// Look up a directive by name.
#[must_use]
pub fn directive(name: &str) -> Option<&'static Directive> {
    GRAMMAR.iter().find(|d| d.name == name)
}

/// Parsed directive arguments.
///
/// Dimensions are kept as the digit strings the author wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Embed {
    pub id: String,
    pub path: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Payload of an embed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveToken {
    pub name: &'static str,
    /// Raw whitespace-separated arguments after the name.
    pub args: Vec<String>,
    /// Source line range.
    pub span: Range<usize>,
    pub embed: Embed,
}

/// Block rule matching any row of [`GRAMMAR`] on a single line.
#[derive(Debug, Default)]
pub struct EmbedRule;

impl EmbedRule {
    /// Rule name in the block chain.
    pub const NAME: &'static str = "embed";

    /// Match a line against the table.
    ///
    /// Leading blockquote (`>`) and list item (`-`, `*`, `+`, `1.`, `1)`)
    /// markers are skipped, so a directive may open a container.
    #[must_use]
    pub fn match_line(line: &str) -> Option<(&'static Directive, Embed)> {
        let directive_text = strip_containers(line).trim_end();
        if !directive_text.starts_with('[') {
            return None;
        }
        GRAMMAR
            .iter()
            .find_map(|directive| directive.parse(directive_text).map(|embed| (directive, embed)))
    }
}

/// Text after any leading container markers.
fn strip_containers(line: &str) -> &str {
    let mut rest = line.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix('>') {
            rest = after.trim_start();
        } else if let Some(after) = list_marker(rest) {
            rest = after.trim_start();
        } else {
            return rest;
        }
    }
}

/// Text after a list item marker, which must be followed by whitespace.
fn list_marker(text: &str) -> Option<&str> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    let marker_len = match text.as_bytes().get(digits) {
        Some(b'.' | b')') if (1..=9).contains(&digits) => digits + 1,
        Some(b'-' | b'*' | b'+') if digits == 0 => 1,
        _ => return None,
    };
    let after = &text[marker_len..];
    after.starts_with([' ', '\t']).then_some(after)
}

impl BlockRule for EmbedRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn parse(&self, state: &mut BlockState<'_>, start: usize, silent: bool) -> bool {
        // Four columns of indentation make an indented code block.
        if state.indent(start) >= 4 {
            return false;
        }
        let Some(line) = state.line(start) else {
            return false;
        };
        let Some((directive, embed)) = Self::match_line(line) else {
            return false;
        };
        if silent {
            return true;
        }

        let markup = strip_containers(line).trim_end();
        let args = markup
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split_whitespace()
            .skip(1)
            .map(str::to_owned)
            .collect();

        tracing::debug!(directive = directive.name, id = %embed.id, line = start, "Embed directive");

        state.push(Token {
            kind: directive.kind(),
            markup: markup.to_owned(),
            map: start..start + 1,
            hidden: false,
            payload: Payload::Directive(DirectiveToken {
                name: directive.name,
                args,
                span: start..start + 1,
                embed,
            }),
        });
        state.consume(start + 1);
        true
    }
}

fn build_codesandbox(caps: &Captures<'_>) -> Option<Embed> {
    let mut embed = Embed {
        id: caps[1].to_owned(),
        ..Embed::default()
    };
    let third = caps.get(3).map(|m| m.as_str().to_owned());
    let fourth = caps.get(4).map(|m| m.as_str().to_owned());

    match caps.get(2).map(|m| m.as_str()) {
        None => {}
        Some(size) if size.bytes().all(|b| b.is_ascii_digit()) => {
            // A number in path position is a width; a trailing number is its height.
            if fourth.is_some() {
                return None;
            }
            embed.height = Some(third.unwrap_or_else(|| size.to_owned()));
            embed.width = Some(size.to_owned());
        }
        Some(path) if path.starts_with('/') => {
            embed.path = Some(path.to_owned());
            embed.width = third;
            embed.height = fourth;
        }
        Some(_) => return None,
    }
    Some(embed)
}

fn build_sized(caps: &Captures<'_>) -> Option<Embed> {
    Some(Embed {
        id: caps[1].to_owned(),
        path: None,
        width: caps.get(2).map(|m| m.as_str().to_owned()),
        height: caps.get(3).map(|m| m.as_str().to_owned()),
    })
}

fn build_video(caps: &Captures<'_>, extract: fn(&str) -> Option<String>) -> Embed {
    let dimension = |index: usize, default: &str| {
        caps.get(index)
            .map_or_else(|| default.to_owned(), |m| m.as_str().to_owned())
    };
    Embed {
        id: resolve_id(&caps[1], extract),
        path: None,
        width: Some(dimension(2, DEFAULT_VIDEO_WIDTH)),
        height: Some(dimension(3, DEFAULT_VIDEO_HEIGHT)),
    }
}

/// Use bare ids verbatim; URLs that do not yield an id become empty.
fn resolve_id(value: &str, extract: fn(&str) -> Option<String>) -> String {
    if !ids::is_url(value) {
        return value.to_owned();
    }
    extract(value).unwrap_or_else(|| {
        tracing::warn!(url = value, "Could not extract embed id");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> (&'static str, Embed) {
        let (directive, embed) = EmbedRule::match_line(line).unwrap();
        (directive.name, embed)
    }

    fn sized(id: &str, width: &str, height: &str) -> Embed {
        Embed {
            id: id.to_owned(),
            path: None,
            width: Some(width.to_owned()),
            height: Some(height.to_owned()),
        }
    }

    #[test]
    fn test_kind_names() {
        let kinds: Vec<String> = GRAMMAR.iter().map(Directive::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "codesandbox_embed",
                "typescript_sandbox_embed",
                "youtube_embed",
                "vimeo_embed",
                "twitter_embed",
            ]
        );
    }

    #[test]
    fn test_youtube_url_with_size() {
        assert_eq!(
            parse("[youtube https://www.youtube.com/watch?v=abc123 640 360]"),
            ("youtube", sized("abc123", "640", "360"))
        );
    }

    #[test]
    fn test_youtube_short_url_defaults() {
        assert_eq!(
            parse("[youtube https://youtu.be/abc123]"),
            ("youtube", sized("abc123", "1024", "576"))
        );
    }

    #[test]
    fn test_youtube_width_only() {
        assert_eq!(parse("[youtube abc 640]").1, sized("abc", "640", "576"));
    }

    #[test]
    fn test_youtube_foreign_host_degrades_to_empty_id() {
        assert_eq!(
            parse("[youtube https://example.com/abc]").1,
            sized("", "1024", "576")
        );
    }

    #[test]
    fn test_vimeo_url() {
        assert_eq!(
            parse("[vimeo https://vimeo.com/76979871]"),
            ("vimeo", sized("76979871", "1024", "576"))
        );
    }

    #[test]
    fn test_codesandbox_numeric_reused_as_height() {
        assert_eq!(
            parse("[codesandbox abc 800]"),
            ("codesandbox", sized("abc", "800", "800"))
        );
    }

    #[test]
    fn test_codesandbox_numeric_pair() {
        assert_eq!(parse("[codesandbox abc 800 600]").1, sized("abc", "800", "600"));
    }

    #[test]
    fn test_codesandbox_path_and_size() {
        assert_eq!(
            parse("[codesandbox abc /src/index.js 800 600]").1,
            Embed {
                path: Some("/src/index.js".to_owned()),
                ..sized("abc", "800", "600")
            }
        );
    }

    #[test]
    fn test_codesandbox_rejects_relative_path() {
        assert!(EmbedRule::match_line("[codesandbox abc src/index.js]").is_none());
        assert!(EmbedRule::match_line("[codesandbox abc 1 2 3]").is_none());
    }

    #[test]
    fn test_typescript_sandbox_id_charset() {
        assert_eq!(
            parse("[typescript-sandbox PTAEH+abc-1 800 600]"),
            ("typescript-sandbox", sized("PTAEH+abc-1", "800", "600"))
        );
        assert!(EmbedRule::match_line("[typescript-sandbox a/b]").is_none());
    }

    #[test]
    fn test_twitter_url_and_bare_id() {
        assert_eq!(
            parse("[twitter https://x.com/someone/status/42]").1.id,
            "42"
        );
        assert_eq!(parse("[twitter 1576415168426573825]").1.id, "1576415168426573825");
    }

    #[test]
    fn test_line_is_trimmed() {
        assert_eq!(parse("  [vimeo 1]  ").1.id, "1");
    }

    #[test]
    fn test_non_matching_lines() {
        for line in [
            "[youtube]",
            "[youtube a b]",
            "[dailymotion abc]",
            "text [youtube abc]",
            "[youtube abc] trailing",
            "[twitter a b]",
        ] {
            assert!(EmbedRule::match_line(line).is_none(), "{line}");
        }
    }

    #[test]
    fn test_container_markers_are_skipped() {
        assert_eq!(parse("- [youtube abc]").0, "youtube");
        assert_eq!(parse("> [vimeo 1]").1.id, "1");
        assert_eq!(parse("12. [twitter 9]").0, "twitter");
        assert_eq!(parse(">  * [vimeo 2]").1.id, "2");
    }

    #[test]
    fn test_container_marker_needs_whitespace() {
        for line in ["-[youtube abc]", "1.[vimeo 1]", "1234567890. [vimeo 1]", "- text [vimeo 1]"] {
            assert!(EmbedRule::match_line(line).is_none(), "{line}");
        }
    }

    #[test]
    fn test_render_youtube() {
        let directive = directive("youtube").unwrap();
        assert_eq!(
            directive.render(&sized("abc123", "640", "360")),
            r#"<section class="youtube"><iframe src="https://www.youtube.com/embed/abc123" style="width: 640px; height: 360px; border: 0;" width="640" height="360" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></section>"#
        );
    }

    #[test]
    fn test_render_codesandbox_with_path() {
        let directive = directive("codesandbox").unwrap();
        let embed = Embed {
            id: "abc".to_owned(),
            path: Some("/index.js".to_owned()),
            ..Embed::default()
        };
        assert_eq!(
            directive.render(&embed),
            r#"<section class="sandbox"><iframe src="https://codesandbox.io/p/sandbox/abc?file=/index.js"></iframe></section>"#
        );
    }

    #[test]
    fn test_render_typescript_sandbox_sizing() {
        let directive = directive("typescript-sandbox").unwrap();
        assert_eq!(
            directive.render(&sized("PTAEH", "800", "600")),
            r#"<section class="sandbox"><iframe src="https://www.typescriptlang.org/play/?#code/PTAEH" style="width: 800px; height: 600px; border: 0;"></iframe></section>"#
        );
    }

    #[test]
    fn test_render_twitter() {
        let directive = directive("twitter").unwrap();
        let html = directive.render(&Embed {
            id: "42".to_owned(),
            ..Embed::default()
        });
        assert!(html.starts_with(
            r#"<section class="twitter"><blockquote class="twitter-tweet"><a href="https://twitter.com/x/status/42"></a></blockquote> <script async"#
        ));
    }

    #[test]
    fn test_render_escapes_attributes() {
        let directive = directive("twitter").unwrap();
        let html = directive.render(&Embed {
            id: "\"><script>".to_owned(),
            ..Embed::default()
        });
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
