//! Markdown to HTML rendering.

use std::sync::Arc;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::block::{Block, BlockRuler};
use crate::frontmatter::{FrontmatterStore, content_key};
use crate::replacements::Replacements;
use crate::rules::RendererRules;
use crate::state::{HeadingIds, TocEntry, code_info};

/// Output switches for [`MarkdownRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render single newlines inside paragraphs as `<br />`.
    pub hard_breaks: bool,
    /// Curly quotes, dashes and ellipses.
    pub smart_punctuation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            smart_punctuation: true,
        }
    }
}

impl RenderOptions {
    fn parser_options(self) -> Options {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        if self.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }
}

/// Result of rendering one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub html: String,
    /// Text of the first level-1 heading.
    pub title: Option<String>,
    /// Every heading in document order.
    pub toc: Vec<TocEntry>,
    /// Non-fatal problems, e.g. a frontmatter block that failed to parse.
    pub warnings: Vec<String>,
}

/// Markdown renderer with block rule extensions.
///
/// Rendering runs in three steps:
///
/// 1. The [`BlockRuler`] scans the source. Lines claimed by a rule become
///    tokens; everything else is passed on as markdown.
/// 2. pulldown-cmark renders the markdown with every visible token replaced
///    by an HTML comment placeholder. Headings get anchor ids and fenced
///    code gets a normalized language.
/// 3. Placeholders are swapped for the output of [`RendererRules`].
///
/// A renderer is immutable while rendering, so one instance can serve
/// concurrent requests.
#[derive(Debug)]
pub struct MarkdownRenderer {
    ruler: BlockRuler,
    rules: RendererRules,
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Renderer with frontmatter extraction into `store` and all embed directives.
    #[must_use]
    pub fn new(store: Arc<FrontmatterStore>) -> Self {
        Self {
            ruler: BlockRuler::standard(store),
            rules: RendererRules::default(),
            options: RenderOptions::default(),
        }
    }

    /// Renderer without any block rule extensions.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            ruler: BlockRuler::new(),
            rules: RendererRules::empty(),
            options: RenderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Block rule chain, for registering additional rules.
    pub fn ruler_mut(&mut self) -> &mut BlockRuler {
        &mut self.ruler
    }

    /// Token renderer table, for overriding output.
    pub fn rules_mut(&mut self) -> &mut RendererRules {
        &mut self.rules
    }

    /// Render `text` to HTML.
    #[must_use]
    pub fn render(&self, text: &str) -> RenderResult {
        let lines: Vec<&str> = text.lines().collect();
        let (blocks, mut warnings) = self.ruler.tokenize(text).into_parts();

        let mut markdown = String::with_capacity(text.len());
        let mut replacements = Replacements::new(&content_key(text)[..16], blocks.len());
        for block in &blocks {
            match block {
                Block::Markdown(range) => {
                    for line in &lines[range.clone()] {
                        markdown.push_str(line);
                        markdown.push('\n');
                    }
                }
                Block::Token(token) if token.hidden => {}
                Block::Token(token) => {
                    let output = self.rules.render(token).unwrap_or_else(|| {
                        warnings.push(format!("No renderer for token \"{}\"", token.kind));
                        String::new()
                    });
                    // Keep whatever precedes the markup (indent, `>` or a list
                    // marker) so the placeholder lands in the same container.
                    let line = lines.get(token.map.start).copied().unwrap_or_default();
                    let prefix = line.find(token.markup.as_str()).map_or_else(
                        || &line[..line.len() - line.trim_start().len()],
                        |at| &line[..at],
                    );
                    markdown.push_str(prefix);
                    markdown.push_str(&replacements.reserve(output));
                    markdown.push('\n');
                }
            }
        }

        let (mut html, title, toc) = self.render_markdown(&markdown);
        tracing::debug!(
            tokens = replacements.len(),
            headings = toc.len(),
            "Rendered markdown"
        );
        replacements.apply(&mut html);

        RenderResult {
            html,
            title,
            toc,
            warnings,
        }
    }

    fn render_markdown(&self, markdown: &str) -> (String, Option<String>, Vec<TocEntry>) {
        let parser = Parser::new_ext(markdown, self.options.parser_options());

        let mut ids = HeadingIds::default();
        let mut toc = Vec::new();
        let mut title = None;
        // Index of the open heading tag, its plain text and its opt-out flag.
        let mut heading: Option<(usize, String, bool)> = None;
        let mut events: Vec<Event<'_>> = Vec::new();

        for event in parser {
            let event = match event {
                Event::Start(Tag::Heading {
                    ref classes,
                    ref attrs,
                    ..
                }) => {
                    let omit_toc = classes.iter().any(|class| is_omit_marker(class))
                        || attrs.iter().any(|(key, _)| is_omit_marker(key));
                    heading = Some((events.len(), String::new(), omit_toc));
                    event
                }
                Event::Text(text) => {
                    if let Some((_, buffer, _)) = &mut heading {
                        buffer.push_str(&text);
                    }
                    Event::Text(text)
                }
                Event::Code(code) => {
                    if let Some((_, buffer, _)) = &mut heading {
                        buffer.push_str(&code);
                    }
                    Event::Code(code)
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some((start, text, omit_toc)) = heading.take() {
                        let mut inner_html = String::new();
                        html::push_html(&mut inner_html, events[start + 1..].iter().cloned());
                        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                            let anchor = ids.claim(id.as_deref(), &text);
                            *id = Some(CowStr::from(anchor.clone()));

                            let text = text.trim().to_owned();
                            let level = level as u8;
                            if level == 1 && title.is_none() {
                                title = Some(text.clone());
                            }
                            toc.push(TocEntry {
                                level,
                                title: text,
                                id: anchor,
                                inner_html: inner_html.trim().to_owned(),
                                omit_toc,
                            });
                        }
                    }
                    event
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => Event::Start(
                    Tag::CodeBlock(CodeBlockKind::Fenced(CowStr::from(code_info(&info)))),
                ),
                Event::SoftBreak if self.options.hard_breaks => Event::HardBreak,
                other => other,
            };
            events.push(event);
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        (output, title, toc)
    }
}

fn is_omit_marker(name: &str) -> bool {
    matches!(name, "omit-toc" | "omit-from-toc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockRule, BlockState, PARAGRAPH, Payload, Token};
    use pretty_assertions::assert_eq;

    fn renderer() -> (Arc<FrontmatterStore>, MarkdownRenderer) {
        let store = Arc::new(FrontmatterStore::default());
        let renderer = MarkdownRenderer::new(Arc::clone(&store));
        (store, renderer)
    }

    fn render(text: &str) -> String {
        renderer().1.render(text).html
    }

    #[test]
    fn test_rule_order() {
        let (_, renderer) = renderer();
        assert_eq!(
            renderer.ruler.names(),
            vec!["front_matter", "fence", "embed", "paragraph"]
        );
    }

    #[test]
    fn test_plain_markdown() {
        assert_eq!(render("Hello *world*"), "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn test_youtube_embed_html() {
        assert_eq!(
            render("[youtube https://www.youtube.com/watch?v=abc123 640 360]"),
            "<section class=\"youtube\"><iframe src=\"https://www.youtube.com/embed/abc123\" \
             style=\"width: 640px; height: 360px; border: 0;\" width=\"640\" height=\"360\" \
             frameborder=\"0\" allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; \
             gyroscope; picture-in-picture\" allowfullscreen></iframe></section>\n"
        );
    }

    #[test]
    fn test_youtube_short_url_uses_default_size() {
        let html = render("[youtube https://youtu.be/abc123]");
        assert!(html.contains(r#"src="https://www.youtube.com/embed/abc123""#));
        assert!(html.contains(r#"width="1024" height="576""#));
    }

    #[test]
    fn test_codesandbox_numeric_size() {
        let html = render("[codesandbox abc 800]");
        assert!(html.contains(r#"src="https://codesandbox.io/p/sandbox/abc""#));
        assert!(html.contains("width: 800px; height: 800px;"));
    }

    #[test]
    fn test_codesandbox_path_and_size() {
        let html = render("[codesandbox abc /src/index.js 800 600]");
        assert!(html.contains(r#"src="https://codesandbox.io/p/sandbox/abc?file=/src/index.js""#));
        assert!(html.contains("width: 800px; height: 600px;"));
    }

    #[test]
    fn test_directive_consumes_exactly_one_line() {
        let html = render("before\n[vimeo 1]\nafter");
        assert!(html.starts_with("<p>before</p>\n<section class=\"vimeo\">"));
        assert!(html.ends_with("</section>\n<p>after</p>\n"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let (_, renderer) = renderer();
        let text = "# Title\n\n[twitter 1576415168426573825]\n\n[codesandbox abc 800]\n";
        assert_eq!(renderer.render(text), renderer.render(text));
    }

    #[test]
    fn test_non_matching_directive_falls_through() {
        assert_eq!(render("[youtube]"), "<p>[youtube]</p>\n");
        assert_eq!(render("[youtube a b]"), "<p>[youtube a b]</p>\n");
    }

    #[test]
    fn test_directive_in_fence_untouched() {
        let html = render("```\n[youtube abc]\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-text\">[youtube abc]\n</code></pre>\n"
        );
    }

    #[test]
    fn test_indented_directive_is_code() {
        let html = render("    [youtube abc]");
        assert_eq!(html, "<pre><code>[youtube abc]\n</code></pre>\n");
    }

    #[test]
    fn test_directive_in_list_item() {
        let html = render("- item\n\n  [vimeo 7]\n");
        assert!(html.contains("<li>"));
        assert!(html.contains(r#"<section class="vimeo">"#));
    }

    fn contains_in_order(html: &str, parts: &[&str]) -> bool {
        let mut rest = html;
        parts.iter().all(|part| match rest.find(part) {
            Some(at) => {
                rest = &rest[at + part.len()..];
                true
            }
            None => false,
        })
    }

    #[test]
    fn test_directive_opens_list_item() {
        let html = render("- [youtube abc]\n- next\n");
        assert!(contains_in_order(
            &html,
            &["<ul>", "<li>", r#"<section class="youtube">"#, "</li>", "<li>next</li>", "</ul>"]
        ));
        assert!(!html.contains("[youtube"));
    }

    #[test]
    fn test_directive_in_blockquote() {
        let html = render("> [vimeo 1]\n");
        assert!(contains_in_order(
            &html,
            &["<blockquote>", r#"<section class="vimeo">"#, "</blockquote>"]
        ));
    }

    #[test]
    fn test_directive_in_ordered_list_inside_blockquote() {
        let html = render("> 1. [twitter 42]\n");
        assert!(contains_in_order(
            &html,
            &["<blockquote>", "<ol>", "<li>", r#"<section class="twitter">"#, "</ol>"]
        ));
    }

    #[test]
    fn test_placeholder_shaped_comment_is_kept() {
        let comment = "<!--quill-0000000000000000-0-->";
        let html = render(&format!("{comment}\n\n[vimeo 1]\n"));
        assert_eq!(html.matches("<iframe").count(), 1);
        assert!(html.starts_with(comment));
    }

    #[test]
    fn test_frontmatter_is_hidden_and_cached() {
        let (store, renderer) = renderer();
        let text = "---\ntitle: Intro\ndescription: Start\n---\n# Intro\n";

        let first = renderer.render(text);
        let second = renderer.render(text);

        assert_eq!(first.html, "<h1 id=\"intro\">Intro</h1>\n");
        assert_eq!(first, second);
        assert_eq!(store.parse_count(), 1);
        assert_eq!(
            store.lookup(text).and_then(|fm| fm.description),
            Some("Start".to_owned())
        );
    }

    #[test]
    fn test_malformed_frontmatter_warns() {
        let (store, renderer) = renderer();
        let result = renderer.render("---\n: : :\n  - [\n---\nBody");

        assert_eq!(result.html, "<p>Body</p>\n");
        assert_eq!(result.warnings.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_heading_ids_and_toc() {
        let (_, renderer) = renderer();
        let result = renderer.render("# Guide\n\n## Setup\n\n## Setup\n\n### Run `cargo` {#run}\n");

        assert_eq!(result.title.as_deref(), Some("Guide"));
        let ids: Vec<(u8, &str, &str)> = result
            .toc
            .iter()
            .map(|e| (e.level, e.title.as_str(), e.id.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![
                (1, "Guide", "guide"),
                (2, "Setup", "setup"),
                (2, "Setup", "setup-1"),
                (3, "Run cargo", "run"),
            ]
        );
        assert!(result.html.contains("<h2 id=\"setup-1\">Setup</h2>"));
    }

    #[test]
    fn test_suffixed_ids_never_collide() {
        let (_, renderer) = renderer();
        let result = renderer.render("## Setup\n\n## Setup\n\n## Setup 1\n");
        let ids: Vec<&str> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1", "setup-1-1"]);
    }

    #[test]
    fn test_heading_opt_out_markers() {
        let (_, renderer) = renderer();
        let result = renderer.render(
            "## Secret <!-- omit-toc -->\n\n## Hidden {.omit-toc}\n\n## Quiet {omit-from-toc}\n\n## *Public*\n",
        );
        let entries: Vec<(&str, &str, bool)> = result
            .toc
            .iter()
            .map(|e| (e.title.as_str(), e.inner_html.as_str(), e.omit_toc))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("Secret", "Secret <!-- omit-toc -->", false),
                ("Hidden", "Hidden", true),
                ("Quiet", "Quiet", true),
                ("Public", "<em>Public</em>", false),
            ]
        );
    }

    #[test]
    fn test_code_language_alias() {
        let html = render("```ts\nlet a = 1;\n```");
        assert!(html.starts_with("<pre><code class=\"language-typescript\">"));
    }

    #[test]
    fn test_hard_breaks() {
        assert_eq!(render("a\nb"), "<p>a<br />\nb</p>\n");

        let soft = MarkdownRenderer::bare().with_options(RenderOptions {
            hard_breaks: false,
            smart_punctuation: false,
        });
        assert_eq!(soft.render("a\nb").html, "<p>a\nb</p>\n");
    }

    #[test]
    fn test_bare_renderer_ignores_directives() {
        let html = MarkdownRenderer::bare().render("[vimeo 1]").html;
        assert_eq!(html, "<p>[vimeo 1]</p>\n");
    }

    #[test]
    fn test_custom_rule_without_renderer_warns() {
        struct Marker;

        impl BlockRule for Marker {
            fn name(&self) -> &str {
                "marker"
            }

            fn parse(&self, state: &mut BlockState<'_>, start: usize, silent: bool) -> bool {
                if state.line(start) != Some("%%") {
                    return false;
                }
                if !silent {
                    state.push(Token {
                        kind: "marker".to_owned(),
                        markup: "%%".to_owned(),
                        map: start..start + 1,
                        hidden: false,
                        payload: Payload::None,
                    });
                    state.consume(start + 1);
                }
                true
            }
        }

        let mut renderer = MarkdownRenderer::bare();
        renderer.ruler_mut().before(PARAGRAPH, Marker).unwrap();
        let result = renderer.render("%%");
        assert_eq!(result.html, "\n");
        assert_eq!(result.warnings, vec!["No renderer for token \"marker\""]);

        renderer.rules_mut().set("marker", |_| "<hr />".to_owned());
        assert_eq!(renderer.render("%%").html, "<hr />\n");
    }
}
