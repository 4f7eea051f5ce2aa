//! Token renderer overrides.

use std::collections::HashMap;

use crate::block::{Payload, Token};
use crate::embed::GRAMMAR;
use crate::frontmatter::FRONTMATTER_KIND;

/// Renders one token to HTML.
pub type RenderFn = Box<dyn Fn(&Token) -> String + Send + Sync>;

/// Token kind to renderer table.
///
/// The table starts with an entry for every embed directive plus the hidden
/// frontmatter block; [`set`](Self::set) replaces or adds entries.
pub struct RendererRules {
    rules: HashMap<String, RenderFn>,
}

impl RendererRules {
    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Install `render` for `kind`, returning the previous renderer.
    pub fn set(
        &mut self,
        kind: impl Into<String>,
        render: impl Fn(&Token) -> String + Send + Sync + 'static,
    ) -> Option<RenderFn> {
        self.rules.insert(kind.into(), Box::new(render))
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }

    /// Render `token`, or `None` if no renderer handles its kind.
    #[must_use]
    pub fn render(&self, token: &Token) -> Option<String> {
        self.rules.get(&token.kind).map(|render| render(token))
    }
}

impl Default for RendererRules {
    fn default() -> Self {
        let mut rules = Self::empty();
        for directive in GRAMMAR {
            rules.set(directive.kind(), move |token| match &token.payload {
                Payload::Directive(parsed) => directive.render(&parsed.embed),
                _ => String::new(),
            });
        }
        rules.set(FRONTMATTER_KIND, |_| String::new());
        rules
    }
}

impl std::fmt::Debug for RendererRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&String> = self.rules.keys().collect();
        kinds.sort();
        f.debug_struct("RendererRules").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{DirectiveToken, Embed};

    fn token(kind: &str, payload: Payload) -> Token {
        Token {
            kind: kind.to_owned(),
            markup: String::new(),
            map: 0..1,
            hidden: false,
            payload,
        }
    }

    #[test]
    fn test_default_covers_grammar() {
        let rules = RendererRules::default();
        for directive in GRAMMAR {
            assert!(rules.contains(&directive.kind()), "{}", directive.name);
        }
        assert!(rules.contains(FRONTMATTER_KIND));
    }

    #[test]
    fn test_render_directive() {
        let rules = RendererRules::default();
        let payload = Payload::Directive(DirectiveToken {
            name: "vimeo",
            args: vec!["1".to_owned()],
            span: 0..1,
            embed: Embed {
                id: "1".to_owned(),
                ..Embed::default()
            },
        });
        let html = rules.render(&token("vimeo_embed", payload)).unwrap();
        assert!(html.starts_with(r#"<section class="vimeo"><iframe src="https://player.vimeo.com/video/1""#));
    }

    #[test]
    fn test_override_replaces_renderer() {
        let mut rules = RendererRules::default();
        let previous = rules.set("twitter_embed", |token| format!("<x>{}</x>", token.markup));
        assert!(previous.is_some());

        let mut t = token("twitter_embed", Payload::None);
        t.markup = "[twitter 1]".to_owned();
        assert_eq!(rules.render(&t).unwrap(), "<x>[twitter 1]</x>");
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(RendererRules::empty().render(&token("nope", Payload::None)), None);
    }
}
