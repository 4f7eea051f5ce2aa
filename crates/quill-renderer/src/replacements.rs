//! Placeholder substitution applied to rendered HTML.

/// Ordered `(placeholder, html)` pairs applied after the markdown pass.
///
/// Placeholders carry a per-document nonce so that comments written in the
/// source cannot collide with them.
#[derive(Debug)]
pub(crate) struct Replacements {
    nonce: String,
    items: Vec<(String, String)>,
}

impl Replacements {
    pub(crate) fn new(nonce: impl Into<String>, capacity: usize) -> Self {
        Self {
            nonce: nonce.into(),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Reserve the next placeholder for `html` and return it.
    pub(crate) fn reserve(&mut self, html: String) -> String {
        let placeholder = format!("<!--quill-{}-{}-->", self.nonce, self.items.len());
        self.items.push((placeholder.clone(), html));
        placeholder
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Substitute every placeholder. Consumes the set.
    pub(crate) fn apply(self, html: &mut String) {
        for (from, to) in self.items {
            if html.contains(&from) {
                *html = html.replace(&from, &to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reserve_numbers_placeholders() {
        let mut replacements = Replacements::new("ab12", 2);
        assert_eq!(replacements.reserve("a".to_owned()), "<!--quill-ab12-0-->");
        assert_eq!(replacements.reserve("b".to_owned()), "<!--quill-ab12-1-->");
        assert_eq!(replacements.len(), 2);
    }

    #[test]
    fn test_apply_does_not_confuse_prefixes() {
        let mut replacements = Replacements::new("n", 11);
        for i in 0..11 {
            replacements.reserve(format!("<p>{i}</p>"));
        }
        let mut html = "<!--quill-n-1-->\n<!--quill-n-10-->\n".to_owned();
        replacements.apply(&mut html);
        assert_eq!(html, "<p>1</p>\n<p>10</p>\n");
    }

    #[test]
    fn test_other_nonce_is_left_alone() {
        let mut replacements = Replacements::new("aaaa", 1);
        replacements.reserve("<hr />".to_owned());
        let mut html = "<!--quill-bbbb-0-->\n<!--quill-aaaa-0-->\n".to_owned();
        replacements.apply(&mut html);
        assert_eq!(html, "<!--quill-bbbb-0-->\n<hr />\n");
    }

    #[test]
    fn test_missing_placeholder_is_ignored() {
        let mut replacements = Replacements::new("n", 1);
        replacements.reserve("x".to_owned());
        let mut html = "unchanged".to_owned();
        replacements.apply(&mut html);
        assert_eq!(html, "unchanged");
    }
}
