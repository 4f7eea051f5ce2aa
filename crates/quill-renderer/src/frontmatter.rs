//! Frontmatter extraction with a content-addressed cache.
//!
//! [`FrontmatterRule`] runs first in the block chain. It hides a leading
//! `---` block from the rendered output and parses its YAML into a
//! [`Frontmatter`] record. The record goes into a [`FrontmatterStore`]
//! keyed by the SHA-256 digest of the whole document, so the metadata of a
//! page can be read back after rendering without parsing it again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quill_cache::{CachePolicy, Clock, TtlCache};
use quill_meta::Frontmatter;
use sha2::{Digest, Sha256};

use crate::block::{BlockRule, BlockState, Payload, Token};

const MARKER: char = '-';
const MIN_MARKERS: usize = 3;

/// Token kind of the hidden frontmatter block.
pub const FRONTMATTER_KIND: &str = "front_matter";

/// Cache key for a document: lowercase hex SHA-256 of its full text.
#[must_use]
pub fn content_key(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Parsed frontmatter records keyed by document content.
///
/// Shared between concurrent renders; all access goes through a mutex.
pub struct FrontmatterStore {
    cache: Mutex<TtlCache<String, Frontmatter>>,
    parses: AtomicUsize,
}

impl FrontmatterStore {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self::from_cache(TtlCache::new(policy))
    }

    /// Create a store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self::from_cache(TtlCache::with_clock(policy, clock))
    }

    fn from_cache(cache: TtlCache<String, Frontmatter>) -> Self {
        Self {
            cache: Mutex::new(cache),
            parses: AtomicUsize::new(0),
        }
    }

    /// Record previously extracted from exactly `text`, if still cached.
    ///
    /// Never parses; a miss means the document has not been rendered
    /// recently or carries no valid frontmatter.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<Frontmatter> {
        self.lock().get(&content_key(text)).cloned()
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.lock().contains(&content_key(text))
    }

    /// Drop the record for `text`.
    pub fn evict(&self, text: &str) -> Option<Frontmatter> {
        self.lock().evict(&content_key(text))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of YAML payloads parsed since creation.
    #[must_use]
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    fn insert(&self, key: String, record: Frontmatter) {
        self.lock().put(key, record);
    }

    fn lock(&self) -> MutexGuard<'_, TtlCache<String, Frontmatter>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FrontmatterStore {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl std::fmt::Debug for FrontmatterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontmatterStore")
            .field("len", &self.len())
            .field("parses", &self.parse_count())
            .finish()
    }
}

/// Block rule for a leading `---` YAML block.
#[derive(Debug)]
pub struct FrontmatterRule {
    store: Arc<FrontmatterStore>,
}

impl FrontmatterRule {
    /// Rule name in the block chain.
    pub const NAME: &'static str = "front_matter";

    #[must_use]
    pub fn new(store: Arc<FrontmatterStore>) -> Self {
        Self { store }
    }

    fn extract(&self, state: &mut BlockState<'_>, content: &str) {
        let key = content_key(state.src());
        if self.store.lock().contains(&key) {
            tracing::debug!(key = %key, "Frontmatter cache hit");
            return;
        }

        self.store.parses.fetch_add(1, Ordering::Relaxed);
        match Frontmatter::from_yaml(content) {
            Ok(record) => self.store.insert(key, record),
            Err(e) => state.warn(format!("Frontmatter ignored: {e}")),
        }
    }
}

impl BlockRule for FrontmatterRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn parse(&self, state: &mut BlockState<'_>, start: usize, silent: bool) -> bool {
        if start != 0 {
            return false;
        }
        let Some(opening) = state.line(0).and_then(marker_run) else {
            return false;
        };
        if silent {
            return true;
        }

        let mut close = None;
        for index in 1..state.line_count() {
            if state.indent(index) < 4
                && state
                    .line(index)
                    .and_then(|line| marker_run(line.trim_start()))
                    .is_some_and(|len| len >= opening)
            {
                close = Some(index);
                break;
            }
        }

        // An unclosed block runs to the end of the document.
        let (content_end, end) = match close {
            Some(index) => (index, index + 1),
            None => (state.line_count(), state.line_count()),
        };
        let content = (1..content_end)
            .filter_map(|index| state.line(index))
            .collect::<Vec<_>>()
            .join("\n");

        self.extract(state, &content);

        let markup = state.line(0).unwrap_or_default().trim_end().to_owned();
        state.push(Token {
            kind: FRONTMATTER_KIND.to_owned(),
            markup,
            map: 0..end,
            hidden: true,
            payload: Payload::Frontmatter { content },
        });
        state.consume(end);
        true
    }
}

/// Length of a marker line: three or more `-` followed only by whitespace.
fn marker_run(line: &str) -> Option<usize> {
    let count = line.chars().take_while(|&c| c == MARKER).count();
    (count >= MIN_MARKERS && line[count..].trim().is_empty()).then_some(count)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use quill_cache::ManualClock;

    use super::*;
    use crate::block::{Block, BlockRuler, FENCE};

    fn setup() -> (Arc<FrontmatterStore>, BlockRuler) {
        let store = Arc::new(FrontmatterStore::default());
        let mut ruler = BlockRuler::new();
        ruler
            .before(FENCE, FrontmatterRule::new(Arc::clone(&store)))
            .unwrap();
        (store, ruler)
    }

    fn first_token(blocks: &[Block]) -> &Token {
        match &blocks[0] {
            Block::Token(token) => token,
            Block::Markdown(lines) => panic!("expected token, got markdown {lines:?}"),
        }
    }

    #[test]
    fn test_content_key_is_sha256_hex() {
        assert_eq!(
            content_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_key("a"), content_key("a\n"));
    }

    #[test]
    fn test_extracts_and_hides_block() {
        let (store, ruler) = setup();
        let text = "---\ntitle: Intro\ndescription: Start\n---\n# Body";

        let (blocks, warnings) = ruler.tokenize(text).into_parts();

        let token = first_token(&blocks);
        assert!(token.hidden);
        assert_eq!(token.map, 0..4);
        assert_eq!(
            token.payload,
            Payload::Frontmatter {
                content: "title: Intro\ndescription: Start".to_owned()
            }
        );
        assert_eq!(blocks[1], Block::Markdown(4..5));
        assert!(warnings.is_empty());
        assert_eq!(store.lookup(text).unwrap().title.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_second_pass_uses_cache() {
        let (store, ruler) = setup();
        let text = "---\ntitle: Intro\n---\nbody";

        let _ = ruler.tokenize(text);
        let first = store.lookup(text);
        let _ = ruler.tokenize(text);

        assert_eq!(store.parse_count(), 1);
        assert_eq!(store.lookup(text), first);
    }

    #[test]
    fn test_different_text_parses_again() {
        let (store, ruler) = setup();
        let _ = ruler.tokenize("---\ntitle: A\n---\n");
        let _ = ruler.tokenize("---\ntitle: A\n---\nmore");
        assert_eq!(store.parse_count(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_longer_closing_run() {
        let (store, ruler) = setup();
        let text = "----\ntitle: A\n---\nstill yaml\n  -----\nbody";

        let (blocks, _) = ruler.tokenize(text).into_parts();

        assert_eq!(first_token(&blocks).map, 0..5);
        assert!(store.lookup(text).is_none(), "multi-document YAML is rejected");
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let (store, ruler) = setup();
        let text = "---\ntitle: A\nbody";

        let (blocks, _) = ruler.tokenize(text).into_parts();

        assert_eq!(blocks.len(), 1);
        assert_eq!(first_token(&blocks).map, 0..3);
        assert!(store.lookup(text).is_none());
    }

    #[test]
    fn test_malformed_yaml_is_hidden_and_warned() {
        let (store, ruler) = setup();
        let text = "---\ntitle: [unclosed\n---\nbody";

        let (blocks, warnings) = ruler.tokenize(text).into_parts();

        assert!(first_token(&blocks).hidden);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Frontmatter ignored: Invalid YAML"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_declines_without_leading_marker() {
        let (store, ruler) = setup();

        for text in ["\n---\ntitle: A\n---", " ---\ntitle: A\n---", "--\ntitle: A\n--", "---x\n---"] {
            let (blocks, _) = ruler.tokenize(text).into_parts();
            assert!(
                blocks.iter().all(|b| matches!(b, Block::Markdown(_))),
                "{text:?}"
            );
        }
        assert_eq!(store.parse_count(), 0);
    }

    #[test]
    fn test_probe_does_not_parse() {
        let (store, ruler) = setup();
        assert_eq!(ruler.probe("---\ntitle: A\n---", 0), Some(FrontmatterRule::NAME));
        assert_eq!(store.parse_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_lookup_expires() {
        let clock = Arc::new(ManualClock::new());
        let policy = CachePolicy::new(Duration::from_secs(60), 10);
        let store = Arc::new(FrontmatterStore::with_clock(policy, clock.clone()));
        let mut ruler = BlockRuler::new();
        ruler
            .before(FENCE, FrontmatterRule::new(Arc::clone(&store)))
            .unwrap();
        let text = "---\ntitle: A\n---\n";

        let _ = ruler.tokenize(text);
        assert!(store.contains(text));

        clock.advance(Duration::from_secs(61));
        assert_eq!(store.lookup(text), None);
    }

    #[test]
    fn test_evict() {
        let (store, ruler) = setup();
        let text = "---\ntitle: A\n---\n";
        let _ = ruler.tokenize(text);

        assert!(store.evict(text).is_some());
        assert!(!store.contains(text));
    }
}
