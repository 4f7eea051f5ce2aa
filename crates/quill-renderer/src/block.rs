//! Ordered block rule chain.
//!
//! Source text is scanned line by line before it reaches pulldown-cmark.
//! At each line the chain tries its rules in order; the first rule that
//! accepts the line decides what happens to it:
//!
//! - a custom [`BlockRule`] emits a [`Token`] and consumes one or more lines
//! - the built-in `fence` rule passes a whole fenced code block through
//! - the built-in `paragraph` rule passes a single line through
//!
//! Custom rules are registered relative to a named anchor with
//! [`BlockRuler::before`]. Every rule is first probed in silent mode, and
//! only a rule that reports a match is run again to commit its output.

use std::ops::Range;
use std::sync::Arc;

use crate::embed::{DirectiveToken, EmbedRule};
use crate::error::RulerError;
use crate::fence::{FenceTracker, is_opening};
use crate::frontmatter::{FrontmatterRule, FrontmatterStore};

/// Name of the built-in rule that passes fenced code blocks through.
pub const FENCE: &str = "fence";

/// Name of the built-in catch-all rule.
pub const PARAGRAPH: &str = "paragraph";

/// A block-level recognizer.
pub trait BlockRule: Send + Sync {
    /// Unique rule name, used as an anchor for later registrations.
    fn name(&self) -> &str;

    /// Try to match at line `start`.
    ///
    /// With `silent` set, report the match without touching `state`.
    /// Otherwise push the output through [`BlockState::push`] and mark the
    /// consumed lines with [`BlockState::consume`].
    fn parse(&self, state: &mut BlockState<'_>, start: usize, silent: bool) -> bool;
}

/// Structured output of a block rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Renderer lookup key, e.g. `youtube_embed`.
    pub kind: String,
    /// Source text the token was built from.
    pub markup: String,
    /// Source lines covered by the token.
    pub map: Range<usize>,
    /// Hidden tokens produce no output.
    pub hidden: bool,
    pub payload: Payload,
}

/// Rule-specific data carried by a [`Token`].
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    None,
    Directive(DirectiveToken),
    Frontmatter { content: String },
}

/// A unit of tokenizer output.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Source lines handed to the markdown parser unchanged.
    Markdown(Range<usize>),
    Token(Token),
}

/// Mutable scan state shared by the rules of one tokenize pass.
#[derive(Debug)]
pub struct BlockState<'a> {
    src: &'a str,
    lines: Vec<&'a str>,
    blocks: Vec<Block>,
    warnings: Vec<String>,
    next: usize,
}

impl<'a> BlockState<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            lines: src.lines().collect(),
            blocks: Vec::new(),
            warnings: Vec::new(),
            next: 0,
        }
    }

    /// Entire source text.
    #[must_use]
    pub fn src(&self) -> &'a str {
        self.src
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line `index` without its terminator.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    /// Leading whitespace width of line `index`, tabs stopping at multiples of four.
    #[must_use]
    pub fn indent(&self, index: usize) -> usize {
        let Some(line) = self.line(index) else {
            return 0;
        };
        let mut width = 0;
        for ch in line.chars() {
            match ch {
                ' ' => width += 1,
                '\t' => width += 4 - width % 4,
                _ => break,
            }
        }
        width
    }

    /// Emit a token.
    pub fn push(&mut self, token: Token) {
        self.blocks.push(Block::Token(token));
    }

    /// Mark lines up to (excluding) `end` as consumed.
    pub fn consume(&mut self, end: usize) {
        self.next = end;
    }

    /// Record a non-fatal problem found while scanning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "Block rule warning");
        self.warnings.push(message);
    }

    fn pass_through(&mut self, lines: Range<usize>) {
        if let Some(Block::Markdown(prev)) = self.blocks.last_mut()
            && prev.end == lines.start
        {
            prev.end = lines.end;
            return;
        }
        self.blocks.push(Block::Markdown(lines));
    }

    /// Finish the pass, returning the emitted blocks and warnings.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Block>, Vec<String>) {
        (self.blocks, self.warnings)
    }
}

enum Entry {
    Fence,
    Paragraph,
    Custom(Box<dyn BlockRule>),
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Self::Fence => FENCE,
            Self::Paragraph => PARAGRAPH,
            Self::Custom(rule) => rule.name(),
        }
    }

    /// Run at `start`, returning the first unconsumed line on a match.
    fn run(&self, state: &mut BlockState<'_>, start: usize) -> Option<usize> {
        match self {
            Self::Fence => {
                let first = state.line(start)?;
                if !is_opening(first) {
                    return None;
                }
                let mut tracker = FenceTracker::new();
                tracker.update(first);
                let mut end = start + 1;
                while end < state.line_count() && tracker.in_fence() {
                    tracker.update(state.lines[end]);
                    end += 1;
                }
                state.pass_through(start..end);
                Some(end)
            }
            Self::Paragraph => {
                state.pass_through(start..start + 1);
                Some(start + 1)
            }
            Self::Custom(rule) => {
                if !rule.parse(state, start, true) {
                    return None;
                }
                state.next = start + 1;
                if !rule.parse(state, start, false) {
                    tracing::debug!(rule = rule.name(), line = start, "Rule declined after probe");
                    return None;
                }
                Some(state.next.max(start + 1))
            }
        }
    }
}

/// Ordered chain of block rules.
pub struct BlockRuler {
    entries: Vec<Entry>,
}

impl BlockRuler {
    /// Create a chain holding only the built-in `fence` and `paragraph` rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::Fence, Entry::Paragraph],
        }
    }

    /// Standard chain: frontmatter before `fence`, embeds before `paragraph`.
    pub(crate) fn standard(store: Arc<FrontmatterStore>) -> Self {
        Self {
            entries: vec![
                Entry::Custom(Box::new(FrontmatterRule::new(store))),
                Entry::Fence,
                Entry::Custom(Box::new(EmbedRule)),
                Entry::Paragraph,
            ],
        }
    }

    /// Insert `rule` immediately before the rule named `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`RulerError::UnknownAnchor`] if no rule is named `anchor`,
    /// or [`RulerError::DuplicateName`] if the rule name is already taken.
    pub fn before(&mut self, anchor: &str, rule: impl BlockRule + 'static) -> Result<(), RulerError> {
        if self.position(rule.name()).is_some() {
            return Err(RulerError::DuplicateName(rule.name().to_owned()));
        }
        let index = self
            .position(anchor)
            .ok_or_else(|| RulerError::UnknownAnchor(anchor.to_owned()))?;
        self.entries.insert(index, Entry::Custom(Box::new(rule)));
        Ok(())
    }

    /// Rule names in evaluation order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::name).collect()
    }

    /// Name of the first rule that would accept line `start`, without emitting anything.
    #[must_use]
    pub fn probe(&self, src: &str, start: usize) -> Option<&str> {
        let mut state = BlockState::new(src);
        self.entries
            .iter()
            .find(|entry| match entry {
                Entry::Fence => state.line(start).is_some_and(is_opening),
                Entry::Paragraph => start < state.line_count(),
                Entry::Custom(rule) => rule.parse(&mut state, start, true),
            })
            .map(Entry::name)
    }

    /// Scan `src` into blocks.
    #[must_use]
    pub fn tokenize<'a>(&self, src: &'a str) -> BlockState<'a> {
        let mut state = BlockState::new(src);
        let mut line = 0;
        while line < state.line_count() {
            let next = self.entries.iter().find_map(|entry| entry.run(&mut state, line));
            line = next.unwrap_or(line + 1);
        }
        state
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name() == name)
    }
}

impl Default for BlockRuler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlockRuler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRuler").field("rules", &self.names()).finish()
    }
}
