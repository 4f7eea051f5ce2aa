//! Fenced code block tracking.
//!
//! Lines inside a fenced block are passed to the markdown parser untouched,
//! so directive-looking text in code samples never becomes an embed.

/// Tracks fence state across consecutive lines.
///
/// A fence is three or more backticks or tildes indented by at most three
/// spaces. The closing fence uses the same character, is at least as long as
/// the opening one and carries nothing but whitespace after it.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` if it opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(trimmed) = strip_indent(line) else {
            return false;
        };

        match self.open {
            Some((ch, len)) => {
                if closes(trimmed, ch, len) {
                    self.open = None;
                    return true;
                }
                false
            }
            None => match opening(trimmed) {
                Some(marker) => {
                    self.open = Some(marker);
                    true
                }
                None => false,
            },
        }
    }
}

/// Returns `true` if `line` would open a fence.
pub(crate) fn is_opening(line: &str) -> bool {
    strip_indent(line).and_then(opening).is_some()
}

/// Strip up to three spaces; `None` for lines indented as code.
fn strip_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 || trimmed.starts_with('\t') {
        return None;
    }
    Some(trimmed)
}

fn opening(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    // Backtick info strings may not contain backticks.
    if count < 3 || (first == '`' && trimmed[count..].contains('`')) {
        return None;
    }
    Some((first, count))
}

fn closes(trimmed: &str, ch: char, min_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == ch).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
