//! Tokenizer and the token cursor handed to value parsers.
//!
//! Input is split on single spaces with no quoting or escaping. Empty segments
//! are kept, so `"a  b"` yields `["a", "", "b"]`.

use std::fmt;

/// Split raw input into a token queue.
pub fn tokenize(input: &str) -> TokenQueue {
    TokenQueue::new(input.split(' ').map(str::to_string).collect())
}

/// Opaque cursor position returned by [`TokenQueue::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Ordered token queue with a movable cursor.
///
/// Consumed tokens stay in the backing buffer, which lets the dispatch engine
/// rewind after a failed parse and report token positions in diagnostics.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenQueue {
    tokens: Vec<String>,
    cursor: usize,
}

impl TokenQueue {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Head of the queue without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.cursor).map(String::as_str)
    }

    /// Consume and return the head of the queue.
    pub fn pop(&mut self) -> Option<String> {
        let token = self.tokens.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(token)
    }

    /// Consume every remaining token.
    pub fn drain_remaining(&mut self) -> Vec<String> {
        let rest = self.tokens[self.cursor..].to_vec();
        self.cursor = self.tokens.len();
        rest
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Number of tokens not consumed yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.cursor)
    }

    /// Index of the head token in the original input.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.cursor)
    }

    /// Rewind (or fast-forward) to a previous checkpoint.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.0.min(self.tokens.len());
    }

    /// Tokens consumed between `checkpoint` and the current cursor.
    pub fn consumed_since(&self, checkpoint: Checkpoint) -> &[String] {
        let start = checkpoint.0.min(self.cursor);
        &self.tokens[start..self.cursor]
    }
}

impl fmt::Debug for TokenQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenQueue")
            .field("consumed", &&self.tokens[..self.cursor])
            .field("remaining", &&self.tokens[self.cursor..])
            .finish()
    }
}
