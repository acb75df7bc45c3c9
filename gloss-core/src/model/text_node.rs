use serde::Serialize;

/// One text node of the serialized markup, in document order.
///
/// `char_start`/`char_end` are coordinates in the character stream, which is
/// the concatenation of every node's `collapsed_text`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextNodeInfo {
    pub char_start: usize,
    pub char_end: usize,
    /// Literal serialized text, entities included
    pub html_text: String,
    pub decoded_text: String,
    /// Decoded text with ASCII whitespace runs collapsed to one space
    pub collapsed_text: String,
}

impl TextNodeInfo {
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }

    /// Check if `pos` falls strictly inside `[char_start, char_end)`
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.char_start && pos < self.char_end
    }
}
