//! Character stream and text-node map of serialized markup.
//!
//! The character stream is what highlight offsets are measured against: the
//! decoded text of every text node, with ASCII whitespace runs collapsed to a
//! single space. Non-breaking spaces are content and never collapse.

use html_escape::decode_html_entities;
use tracing::debug;

use crate::markup::{is_block, tokenize, Token};
use crate::model::TextNodeInfo;

/// Longest entity reference we try to decode, `&` and `;` included
const MAX_ENTITY_LEN: usize = 40;

/// One decoded unit of literal text: a single character or a whole entity
/// reference, with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unit {
    pub byte: usize,
    pub decoded: String,
}

/// Break literal text into characters and entity references
pub(crate) fn units(html_text: &str) -> Vec<Unit> {
    let mut out = Vec::with_capacity(html_text.len());
    let mut i = 0usize;

    while i < html_text.len() {
        let rest = &html_text[i..];
        if rest.starts_with('&') {
            if let Some(semi) = rest[1..].find(';').filter(|&p| p + 2 <= MAX_ENTITY_LEN) {
                let candidate = &rest[..semi + 2];
                let decoded = decode_html_entities(candidate);
                if decoded != candidate {
                    out.push(Unit {
                        byte: i,
                        decoded: decoded.into_owned(),
                    });
                    i += candidate.len();
                    continue;
                }
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.push(Unit {
            byte: i,
            decoded: ch.to_string(),
        });
        i += ch.len_utf8();
    }
    out
}

/// Walks decoded characters and reports whether each one survives collapsing
#[derive(Debug, Default)]
pub(crate) struct Collapser {
    prev_ws: bool,
}

impl Collapser {
    /// The character as it appears in the collapsed text, if it appears at all
    pub fn feed(&mut self, ch: char) -> Option<char> {
        let ws = ch.is_ascii_whitespace();
        let was_ws = std::mem::replace(&mut self.prev_ws, ws);
        match (ws, was_ws) {
            (true, true) => None,
            (true, false) => Some(' '),
            (false, _) => Some(ch),
        }
    }
}

fn collapse(decoded: &str) -> String {
    let mut collapser = Collapser::default();
    decoded.chars().filter_map(|c| collapser.feed(c)).collect()
}

/// Text nodes of a document plus the byte offset of each within the markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextIndex {
    pub nodes: Vec<TextNodeInfo>,
    pub byte_offsets: Vec<usize>,
}

impl TextIndex {
    pub fn build(markup: &str) -> Self {
        let tokens = tokenize(markup);
        let mut index = TextIndex::default();
        let mut char_pos = 0usize;

        let touches_block = |token: Option<&Token>| match token {
            None => true,
            Some(Token::Tag(tag)) => is_block(&tag.name),
            Some(Token::Text(_)) => false,
        };

        for (i, token) in tokens.iter().enumerate() {
            let Token::Text(range) = token else {
                continue;
            };
            let html_text = &markup[range.clone()];
            let decoded_text: String = units(html_text)
                .into_iter()
                .map(|u| u.decoded)
                .collect();
            let collapsed_text = collapse(&decoded_text);

            if collapsed_text.is_empty() {
                continue;
            }
            let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
            if collapsed_text == " " && (touches_block(prev) || touches_block(tokens.get(i + 1))) {
                continue;
            }

            let len = collapsed_text.chars().count();
            index.nodes.push(TextNodeInfo {
                char_start: char_pos,
                char_end: char_pos + len,
                html_text: html_text.to_string(),
                decoded_text,
                collapsed_text,
            });
            index.byte_offsets.push(range.start);
            char_pos += len;
        }

        debug!(
            nodes = index.nodes.len(),
            chars = char_pos,
            "built text index"
        );
        index
    }

    /// The character stream highlight offsets refer to
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.collapsed_text.as_str())
            .collect()
    }

    pub fn char_len(&self) -> usize {
        self.nodes.last().map(|n| n.char_end).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
