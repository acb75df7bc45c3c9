//! Back-to-front insertion of text into serialized markup.

use tracing::trace;

/// Text to insert at a byte offset.
///
/// Insertions sharing a byte offset are written in ascending `rank` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub byte_pos: usize,
    pub rank: (usize, usize),
    pub text: String,
}

impl Insertion {
    pub fn new(byte_pos: usize, rank: (usize, usize), text: impl Into<String>) -> Self {
        Self {
            byte_pos,
            rank,
            text: text.into(),
        }
    }
}

/// Apply all insertions to `markup`.
///
/// Works from the highest offset down so earlier offsets stay valid, and
/// writes each same-offset batch as one splice. Offsets past the end (or off
/// a char boundary) are pulled back to the nearest valid position.
pub fn apply(markup: &str, mut insertions: Vec<Insertion>) -> String {
    if insertions.is_empty() {
        return markup.to_string();
    }

    for ins in &mut insertions {
        let mut pos = ins.byte_pos.min(markup.len());
        while !markup.is_char_boundary(pos) {
            pos -= 1;
        }
        ins.byte_pos = pos;
    }
    insertions.sort_by(|a, b| b.byte_pos.cmp(&a.byte_pos).then(a.rank.cmp(&b.rank)));

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = markup.to_string();
    out.reserve(extra);

    let mut batch = String::new();
    let mut iter = insertions.into_iter().peekable();
    while let Some(first) = iter.next() {
        let pos = first.byte_pos;
        batch.clear();
        batch.push_str(&first.text);
        while let Some(next) = iter.next_if(|n| n.byte_pos == pos) {
            batch.push_str(&next.text);
        }
        trace!(pos, len = batch.len(), "splicing");
        out.insert_str(pos, &batch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offsets_refer_to_original_markup() {
        let out = apply(
            "abcdef",
            vec![
                Insertion::new(1, (0, 0), "["),
                Insertion::new(4, (0, 1), "]"),
            ],
        );
        assert_eq!(out, "a[bcd]ef");
    }

    #[test]
    fn test_same_offset_follows_rank() {
        let out = apply(
            "ab",
            vec![
                Insertion::new(1, (1, 0), "<open>"),
                Insertion::new(1, (0, 1), "</close>"),
            ],
        );
        assert_eq!(out, "a</close><open>b");
    }

    #[test]
    fn test_past_end_clamps() {
        let out = apply("ab", vec![Insertion::new(40, (0, 1), "!")]);
        assert_eq!(out, "ab!");
    }

    #[test]
    fn test_no_insertions_is_identity() {
        assert_eq!(apply("<p>x</p>", Vec::new()), "<p>x</p>");
    }
}
