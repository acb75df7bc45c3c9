//! Character offset to serialized byte offset mapping.

use crate::index::{units, Collapser};
use crate::model::TextNodeInfo;

/// Byte offset within `html_text` of the character at `collapsed_offset` in
/// its collapsed form.
///
/// Entity references count as the characters they decode to and whitespace
/// runs count once, so the result always lands on a unit boundary: never
/// inside an entity, and past any whitespace that collapsed away.
pub fn collapsed_to_raw(html_text: &str, collapsed_offset: usize) -> usize {
    let mut collapser = Collapser::default();
    let mut count = 0usize;

    for unit in units(html_text) {
        for ch in unit.decoded.chars() {
            if collapser.feed(ch).is_none() {
                continue;
            }
            if count == collapsed_offset {
                return unit.byte;
            }
            count += 1;
        }
    }
    html_text.len()
}

/// Map a character-stream position to a byte offset in the serialized markup.
///
/// At a shared boundary between two nodes, a region end resolves to the end
/// of the earlier node so closing tags hug the last highlighted character;
/// everything else resolves to the start of the later node. Positions at or
/// past the end of the text resolve to the end of the last node. Returns
/// `None` only when there are no text nodes at all.
pub fn char_to_byte(
    char_idx: usize,
    text_nodes: &[TextNodeInfo],
    byte_offsets: &[usize],
    is_region_end: bool,
) -> Option<usize> {
    let last = text_nodes.len().checked_sub(1)?;
    let node_end = |i: usize| -> Option<usize> {
        Some(byte_offsets.get(i)? + text_nodes[i].html_text.len())
    };

    let i = text_nodes.partition_point(|n| n.char_end <= char_idx);
    if let Some(node) = text_nodes.get(i) {
        if node.char_start < char_idx {
            let in_node = collapsed_to_raw(&node.html_text, char_idx - node.char_start);
            return Some(byte_offsets.get(i)? + in_node);
        }
        if node.char_start == char_idx {
            if is_region_end && i > 0 {
                return node_end(i - 1);
            }
            return byte_offsets.get(i).copied();
        }
    }

    node_end(last)
}
