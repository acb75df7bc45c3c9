//! Structural boundary detection.
//!
//! A character position is a boundary when the text node starting there sits
//! in a different block element, or under a different set of open inline
//! formatting elements, than the node before it. Generated markup must never
//! straddle such a position.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::markup::{is_block, is_inline, scan_tags, Tag, TagKind};
use crate::model::TextNodeInfo;

/// Nearest enclosing block: element name and byte offset of its opening tag
pub type BlockIdentity = Option<(String, usize)>;

/// Tags that end at or before `byte`
fn tags_before(tags: &[Tag], byte: usize) -> &[Tag] {
    let upto = tags.partition_point(|t| t.end <= byte);
    &tags[..upto]
}

fn nearest_block(preceding: &[Tag]) -> BlockIdentity {
    let mut depth = 0usize;
    for tag in preceding.iter().rev() {
        if !is_block(&tag.name) {
            continue;
        }
        match tag.kind {
            TagKind::Close => depth += 1,
            TagKind::Open if depth == 0 => return Some((tag.name.clone(), tag.start)),
            TagKind::Open => depth -= 1,
            TagKind::SelfClosing => {}
        }
    }
    None
}

/// Open inline formatting elements, outermost first
fn open_inlines(preceding: &[Tag]) -> Vec<String> {
    let mut closed: HashMap<&str, usize> = HashMap::new();
    let mut open = Vec::new();

    for tag in preceding.iter().rev() {
        if is_block(&tag.name) {
            break;
        }
        if !is_inline(&tag.name) {
            continue;
        }
        match tag.kind {
            TagKind::Close => *closed.entry(tag.name.as_str()).or_default() += 1,
            TagKind::Open => {
                let pending = closed.entry(tag.name.as_str()).or_default();
                if *pending > 0 {
                    *pending -= 1;
                } else {
                    open.push(tag.name.clone());
                }
            }
            TagKind::SelfClosing => {}
        }
    }

    open.reverse();
    open
}

/// Block identity of each text node, parallel to `byte_offsets`
pub fn block_identities(markup: &str, byte_offsets: &[usize]) -> Vec<BlockIdentity> {
    let tags = scan_tags(markup);
    byte_offsets
        .iter()
        .map(|&b| nearest_block(tags_before(&tags, b)))
        .collect()
}

/// Positions where consecutive entries of `keys` differ
fn changes<T: PartialEq>(nodes: &[TextNodeInfo], keys: &[T]) -> BTreeSet<usize> {
    nodes
        .iter()
        .zip(keys)
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|pair| pair[0].1 != pair[1].1)
        .map(|pair| pair[1].0.char_start)
        .collect()
}

/// Boundaries where the nearest block-level ancestor changes
pub fn block_boundaries(
    markup: &str,
    text_nodes: &[TextNodeInfo],
    byte_offsets: &[usize],
) -> BTreeSet<usize> {
    if text_nodes.len() <= 1 {
        return BTreeSet::new();
    }
    changes(text_nodes, &block_identities(markup, byte_offsets))
}

/// Boundaries where the set of open inline formatting elements changes
pub fn inline_boundaries(
    markup: &str,
    text_nodes: &[TextNodeInfo],
    byte_offsets: &[usize],
) -> BTreeSet<usize> {
    if text_nodes.len() <= 1 {
        return BTreeSet::new();
    }
    let tags = scan_tags(markup);
    let stacks: Vec<Vec<String>> = byte_offsets
        .iter()
        .map(|&b| open_inlines(tags_before(&tags, b)))
        .collect();
    changes(text_nodes, &stacks)
}

/// Union of block and inline boundaries, as character positions
pub fn detect_boundaries(
    markup: &str,
    text_nodes: &[TextNodeInfo],
    byte_offsets: &[usize],
) -> BTreeSet<usize> {
    let mut boundaries = block_boundaries(markup, text_nodes, byte_offsets);
    boundaries.extend(inline_boundaries(markup, text_nodes, byte_offsets));
    debug!(count = boundaries.len(), "detected structural boundaries");
    boundaries
}
