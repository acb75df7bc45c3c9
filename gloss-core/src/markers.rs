//! Placeholder markers for pipelines with an external conversion step.
//!
//! Highlights are first marked up with plain-text tokens that survive a
//! markup-to-macro converter, then the converted text is read back into
//! fragments for the nested renderer:
//!
//! - `HLSTART{n}ENDHL` where highlight `n` starts
//! - `HLEND{n}ENDHL` where it ends, followed by `ANNMARKER{n}ENDMARKER`

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::model::{Fragment, Highlight, TextNodeInfo};
use crate::offset::char_to_byte;
use crate::splice::{self, Insertion};

/// Braces may come back escaped from the converter
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"HLSTART\\?\{(\d+)\\?\}ENDHL|HLEND\\?\{(\d+)\\?\}ENDHL|ANNMARKER\\?\{(\d+)\\?\}ENDMARKER",
    )
    .expect("valid marker regex")
});

pub fn start_marker(index: usize) -> String {
    format!("HLSTART{{{index}}}ENDHL")
}

pub fn end_marker(index: usize) -> String {
    format!("HLEND{{{index}}}ENDHL")
}

pub fn annot_marker(index: usize) -> String {
    format!("ANNMARKER{{{index}}}ENDMARKER")
}

/// True if `text` still holds any complete placeholder
pub fn contains_markers(text: &str) -> bool {
    MARKER.is_match(text)
}

/// Insert start/end/annotation placeholders for every highlight.
///
/// Uses the same offset contract as the span renderer; at a shared byte
/// offset all end markers precede all start markers.
pub fn insert_markers(
    markup: &str,
    highlights: &[Highlight],
    text_nodes: &[TextNodeInfo],
    byte_offsets: &[usize],
) -> String {
    if highlights.is_empty() || text_nodes.is_empty() {
        return markup.to_string();
    }

    let mut insertions = Vec::with_capacity(highlights.len() * 2);
    for (idx, hl) in highlights.iter().enumerate() {
        if !hl.is_well_formed() {
            continue;
        }
        let (Some(start), Some(end)) = (
            char_to_byte(hl.start_char, text_nodes, byte_offsets, false),
            char_to_byte(hl.end(), text_nodes, byte_offsets, true),
        ) else {
            continue;
        };
        trace!(idx, start, end, "placing markers");
        let closing = format!("{}{}", end_marker(idx), annot_marker(idx));
        if start >= end {
            // Clamped to a single spot: keep the markers balanced
            insertions.push(Insertion::new(
                start,
                (0, idx),
                format!("{}{closing}", start_marker(idx)),
            ));
            continue;
        }
        insertions.push(Insertion::new(start, (1, idx), start_marker(idx)));
        insertions.push(Insertion::new(end, (0, idx), closing));
    }

    splice::apply(markup, insertions)
}

fn push_text(fragments: &mut Vec<Fragment>, text: &str, active: &BTreeSet<usize>) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = fragments.last_mut() {
        if last.active == *active && last.annots.is_empty() {
            last.text.push_str(text);
            return;
        }
    }
    fragments.push(Fragment {
        text: text.to_string(),
        active: active.clone(),
        annots: Vec::new(),
    });
}

/// Read marker-bearing text back into fragments.
///
/// Every placeholder is consumed; an end marker for a highlight that is not
/// active is dropped.
pub fn resolve_markers(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut active = BTreeSet::new();
    let mut last = 0usize;

    for caps in MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut fragments, &text[last..whole.start()], &active);
        last = whole.end();

        let index = |group: usize| caps.get(group).and_then(|m| m.as_str().parse::<usize>().ok());
        if let Some(n) = index(1) {
            active.insert(n);
        } else if let Some(n) = index(2) {
            active.remove(&n);
        } else if let Some(n) = index(3) {
            match fragments.last_mut() {
                Some(frag) => frag.annots.push(n),
                None => fragments.push(Fragment::default().with_annots([n])),
            }
        }
    }
    push_text(&mut fragments, &text[last..], &active);

    debug!(fragments = fragments.len(), "resolved markers");
    fragments
}
