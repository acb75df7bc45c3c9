//! Event sweep turning overlapping highlights into non-overlapping regions.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::model::{Highlight, Region};

/// Start sorts before end so touching highlights leave no zero-width gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Start,
    End,
}

/// Decompose highlights into the minimal ordered sequence of regions.
///
/// Each region carries the indices of every highlight active over it. After
/// the sweep, each highlight's annotation marker is anchored on the last
/// region that contains it.
pub fn compute_regions(highlights: &[Highlight]) -> Vec<Region> {
    if highlights.is_empty() {
        return Vec::new();
    }

    let mut events: Vec<(usize, EventKind, usize)> = Vec::with_capacity(highlights.len() * 2);
    for (idx, hl) in highlights.iter().enumerate() {
        if !hl.is_well_formed() {
            trace!(idx, start = hl.start_char, end = hl.end(), "skipping empty highlight");
            continue;
        }
        events.push((hl.start_char, EventKind::Start, idx));
        events.push((hl.end(), EventKind::End, idx));
    }
    events.sort_unstable();

    let mut regions = Vec::new();
    let mut active: BTreeSet<usize> = BTreeSet::new();
    let mut prev_pos = 0usize;

    for (pos, kind, idx) in events {
        if pos > prev_pos && !active.is_empty() {
            regions.push(Region::new(prev_pos, pos, active.clone()));
        }
        match kind {
            EventKind::Start => {
                active.insert(idx);
            }
            EventKind::End => {
                active.remove(&idx);
            }
        }
        prev_pos = pos;
    }

    for idx in 0..highlights.len() {
        if let Some(owner) = regions.iter_mut().rev().find(|r| r.active.contains(&idx)) {
            owner.annots.push(idx);
        }
    }

    debug!(
        highlights = highlights.len(),
        regions = regions.len(),
        "computed regions"
    );
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(regions: &[Region]) -> Vec<(usize, usize, Vec<usize>)> {
        regions
            .iter()
            .map(|r| (r.start, r.end, r.active.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_regions(&[]).is_empty());
    }

    #[test]
    fn test_interleaved_highlights() {
        let regions = compute_regions(&[Highlight::new(1, 4, "a"), Highlight::new(2, 6, "b")]);

        assert_eq!(
            spans(&regions),
            vec![(1, 2, vec![0]), (2, 4, vec![0, 1]), (4, 6, vec![1])]
        );
        assert_eq!(regions[1].annots, vec![0]);
        assert_eq!(regions[2].annots, vec![1]);
        assert!(regions[0].annots.is_empty());
    }

    #[test]
    fn test_touching_highlights_leave_no_gap() {
        let regions = compute_regions(&[Highlight::new(0, 3, "a"), Highlight::new(3, 5, "b")]);
        assert_eq!(spans(&regions), vec![(0, 3, vec![0]), (3, 5, vec![1])]);
    }

    #[test]
    fn test_disjoint_highlights_leave_gap_unmaterialized() {
        let regions = compute_regions(&[Highlight::new(0, 2, "a"), Highlight::new(5, 7, "b")]);
        assert_eq!(spans(&regions), vec![(0, 2, vec![0]), (5, 7, vec![1])]);
    }

    #[test]
    fn test_nested_highlight_marker_on_last_region() {
        let regions = compute_regions(&[Highlight::new(0, 10, "outer"), Highlight::new(3, 5, "inner")]);

        assert_eq!(
            spans(&regions),
            vec![(0, 3, vec![0]), (3, 5, vec![0, 1]), (5, 10, vec![0])]
        );
        assert_eq!(regions[1].annots, vec![1]);
        assert_eq!(regions[2].annots, vec![0]);
    }

    #[test]
    fn test_malformed_ranges_contribute_nothing() {
        let regions = compute_regions(&[Highlight::new(6, 2, "bad"), Highlight::new(4, 4, "empty")]);
        assert!(regions.is_empty());
    }

    #[test]
    fn test_open_ended_highlight_at_max_start() {
        let hl = Highlight {
            start_char: usize::MAX,
            end_char: None,
            tag: "a".to_string(),
            ..Highlight::default()
        };
        let regions = compute_regions(&[hl, Highlight::new(0, 2, "b")]);
        assert_eq!(spans(&regions), vec![(0, 2, vec![1])]);
    }

    #[test]
    fn test_identical_ranges_share_one_region() {
        let regions = compute_regions(&[Highlight::new(2, 4, "a"), Highlight::new(2, 4, "b")]);
        assert_eq!(spans(&regions), vec![(2, 4, vec![0, 1])]);
        assert_eq!(regions[0].annots, vec![0, 1]);
    }
}
