use std::collections::BTreeSet;

use tracing::trace;

use crate::model::Region;

/// Cut every region at the structural boundaries strictly inside it.
///
/// Pieces share the original active set; only the last piece keeps the
/// annotation markers.
pub fn split_at_boundaries(regions: Vec<Region>, boundaries: &BTreeSet<usize>) -> Vec<Region> {
    let mut out = Vec::with_capacity(regions.len());

    for region in regions {
        if region.end <= region.start.saturating_add(1) {
            out.push(region);
            continue;
        }
        let cuts: Vec<usize> = boundaries
            .range(region.start.saturating_add(1)..region.end)
            .copied()
            .collect();
        if cuts.is_empty() {
            out.push(region);
            continue;
        }

        trace!(
            start = region.start,
            end = region.end,
            pieces = cuts.len() + 1,
            "splitting region"
        );

        let mut piece_start = region.start;
        for cut in cuts {
            out.push(Region::new(piece_start, cut, region.active.clone()));
            piece_start = cut;
        }
        out.push(Region {
            start: piece_start,
            end: region.end,
            active: region.active,
            annots: region.annots,
        });
    }
    out
}
