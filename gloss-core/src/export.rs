//! End-to-end export: index the markup, decompose the highlights, and hand
//! the boundary-clean regions to one of the output targets.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::boundary::{block_identities, detect_boundaries};
use crate::compose::compute_regions;
use crate::index::TextIndex;
use crate::model::{Fragment, Highlight, ParagraphMap, Region};
use crate::palette::Palette;
use crate::render::annotation::{escape_latex, MarkerFormat};
use crate::render::nested::{preamble, render_nested};
use crate::render::spans::{render_spans, SpanOptions};
use crate::split::split_at_boundaries;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("{highlights} highlight(s) given for a document with no text content")]
    EmptyContent { highlights: usize },
}

/// Everything the output targets need, computed once per export
#[derive(Debug, Clone)]
pub struct AnnotatedDocument<'a> {
    pub markup: &'a str,
    pub highlights: &'a [Highlight],
    pub index: TextIndex,
    /// Block and inline boundaries
    pub boundaries: BTreeSet<usize>,
    /// Character positions where a new block starts (first block excluded)
    pub block_starts: BTreeSet<usize>,
    /// Regions already split at `boundaries`
    pub regions: Vec<Region>,
    pub paragraphs: ParagraphMap,
}

impl<'a> AnnotatedDocument<'a> {
    pub fn prepare(markup: &'a str, highlights: &'a [Highlight]) -> Self {
        let index = TextIndex::build(markup);

        let mut paragraphs = ParagraphMap::new();
        let mut block_starts = BTreeSet::new();
        let identities = block_identities(markup, &index.byte_offsets);
        let mut number = 0u32;
        let mut prev = None;
        for (node, identity) in index.nodes.iter().zip(&identities) {
            if prev != Some(identity) {
                if prev.is_some() {
                    block_starts.insert(node.char_start);
                }
                number += 1;
                paragraphs.insert(node.char_start, number);
            }
            prev = Some(identity);
        }

        let boundaries = detect_boundaries(markup, &index.nodes, &index.byte_offsets);
        let regions = split_at_boundaries(compute_regions(highlights), &boundaries);

        debug!(
            chars = index.char_len(),
            paragraphs = paragraphs.len(),
            regions = regions.len(),
            "prepared document"
        );

        Self {
            markup,
            highlights,
            index,
            boundaries,
            block_starts,
            regions,
            paragraphs,
        }
    }
}

/// An output format for an annotated document
pub trait ExportTarget {
    fn render(&self, doc: &AnnotatedDocument<'_>, palette: &Palette) -> String;
}

/// Flat inline markup: the original markup with `<span>` pairs spliced in
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSpans {
    pub marker_format: MarkerFormat,
}

impl ExportTarget for HtmlSpans {
    fn render(&self, doc: &AnnotatedDocument<'_>, palette: &Palette) -> String {
        let opts = SpanOptions::new(palette)
            .with_paragraphs(&doc.paragraphs)
            .with_marker_format(self.marker_format);
        render_spans(
            doc.markup,
            &doc.regions,
            &doc.index.nodes,
            &doc.index.byte_offsets,
            doc.highlights,
            &opts,
        )
    }
}

/// Nested typesetting macros over the escaped character stream
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexNested {
    /// Wrap the body in a compilable document with preamble
    pub standalone: bool,
}

impl LatexNested {
    /// Cut the character stream into escaped fragments.
    ///
    /// Each region becomes one fragment, gaps become plain fragments, and a
    /// blank line separates blocks. Regions that lie entirely past the end
    /// of the text are clamped to empty fragments at the end so their
    /// markers survive.
    pub fn fragments(doc: &AnnotatedDocument<'_>) -> Vec<Fragment> {
        let chars: Vec<char> = doc.index.text().chars().collect();
        let len = chars.len();
        let clamp = |r: &Region| (r.start.min(len), r.end.min(len));

        let mut cuts: BTreeSet<usize> = doc
            .block_starts
            .iter()
            .copied()
            .filter(|&p| p < len)
            .collect();
        cuts.insert(0);
        cuts.insert(len);
        for region in &doc.regions {
            let (start, end) = clamp(region);
            cuts.insert(start);
            cuts.insert(end);
        }
        let cuts: Vec<usize> = cuts.into_iter().collect();

        let mut fragments = Vec::with_capacity(cuts.len() * 2);
        let mut regions = doc.regions.iter().peekable();

        for window in cuts.windows(2) {
            let (a, b) = (window[0], window[1]);
            if a > 0 && doc.block_starts.contains(&a) {
                fragments.push(Fragment::plain("\n\n"));
            }
            while regions.next_if(|r| clamp(*r).1 <= a).is_some() {}

            let text = escape_latex(&chars[a..b].iter().collect::<String>());
            match regions.peek() {
                Some(&r) if clamp(r).0 <= a && b <= clamp(r).1 => {
                    let annots = if b == clamp(r).1 { r.annots.clone() } else { Vec::new() };
                    fragments.push(Fragment {
                        text,
                        active: r.active.clone(),
                        annots,
                    });
                }
                _ => fragments.push(Fragment::plain(text)),
            }
        }

        for region in &doc.regions {
            let (start, end) = clamp(region);
            if start == end && !region.annots.is_empty() {
                fragments.push(Fragment {
                    text: String::new(),
                    active: region.active.clone(),
                    annots: region.annots.clone(),
                });
            }
        }
        fragments
    }
}

impl ExportTarget for LatexNested {
    fn render(&self, doc: &AnnotatedDocument<'_>, palette: &Palette) -> String {
        let fragments = Self::fragments(doc);
        let body = render_nested(&fragments, doc.highlights, palette, Some(&doc.paragraphs));
        if !self.standalone {
            return body;
        }
        format!(
            "\\documentclass{{article}}\n{}\\begin{{document}}\n{}\n\\end{{document}}\n",
            preamble(palette, doc.highlights),
            body
        )
    }
}

/// Run the whole pipeline for one document.
///
/// Highlights over a document with no text at all cannot be anchored
/// anywhere and are rejected; every other degenerate input degrades
/// silently.
pub fn export(
    markup: &str,
    highlights: &[Highlight],
    palette: &Palette,
    target: &dyn ExportTarget,
) -> Result<String, ExportError> {
    let doc = AnnotatedDocument::prepare(markup, highlights);
    if !highlights.is_empty() && doc.index.char_len() == 0 {
        return Err(ExportError::EmptyContent {
            highlights: highlights.len(),
        });
    }

    let out = target.render(&doc, palette);
    info!(
        highlights = highlights.len(),
        regions = doc.regions.len(),
        bytes = out.len(),
        "exported document"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_content_is_rejected() {
        let highlights = [Highlight::new(0, 3, "a")];
        let err = export("<p></p>", &highlights, &Palette::new(), &HtmlSpans::default()).unwrap_err();
        assert_eq!(err, ExportError::EmptyContent { highlights: 1 });
    }

    #[test]
    fn test_empty_content_without_highlights_is_fine() {
        let out = export("", &[], &Palette::new(), &LatexNested::default()).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_paragraph_numbers_follow_blocks() {
        let doc = AnnotatedDocument::prepare("<p>one</p><p>two</p><ul><li>three</li></ul>", &[]);
        assert_eq!(doc.paragraphs.lookup(0), Some(1));
        assert_eq!(doc.paragraphs.lookup(4), Some(2));
        assert_eq!(doc.paragraphs.lookup(7), Some(3));
        assert_eq!(doc.block_starts, BTreeSet::from([3, 6]));
    }

    #[test]
    fn test_latex_fragments_escape_and_separate_blocks() {
        let highlights = [Highlight::new(1, 5, "a")];
        let doc = AnnotatedDocument::prepare("<p>a&amp;b</p><p>c_d</p>", &highlights);
        let fragments = LatexNested::fragments(&doc);

        assert_eq!(
            fragments,
            vec![
                Fragment::plain("a"),
                Fragment::highlighted("\\&b", [0]),
                Fragment::plain("\n\n"),
                Fragment::highlighted("c\\_", [0]).with_annots([0]),
                Fragment::plain("d"),
            ]
        );
    }

    #[test]
    fn test_region_past_end_keeps_marker() {
        let highlights = [Highlight::new(10, 12, "a")];
        let doc = AnnotatedDocument::prepare("<p>abc</p>", &highlights);
        let fragments = LatexNested::fragments(&doc);

        let last = fragments.last().unwrap();
        assert_eq!(last.text, "");
        assert_eq!(last.annots, vec![0]);
    }

    #[test]
    fn test_standalone_document() {
        let highlights = [Highlight::new(0, 1, "a")];
        let out = export(
            "<p>x</p>",
            &highlights,
            &Palette::new(),
            &LatexNested { standalone: true },
        )
        .unwrap();

        assert!(out.starts_with("\\documentclass{article}\n\\usepackage{xcolor}\n"));
        assert!(out.contains("\\definecolor{tag-a}{HTML}{"));
        assert!(out.ends_with("\n\\end{document}\n"));
    }
}
