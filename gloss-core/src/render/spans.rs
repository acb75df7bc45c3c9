//! Flat inline-markup target: paired `<span>` tags spliced into the markup.

use html_escape::encode_double_quoted_attribute;
use tracing::{debug, trace};

use crate::model::{Highlight, ParagraphMap, Region, TextNodeInfo};
use crate::offset::char_to_byte;
use crate::palette::{color_name, Palette};
use crate::render::annotation::MarkerFormat;
use crate::splice::{self, Insertion};

pub const CLOSE_TAG: &str = "</span>";

/// Read-only lookups the span renderer formats with
#[derive(Debug, Clone, Copy)]
pub struct SpanOptions<'a> {
    pub palette: &'a Palette,
    pub paragraphs: Option<&'a ParagraphMap>,
    pub marker_format: MarkerFormat,
}

impl<'a> SpanOptions<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        Self {
            palette,
            paragraphs: None,
            marker_format: MarkerFormat::default(),
        }
    }

    pub fn with_paragraphs(mut self, paragraphs: &'a ParagraphMap) -> Self {
        self.paragraphs = Some(paragraphs);
        self
    }

    pub fn with_marker_format(mut self, marker_format: MarkerFormat) -> Self {
        self.marker_format = marker_format;
        self
    }
}

fn join<I: IntoIterator<Item = String>>(items: I) -> String {
    items.into_iter().collect::<Vec<_>>().join(",")
}

/// Opening tag for one region
pub fn open_tag(region: &Region, highlights: &[Highlight], opts: &SpanOptions<'_>) -> String {
    let indices = join(region.active.iter().map(|i| i.to_string()));
    let colors = join(region.active.iter().map(|&i| {
        highlights
            .get(i)
            .map(|h| color_name(&h.tag))
            .unwrap_or_else(|| color_name(""))
    }));

    let mut tag = format!("<span class=\"hl\" data-hl=\"{indices}\" data-colors=\"{colors}\"");

    if !region.annots.is_empty() {
        let payload: String = region
            .annots
            .iter()
            .filter_map(|&i| {
                let hl = highlights.get(i)?;
                let paragraph = opts.paragraphs.and_then(|p| p.lookup(hl.start_char));
                Some(opts.marker_format.format(i, hl, opts.palette, paragraph))
            })
            .collect();
        tag.push_str(&format!(
            " data-annots=\"{}\"",
            encode_double_quoted_attribute(&payload)
        ));
    }

    tag.push('>');
    tag
}

/// Insert one `<span>` pair per region into `markup`.
///
/// Gaps between regions are left untouched. Where a closing and an opening
/// tag meet at one byte offset the result reads `</span><span …>`.
pub fn render_spans(
    markup: &str,
    regions: &[Region],
    text_nodes: &[TextNodeInfo],
    byte_offsets: &[usize],
    highlights: &[Highlight],
    opts: &SpanOptions<'_>,
) -> String {
    if highlights.is_empty() || regions.is_empty() || text_nodes.is_empty() {
        return markup.to_string();
    }

    let mut insertions = Vec::with_capacity(regions.len() * 2);
    for (n, region) in regions.iter().enumerate() {
        let (Some(open_at), Some(close_at)) = (
            char_to_byte(region.start, text_nodes, byte_offsets, false),
            char_to_byte(region.end, text_nodes, byte_offsets, true),
        ) else {
            continue;
        };
        trace!(region = n, open_at, close_at, "placing span");
        insertions.push(Insertion::new(open_at, (n, 0), open_tag(region, highlights, opts)));
        insertions.push(Insertion::new(close_at, (n, 1), CLOSE_TAG));
    }

    debug!(spans = insertions.len() / 2, "rendering flat spans");
    splice::apply(markup, insertions)
}
