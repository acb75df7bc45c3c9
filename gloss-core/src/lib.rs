//! Gloss Core - highlight export pipeline
//!
//! Turns possibly-overlapping character-range highlights over an HTML
//! document into either inline `<span>` markup or nested typesetting macros.
//! Every stage is a pure function over borrowed input:
//!
//! compose regions → detect structural boundaries → split regions → render

pub mod boundary;
pub mod compose;
pub mod export;
pub mod index;
pub mod markers;
pub mod markup;
pub mod model;
pub mod offset;
pub mod palette;
pub mod render;
pub mod splice;
pub mod split;

pub use boundary::detect_boundaries;
pub use compose::compute_regions;
pub use export::{export, AnnotatedDocument, ExportError, ExportTarget, HtmlSpans, LatexNested};
pub use index::TextIndex;
pub use markers::{insert_markers, resolve_markers};
pub use model::{sort_highlights, Comment, Fragment, Highlight, ParagraphMap, Region, TextNodeInfo};
pub use offset::char_to_byte;
pub use palette::{Palette, TagStyle};
pub use render::{render_nested, render_spans, MarkerFormat, SpanOptions};
pub use split::split_at_boundaries;
