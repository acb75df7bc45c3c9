//! Nested typesetting-macro target.
//!
//! Every highlighted fragment gets two independent nestings: fill wrappers
//! (`\highLight`), one per active highlight, and underline wrappers
//! (`\underLine`) whose shape depends on how many highlights overlap.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{Fragment, Highlight, ParagraphMap};
use crate::palette::{color_name, dark_color, light_color, Palette, MANY_DARK, MANY_DARK_HEX};
use crate::render::annotation::latex_annot;

/// Paragraph and list-item separators that a wrapper must never span
static STRUCTURAL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\par\b|\\item\b(?:\[[^\]]*\])?|\n[ \t]*\n\s*").expect("valid structural token regex")
});

fn underline(color: &str, weight: u8, body: &str) -> String {
    format!("\\underLine[color={color}, height={weight}pt, bottom=-3pt]{{{body}}}")
}

/// Underline nesting for the given tags, in ascending highlight order
fn underline_wrap(text: &str, tags: &[&str]) -> String {
    match tags {
        [] => text.to_string(),
        [only] => underline(&dark_color(only), 1, text),
        [outer, inner] => underline(&dark_color(outer), 2, &underline(&dark_color(inner), 1, text)),
        _ => underline(MANY_DARK, 4, text),
    }
}

/// Fill wrappers outside, underline wrappers inside
fn wrap_segment(text: &str, tags: &[&str]) -> String {
    let mut body = underline_wrap(text, tags);
    for tag in tags.iter().rev() {
        body = format!("\\highLight[{}]{{{}}}", light_color(tag), body);
    }
    body
}

/// Wrap `text`, closing and reopening around every structural token
fn wrap_text(text: &str, tags: &[&str]) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0usize;

    let push_segment = |out: &mut String, segment: &str| {
        if segment.trim().is_empty() {
            out.push_str(segment);
        } else {
            out.push_str(&wrap_segment(segment, tags));
        }
    };

    for token in STRUCTURAL_TOKEN.find_iter(text) {
        push_segment(&mut out, &text[last..token.start()]);
        out.push_str(token.as_str());
        last = token.end();
    }
    push_segment(&mut out, &text[last..]);
    out
}

/// Render fragments as nested macro source.
///
/// Fragments with no active highlight pass through unchanged. After each
/// fragment, one `\annot` margin note is emitted per owned highlight.
pub fn render_nested(
    fragments: &[Fragment],
    highlights: &[Highlight],
    palette: &Palette,
    paragraphs: Option<&ParagraphMap>,
) -> String {
    let mut out = String::new();

    for frag in fragments {
        if frag.active.is_empty() {
            out.push_str(&frag.text);
        } else {
            let tags: Vec<&str> = frag
                .active
                .iter()
                .map(|&i| highlights.get(i).map(|h| h.tag.as_str()).unwrap_or(""))
                .collect();
            out.push_str(&wrap_text(&frag.text, &tags));
        }

        for &i in &frag.annots {
            let Some(hl) = highlights.get(i) else {
                continue;
            };
            let paragraph = paragraphs.and_then(|p| p.lookup(hl.start_char));
            out.push_str(&latex_annot(hl, palette, paragraph));
        }
    }

    debug!(fragments = fragments.len(), "rendered nested macros");
    out
}

/// `\definecolor`/`\colorlet` lines for every tag in use, plus the shared
/// many-tags underline color
pub fn color_definitions(palette: &Palette, highlights: &[Highlight]) -> String {
    let tags: BTreeSet<&str> = highlights.iter().map(|h| h.tag.as_str()).collect();

    let mut out = String::new();
    for tag in tags {
        let name = color_name(tag);
        let hex = palette.color_hex(tag);
        out.push_str(&format!(
            "\\definecolor{{{name}}}{{HTML}}{{{}}}\n",
            hex.trim_start_matches('#').to_ascii_uppercase()
        ));
        out.push_str(&format!("\\colorlet{{{}}}{{{name}!30}}\n", light_color(tag)));
        out.push_str(&format!("\\colorlet{{{}}}{{{name}!70!black}}\n", dark_color(tag)));
    }
    out.push_str(&format!("\\definecolor{{{MANY_DARK}}}{{HTML}}{{{MANY_DARK_HEX}}}\n"));
    out
}

/// Package imports, the `\annot` command and color definitions for a
/// standalone document
pub fn preamble(palette: &Palette, highlights: &[Highlight]) -> String {
    let mut out = String::from(
        "\\usepackage{xcolor}\n\
         \\usepackage{luacolor}\n\
         \\usepackage{lua-ul}\n\
         \\usepackage{marginnote}\n\
         \\newcommand{\\annot}[2]{\\marginnote{\\color{#1}\\footnotesize #2}}\n",
    );
    out.push_str(&color_definitions(palette, highlights));
    out
}
