//! Annotation marker payloads: margin-note macros and HTML cards.

use chrono::{DateTime, NaiveDateTime};
use html_escape::encode_text;
use serde::{Deserialize, Serialize};

use crate::model::{Comment, Highlight};
use crate::palette::{dark_color, Palette};

/// Style of the pre-rendered annotation payload
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkerFormat {
    #[default]
    Html,
    Latex,
}

impl MarkerFormat {
    /// One formatted block for the highlight at `index`
    pub fn format(
        &self,
        index: usize,
        highlight: &Highlight,
        palette: &Palette,
        paragraph: Option<u32>,
    ) -> String {
        match self {
            MarkerFormat::Html => html_card(index, highlight, palette, paragraph),
            MarkerFormat::Latex => latex_annot(highlight, palette, paragraph),
        }
    }
}

/// Escape text for LaTeX body context
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a timestamp as `18 Oct 2026 14:30`; unparseable input is returned as-is
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%d %b %Y %H:%M";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY).to_string();
    }
    raw.to_string()
}

/// "Author, 18 Oct 2026 14:30", skipping whichever part is missing
fn byline(author: &str, created_at: Option<&str>) -> String {
    let mut parts = Vec::new();
    if !author.is_empty() {
        parts.push(author.to_string());
    }
    if let Some(ts) = created_at.filter(|ts| !ts.is_empty()) {
        parts.push(format_timestamp(ts));
    }
    parts.join(", ")
}

fn comment_attribution(comment: &Comment) -> String {
    let line = byline(&comment.author, comment.created_at.as_deref());
    if line.is_empty() {
        "Comment".to_string()
    } else {
        line
    }
}

/// `\annot{color}{content}` margin note for one highlight
pub fn latex_annot(highlight: &Highlight, palette: &Palette, paragraph: Option<u32>) -> String {
    let mut content = format!(
        "\\textbf{{{}}}",
        escape_latex(&palette.display_name(&highlight.tag))
    );
    if let Some(p) = paragraph {
        content.push_str(&format!(" [{p}]"));
    }

    let by = byline(&highlight.author, highlight.created_at.as_deref());
    if !by.is_empty() {
        content.push_str(&format!("\\par{{\\scriptsize {}}}", escape_latex(&by)));
    }

    for comment in &highlight.comments {
        content.push_str(&format!(
            "\\par{{\\scriptsize\\textbf{{{}:}}}} {}",
            escape_latex(&comment_attribution(comment)),
            escape_latex(&comment.text)
        ));
    }

    format!("\\annot{{{}}}{{{}}}", dark_color(&highlight.tag), content)
}

/// `<div class="annot">` card for one highlight
pub fn html_card(
    index: usize,
    highlight: &Highlight,
    palette: &Palette,
    paragraph: Option<u32>,
) -> String {
    let mut card = format!(
        "<div class=\"annot\" data-hl=\"{index}\"><strong>{}</strong>",
        encode_text(&palette.display_name(&highlight.tag))
    );
    if let Some(p) = paragraph {
        card.push_str(&format!(" <span class=\"para\">[{p}]</span>"));
    }

    let by = byline(&highlight.author, highlight.created_at.as_deref());
    if !by.is_empty() {
        card.push_str(&format!("<span class=\"byline\">{}</span>", encode_text(&by)));
    }

    if !highlight.comments.is_empty() {
        card.push_str("<ul class=\"comments\">");
        for comment in &highlight.comments {
            card.push_str(&format!(
                "<li><strong>{}</strong>: {}</li>",
                encode_text(&comment_attribution(comment)),
                encode_text(&comment.text)
            ));
        }
        card.push_str("</ul>");
    }

    card.push_str("</div>");
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("50% & $5", "50\\% \\& \\$5")]
    #[case("a_b {c}", "a\\_b \\{c\\}")]
    #[case("~^\\", "\\textasciitilde{}\\textasciicircum{}\\textbackslash{}")]
    #[case("plain text", "plain text")]
    fn test_escape_latex(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_latex(input), expected);
    }

    #[rstest]
    #[case("2026-10-18T14:30:00Z", "18 Oct 2026 14:30")]
    #[case("2026-10-18T14:30:00.123456", "18 Oct 2026 14:30")]
    #[case("yesterday", "yesterday")]
    fn test_format_timestamp(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(format_timestamp(raw), expected);
    }

    fn sample() -> Highlight {
        let mut hl = Highlight::new(0, 4, "legal-issue")
            .with_author("Ada")
            .with_comment("Bob", "Check s 5 & s 6");
        hl.created_at = Some("2026-10-18T14:30:00Z".to_string());
        hl
    }

    #[test]
    fn test_latex_annot() {
        let out = latex_annot(&sample(), &Palette::new(), Some(3));
        assert_eq!(
            out,
            "\\annot{tag-legal-issue-dark}{\\textbf{Legal Issue} [3]\
             \\par{\\scriptsize Ada, 18 Oct 2026 14:30}\
             \\par{\\scriptsize\\textbf{Bob:}} Check s 5 \\& s 6}"
        );
    }

    #[test]
    fn test_html_card_escapes_text() {
        let out = html_card(2, &sample(), &Palette::new(), None);
        assert!(out.starts_with("<div class=\"annot\" data-hl=\"2\"><strong>Legal Issue</strong>"));
        assert!(out.contains("<li><strong>Bob</strong>: Check s 5 &amp; s 6</li>"));
        assert!(!out.contains("class=\"para\""));
    }
}
