//! Quote-aware tokenizer for serialized HTML.
//!
//! Only as much HTML as the pipeline needs: start/end/self-closing tags with
//! their byte spans, and the text runs between them. Comments, doctypes and
//! processing instructions are skipped, and the content of raw-text elements
//! (`script`, `style`) never produces text.

use std::ops::Range;

use memchr::{memchr, memmem};

/* =============================== Vocabularies ============================ */

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hgroup", "html", "li", "main", "nav", "ol", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Block-level element names (lower-case)
pub fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Inline formatting element names (lower-case)
pub fn is_inline(name: &str) -> bool {
    INLINE_TAGS.contains(&name)
}

pub fn is_void(name: &str) -> bool {
    VOID_TAGS.contains(&name)
}

fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_TAGS.contains(&name)
}

/* ================================= Tokens ================================ */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    /// Explicit `<x/>` or a void element
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lower-cased element name
    pub name: String,
    pub kind: TagKind,
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Tag(Tag),
    /// Byte range of a literal text run
    Text(Range<usize>),
}

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

#[inline]
fn is_ws(b: u8) -> bool {
    b.is_ascii_whitespace()
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    i += 1;
    let mut quote: u8 = 0;
    while i < s.len() {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Parse the tag occupying `s[start..=gt]`
fn parse_tag(s: &[u8], start: usize, gt: usize) -> Tag {
    let mut i = start + 1;
    let is_end = s[i] == b'/';
    if is_end {
        i += 1;
    }
    let name_start = i;
    while i < gt && is_name_char(s[i]) {
        i += 1;
    }
    let name = String::from_utf8_lossy(&s[name_start..i]).to_ascii_lowercase();

    let mut j = gt;
    while j > start && is_ws(s[j - 1]) {
        j -= 1;
    }
    let slash_closed = j > name_start && s[j - 1] == b'/';

    let kind = if is_end {
        TagKind::Close
    } else if slash_closed || is_void(&name) {
        TagKind::SelfClosing
    } else {
        TagKind::Open
    };

    Tag {
        name,
        kind,
        start,
        end: gt + 1,
    }
}

/// Read the markup construct starting at `lt` (s[lt] == '<').
///
/// Returns the byte offset to resume from and the tag, if the construct was
/// one. `None` means the '<' is literal text.
fn read_construct(s: &[u8], lt: usize) -> Option<(usize, Option<Tag>)> {
    let rest = &s[lt..];
    if rest.starts_with(b"<!--") {
        let end = memmem::find(&rest[4..], b"-->")
            .map(|p| lt + 4 + p + 3)
            .unwrap_or(s.len());
        return Some((end, None));
    }

    match rest.get(1).copied() {
        Some(b'!') | Some(b'?') => {
            let end = find_tag_end(s, lt).map(|gt| gt + 1).unwrap_or(s.len());
            Some((end, None))
        }
        Some(b'/') if rest.get(2).is_some_and(|b| b.is_ascii_alphabetic()) => {
            let gt = find_tag_end(s, lt)?;
            Some((gt + 1, Some(parse_tag(s, lt, gt))))
        }
        Some(b) if b.is_ascii_alphabetic() => {
            let gt = find_tag_end(s, lt)?;
            Some((gt + 1, Some(parse_tag(s, lt, gt))))
        }
        _ => None,
    }
}

/// Offset of the `</name` that ends a raw-text element opened before `from`
fn find_raw_text_end(s: &[u8], from: usize, name: &str) -> usize {
    let name = name.as_bytes();
    let mut i = from;
    while let Some(off) = memchr(b'<', &s[i..]) {
        let lt = i + off;
        let candidate = &s[lt + 1..];
        if candidate.first() == Some(&b'/')
            && candidate.len() > name.len()
            && candidate[1..=name.len()].eq_ignore_ascii_case(name)
        {
            return lt;
        }
        i = lt + 1;
    }
    s.len()
}

/// Split serialized markup into tags and text runs, in document order
pub fn tokenize(markup: &str) -> Vec<Token> {
    let s = markup.as_bytes();
    let n = s.len();
    let mut tokens = Vec::new();
    let mut text_start = 0usize;
    let mut i = 0usize;

    while i < n {
        let Some(off) = memchr(b'<', &s[i..]) else {
            break;
        };
        let lt = i + off;
        let Some((resume, tag)) = read_construct(s, lt) else {
            i = lt + 1;
            continue;
        };

        if lt > text_start {
            tokens.push(Token::Text(text_start..lt));
        }

        let mut resume = resume;
        if let Some(tag) = tag {
            if tag.kind == TagKind::Open && is_raw_text(&tag.name) {
                resume = find_raw_text_end(s, resume, &tag.name);
            }
            tokens.push(Token::Tag(tag));
        }

        i = resume;
        text_start = resume;
    }

    if text_start < n {
        tokens.push(Token::Text(text_start..n));
    }
    tokens
}

/// All tags of the markup, in document order
pub fn scan_tags(markup: &str) -> Vec<Tag> {
    tokenize(markup)
        .into_iter()
        .filter_map(|t| match t {
            Token::Tag(tag) => Some(tag),
            Token::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(markup: &str) -> Vec<(String, TagKind)> {
        scan_tags(markup)
            .into_iter()
            .map(|t| (t.name, t.kind))
            .collect()
    }

    #[test]
    fn test_tag_kinds_and_case() {
        assert_eq!(
            names("<P class=x>a<BR>b<img src='x'/></p>"),
            vec![
                ("p".to_string(), TagKind::Open),
                ("br".to_string(), TagKind::SelfClosing),
                ("img".to_string(), TagKind::SelfClosing),
                ("p".to_string(), TagKind::Close),
            ]
        );
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let markup = r#"<a title="x > y">link</a>"#;
        let tags = scan_tags(markup);
        assert_eq!(tags[0].end, markup.find("link").unwrap());
    }

    #[test]
    fn test_comments_and_doctype_are_skipped() {
        let tokens = tokenize("<!DOCTYPE html><!-- <p>nope</p> --><p>yes</p>");
        let texts: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Text(r) => Some(r.clone()),
                Token::Tag(_) => None,
            })
            .collect();
        assert_eq!(texts.len(), 1);
        assert_eq!(names("<!-- <b> --><i>x</i>").len(), 2);
    }

    #[test]
    fn test_raw_text_content_is_not_text() {
        let markup = "<script>if (a < b) { x('<p>') }</script><p>hi</p>";
        let tokens = tokenize(markup);
        let texts: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Text(r) => Some(&markup[r.clone()]),
                Token::Tag(_) => None,
            })
            .collect();
        assert_eq!(texts, vec!["hi"]);
    }

    #[test]
    fn test_literal_lt_stays_in_text() {
        let markup = "<p>1 < 2</p>";
        let tokens = tokenize(markup);
        assert_eq!(tokens[1], Token::Text(3..8));
    }

    #[test]
    fn test_vocabularies() {
        assert!(is_block("li"));
        assert!(!is_block("em"));
        assert!(is_inline("strong"));
        assert!(!is_inline("p"));
        assert!(is_void("hr"));
    }
}
