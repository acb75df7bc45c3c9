use serde::{Deserialize, Serialize};

/// A comment in a highlight's discussion thread
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// An author-supplied highlight over a half-open character range.
///
/// Highlights are identified by their position in the slice handed to the
/// pipeline, never by any field on the record itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Highlight {
    pub start_char: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_char: Option<usize>,
    pub tag: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Highlight {
    pub fn new(start_char: usize, end_char: usize, tag: impl Into<String>) -> Self {
        Self {
            start_char,
            end_char: Some(end_char),
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_comment(mut self, author: impl Into<String>, text: impl Into<String>) -> Self {
        self.comments.push(Comment {
            author: author.into(),
            text: text.into(),
            created_at: None,
        });
        self
    }

    /// Exclusive end; a missing end covers a single character
    pub fn end(&self) -> usize {
        self.end_char
            .unwrap_or_else(|| self.start_char.saturating_add(1))
    }

    /// True when the range covers at least one character
    pub fn is_well_formed(&self) -> bool {
        self.end() > self.start_char
    }
}

/// Sort highlights into the `(start_char, tag)` order the pipeline expects.
///
/// The pipeline itself never reorders its input; callers that do not already
/// hold sorted highlights use this before handing them over.
pub fn sort_highlights(highlights: &mut [Highlight]) {
    highlights.sort_by(|a, b| {
        a.start_char
            .cmp(&b.start_char)
            .then_with(|| a.tag.cmp(&b.tag))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_end_covers_one_char() {
        let json = r#"{"start_char": 7, "tag": "issue"}"#;
        let hl: Highlight = serde_json::from_str(json).unwrap();

        assert_eq!(hl.end(), 8);
        assert!(hl.is_well_formed());
        assert!(hl.comments.is_empty());
    }

    #[test]
    fn test_missing_end_at_max_start_is_malformed() {
        let json = r#"{"start_char": 18446744073709551615, "tag": "a"}"#;
        let hl: Highlight = serde_json::from_str(json).unwrap();

        assert_eq!(hl.end(), usize::MAX);
        assert!(!hl.is_well_formed());
    }

    #[test]
    fn test_inverted_range_is_malformed() {
        let hl = Highlight::new(10, 4, "issue");
        assert!(!hl.is_well_formed());
    }

    #[test]
    fn test_sort_by_start_then_tag() {
        let mut highlights = vec![
            Highlight::new(5, 9, "b"),
            Highlight::new(2, 3, "z"),
            Highlight::new(5, 6, "a"),
        ];
        sort_highlights(&mut highlights);

        let keys: Vec<_> = highlights
            .iter()
            .map(|h| (h.start_char, h.tag.as_str()))
            .collect();
        assert_eq!(keys, vec![(2, "z"), (5, "a"), (5, "b")]);
    }
}
