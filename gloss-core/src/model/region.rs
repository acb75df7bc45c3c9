use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// A maximal character interval with a constant set of active highlights
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    /// Highlight indices active over the whole region
    pub active: BTreeSet<usize>,
    /// Highlight indices whose annotation marker is anchored here
    pub annots: Vec<usize>,
}

impl Region {
    pub fn new(start: usize, end: usize, active: BTreeSet<usize>) -> Self {
        Self {
            start,
            end,
            active,
            annots: Vec::new(),
        }
    }

    /// Check if this region contains the given character position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A run of already-serialized text with the highlights active over it.
///
/// Input of the nested renderer; gaps between regions are fragments with an
/// empty active set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub active: BTreeSet<usize>,
    pub annots: Vec<usize>,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn highlighted(text: impl Into<String>, active: impl IntoIterator<Item = usize>) -> Self {
        Self {
            text: text.into(),
            active: active.into_iter().collect(),
            annots: Vec::new(),
        }
    }

    pub fn with_annots(mut self, annots: impl IntoIterator<Item = usize>) -> Self {
        self.annots.extend(annots);
        self
    }
}

/// Character position to paragraph number lookup.
///
/// Keys are the first character of each numbered block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphMap {
    starts: BTreeMap<usize, u32>,
}

impl ParagraphMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, char_start: usize, number: u32) {
        self.starts.insert(char_start, number);
    }

    /// Paragraph containing `pos`, if any block starts at or before it
    pub fn lookup(&self, pos: usize) -> Option<u32> {
        self.starts.range(..=pos).next_back().map(|(_, &n)| n)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

impl FromIterator<(usize, u32)> for ParagraphMap {
    fn from_iter<I: IntoIterator<Item = (usize, u32)>>(iter: I) -> Self {
        Self {
            starts: iter.into_iter().collect(),
        }
    }
}
