//! Tag colors and display labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dark color shared by every underline with three or more tags
pub const MANY_DARK: &str = "many-dark";
pub const MANY_DARK_HEX: &str = "333333";

/// Fallback colors for tags without a configured one
const FALLBACK_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Registry entry for one tag
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Read-only tag lookup owned by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Palette {
    tags: BTreeMap<String, TagStyle>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>, color: impl Into<String>) -> Self {
        self.tags.entry(tag.into()).or_default().color = Some(color.into());
        self
    }

    pub fn with_label(mut self, tag: impl Into<String>, label: impl Into<String>) -> Self {
        self.tags.entry(tag.into()).or_default().label = Some(label.into());
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, style: TagStyle) {
        self.tags.insert(tag.into(), style);
    }

    /// Hex color for a tag, `#` included
    pub fn color_hex(&self, tag: &str) -> String {
        if let Some(color) = self.tags.get(tag).and_then(|s| s.color.as_ref()) {
            return color.clone();
        }
        FALLBACK_COLORS[tag_hash(tag) as usize % FALLBACK_COLORS.len()].to_string()
    }

    /// Human-readable tag name.
    ///
    /// Registry labels win; opaque identifiers without one get a generic
    /// label; anything else is title-cased from the key.
    pub fn display_name(&self, tag: &str) -> String {
        if let Some(label) = self.tags.get(tag).and_then(|s| s.label.as_ref()) {
            return label.clone();
        }
        if Uuid::parse_str(tag).is_ok() {
            return "Untitled tag".to_string();
        }
        humanize(tag)
    }
}

fn humanize(tag: &str) -> String {
    tag.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn tag_hash(tag: &str) -> u32 {
    tag.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

/// Lower-case, hyphen-separated form of a tag key usable in color names
pub fn slug(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    for c in tag.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "untagged".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Base color name of a tag, e.g. `tag-jurisdiction`.
///
/// Tags that are not already in slug form get a hash suffix, so `Key Fact`
/// and `key_fact` never share a color.
pub fn color_name(tag: &str) -> String {
    let slug = slug(tag);
    if slug == tag {
        format!("tag-{slug}")
    } else {
        format!("tag-{slug}-{:08x}", tag_hash(tag))
    }
}

/// Fill color name
pub fn light_color(tag: &str) -> String {
    format!("{}-light", color_name(tag))
}

/// Underline and margin-note color name
pub fn dark_color(tag: &str) -> String {
    format!("{}-dark", color_name(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jurisdiction", "jurisdiction")]
    #[case("Legal Issue", "legal-issue")]
    #[case("key_fact!!", "key-fact")]
    #[case("***", "untagged")]
    fn test_slug(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(slug(tag), expected);
    }

    #[test]
    fn test_color_names() {
        assert_eq!(color_name("key-fact"), "tag-key-fact");
        assert!(color_name("Key Fact").starts_with("tag-key-fact-"));
        assert_eq!(light_color("a"), "tag-a-light");
        assert_eq!(dark_color("a"), "tag-a-dark");
    }

    #[test]
    fn test_lossy_slugs_get_distinct_names() {
        let names = [color_name("Key Fact"), color_name("key_fact"), color_name("key-fact")];
        assert_ne!(names[0], names[1]);
        assert_ne!(names[0], names[2]);
        assert_ne!(names[1], names[2]);
        assert_eq!(color_name("Key Fact"), color_name("Key Fact"));
    }

    #[test]
    fn test_configured_color_wins() {
        let palette = Palette::new().with_tag("a", "#123456");
        assert_eq!(palette.color_hex("a"), "#123456");
    }

    #[test]
    fn test_fallback_color_is_stable() {
        let palette = Palette::new();
        let first = palette.color_hex("unconfigured");
        assert_eq!(palette.color_hex("unconfigured"), first);
        assert!(FALLBACK_COLORS.contains(&first.as_str()));
    }

    #[test]
    fn test_display_name() {
        let id = "0b7d3e4a-5c61-4b8e-9d1f-2a3b4c5d6e7f";
        let palette = Palette::new().with_label(id, "Reasoning");

        assert_eq!(palette.display_name(id), "Reasoning");
        assert_eq!(
            palette.display_name("6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f"),
            "Untitled tag"
        );
        assert_eq!(palette.display_name("legal_issue"), "Legal Issue");
    }

    #[test]
    fn test_palette_from_toml_shape() {
        let json = r##"{"a": {"color": "#ff0000", "label": "Alpha"}}"##;
        let palette: Palette = serde_json::from_str(json).unwrap();
        assert_eq!(palette.display_name("a"), "Alpha");
        assert_eq!(palette.color_hex("a"), "#ff0000");
    }
}
