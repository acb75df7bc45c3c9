pub mod highlight;
pub mod region;
pub mod text_node;

pub use highlight::{sort_highlights, Comment, Highlight};
pub use region::{Fragment, ParagraphMap, Region};
pub use text_node::TextNodeInfo;
