pub mod annotation;
pub mod nested;
pub mod spans;

pub use annotation::{escape_latex, format_timestamp, MarkerFormat};
pub use nested::{color_definitions, preamble, render_nested};
pub use spans::{render_spans, SpanOptions};
