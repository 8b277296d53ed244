//! Markdown section parsing.

mod parser;

pub use parser::{
    ParsedDocument, ParsedSection, frontmatter_boundary, frontmatter_value, parse, section_heading,
};
