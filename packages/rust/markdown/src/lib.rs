//! Markdown text handling for docsmith.
//!
//! - [`frontmatter`]: split a file into YAML front-matter and body, read
//!   fields, and edit them without disturbing untouched lines.
//! - [`titles`]: the title-injection pass over a single file.
//! - [`tidy`]: blank-line and newline cleanup for generated Markdown.

mod cleanup;
pub mod frontmatter;
pub mod titles;

pub use cleanup::tidy;
pub use frontmatter::{Document, FrontMatter, quote_yaml_string};
pub use titles::{TitleAction, TitleEdit, TitleOptions, first_heading, inject_title};
