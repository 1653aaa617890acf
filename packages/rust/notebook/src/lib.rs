//! Notebook-to-Markdown conversion.
//!
//! Parses nbformat v4 JSON and renders the cells as a Markdown blog post:
//! markdown and raw cells verbatim, code cells as fenced blocks, outputs as
//! indented text, raw HTML, or inline data-URI images. Cell tags can drop a
//! whole cell, its input, or its outputs.

mod outputs;

use tracing::{debug, instrument};

use docsmith_markdown::{Document, FrontMatter, first_heading};
use docsmith_shared::{Cell, DocsmithError, MIN_NBFORMAT, Notebook, NotebooksConfig, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for notebook rendering.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Tags that drop the whole cell.
    pub remove_cell_tags: Vec<String>,
    /// Tags that drop a code cell's outputs.
    pub remove_output_tags: Vec<String>,
    /// Tags that drop a cell's source.
    pub remove_input_tags: Vec<String>,
    /// Fence language when the notebook declares none.
    pub default_language: String,
    /// Alt text for inline images.
    pub image_alt: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::from(&NotebooksConfig::default())
    }
}

impl From<&NotebooksConfig> for ConvertOptions {
    fn from(config: &NotebooksConfig) -> Self {
        Self {
            remove_cell_tags: config.remove_cell_tags.clone(),
            remove_output_tags: config.remove_output_tags.clone(),
            remove_input_tags: config.remove_input_tags.clone(),
            default_language: config.default_language.clone(),
            image_alt: config.image_alt.clone(),
        }
    }
}

/// Result of converting a notebook to Markdown.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The final Markdown content (front-matter included, if any).
    pub markdown: String,
    /// Front-matter title, else the first heading.
    pub title: Option<String>,
    /// Number of cells that produced output.
    pub rendered_cells: usize,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse notebook JSON. `origin` names the source in error messages.
pub fn parse_notebook(json: &str, origin: &str) -> Result<Notebook> {
    let notebook: Notebook = serde_json::from_str(json)
        .map_err(|e| DocsmithError::parse(format!("{origin}: invalid notebook JSON: {e}")))?;

    if notebook.nbformat < MIN_NBFORMAT {
        return Err(DocsmithError::parse(format!(
            "{origin}: unsupported nbformat {} (need {MIN_NBFORMAT} or later)",
            notebook.nbformat
        )));
    }

    Ok(notebook)
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Render a parsed notebook as Markdown.
///
/// 1. Drops cells, inputs, and outputs according to their tags
/// 2. Renders each remaining cell to a block
/// 3. Joins blocks with blank lines and runs the cleanup pipeline
/// 4. Generates front-matter from notebook metadata if the cells carry none
#[instrument(skip_all, fields(cells = notebook.cells.len()))]
pub fn convert(notebook: &Notebook, opts: &ConvertOptions) -> Result<ConvertResult> {
    let language = notebook
        .language()
        .unwrap_or(opts.default_language.as_str())
        .to_string();

    let mut blocks: Vec<String> = Vec::new();
    let mut rendered_cells = 0;

    for cell in &notebook.cells {
        if cell.has_any_tag(&opts.remove_cell_tags) {
            debug!("cell removed by tag");
            continue;
        }

        let cell_blocks = render_cell(cell, &language, opts);
        if !cell_blocks.is_empty() {
            rendered_cells += 1;
            blocks.extend(cell_blocks);
        }
    }

    let body = docsmith_markdown::tidy(&blocks.join("\n\n"));
    let mut doc = Document::parse(&body);

    if doc.front_matter.is_none() {
        doc.front_matter = metadata_front_matter(notebook);
    }

    let title = match &doc.front_matter {
        Some(fm) => fm.title()?,
        None => None,
    }
    .or_else(|| first_heading(&doc.body));

    let markdown = doc.render();
    debug!(rendered_cells, len = markdown.len(), "notebook rendered");

    Ok(ConvertResult {
        markdown,
        title,
        rendered_cells,
    })
}

/// Parse and render in one step.
pub fn convert_json(json: &str, origin: &str, opts: &ConvertOptions) -> Result<ConvertResult> {
    let notebook = parse_notebook(json, origin)?;
    convert(&notebook, opts)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Markdown blocks for one cell, in order.
fn render_cell(cell: &Cell, language: &str, opts: &ConvertOptions) -> Vec<String> {
    let keep_input = !cell.has_any_tag(&opts.remove_input_tags);
    let mut blocks = Vec::new();

    match cell {
        Cell::Markdown { source, .. } => {
            if keep_input && !source.is_blank() {
                blocks.push(source.joined().trim_end().to_string());
            }
        }
        Cell::Raw { source, metadata } => {
            let for_markdown = match metadata.raw_format() {
                None => true,
                Some(format) => matches!(format, "text/markdown" | "markdown" | "md"),
            };
            if keep_input && for_markdown && !source.is_blank() {
                blocks.push(source.joined().trim_end().to_string());
            }
        }
        Cell::Code {
            source,
            outputs: cell_outputs,
            ..
        } => {
            if keep_input && !source.is_blank() {
                let code = source.joined();
                blocks.push(format!("```{language}\n{}\n```", code.trim_end()));
            }
            if !cell.has_any_tag(&opts.remove_output_tags) {
                blocks.extend(
                    cell_outputs
                        .iter()
                        .filter_map(|o| outputs::render_output(o, &opts.image_alt)),
                );
            }
        }
    }

    blocks
}

/// Front-matter from the nbformat `title` / `authors` metadata fields.
fn metadata_front_matter(notebook: &Notebook) -> Option<FrontMatter> {
    let meta = &notebook.metadata;
    let title = meta.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let authors: Vec<String> = meta
        .authors
        .iter()
        .map(|a| a.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if title.is_none() && authors.is_empty() {
        return None;
    }

    let mut fm = FrontMatter::new();
    if let Some(title) = title {
        fm.set_field("title", title);
    }
    if !authors.is_empty() {
        fm.push_list("authors", &authors);
    }
    Some(fm)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn load_fixture(name: &str) -> String {
        fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn notebook(cells: &str, metadata: &str) -> String {
        format!(r#"{{"cells": {cells}, "metadata": {metadata}, "nbformat": 4, "nbformat_minor": 5}}"#)
    }

    fn render(json: &str) -> ConvertResult {
        convert_json(json, "test.ipynb", &ConvertOptions::default()).expect("convert")
    }

    // --- Fixture-based tests ---

    #[test]
    fn sample_notebook_matches_expected_markdown() {
        let json = load_fixture("notebooks/async-fetching.ipynb");
        let expected = load_fixture("notebooks/async-fetching.md");

        let result = render(&json);
        assert_eq!(result.markdown, expected);
        assert_eq!(result.title.as_deref(), Some("Fetching URLs Concurrently"));
    }

    #[test]
    fn sample_notebook_front_matter_survives() {
        let json = load_fixture("notebooks/async-fetching.ipynb");
        let result = render(&json);

        let doc = Document::parse(&result.markdown);
        let fm = doc.front_matter.expect("front-matter from raw cell");
        assert_eq!(fm.get_str("date").unwrap().as_deref(), Some("2024-02-11"));
        assert!(!result.markdown.contains("autoreload"));
        assert!(!result.markdown.contains("'noisy'"));
        assert!(!result.markdown.contains("plot_latency"));
        assert!(!result.markdown.contains("\\newpage"));
    }

    // --- Cell handling ---

    #[test]
    fn code_fence_uses_kernel_language() {
        let json = notebook(
            r#"[{"cell_type": "code", "metadata": {}, "outputs": [], "source": "x <- 1"}]"#,
            r#"{"kernelspec": {"name": "ir", "language": "R"}}"#,
        );
        assert_eq!(render(&json).markdown, "```R\nx <- 1\n```\n");
    }

    #[test]
    fn code_fence_falls_back_to_default_language() {
        let json = notebook(
            r#"[{"cell_type": "code", "metadata": {}, "outputs": [], "source": "1"}]"#,
            "{}",
        );
        assert_eq!(render(&json).markdown, "```python\n1\n```\n");
    }

    #[test]
    fn blank_cells_are_skipped() {
        let json = notebook(
            r#"[
                {"cell_type": "markdown", "metadata": {}, "source": ["  \n"]},
                {"cell_type": "code", "metadata": {}, "outputs": [], "source": []},
                {"cell_type": "markdown", "metadata": {}, "source": "text"}
            ]"#,
            "{}",
        );
        let result = render(&json);
        assert_eq!(result.markdown, "text\n");
        assert_eq!(result.rendered_cells, 1);
    }

    #[test]
    fn custom_tags_are_honoured() {
        let json = notebook(
            r#"[
                {"cell_type": "markdown", "metadata": {"tags": ["private"]}, "source": "secret"},
                {"cell_type": "markdown", "metadata": {"tags": ["remove_cell"]}, "source": "kept"}
            ]"#,
            "{}",
        );
        let opts = ConvertOptions {
            remove_cell_tags: vec!["private".into()],
            ..ConvertOptions::default()
        };
        let result = convert_json(&json, "t.ipynb", &opts).expect("convert");
        assert_eq!(result.markdown, "kept\n");
    }

    // --- Front-matter ---

    #[test]
    fn metadata_generates_front_matter() {
        let json = notebook(
            r##"[{"cell_type": "markdown", "metadata": {}, "source": "# Heading"}]"##,
            r#"{"title": "Postgres: Indexes", "authors": [{"name": "Sam"}]}"#,
        );
        let result = render(&json);
        assert_eq!(
            result.markdown,
            "---\ntitle: \"Postgres: Indexes\"\nauthors:\n  - Sam\n---\n# Heading\n"
        );
        assert_eq!(result.title.as_deref(), Some("Postgres: Indexes"));
    }

    #[test]
    fn no_front_matter_without_metadata() {
        let json = notebook(
            r##"[{"cell_type": "markdown", "metadata": {}, "source": "# Only Heading"}]"##,
            "{}",
        );
        let result = render(&json);
        assert_eq!(result.markdown, "# Only Heading\n");
        assert_eq!(result.title.as_deref(), Some("Only Heading"));
    }

    // --- Errors ---

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_notebook("{\"cells\": [", "broken.ipynb").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("parse error: broken.ipynb"), "{msg}");
    }

    #[test]
    fn old_nbformat_is_rejected() {
        let json = r#"{"cells": [], "metadata": {}, "nbformat": 3, "nbformat_minor": 0}"#;
        let err = parse_notebook(json, "old.ipynb").unwrap_err();
        assert!(err.to_string().contains("unsupported nbformat 3"));
    }
}
