//! Post-render cleanup pipeline for generated Markdown.
//!
//! Each cleanup pass is a function `&str -> String` applied in sequence.
//! Passes that look at blank lines skip fenced code so that code and
//! captured output keep their exact spacing.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on raw Markdown text.
pub fn tidy(md: &str) -> String {
    let mut result = normalize_line_endings(md);

    result = blank_whitespace_lines(&result);
    result = collapse_blank_lines(&result);
    result = trim_leading_blank_lines(&result);
    result = ensure_trailing_newline(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Normalize line endings
// ---------------------------------------------------------------------------

/// Convert CRLF and lone CR line endings to LF.
fn normalize_line_endings(md: &str) -> String {
    static CR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\r\n?").expect("valid regex"));

    CR_RE.replace_all(md, "\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Whitespace-only lines become empty
// ---------------------------------------------------------------------------

/// Empty out lines that hold only whitespace, outside code fences.
fn blank_whitespace_lines(md: &str) -> String {
    map_prose_lines(md, |line| {
        if line.trim().is_empty() {
            String::new()
        } else {
            line.to_string()
        }
    })
}

// ---------------------------------------------------------------------------
// Pass 3: Collapse runs of blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of blank lines to a single blank line, outside code fences.
fn collapse_blank_lines(md: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_code_block = false;
    let mut previous_blank = false;

    for line in md.split('\n') {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            previous_blank = false;
            out.push(line);
            continue;
        }

        if !in_code_block && line.is_empty() {
            if previous_blank {
                continue;
            }
            previous_blank = true;
        } else {
            previous_blank = false;
        }
        out.push(line);
    }

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 4: Trim leading blank lines
// ---------------------------------------------------------------------------

fn trim_leading_blank_lines(md: &str) -> String {
    md.trim_start_matches('\n').to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Ensure trailing newline
// ---------------------------------------------------------------------------

/// Ensure the file ends with exactly one newline.
fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    format!("{trimmed}\n")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply `f` to every line outside fenced code blocks.
fn map_prose_lines(md: &str, f: impl Fn(&str) -> String) -> String {
    let mut in_code_block = false;
    md.split('\n')
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
                return line.to_string();
            }
            if in_code_block {
                line.to_string()
            } else {
                f(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_line_endings_converts_crlf() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn blank_whitespace_lines_skips_code() {
        let input = "text\n   \n```\n  \n```";
        assert_eq!(blank_whitespace_lines(input), "text\n\n```\n  \n```");
    }

    #[test]
    fn collapse_blank_lines_collapses_excess() {
        let input = "Line 1\n\n\n\n\nLine 2";
        assert_eq!(collapse_blank_lines(input), "Line 1\n\nLine 2");
    }

    #[test]
    fn collapse_blank_lines_keeps_single() {
        let input = "Line 1\n\nLine 2";
        assert_eq!(collapse_blank_lines(input), input);
    }

    #[test]
    fn collapse_blank_lines_preserves_code_blocks() {
        let input = "```python\na = 1\n\n\n\nb = 2\n```";
        assert_eq!(collapse_blank_lines(input), input);
    }

    #[test]
    fn ensure_trailing_newline_adds_if_missing() {
        assert_eq!(ensure_trailing_newline("Content"), "Content\n");
    }

    #[test]
    fn ensure_trailing_newline_normalizes_multiple() {
        assert_eq!(ensure_trailing_newline("Content\n\n\n"), "Content\n");
    }

    #[test]
    fn full_pipeline_cleans_markdown() {
        let input = "\n\n# Title\r\n\r\n\r\n\r\n## Section\n  \n\t\n```python\nprint('hi')\n\n\n```\n\n\n\nEnd";
        let result = tidy(input);

        assert!(result.starts_with("# Title\n\n## Section\n\n```python"));
        assert!(result.contains("print('hi')\n\n\n```"));
        assert!(!result.contains('\r'));
        assert!(result.ends_with("```\n\nEnd\n"));
    }
}
