//! YAML front-matter splitting, reading, and line-preserving edits.
//!
//! A document has front-matter when its first line is `---` and a later
//! line is `---` or `...`. The raw lines are kept so that rewriting a
//! document only touches the lines that were edited.

use serde_yaml::{Mapping, Value};

use docsmith_shared::{DocsmithError, Result};

const DELIMITER: &str = "---";
const YAML_DOC_END: &str = "...";

// ---------------------------------------------------------------------------
// FrontMatter
// ---------------------------------------------------------------------------

/// The YAML block at the top of a Markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    opening: String,
    lines: Vec<String>,
    closing: String,
    newline_after: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontMatter {
    /// An empty `---`/`---` block.
    pub fn new() -> Self {
        Self {
            opening: DELIMITER.to_string(),
            lines: Vec::new(),
            closing: DELIMITER.to_string(),
            newline_after: true,
        }
    }

    /// Raw YAML lines between the delimiters.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Parse the block as a YAML mapping.
    ///
    /// An empty or comment-only block is an empty mapping; any other
    /// non-mapping document is a parse error.
    pub fn values(&self) -> Result<Mapping> {
        let comment_only = self.lines.iter().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        });
        if comment_only {
            return Ok(Mapping::new());
        }

        let yaml = self.lines.join("\n");

        match serde_yaml::from_str::<Value>(&yaml) {
            Ok(Value::Mapping(map)) => Ok(map),
            Ok(Value::Null) => Ok(Mapping::new()),
            Ok(_) => Err(DocsmithError::parse("front-matter is not a YAML mapping")),
            Err(e) => Err(DocsmithError::parse(format!("invalid front-matter YAML: {e}"))),
        }
    }

    /// Scalar value of `key` rendered as a string.
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        let values = self.values()?;
        Ok(values.get(key).and_then(scalar_to_string))
    }

    /// The `title` field, if present and non-blank.
    pub fn title(&self) -> Result<Option<String>> {
        Ok(self
            .get_str("title")?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    /// Set a top-level scalar field.
    ///
    /// An existing top-level line for `key` (e.g. an empty `title:`) is
    /// replaced so the key never appears twice; otherwise the field is
    /// appended as the last line.
    pub fn set_field(&mut self, key: &str, value: &str) {
        let line = format!("{key}: {}", quote_yaml_string(value));
        match self.lines.iter().position(|l| is_key_line(l, key)) {
            Some(idx) => self.lines[idx] = line,
            None => self.lines.push(line),
        }
    }

    /// Append a block sequence field.
    pub fn push_list(&mut self, key: &str, items: &[String]) {
        self.lines.push(format!("{key}:"));
        for item in items {
            self.lines.push(format!("  - {}", quote_yaml_string(item)));
        }
    }

    /// Serialize the block, delimiters included.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.lines.iter().map(|l| l.len() + 1).sum::<usize>() + 8,
        );
        out.push_str(&self.opening);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&self.closing);
        if self.newline_after {
            out.push('\n');
        }
        out
    }
}

/// True for a top-level (unindented) `key:` line.
fn is_key_line(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start_matches([' ', '\t']).starts_with(':'))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A Markdown file split into optional front-matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Leading YAML block, if any.
    pub front_matter: Option<FrontMatter>,
    /// Everything after the closing delimiter line.
    pub body: String,
}

impl Document {
    /// Split `text` into front-matter and body.
    ///
    /// An opening `---` without a closing delimiter is body text.
    pub fn parse(text: &str) -> Self {
        let mut segments = text.split_inclusive('\n');

        let Some(first) = segments.next() else {
            return Self::body_only(text);
        };
        if strip_newline(first).trim_end() != DELIMITER {
            return Self::body_only(text);
        }

        let mut consumed = first.len();
        let mut lines = Vec::new();
        for segment in segments {
            consumed += segment.len();
            let line = strip_newline(segment);
            let trimmed = line.trim_end();
            if trimmed == DELIMITER || trimmed == YAML_DOC_END {
                return Self {
                    front_matter: Some(FrontMatter {
                        opening: strip_newline(first).to_string(),
                        lines,
                        closing: line.to_string(),
                        newline_after: segment.ends_with('\n'),
                    }),
                    body: text[consumed..].to_string(),
                };
            }
            lines.push(line.to_string());
        }

        Self::body_only(text)
    }

    fn body_only(text: &str) -> Self {
        Self {
            front_matter: None,
            body: text.to_string(),
        }
    }

    /// The front-matter block, creating an empty one if absent.
    pub fn front_matter_or_insert(&mut self) -> &mut FrontMatter {
        self.front_matter.get_or_insert_with(FrontMatter::new)
    }

    /// Reassemble the file text.
    pub fn render(&self) -> String {
        match &self.front_matter {
            Some(fm) => format!("{}{}", fm.render(), self.body),
            None => self.body.clone(),
        }
    }
}

fn strip_newline(segment: &str) -> &str {
    segment.strip_suffix('\n').unwrap_or(segment)
}

// ---------------------------------------------------------------------------
// YAML quoting
// ---------------------------------------------------------------------------

/// Render `s` as a YAML scalar that reads back as exactly `s`.
///
/// Plain style is used when YAML would parse the bare text to the same
/// string; anything else (colons, comments, numbers, booleans, leading
/// indicators) is double-quoted.
pub fn quote_yaml_string(s: &str) -> String {
    if is_plain_safe(s) {
        s.to_string()
    } else {
        format!("\"{}\"", escape_yaml_string(s))
    }
}

fn is_plain_safe(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.contains(['\n', '\r', '\t']) {
        return false;
    }
    matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(ref parsed)) if parsed == s)
}

/// Escape special characters for a double-quoted YAML string.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
