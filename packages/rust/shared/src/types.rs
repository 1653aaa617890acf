//! Core domain types: the nbformat v4 notebook document.
//!
//! Only the fields the converter reads are modelled; everything else in the
//! JSON (cell ids, attachments, widget state) is ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lowest nbformat major version the converter understands.
pub const MIN_NBFORMAT: u32 = 4;

// ---------------------------------------------------------------------------
// MultilineString
// ---------------------------------------------------------------------------

/// nbformat text field: either one string or a list of line fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilineString {
    Single(String),
    Lines(Vec<String>),
}

impl MultilineString {
    /// Concatenate the fragments into one string.
    pub fn joined(&self) -> String {
        match self {
            Self::Single(s) => s.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }

    /// True when the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Single(s) => s.trim().is_empty(),
            Self::Lines(lines) => lines.iter().all(|l| l.trim().is_empty()),
        }
    }
}

impl Default for MultilineString {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl From<&str> for MultilineString {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Notebook
// ---------------------------------------------------------------------------

/// A parsed `.ipynb` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Cells in document order.
    pub cells: Vec<Cell>,
    /// Notebook-level metadata.
    #[serde(default)]
    pub metadata: NotebookMetadata,
    /// Major format version.
    pub nbformat: u32,
    /// Minor format version.
    #[serde(default)]
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Kernel language, preferring `language_info` over `kernelspec`.
    pub fn language(&self) -> Option<&str> {
        self.metadata
            .language_info
            .as_ref()
            .map(|l| l.name.as_str())
            .or_else(|| {
                self.metadata
                    .kernelspec
                    .as_ref()
                    .and_then(|k| k.language.as_deref())
            })
            .filter(|l| !l.is_empty())
    }
}

/// `metadata` object at the notebook root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookMetadata {
    /// Document title (nbformat 4.x optional field).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document authors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    /// Kernel description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,
    /// Language reported by the kernel at save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_info: Option<LanguageInfo>,
}

/// Entry of `metadata.authors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One notebook cell, tagged by `cell_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        #[serde(default)]
        source: MultilineString,
        #[serde(default)]
        metadata: CellMetadata,
    },
    Code {
        #[serde(default)]
        source: MultilineString,
        #[serde(default)]
        metadata: CellMetadata,
        #[serde(default)]
        outputs: Vec<Output>,
        #[serde(default)]
        execution_count: Option<u32>,
    },
    Raw {
        #[serde(default)]
        source: MultilineString,
        #[serde(default)]
        metadata: CellMetadata,
    },
}

impl Cell {
    pub fn metadata(&self) -> &CellMetadata {
        match self {
            Self::Markdown { metadata, .. }
            | Self::Code { metadata, .. }
            | Self::Raw { metadata, .. } => metadata,
        }
    }

    /// True if any of the cell's tags is in `tags`.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.metadata().tags.iter().any(|t| tags.contains(t))
    }
}

/// Per-cell metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellMetadata {
    /// Free-form tags used to steer conversion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Target MIME type of a raw cell (nbformat field).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Target MIME type of a raw cell as written by the classic notebook UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_mimetype: Option<String>,
}

impl CellMetadata {
    /// Raw-cell target format, whichever field carries it.
    pub fn raw_format(&self) -> Option<&str> {
        self.format
            .as_deref()
            .or(self.raw_mimetype.as_deref())
            .filter(|f| !f.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One code-cell output, tagged by `output_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        #[serde(default)]
        name: String,
        #[serde(default)]
        text: MultilineString,
    },
    ExecuteResult {
        #[serde(default)]
        data: MimeBundle,
        #[serde(default)]
        execution_count: Option<u32>,
    },
    DisplayData {
        #[serde(default)]
        data: MimeBundle,
    },
    Error {
        #[serde(default)]
        ename: String,
        #[serde(default)]
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// MIME type → payload map of a rich output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeBundle(pub BTreeMap<String, serde_json::Value>);

impl MimeBundle {
    /// Text payload for `mime`, joining line fragments.
    ///
    /// Returns `None` for missing keys and for structured (JSON object)
    /// payloads such as `application/json`.
    pub fn text(&self, mime: &str) -> Option<String> {
        match self.0.get(mime)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(parts) => Some(
                parts
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .collect::<String>(),
            ),
            _ => None,
        }
    }
}
