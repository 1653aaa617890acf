//! Title injection: keep front-matter `title` and the page H1 in agreement.
//!
//! Two rules, applied in order:
//! 1. No `title` field → copy the body's first heading into front-matter.
//! 2. With heading sync on, the first body line must be `# <title>`.
//!
//! Applying [`inject_title`] to its own output changes nothing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use docsmith_shared::Result;

use crate::frontmatter::Document;

/// Options for [`inject_title`].
#[derive(Debug, Clone, Copy)]
pub struct TitleOptions {
    /// Rewrite or insert the body's leading H1 to match the title.
    pub sync_heading: bool,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self { sync_heading: true }
    }
}

/// One edit made by [`inject_title`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleAction {
    /// Added `title:` to front-matter from the first heading.
    AddedField,
    /// Replaced a leading H1 that disagreed with the title.
    ReplacedHeading,
    /// Inserted an H1 after the front-matter.
    InsertedHeading,
}

/// Result of [`inject_title`].
#[derive(Debug, Clone)]
pub struct TitleEdit {
    /// The (possibly) edited file text.
    pub text: String,
    /// The title the document ended up with, if any.
    pub title: Option<String>,
    /// Edits applied, in order.
    pub actions: Vec<TitleAction>,
}

impl TitleEdit {
    /// True if the text differs from the input.
    pub fn changed(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Apply title injection to one Markdown file's text.
///
/// Fails only when existing front-matter is not valid YAML.
pub fn inject_title(text: &str, opts: TitleOptions) -> Result<TitleEdit> {
    let mut doc = Document::parse(text);
    let mut actions = Vec::new();

    let existing = match &doc.front_matter {
        Some(fm) => fm.title()?,
        None => None,
    };

    let title = match existing {
        Some(title) => Some(title),
        None => match first_heading(&doc.body) {
            Some(heading) => {
                debug!(%heading, "adding title from first heading");
                doc.front_matter_or_insert().set_field("title", &heading);
                actions.push(TitleAction::AddedField);
                Some(heading)
            }
            None => None,
        },
    };

    if opts.sync_heading {
        if let Some(title) = &title {
            if let Some(action) = sync_heading(&mut doc, title) {
                actions.push(action);
            }
        }
    }

    let text = if actions.is_empty() {
        text.to_string()
    } else {
        doc.render()
    };

    Ok(TitleEdit {
        text,
        title,
        actions,
    })
}

/// Text of the first ATX heading outside fenced code blocks.
///
/// Optional closing `#`s and surrounding whitespace are stripped.
pub fn first_heading(body: &str) -> Option<String> {
    static ATX_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^ {0,3}#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid regex")
    });

    let mut fence: Option<&str> = None;
    for line in body.lines() {
        if let Some(marker) = fence_marker(line) {
            match fence {
                None => fence = Some(marker),
                Some(open) if marker.starts_with(open) => fence = None,
                Some(_) => {}
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }
        if let Some(caps) = ATX_RE.captures(line) {
            let text = caps[1].trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

/// Fence delimiter (``` or ~~~ run) opening the line, if any.
fn fence_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    for ch in ['`', '~'] {
        let run = trimmed.len() - trimmed.trim_start_matches(ch).len();
        if run >= 3 {
            return Some(&trimmed[..run]);
        }
    }
    None
}

/// Make the body's first non-blank line `# <title>`.
fn sync_heading(doc: &mut Document, title: &str) -> Option<TitleAction> {
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let wanted = format!("# {title}");

    let mut offset = 0;
    for segment in doc.body.split_inclusive('\n') {
        let line = segment.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            offset += segment.len();
            continue;
        }

        if line.trim_end() == wanted {
            return None;
        }
        if line.starts_with("# ") {
            let end = offset + line.len();
            doc.body.replace_range(offset..end, &wanted);
            return Some(TitleAction::ReplacedHeading);
        }
        break;
    }

    let rest = &doc.body[offset..];
    doc.body = if rest.is_empty() {
        format!("\n{wanted}\n")
    } else {
        format!("\n{wanted}\n\n{rest}")
    };
    Some(TitleAction::InsertedHeading)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> TitleEdit {
        inject_title(text, TitleOptions::default()).expect("inject")
    }

    fn run_no_sync(text: &str) -> TitleEdit {
        inject_title(text, TitleOptions { sync_heading: false }).expect("inject")
    }

    #[test]
    fn first_heading_skips_code_fences() {
        let body = "intro\n\n```python\n# not a heading\n```\n\n## Real One ##\n";
        assert_eq!(first_heading(body).as_deref(), Some("Real One"));
    }

    #[test]
    fn first_heading_handles_tilde_fences_and_indent() {
        let body = "~~~\n# hidden\n~~~\n   # Indented OK\n";
        assert_eq!(first_heading(body).as_deref(), Some("Indented OK"));
        assert_eq!(first_heading("    # code block"), None);
        assert_eq!(first_heading("#hashtag\n"), None);
    }

    #[test]
    fn first_heading_keeps_inner_hashes() {
        assert_eq!(first_heading("# Why C# matters\n").as_deref(), Some("Why C# matters"));
    }

    #[test]
    fn adds_exactly_one_title_field() {
        let text = "---\ndate: 2024-03-01\n---\n# Async Fetching\n\nBody text.\n";
        let edit = run_no_sync(text);

        assert_eq!(edit.actions, vec![TitleAction::AddedField]);
        assert_eq!(
            edit.text,
            "---\ndate: 2024-03-01\ntitle: Async Fetching\n---\n# Async Fetching\n\nBody text.\n"
        );
        assert_eq!(edit.text.matches("title:").count(), 1);
    }

    #[test]
    fn creates_front_matter_when_missing() {
        let edit = run("# DuckDB Notes\n\nText\n");
        assert_eq!(edit.actions, vec![TitleAction::AddedField]);
        assert_eq!(edit.text, "---\ntitle: DuckDB Notes\n---\n# DuckDB Notes\n\nText\n");
    }

    #[test]
    fn quotes_titles_that_need_it() {
        let edit = run_no_sync("# Postgres: Part 2\n");
        assert!(edit.text.starts_with("---\ntitle: \"Postgres: Part 2\"\n---\n"));
        assert_eq!(edit.title.as_deref(), Some("Postgres: Part 2"));
    }

    #[test]
    fn existing_title_is_kept() {
        let text = "---\ntitle: Chosen\n---\n# Chosen\n";
        let edit = run(text);
        assert!(!edit.changed());
        assert_eq!(edit.text, text);
    }

    #[test]
    fn untouched_without_title_or_heading() {
        let text = "---\ndate: 2024-01-01\n---\nJust prose.\n";
        let edit = run(text);
        assert!(!edit.changed());
        assert_eq!(edit.title, None);
        assert_eq!(edit.text, text);
    }

    #[test]
    fn sync_inserts_heading_after_front_matter() {
        let text = "---\ntitle: Setup Guide\n---\nInstall things.\n";
        let edit = run(text);
        assert_eq!(edit.actions, vec![TitleAction::InsertedHeading]);
        assert_eq!(edit.text, "---\ntitle: Setup Guide\n---\n\n# Setup Guide\n\nInstall things.\n");
    }

    #[test]
    fn sync_replaces_mismatched_h1() {
        let text = "---\ntitle: \"New: Name\"\n---\n\n# Old Name\n\nBody\n";
        let edit = run(text);
        assert_eq!(edit.actions, vec![TitleAction::ReplacedHeading]);
        assert_eq!(edit.text, "---\ntitle: \"New: Name\"\n---\n\n# New: Name\n\nBody\n");
    }

    #[test]
    fn sync_leaves_lower_headings_alone() {
        let text = "---\ntitle: Top\n---\n## Section\n";
        let edit = run(text);
        assert_eq!(edit.actions, vec![TitleAction::InsertedHeading]);
        assert!(edit.text.contains("\n# Top\n\n## Section\n"));
    }

    #[test]
    fn sync_on_empty_body() {
        let edit = run("---\ntitle: Stub\n---\n");
        assert_eq!(edit.text, "---\ntitle: Stub\n---\n\n# Stub\n");
    }

    #[test]
    fn injection_is_idempotent() {
        let inputs = [
            "# Plain\n\nBody\n",
            "---\ndate: 2024-01-01\n---\nIntro line\n\n## Second Level\n",
            "---\ntitle: Given\n---\nNo heading\n",
            "---\ntitle: Given\n---\n# Different\n",
            "---\ntitle:\n---\n# Filled: Later\n",
            "Nothing here\n",
            "---\r\nauthor: x\r\n---\r\n# Windows\r\n",
        ];
        for input in inputs {
            for opts in [TitleOptions::default(), TitleOptions { sync_heading: false }] {
                let once = inject_title(input, opts).expect("first");
                let twice = inject_title(&once.text, opts).expect("second");
                assert_eq!(twice.text, once.text, "input {input:?}");
                assert!(!twice.changed(), "second run changed {input:?}");
            }
        }
    }

    #[test]
    fn invalid_front_matter_is_an_error() {
        let err = inject_title("---\ntitle: [oops\n---\n# H\n", TitleOptions::default());
        assert!(err.is_err());
    }
}
