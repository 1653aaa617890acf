//! Batch title injection over the configured content sections.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use docsmith_markdown::{TitleEdit, TitleOptions};
use docsmith_shared::Result;

use crate::content;
use crate::pipeline::ProgressReporter;
use crate::project::Project;

/// Outcome of a title-injection run.
#[derive(Debug, Default)]
pub struct TitleReport {
    /// Files rewritten.
    pub updated: Vec<PathBuf>,
    /// Files already in order.
    pub unchanged: usize,
    /// Files with neither a `title` field nor a heading.
    pub untitled: Vec<PathBuf>,
    /// Configured sections with no directory on disk.
    pub missing_sections: Vec<String>,
}

/// Apply title injection to one file, writing it back only if it changed.
pub fn inject_title_in_file(path: &Path, opts: TitleOptions) -> Result<TitleEdit> {
    let original = content::read_text(path)?;
    let edit = docsmith_markdown::inject_title(&original, opts)
        .map_err(|e| content::with_path(e, path))?;

    if edit.changed() {
        content::write_if_changed(path, &edit.text)?;
    }
    Ok(edit)
}

/// Run title injection over every section's pages (landing pages excluded).
#[instrument(skip_all, fields(sections = project.sections().len()))]
pub fn inject_titles(
    project: &Project,
    opts: TitleOptions,
    progress: &dyn ProgressReporter,
) -> Result<TitleReport> {
    let mut report = TitleReport::default();
    progress.phase("Injecting titles");

    let mut files = Vec::new();
    for section in project.sections() {
        let dir = project.paths.section_dir(section);
        if !dir.is_dir() {
            warn!(section, dir = %dir.display(), "section directory not found, skipping");
            report.missing_sections.push(section.clone());
            continue;
        }
        files.extend(content::sorted_files(&dir, "md", Some(project.index_stem()))?);
    }

    let total = files.len();
    for (i, path) in files.iter().enumerate() {
        let edit = inject_title_in_file(path, opts)?;

        if edit.changed() {
            info!(path = %path.display(), actions = ?edit.actions, "updated title");
            report.updated.push(path.clone());
        } else if edit.title.is_none() {
            debug!(path = %path.display(), "no title or heading found");
            report.untitled.push(path.clone());
        } else {
            report.unchanged += 1;
        }

        progress.file_done(path, i + 1, total);
    }

    info!(
        updated = report.updated.len(),
        unchanged = report.unchanged,
        untitled = report.untitled.len(),
        "title injection complete"
    );

    Ok(report)
}
