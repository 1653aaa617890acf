//! Strip the `setup_` prefix from the setup notes.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use docsmith_shared::{DocsmithError, Result};

use crate::content;
use crate::project::Project;

/// Outcome of a rename run.
#[derive(Debug, Default)]
pub struct RenameReport {
    /// `(from, to)` pairs that were processed.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Files without the prefix.
    pub skipped: usize,
}

/// Copy every prefixed file in the setups section to its un-prefixed name.
///
/// The prefixed file stays unless `remove_original` is set. An existing
/// destination with identical content is fine; one with different content
/// is a validation error and nothing further is touched.
#[instrument(skip_all, fields(section = %project.config.setups.section, remove_original = remove_original))]
pub fn rename_setups(project: &Project, remove_original: bool) -> Result<RenameReport> {
    let setups = &project.config.setups;
    let dir = project.paths.section_dir(&setups.section);
    let mut report = RenameReport::default();

    if !dir.is_dir() {
        warn!(dir = %dir.display(), "setups directory not found, nothing to rename");
        return Ok(report);
    }

    for path in content::all_files(&dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            report.skipped += 1;
            continue;
        };
        let Some(stripped) = name.strip_prefix(setups.prefix.as_str()) else {
            report.skipped += 1;
            continue;
        };
        if stripped.is_empty() {
            return Err(DocsmithError::validation(format!(
                "file name is only the prefix: {}",
                path.display()
            )));
        }

        let target = dir.join(stripped);
        let text = content::read_text(&path)?;

        if target.exists() && content::read_text(&target)? != text {
            return Err(DocsmithError::validation(format!(
                "refusing to overwrite {} with {}: contents differ",
                target.display(),
                path.display()
            )));
        }

        let outcome = content::write_if_changed(&target, &text)?;
        if remove_original {
            std::fs::remove_file(&path).map_err(|e| DocsmithError::io(&path, e))?;
        }

        if outcome.is_write() {
            info!(from = %path.display(), to = %target.display(), removed = remove_original, "renamed setup");
        } else {
            debug!(from = %path.display(), to = %target.display(), "destination already present");
        }
        report.renamed.push((path, target));
    }

    Ok(report)
}
