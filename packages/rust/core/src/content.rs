//! Filesystem helpers shared by the batch jobs.

use std::path::{Path, PathBuf};

use tracing::debug;

use docsmith_shared::{DocsmithError, Result};

/// What [`write_if_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist.
    Created,
    /// The file existed with different content.
    Updated,
    /// The file already held exactly this content; nothing was written.
    Unchanged,
}

impl WriteOutcome {
    pub fn is_write(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Regular files in `dir` with the given extension, sorted by path.
///
/// Hidden files and files whose stem equals `skip_stem` are left out.
pub fn sorted_files(dir: &Path, extension: &str, skip_stem: Option<&str>) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DocsmithError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DocsmithError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if skip_stem.is_some() && file_stem(&path) == skip_stem {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Every regular, non-hidden file in `dir`, sorted by path.
pub fn all_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DocsmithError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DocsmithError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && !entry.file_name().to_string_lossy().starts_with('.') {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// UTF-8 file stem, if any.
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| DocsmithError::io(path, e))
}

/// Write `content` to `path` unless the file already holds it.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so a failed run never leaves a half-written page behind.
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteOutcome> {
    let outcome = match std::fs::read_to_string(path) {
        Ok(existing) if existing == content => {
            debug!(path = %path.display(), "content unchanged, skipping write");
            return Ok(WriteOutcome::Unchanged);
        }
        Ok(_) => WriteOutcome::Updated,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => WriteOutcome::Created,
        // Unreadable (e.g. not UTF-8): overwrite.
        Err(_) => WriteOutcome::Updated,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DocsmithError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| DocsmithError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| DocsmithError::io(path, e))?;

    Ok(outcome)
}

/// Prefix a parse error's message with the file it came from.
pub fn with_path(err: DocsmithError, path: &Path) -> DocsmithError {
    match err {
        DocsmithError::Parse { message } => {
            DocsmithError::parse(format!("{}: {message}", path.display()))
        }
        other => other,
    }
}
