//! Batch notebook conversion: `docs/notebooks/*.ipynb` → `docs/blog/<stem>.md`.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use docsmith_markdown::TitleOptions;
use docsmith_notebook::ConvertOptions;
use docsmith_shared::{DocsmithError, Result};

use crate::content::{self, WriteOutcome};
use crate::pipeline::ProgressReporter;
use crate::project::Project;

/// Outcome of a conversion run.
#[derive(Debug, Default)]
pub struct ConvertReport {
    /// Posts created or rewritten.
    pub written: Vec<PathBuf>,
    /// Posts whose rendered content was already on disk.
    pub unchanged: Vec<PathBuf>,
}

impl ConvertReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

/// Convert every notebook in the notebooks directory into a blog post.
///
/// Title injection runs on the rendered post before it is compared with the
/// file on disk, so a post that `inject_titles` already fixed up stays
/// unchanged. Any unreadable or malformed notebook aborts the run.
#[instrument(skip_all, fields(dir = %project.paths.notebooks_dir.display()))]
pub fn convert_notebooks(
    project: &Project,
    title_opts: TitleOptions,
    progress: &dyn ProgressReporter,
) -> Result<ConvertReport> {
    let notebooks_dir = &project.paths.notebooks_dir;
    let blog_dir = &project.paths.blog_dir;
    let mut report = ConvertReport::default();

    progress.phase("Converting notebooks");

    if !notebooks_dir.is_dir() {
        warn!(dir = %notebooks_dir.display(), "notebooks directory not found, nothing to convert");
        return Ok(report);
    }

    let notebooks = content::sorted_files(notebooks_dir, "ipynb", None)?;
    if notebooks.is_empty() {
        return Ok(report);
    }

    std::fs::create_dir_all(blog_dir).map_err(|e| DocsmithError::io(blog_dir, e))?;

    let opts = ConvertOptions::from(&project.config.notebooks);
    let total = notebooks.len();

    for (i, notebook_path) in notebooks.iter().enumerate() {
        let stem = content::file_stem(notebook_path).ok_or_else(|| {
            DocsmithError::validation(format!(
                "notebook name is not valid UTF-8: {}",
                notebook_path.display()
            ))
        })?;

        let json = content::read_text(notebook_path)?;
        let notebook =
            docsmith_notebook::parse_notebook(&json, &notebook_path.display().to_string())?;
        let result = docsmith_notebook::convert(&notebook, &opts)
            .map_err(|e| content::with_path(e, notebook_path))?;
        let titled = docsmith_markdown::inject_title(&result.markdown, title_opts)
            .map_err(|e| content::with_path(e, notebook_path))?;

        let post = blog_dir.join(format!("{stem}.md"));
        match content::write_if_changed(&post, &titled.text)? {
            WriteOutcome::Unchanged => report.unchanged.push(post.clone()),
            outcome => {
                info!(
                    path = %post.display(),
                    title = titled.title.as_deref().unwrap_or(""),
                    ?outcome,
                    "wrote post"
                );
                report.written.push(post.clone());
            }
        }

        progress.file_done(&post, i + 1, total);
    }

    info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "notebook conversion complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use docsmith_shared::SiteConfig;

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn project_with_notebook(name: &str, json: &str) -> (tempfile::TempDir, Project) {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = Project::new(dir.path(), SiteConfig::default());
        std::fs::create_dir_all(&project.paths.notebooks_dir).expect("mkdir");
        std::fs::write(project.paths.notebooks_dir.join(name), json).expect("write");
        (dir, project)
    }

    fn run(project: &Project) -> Result<ConvertReport> {
        convert_notebooks(project, TitleOptions::default(), &SilentProgress)
    }

    #[test]
    fn converts_sample_notebook_into_blog_dir() {
        let (_dir, project) =
            project_with_notebook("async-fetching.ipynb", &fixture("notebooks/async-fetching.ipynb"));

        let report = run(&project).expect("convert");

        let post = project.paths.blog_dir.join("async-fetching.md");
        assert_eq!(report.written, vec![post.clone()]);

        let expected = docsmith_markdown::inject_title(
            &fixture("notebooks/async-fetching.md"),
            TitleOptions::default(),
        )
        .expect("inject")
        .text;
        let written = std::fs::read_to_string(&post).unwrap();
        assert_eq!(written, expected);
        assert_eq!(written.matches("title: Fetching URLs Concurrently\n").count(), 1);
    }

    #[test]
    fn second_run_reports_unchanged() {
        let (_dir, project) =
            project_with_notebook("a.ipynb", &fixture("notebooks/async-fetching.ipynb"));

        run(&project).expect("first");
        let report = run(&project).expect("second");
        assert!(report.written.is_empty());
        assert_eq!(report.unchanged.len(), 1);
        assert_eq!(report.total(), 1);
    }

    #[test]
    fn post_already_titled_on_disk_is_left_alone() {
        let json = r##"{"cells": [{"cell_type": "markdown", "metadata": {}, "source": "# Hello\n\nBody"}],
            "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"##;
        let (_dir, project) = project_with_notebook("hello.ipynb", json);
        let post = project.paths.blog_dir.join("hello.md");
        std::fs::create_dir_all(&project.paths.blog_dir).expect("mkdir");
        std::fs::write(&post, "---\ntitle: Hello\n---\n# Hello\n\nBody\n").expect("write");

        let report = run(&project).expect("convert");
        assert!(report.written.is_empty());
        assert_eq!(report.unchanged, vec![post]);
    }

    #[test]
    fn missing_notebooks_dir_is_empty_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = Project::new(dir.path(), SiteConfig::default());

        let report = run(&project).expect("convert");
        assert_eq!(report.total(), 0);
        assert!(!project.paths.blog_dir.exists());
    }

    #[test]
    fn malformed_notebook_aborts_with_path() {
        let (_dir, project) = project_with_notebook("broken.ipynb", "{ not json");

        let err = run(&project).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("broken.ipynb"), "{msg}");
        assert!(msg.starts_with("parse error"), "{msg}");
    }

    #[test]
    fn bad_front_matter_cell_names_the_notebook() {
        let json = r#"{"cells": [{"cell_type": "raw", "metadata": {}, "source": "---\ntitle: [x\n---"}],
            "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#;
        let (_dir, project) = project_with_notebook("bad-yaml.ipynb", json);

        let err = run(&project).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, DocsmithError::Parse { .. }));
        assert!(msg.contains("bad-yaml.ipynb"), "{msg}");
        assert!(msg.contains("front-matter"), "{msg}");
    }
}
