//! The `build` sequence run in CI: convert → titles → (nav).

use std::path::Path;
use std::time::Instant;

use tracing::{info, instrument};

use docsmith_markdown::TitleOptions;
use docsmith_shared::Result;

use crate::convert::{self, ConvertReport};
use crate::nav::{self, NavReport};
use crate::project::Project;
use crate::titles::{self, TitleReport};

/// Options for [`build`].
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Keep the first H1 in step with the front-matter title.
    pub sync_heading: bool,
    /// Regenerate the nav block after the content passes.
    pub nav: bool,
}

impl BuildOptions {
    pub fn from_project(project: &Project) -> Self {
        Self {
            sync_heading: project.config.site.sync_heading,
            nav: false,
        }
    }
}

/// Result of a [`build`] run.
#[derive(Debug)]
pub struct BuildReport {
    pub convert: ConvertReport,
    pub titles: TitleReport,
    pub nav: Option<NavReport>,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each file of the current phase.
    fn file_done(&self, path: &Path, current: usize, total: usize);
    /// Called when the run completes.
    fn finish(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_done(&self, _path: &Path, _current: usize, _total: usize) {}
    fn finish(&self) {}
}

/// Run the full content pipeline.
///
/// 1. Convert notebooks into blog posts (titles applied before writing)
/// 2. Inject titles across all other pages
/// 3. Regenerate nav, if requested
#[instrument(skip_all, fields(root = %project.paths.root.display(), nav = opts.nav))]
pub fn build(
    project: &Project,
    opts: BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();

    let title_opts = TitleOptions {
        sync_heading: opts.sync_heading,
    };

    let convert = convert::convert_notebooks(project, title_opts, progress)?;
    let titles = titles::inject_titles(project, title_opts, progress)?;

    let nav = if opts.nav {
        progress.phase("Generating nav");
        Some(nav::generate_nav(project, false)?)
    } else {
        None
    };

    progress.finish();

    let elapsed = start.elapsed();
    info!(
        posts = convert.written.len(),
        titles = titles.updated.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "build complete"
    );

    Ok(BuildReport {
        convert,
        titles,
        nav,
        elapsed,
    })
}
