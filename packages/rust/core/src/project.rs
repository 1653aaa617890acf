//! A content project: config plus the paths it resolves to.

use std::path::Path;

use tracing::debug;

use docsmith_shared::{ProjectPaths, Result, SiteConfig, load_config, load_config_from};

/// Config and resolved paths for one site checkout.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: SiteConfig,
    pub paths: ProjectPaths,
}

impl Project {
    /// Build a project from an already-loaded config.
    pub fn new(root: &Path, config: SiteConfig) -> Self {
        let paths = ProjectPaths::resolve(root, &config);
        Self { config, paths }
    }

    /// Load `docsmith.toml` from `root`, or from `config_path` when given.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config_from(path)?,
            None => load_config(root)?,
        };
        debug!(root = %root.display(), sections = ?config.site.sections, "project loaded");
        Ok(Self::new(root, config))
    }

    /// Configured section names, in nav order.
    pub fn sections(&self) -> &[String] {
        &self.config.site.sections
    }

    /// Stem of section landing pages.
    pub fn index_stem(&self) -> &str {
        &self.config.site.index_stem
    }
}
