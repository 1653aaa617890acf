//! Project configuration for docsmith.
//!
//! Config lives at `<project root>/docsmith.toml`. A missing file means
//! defaults, which match the conventional MkDocs content layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocsmithError, Result};

/// Default configuration file name, resolved against the project root.
pub const CONFIG_FILE_NAME: &str = "docsmith.toml";

// ---------------------------------------------------------------------------
// Config structs (matching docsmith.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Content and generator paths.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Notebook conversion settings.
    #[serde(default)]
    pub notebooks: NotebooksConfig,

    /// Section layout and title handling.
    #[serde(default)]
    pub site: SectionsConfig,

    /// Setup-file renaming.
    #[serde(default)]
    pub setups: SetupsConfig,
}

/// `[paths]` section. Relative paths resolve against the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the Markdown content tree.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Directory scanned for `*.ipynb` sources.
    #[serde(default = "default_notebooks_dir")]
    pub notebooks_dir: String,

    /// Directory that receives converted notebook posts.
    #[serde(default = "default_blog_dir")]
    pub blog_dir: String,

    /// Site generator config file that carries the nav block.
    #[serde(default = "default_site_config")]
    pub site_config: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            notebooks_dir: default_notebooks_dir(),
            blog_dir: default_blog_dir(),
            site_config: default_site_config(),
        }
    }
}

fn default_docs_dir() -> String {
    "docs".into()
}
fn default_notebooks_dir() -> String {
    "docs/notebooks".into()
}
fn default_blog_dir() -> String {
    "docs/blog".into()
}
fn default_site_config() -> String {
    "mkdocs.yml".into()
}

/// `[notebooks]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebooksConfig {
    /// Cell tags that drop the whole cell.
    #[serde(default = "default_remove_cell_tags")]
    pub remove_cell_tags: Vec<String>,

    /// Cell tags that drop a code cell's outputs.
    #[serde(default = "default_remove_output_tags")]
    pub remove_output_tags: Vec<String>,

    /// Cell tags that drop a cell's source but keep its outputs.
    #[serde(default = "default_remove_input_tags")]
    pub remove_input_tags: Vec<String>,

    /// Fence language when the notebook does not declare one.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Alt text for embedded image outputs.
    #[serde(default = "default_image_alt")]
    pub image_alt: String,
}

impl Default for NotebooksConfig {
    fn default() -> Self {
        Self {
            remove_cell_tags: default_remove_cell_tags(),
            remove_output_tags: default_remove_output_tags(),
            remove_input_tags: default_remove_input_tags(),
            default_language: default_language(),
            image_alt: default_image_alt(),
        }
    }
}

fn default_remove_cell_tags() -> Vec<String> {
    vec!["remove_cell".into()]
}
fn default_remove_output_tags() -> Vec<String> {
    vec!["remove_output".into()]
}
fn default_remove_input_tags() -> Vec<String> {
    vec!["remove_input".into()]
}
fn default_language() -> String {
    "python".into()
}
fn default_image_alt() -> String {
    "Cell Output".into()
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsConfig {
    /// Section directory names under `docs_dir`, in nav order.
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    /// Line that starts the generated nav block in the site config.
    #[serde(default = "default_nav_marker")]
    pub nav_marker: String,

    /// File stem of a section's landing page (skipped by per-file passes).
    #[serde(default = "default_index_stem")]
    pub index_stem: String,

    /// Keep the body's H1 in step with the front-matter title.
    #[serde(default = "default_true")]
    pub sync_heading: bool,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            nav_marker: default_nav_marker(),
            index_stem: default_index_stem(),
            sync_heading: true,
        }
    }
}

fn default_sections() -> Vec<String> {
    ["blog", "guides", "resources", "setups"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_nav_marker() -> String {
    "# NAV".into()
}
fn default_index_stem() -> String {
    "index".into()
}
fn default_true() -> bool {
    true
}

/// `[setups]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupsConfig {
    /// Section holding the setup notes.
    #[serde(default = "default_setups_section")]
    pub section: String,

    /// File-name prefix stripped by `rename-setups`.
    #[serde(default = "default_setups_prefix")]
    pub prefix: String,
}

impl Default for SetupsConfig {
    fn default() -> Self {
        Self {
            section: default_setups_section(),
            prefix: default_setups_prefix(),
        }
    }
}

fn default_setups_section() -> String {
    "setups".into()
}
fn default_setups_prefix() -> String {
    "setup_".into()
}

// ---------------------------------------------------------------------------
// Resolved paths (runtime, config + project root)
// ---------------------------------------------------------------------------

/// Config paths joined onto a project root.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project root all relative paths resolve against.
    pub root: PathBuf,
    /// Markdown content tree.
    pub docs_dir: PathBuf,
    /// Notebook sources.
    pub notebooks_dir: PathBuf,
    /// Converted notebook output.
    pub blog_dir: PathBuf,
    /// Site generator config file.
    pub site_config: PathBuf,
}

impl ProjectPaths {
    /// Resolve the `[paths]` section against `root`.
    pub fn resolve(root: &Path, config: &SiteConfig) -> Self {
        let join = |p: &str| root.join(p);
        Self {
            root: root.to_path_buf(),
            docs_dir: join(&config.paths.docs_dir),
            notebooks_dir: join(&config.paths.notebooks_dir),
            blog_dir: join(&config.paths.blog_dir),
            site_config: join(&config.paths.site_config),
        }
    }

    /// Directory of a named section, e.g. `docs/guides`.
    pub fn section_dir(&self, section: &str) -> PathBuf {
        self.docs_dir.join(section.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file for a project root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(SiteConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsmithError::io(path, e))?;

    let config: SiteConfig = toml::from_str(&content).map_err(|e| {
        DocsmithError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Write the default config file into `root`. Returns the path written.
///
/// Refuses to overwrite an existing file.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() {
        return Err(DocsmithError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&SiteConfig::default())
        .map_err(|e| DocsmithError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocsmithError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs the batch jobs cannot act on.
fn validate_config(config: &SiteConfig) -> Result<()> {
    if config.site.nav_marker.trim().is_empty() {
        return Err(DocsmithError::config("site.nav_marker must not be empty"));
    }
    if let Some(bad) = config
        .site
        .sections
        .iter()
        .find(|s| s.is_empty() || s.contains(['/', '\\']))
    {
        return Err(DocsmithError::config(format!(
            "invalid section name '{bad}': expected a single directory name"
        )));
    }
    Ok(())
}
