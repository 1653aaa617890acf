//! Shared types, error model, and configuration for docsmith.
//!
//! This crate is the foundation depended on by all other docsmith crates.
//! It provides:
//! - [`DocsmithError`], the unified error type
//! - Notebook domain types ([`Notebook`], [`Cell`], [`Output`])
//! - Configuration ([`SiteConfig`], [`ProjectPaths`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, NotebooksConfig, PathsConfig, ProjectPaths, SectionsConfig, SetupsConfig,
    SiteConfig, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DocsmithError, Result};
pub use types::{
    Author, Cell, CellMetadata, KernelSpec, LanguageInfo, MIN_NBFORMAT, MimeBundle,
    MultilineString, Notebook, NotebookMetadata, Output,
};
