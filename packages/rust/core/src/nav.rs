//! Site navigation generation.
//!
//! Builds the `nav:` block of the site generator config from the section
//! directories and splices it in after the nav marker line, replacing
//! whatever followed the marker before.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use docsmith_shared::{DocsmithError, Result};

use crate::content;
use crate::project::Project;

/// Outcome of a nav generation run.
#[derive(Debug)]
pub struct NavReport {
    /// The generated block, marker line first.
    pub lines: Vec<String>,
    /// Site config that was (or would be) rewritten.
    pub site_config: PathBuf,
    /// Backup of the previous site config, if one was written.
    pub backup: Option<PathBuf>,
    /// Whether the site config was written.
    pub written: bool,
}

/// Nav lines for one section.
///
/// `stems` are the section's page stems, landing page excluded.
pub fn section_nav(section: &str, stems: &[String]) -> Vec<String> {
    let slug = section.to_lowercase();
    let mut lines = vec![
        format!("  - {}:", title_from_stem(section)),
        format!("    - {slug}/index.md"),
    ];
    for stem in stems {
        let title = title_from_stem(stem).replace('\'', "''");
        lines.push(format!("    - '{title}': {slug}/{stem}"));
    }
    lines
}

/// The full nav block: marker, `nav:`, then every section present on disk.
pub fn nav_block(project: &Project) -> Result<Vec<String>> {
    let mut lines = vec![project.config.site.nav_marker.clone(), "nav:".to_string()];

    for section in project.sections() {
        let dir = project.paths.section_dir(section);
        if !dir.is_dir() {
            warn!(section, dir = %dir.display(), "section directory not found, leaving it out of nav");
            continue;
        }

        let stems: Vec<String> = content::sorted_files(&dir, "md", Some(project.index_stem()))?
            .iter()
            .filter_map(|p| content::file_stem(p).map(String::from))
            .collect();
        lines.extend(section_nav(section, &stems));
    }

    Ok(lines)
}

/// Replace everything from the marker line onward with `block`.
///
/// Without a marker line the block is appended.
pub fn splice_nav(original: &str, marker: &str, block: &[String]) -> String {
    let mut offset = 0;
    let mut head = None;
    for segment in original.split_inclusive('\n') {
        if segment.trim_end() == marker {
            head = Some(&original[..offset]);
            break;
        }
        offset += segment.len();
    }

    let head = match head {
        Some(head) => head.to_string(),
        None if original.is_empty() || original.ends_with('\n') => original.to_string(),
        None => format!("{original}\n"),
    };

    format!("{head}{}\n", block.join("\n"))
}

/// Regenerate the nav block in the site config.
///
/// The previous config is copied to `.bak.<name>` next to it before the
/// rewrite. With `dry_run` nothing is written.
#[instrument(skip_all, fields(site_config = %project.paths.site_config.display(), dry_run = dry_run))]
pub fn generate_nav(project: &Project, dry_run: bool) -> Result<NavReport> {
    let site_config = project.paths.site_config.clone();
    let lines = nav_block(project)?;

    if dry_run {
        return Ok(NavReport {
            lines,
            site_config,
            backup: None,
            written: false,
        });
    }

    let original = content::read_text(&site_config)?;
    let updated = splice_nav(&original, &project.config.site.nav_marker, &lines);

    if updated == original {
        info!("nav already up to date");
        return Ok(NavReport {
            lines,
            site_config,
            backup: None,
            written: false,
        });
    }

    let file_name = site_config
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            DocsmithError::config(format!("site config is not a file: {}", site_config.display()))
        })?;
    let backup = site_config.with_file_name(format!(".bak.{file_name}"));
    std::fs::write(&backup, &original).map_err(|e| DocsmithError::io(&backup, e))?;

    content::write_if_changed(&site_config, &updated)?;
    info!(entries = lines.len(), backup = %backup.display(), "nav written");

    Ok(NavReport {
        lines,
        site_config,
        backup: Some(backup),
        written: true,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Human-readable title from a file stem or section name.
fn title_from_stem(stem: &str) -> String {
    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.as_str().to_lowercase())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
