//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docsmith_core::pipeline::{BuildOptions, ProgressReporter};
use docsmith_core::project::Project;
use docsmith_markdown::TitleOptions;
use docsmith_shared::init_config;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docsmith: build-time content pipeline for a MkDocs site.
#[derive(Parser)]
#[command(
    name = "docsmith",
    version,
    about = "Convert notebooks to posts, sync page titles, and regenerate site nav.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root (defaults to the current directory).
    #[arg(long, global = true, env = "DOCSMITH_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/docsmith.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert notebooks into blog posts.
    Convert,

    /// Add missing front-matter titles and sync page headings.
    Titles {
        /// Leave page H1s alone.
        #[arg(long)]
        no_sync_heading: bool,
    },

    /// Regenerate the nav block in the site config.
    Nav {
        /// Print the block instead of writing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy setup notes to their names without the `setup_` prefix.
    RenameSetups {
        /// Delete the prefixed files once copied.
        #[arg(long)]
        remove_original: bool,
    },

    /// Run the CI sequence: convert, then titles.
    Build {
        /// Also regenerate the nav block.
        #[arg(long)]
        nav: bool,

        /// Leave page H1s alone.
        #[arg(long)]
        no_sync_heading: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docsmith=info",
        1 => "docsmith=debug",
        _ => "docsmith=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };
    let config = cli.config.as_deref();

    match cli.command {
        Command::Convert => cmd_convert(&root, config),
        Command::Titles { no_sync_heading } => cmd_titles(&root, config, no_sync_heading),
        Command::Nav { dry_run } => cmd_nav(&root, config, dry_run),
        Command::RenameSetups { remove_original } => {
            cmd_rename_setups(&root, config, remove_original)
        }
        Command::Build {
            nav,
            no_sync_heading,
        } => cmd_build(&root, config, nav, no_sync_heading),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&root),
            ConfigAction::Show => cmd_config_show(&root, config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_convert(root: &Path, config: Option<&Path>) -> Result<()> {
    let project = Project::load(root, config)?;
    let title_opts = TitleOptions {
        sync_heading: project.config.site.sync_heading,
    };
    info!(dir = %project.paths.notebooks_dir.display(), "converting notebooks");

    let reporter = CliProgress::new()?;
    let report = docsmith_core::convert::convert_notebooks(&project, title_opts, &reporter)?;
    reporter.finish();

    println!();
    println!("  Notebooks converted");
    println!("  Written:   {}", report.written.len());
    println!("  Unchanged: {}", report.unchanged.len());
    println!("  Output:    {}", project.paths.blog_dir.display());
    println!();

    Ok(())
}

fn cmd_titles(root: &Path, config: Option<&Path>, no_sync_heading: bool) -> Result<()> {
    let project = Project::load(root, config)?;
    let opts = TitleOptions {
        sync_heading: project.config.site.sync_heading && !no_sync_heading,
    };
    info!(sync_heading = opts.sync_heading, "injecting titles");

    let reporter = CliProgress::new()?;
    let report = docsmith_core::titles::inject_titles(&project, opts, &reporter)?;
    reporter.finish();

    println!();
    println!("  Titles checked");
    println!("  Updated:   {}", report.updated.len());
    println!("  Unchanged: {}", report.unchanged);
    println!("  Untitled:  {}", report.untitled.len());
    for path in &report.untitled {
        println!("    {}", path.display());
    }
    println!();

    Ok(())
}

fn cmd_nav(root: &Path, config: Option<&Path>, dry_run: bool) -> Result<()> {
    let project = Project::load(root, config)?;
    let report = docsmith_core::nav::generate_nav(&project, dry_run)?;

    if dry_run {
        for line in &report.lines {
            println!("{line}");
        }
        return Ok(());
    }

    if report.written {
        println!("Nav written to: {}", report.site_config.display());
        if let Some(backup) = &report.backup {
            println!("Backup:         {}", backup.display());
        }
    } else {
        println!("Nav already up to date: {}", report.site_config.display());
    }

    Ok(())
}

fn cmd_rename_setups(root: &Path, config: Option<&Path>, remove_original: bool) -> Result<()> {
    let project = Project::load(root, config)?;
    let report = docsmith_core::rename::rename_setups(&project, remove_original)?;

    for (from, to) in &report.renamed {
        println!("  {} -> {}", from.display(), to.display());
    }
    println!("Renamed {} file(s), skipped {}", report.renamed.len(), report.skipped);

    Ok(())
}

fn cmd_build(root: &Path, config: Option<&Path>, nav: bool, no_sync_heading: bool) -> Result<()> {
    let project = Project::load(root, config)?;
    let defaults = BuildOptions::from_project(&project);
    let opts = BuildOptions {
        sync_heading: defaults.sync_heading && !no_sync_heading,
        nav,
    };

    info!(root = %root.display(), nav, "building site content");

    let reporter = CliProgress::new()?;
    let report = docsmith_core::pipeline::build(&project, opts, &reporter)?;

    println!();
    println!("  Site content built");
    println!("  Posts:   {} written, {} unchanged", report.convert.written.len(), report.convert.unchanged.len());
    println!("  Titles:  {} updated", report.titles.updated.len());
    if let Some(nav) = &report.nav {
        let state = if nav.written { "written" } else { "up to date" };
        println!("  Nav:     {state}");
    }
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_config_init(root: &Path) -> Result<()> {
    let path = init_config(root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(root: &Path, config: Option<&Path>) -> Result<()> {
    let project = Project::load(root, config)?;
    let toml_str = toml::to_string_pretty(&project.config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .map_err(|e| eyre!("invalid progress template: {e}"))?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_done(&self, path: &Path, current: usize, total: usize) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.spinner.set_message(format!("[{current}/{total}] {name}"));
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}
