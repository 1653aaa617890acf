//! docsmith CLI: build-time content pipeline for the docs site.
//!
//! Converts notebooks into blog posts, keeps page titles in order, and
//! regenerates the site navigation before the generator runs.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
