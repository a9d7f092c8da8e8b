//! The `umbra` command-line front end.
//!
//! ```text
//! umbra color <COLOR>                     inspect a color in OKLCH
//! umbra contrast <FG> <BG> [--target N]   contrast ratio and adjusted foreground
//! umbra vars <FILE>                       variable overrides for a variable map
//! umbra page <FILE> [--deactivate]        run the engine over a page fixture
//! ```
//!
//! Every command prints plain text, or JSON with `--json`. `--config` loads
//! an [`EngineConfig`] from YAML or JSON.

mod commands;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use umbra_engine::EngineConfig;

pub use commands::{ColorReport, ContrastReport, PageReport};

#[derive(Debug, Parser)]
#[command(name = "umbra")]
#[command(version)]
#[command(about = "Dark-mode color rewriting for rendered pages")]
pub struct Cli {
    /// Engine config file (.yaml, .yml or .json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect a color: OKLCH components, luminance and its dark-mode inversion
    Color(ColorArgs),

    /// Contrast ratio of two colors and the foreground adjusted to a target
    Contrast(ContrastArgs),

    /// Generate variable overrides from a YAML or JSON map of custom properties
    Vars(VarsArgs),

    /// Activate the engine on a page fixture and print the rewritten page
    Page(PageArgs),
}

#[derive(Debug, Args)]
pub struct ColorArgs {
    /// Any CSS color: #hex, rgb(), hsl(), a named color
    pub color: String,
}

#[derive(Debug, Args)]
pub struct ContrastArgs {
    /// Foreground color
    pub foreground: String,

    /// Background color
    pub background: String,

    /// Ratio the adjusted foreground should reach
    #[arg(long, default_value_t = umbra_color::TEXT_CONTRAST_TARGET)]
    pub target: f64,
}

#[derive(Debug, Args)]
pub struct VarsArgs {
    /// Map of custom property names to values
    pub file: PathBuf,

    /// Print the complete stylesheet rule block (a JSON string with --json)
    #[arg(long)]
    pub block: bool,
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page fixture (.yaml, .yml or .json)
    pub file: PathBuf,

    /// Deactivate again after activating, to show the restored page
    #[arg(long)]
    pub deactivate: bool,
}

impl Cli {
    /// Loads the config named by `--config`, or the defaults.
    pub fn load_config(&self) -> Result<EngineConfig> {
        match &self.config {
            Some(path) => EngineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Runs a parsed command line, writing results to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = cli.load_config()?;
    match &cli.command {
        Command::Color(args) => commands::color(args, cli.json, &config, out),
        Command::Contrast(args) => commands::contrast(args, cli.json, &config, out),
        Command::Vars(args) => commands::vars(args, cli.json, &config, out),
        Command::Page(args) => commands::page(args, cli.json, &config, out),
    }
}
