//! Gloss CLI - export overlapping highlights as inline spans or LaTeX macros

mod config;
mod io;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gloss_core::{export, AnnotatedDocument, ExportTarget, HtmlSpans, LatexNested, MarkerFormat, Region};

use config::{Config, OutputFormat};

#[derive(Parser)]
#[command(version, about = "Gloss - render overlapping highlights over HTML", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ~/.gloss/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render highlights into the document
    Render(RenderArgs),
    /// Print the boundary-split regions as JSON
    Regions {
        /// HTML document
        markup: PathBuf,

        /// JSON highlight file
        #[arg(long)]
        highlights: PathBuf,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// HTML document
    markup: PathBuf,

    /// JSON highlight file
    #[arg(long)]
    highlights: PathBuf,

    /// Output target (overrides config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Annotation payload style for html output (overrides config)
    #[arg(long, value_parser = parse_marker_format)]
    marker_format: Option<MarkerFormat>,

    /// Wrap latex output in a complete document
    #[arg(long)]
    standalone: bool,

    /// Write here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_marker_format(raw: &str) -> Result<MarkerFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "html" => Ok(MarkerFormat::Html),
        "latex" => Ok(MarkerFormat::Latex),
        other => Err(format!("unknown marker format '{other}' (expected html or latex)")),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(args) => render(args, &config),
        Commands::Regions { markup, highlights } => regions(&markup, &highlights),
    }
}

fn render(args: RenderArgs, config: &Config) -> Result<()> {
    let markup = io::load_markup(&args.markup)?;
    let highlights = io::load_highlights(&args.highlights)?;

    let format = args.format.unwrap_or(config.format);
    let target: Box<dyn ExportTarget> = match format {
        OutputFormat::Html => Box::new(HtmlSpans {
            marker_format: args.marker_format.unwrap_or(config.marker_format),
        }),
        OutputFormat::Latex => Box::new(LatexNested {
            standalone: args.standalone || config.standalone,
        }),
    };

    let out = export(&markup, &highlights, &config.tags, target.as_ref())
        .with_context(|| format!("Failed to export {}", args.markup.display()))?;
    info!(?format, highlights = highlights.len(), "rendered");

    io::write_output(args.output.as_deref(), &out)
}

/// One split region with the text it covers
#[derive(Serialize)]
struct RegionReport<'a> {
    #[serde(flatten)]
    region: &'a Region,
    text: String,
}

fn regions(markup_path: &Path, highlights_path: &Path) -> Result<()> {
    let markup = io::load_markup(markup_path)?;
    let highlights = io::load_highlights(highlights_path)?;
    let doc = AnnotatedDocument::prepare(&markup, &highlights);

    let chars: Vec<char> = doc.index.text().chars().collect();
    let report: Vec<RegionReport<'_>> = doc
        .regions
        .iter()
        .map(|region| {
            let start = region.start.min(chars.len());
            let end = region.end.min(chars.len());
            RegionReport {
                region,
                text: chars[start..end].iter().collect(),
            }
        })
        .collect();

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize regions")?;
    io::write_output(None, &json)
}
