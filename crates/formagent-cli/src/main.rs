//! formagent - extract normalized text from uploaded forms.
//!
//! Runs the same batch extraction the interactive session uses, over files
//! on disk. Per-file failures are reported inline and never change the exit
//! code; only argument and configuration errors do.
//!
//! Logging goes to stderr and honours `RUST_LOG`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formagent_extract::{
    BatchExtractor, ExtractionConfig, ExtractionDispatcher, ExtractionResults, FormatKind,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "formagent")]
#[command(about = "Extract normalized text from PDFs, images, tables and documents")]
#[command(version)]
struct Cli {
    /// Extraction config file (.toml, .json, .yaml)
    #[arg(long, global = true, env = "FORMAGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from each file
    Extract {
        /// Files to extract
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print a JSON object of name -> text (null on failure)
        #[arg(long)]
        json: bool,
    },

    /// Show which strategy each file would use
    Classify {
        /// Files to classify
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    match cli.command {
        Commands::Extract { paths, json } => {
            let config = load_config(cli.config.as_deref())?;
            let batch = BatchExtractor::new(ExtractionDispatcher::new(config));
            let results = batch.extract_all(&paths);

            if json {
                println!("{}", serde_json::to_string_pretty(&results_json(&results))?);
            } else {
                print_results(&results);
            }
        }
        Commands::Classify { paths } => {
            for path in &paths {
                println!("{}\t{}", FormatKind::from_path(path), path.display());
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    match path {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ExtractionConfig::default()),
    }
}

fn results_json(results: &ExtractionResults) -> serde_json::Value {
    let map = results
        .iter()
        .map(|entry| {
            let value = entry
                .outcome
                .text()
                .map(|t| serde_json::Value::String(t.to_string()))
                .unwrap_or(serde_json::Value::Null);
            (entry.source.name.clone(), value)
        })
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}

fn print_results(results: &ExtractionResults) {
    for entry in results {
        println!("== {}", entry.source.name);
        match (entry.outcome.text(), entry.outcome.error()) {
            (Some(text), _) if !text.trim().is_empty() => println!("{}", text),
            (_, Some(e)) => println!("<no content: {}>", e),
            _ => println!("<no content>"),
        }
        println!();
    }

    let summary = results.summary();
    eprintln!(
        "{} file(s): {} extracted, {} failed",
        summary.total, summary.extracted, summary.failed
    );
}
