use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;

// Import from our modularized library
use api_key_validator_rs::prelude::*;

#[derive(Parser)]
#[command(name = "api_key_validator_rs")]
#[command(about = "Validate API keys against an HTTP endpoint", long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["key", "file"]),
))]
struct Cli {
    /// Single API key to validate
    #[arg(short = 'k', value_parser = NonEmptyStringValueParser::new())]
    key: Option<String>,

    /// File containing API keys, one per line
    #[arg(short = 'f')]
    file: Option<PathBuf>,

    /// Endpoint the key is appended to
    #[arg(short = 'e', default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Disable color output
    #[arg(long)]
    remove_color: bool,

    /// Display invalid API keys
    #[arg(short = 'd')]
    show_invalid: bool,

    /// Display HTTP response body for each printed API key
    #[arg(long)]
    debug: bool,

    /// Number of worker threads used for validation
    #[arg(short = 't', default_value_t = 1)]
    threads: usize,

    /// Run in batch mode (no progress bar)
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            endpoint: self.endpoint.clone(),
            workers: self.threads,
            show_invalid: self.show_invalid,
            use_color: !self.remove_color,
            debug: self.debug,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.run_config();
    config.validate()?;

    // Load the key file up front so a bad path fails before any request is sent
    let keys = match cli.file {
        Some(ref path) => {
            let keys = collect_keys(path)?;
            if cli.verbose {
                eprintln!("Loaded {} key(s) from {}", keys.len(), path.display());
            }
            Some(keys)
        }
        None => None,
    };

    let validator = Validator::new(HttpTransport::new()?, config.endpoint.clone());
    if cli.verbose {
        eprintln!("Endpoint: {}", validator.endpoint());
        eprintln!("Using {} worker thread(s)", config.workers);
    }

    let mut out = io::stdout().lock();
    let mut err = io::stderr();
    let mut summary = Summary::default();

    // A key given on the command line bypasses the pool
    if let Some(ref key) = cli.key {
        let result = validator.validate(key);
        write_diagnostics(&mut err, [&result])?;
        summary.merge(write_report(&mut out, [&result], &config)?);
    }

    if let Some(keys) = keys {
        let progress = if cli.batch || keys.is_empty() {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(keys.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .context("Invalid progress bar template")?
                    .progress_chars("#>-"),
            );
            pb
        };

        let results = dispatch_with_progress(&keys, config.workers, &validator, &progress)?;
        progress.finish_and_clear();

        write_diagnostics(&mut err, &results)?;
        summary.merge(write_report(&mut out, &results, &config)?);
    }

    write_summary(&mut out, &summary)?;

    Ok(())
}
