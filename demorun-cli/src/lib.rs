#![warn(missing_docs)]
//! demorun CLI Library
//!
//! Front ends for the example dispatcher:
//! - `list` / `show` / `run` and the HTTP API (`serve`) for interactive use
//! - `batch` (the default) for running a fixed list of units in order
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     demorun_cli::run()
//! }
//! ```

mod batch;
mod config;
mod dispatcher;
#[allow(missing_docs)]
pub mod server;

pub use batch::run_batch;
pub use config::*;
pub use dispatcher::{DispatchError, Dispatcher, UnitSource};

use anyhow::Context;
use clap::{Parser, Subcommand};
use demorun_core::filter_units;
use demorun_report::{
    OutputFormat, format_human_batch, format_human_outcome, format_unit_list,
    generate_json_outcome, generate_json_report,
};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// demorun CLI arguments
#[derive(Parser, Debug)]
#[command(name = "demorun")]
#[command(author, version, about = "demorun - run example scripts in their own environments")]
pub struct Cli {
    /// Optional subcommand; defaults to Batch
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: discover demorun.toml upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Examples directory, overriding the configuration
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered examples
    List {
        /// Filter examples by regex pattern
        #[arg(default_value = ".*")]
        filter: String,

        /// Output format: json, human
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// Print an example's source
    Show {
        /// Example file name
        unit: String,
    },
    /// Run one example and print its output
    Run {
        /// Example file name
        unit: String,

        /// Timeout (e.g. "30", "30s", "2m")
        #[arg(long)]
        timeout: Option<String>,

        /// Output format: json, human
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// Run the configured examples one after another (default)
    Batch {
        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, human
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// Serve the JSON API
    Serve {
        /// Listen address, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write a default demorun.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the demorun CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the demorun CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose);

    if let Some(Commands::Init { force }) = cli.command {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        return init_config(&path, force);
    }

    let config = load_config(&cli)?;
    let dispatcher = Dispatcher::from_config(&config)?;

    match cli.command {
        Some(Commands::List { filter, format }) => list_units(&dispatcher, &filter, &format),
        Some(Commands::Show { unit }) => show_unit(&dispatcher, &unit),
        Some(Commands::Run {
            unit,
            timeout,
            format,
        }) => {
            let dispatcher = match timeout {
                Some(t) => dispatcher.with_timeout(DemorunConfig::parse_duration(&t)?),
                None => dispatcher,
            };
            run_unit(&dispatcher, &unit, &format)
        }
        Some(Commands::Batch { output, format }) => {
            batch_units(&dispatcher, &config, output.as_ref(), &format)
        }
        None => batch_units(&dispatcher, &config, None, "human"),
        Some(Commands::Serve { bind }) => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(Arc::new(dispatcher), &bind))
        }
        Some(Commands::Init { .. }) => Ok(()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "demorun=debug,demorun_cli=debug,demorun_exec=debug,demorun_core=debug,tower_http=debug"
    } else {
        "demorun=info,demorun_cli=info,demorun_exec=info,demorun_core=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries reports; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `--config`, or discover demorun.toml, then apply `--dir`.
fn load_config(cli: &Cli) -> anyhow::Result<DemorunConfig> {
    let found = match &cli.config {
        Some(path) => Some((path.clone(), DemorunConfig::load(path)?)),
        None => DemorunConfig::discover()?,
    };
    let mut config = match found {
        Some((path, mut config)) => {
            tracing::debug!("Using configuration {}", path.display());
            if let Some(base) = path.parent() {
                config.rebase(base);
            }
            config
        }
        None => DemorunConfig::default(),
    };
    if let Some(dir) = &cli.dir {
        config.registry.directory = dir.clone();
    }
    Ok(config)
}

fn parse_format(format: &str) -> anyhow::Result<OutputFormat> {
    format.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn list_units(dispatcher: &Dispatcher, filter: &str, format: &str) -> anyhow::Result<()> {
    let filter_re =
        Regex::new(filter).with_context(|| format!("Invalid filter pattern {:?}", filter))?;
    let units = filter_units(dispatcher.list()?, Some(&filter_re));

    match parse_format(format)? {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&units)?),
        OutputFormat::Human => print!("{}", format_unit_list(&units)),
    }
    Ok(())
}

fn show_unit(dispatcher: &Dispatcher, identifier: &str) -> anyhow::Result<()> {
    let view = dispatcher.view(identifier)?;
    eprintln!(
        "{} ({}, environment {})",
        view.unit.display_name,
        view.unit.path.display(),
        view.environment.display()
    );
    print!("{}", view.source);
    Ok(())
}

fn run_unit(dispatcher: &Dispatcher, identifier: &str, format: &str) -> anyhow::Result<()> {
    let format = parse_format(format)?;

    let spinner = match format {
        OutputFormat::Human => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("Running {}", identifier));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        }
        OutputFormat::Json => None,
    };

    let result = dispatcher.execute(identifier);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let rendered = result?;

    let output = match format {
        OutputFormat::Json => generate_json_outcome(&rendered)?,
        OutputFormat::Human => format_human_outcome(&rendered),
    };
    print!("{}", output);
    if format == OutputFormat::Json {
        println!();
    }

    if !rendered.status.is_success() {
        std::io::stdout().flush()?;
        std::process::exit(1);
    }
    Ok(())
}

fn batch_units(
    dispatcher: &Dispatcher,
    config: &DemorunConfig,
    output: Option<&PathBuf>,
    format: &str,
) -> anyhow::Result<()> {
    let format = parse_format(format)?;
    let report = run_batch(dispatcher, &config.batch.units);

    if let Some(path) = output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(generate_json_report(&report)?.as_bytes())?;
        eprintln!("Report written to: {}", path.display());
    }

    match format {
        OutputFormat::Json => println!("{}", generate_json_report(&report)?),
        OutputFormat::Human => print!("{}", format_human_batch(&report)),
    }
    Ok(())
}

fn init_config(path: &std::path::Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(path, DemorunConfig::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
