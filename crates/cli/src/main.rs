use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "caterm", version, about = "Parse bank statements and categorize transactions")]
struct Cli {
    /// Configuration file (default: ./caterm.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from statements into the clean transactions file
    Parse {
        /// Statement files (defaults to `statements` from the config)
        files: Vec<PathBuf>,

        /// Clean transactions file to append to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the batch report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Categorize the clean transactions file
    Categorize {
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,

        /// Minimum confidence in percent (default: config, 99)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Parse the configured statements, then categorize
    Run {
        /// Print the batch report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    logging::init(&cfg.logging)?;

    match cli.command {
        Command::Parse {
            files,
            output,
            json,
        } => {
            let report = commands::parse(&cfg, files, output)?;
            print_report(&report, json)?;
        }

        Command::Categorize {
            input,
            output,
            threshold,
        } => {
            let summary = commands::categorize(&cfg, input, output, threshold)?;
            commands::print_summary(&summary);
        }

        Command::Run { json } => {
            tracing::info!("Starting transaction processing pipeline");
            let report = commands::parse(&cfg, Vec::new(), None)?;
            let summary = commands::categorize(&cfg, None, None, None)?;
            if json {
                let both = serde_json::json!({ "import": report, "categorize": summary });
                println!("{}", serde_json::to_string_pretty(&both)?);
            } else {
                commands::print_report(&report);
                commands::print_summary(&summary);
            }
        }
    }

    Ok(())
}

fn print_report(report: &caterm_import::BatchReport, json: bool) -> Result<()> {
    if json {
        let s = serde_json::to_string_pretty(report).context("serialize batch report")?;
        println!("{s}");
    } else {
        commands::print_report(report);
    }
    Ok(())
}
