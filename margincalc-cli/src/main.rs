//! margincalc command-line driver
//!
//! Writes the CSV template, runs the calculator over imported tables and compares
//! scenarios.
//!
//! # Usage
//!
//! ```bash
//! margincalc template            # writes margin_template.csv
//! margincalc template --stdout
//! margincalc compute --input products.csv --raw-price 70
//! margincalc compare --a current.csv --b proposed.csv --raw-price 70
//! margincalc init-session --output session.toml
//! margincalc session --config session.toml
//! ```

mod commands;

use clap::{Parser, Subcommand};
use margincalc_core::table_io::TEMPLATE_FILE_NAME;
use std::path::PathBuf;

/// Contribution-margin calculator for product mixes
#[derive(Parser, Debug)]
#[command(name = "margincalc")]
#[command(about = "Calculate and compare contribution margins of product scenarios")]
struct Args {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the product CSV template
    Template {
        /// Destination file
        #[arg(short, long, default_value = TEMPLATE_FILE_NAME)]
        output: PathBuf,

        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// Calculate margins for one product table
    Compute {
        /// Product table as CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Raw material price per kg
        #[arg(short, long, default_value = "70", value_parser = parse_price)]
        raw_price: f64,

        /// Write results as CSV instead of a text table
        #[arg(long)]
        csv: bool,
    },
    /// Compare two product tables at the same raw material price
    Compare {
        /// Scenario A product table as CSV
        #[arg(long)]
        a: PathBuf,

        /// Scenario B product table as CSV
        #[arg(long)]
        b: PathBuf,

        /// Raw material price per kg
        #[arg(short, long, default_value = "70", value_parser = parse_price)]
        raw_price: f64,
    },
    /// Print both scenarios and their comparison from a session file
    Session {
        /// Session file (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write a session file with the default products in both scenarios
    InitSession {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_price(s: &str) -> Result<f64, String> {
    margincalc_core::config::parse_raw_price(s).map_err(|e| e.to_string())
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut stdout = std::io::stdout().lock();
    let result = match args.command {
        Command::Template { output, stdout: to_stdout } => {
            let output = (!to_stdout).then_some(output.as_path());
            commands::template(output, &mut stdout)
        }
        Command::Compute {
            input,
            raw_price,
            csv,
        } => commands::compute(&input, raw_price, csv, &mut stdout),
        Command::Compare { a, b, raw_price } => commands::compare(&a, &b, raw_price, &mut stdout),
        Command::Session { config } => commands::session(&config, &mut stdout),
        Command::InitSession { output } => commands::init_session(&output),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
