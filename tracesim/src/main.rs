use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracelib::config::{CacheKind, RunConfig};
use tracelib::expr;
use tracelib::row::Row;
use tracelib::simulator::{fill_direct_mapped, fill_fully_associative, fill_two_way, Simulator};

#[derive(Parser, Debug)]
#[command(about = "Worked cache-access tables for trace exercises")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a trace of address expressions against a cache configuration
    Simulate {
        /// File path to the JSON cache configuration
        config: PathBuf,
        /// File path to the trace, one address expression per line
        trace: PathBuf,
    },
    /// Complete pre-decomposed rows with their occupancy columns
    Fill {
        /// Cache organization: direct, full, 2way, or 4way
        #[arg(short, long)]
        kind: CacheKind,
        /// File path to the JSON array of input rows
        rows: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }

    let rows = match args.command {
        Command::Simulate { config, trace } => {
            let config_file = File::open(&config)
                .with_context(|| format!("couldn't open the config file at {}", config.display()))?;
            let config: RunConfig = serde_json::from_reader(BufReader::new(config_file))
                .context("couldn't parse the config file")?;
            let trace_text = fs::read_to_string(&trace)
                .with_context(|| format!("couldn't read the trace file at {}", trace.display()))?;
            let trace: Vec<String> = trace_text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
            let mut simulator = Simulator::new(&config);
            let rows = simulator.simulate(&trace, expr::evaluate);
            log::info!(
                "{} rows simulated, {} cache lines left empty",
                rows.len(),
                simulator.empty_line_count()
            );
            rows
        }
        Command::Fill { kind, rows } => {
            let rows_file = File::open(&rows)
                .with_context(|| format!("couldn't open the rows file at {}", rows.display()))?;
            let input: Vec<Row> = serde_json::from_reader(BufReader::new(rows_file))
                .context("couldn't parse the rows file")?;
            match kind {
                CacheKind::Direct => fill_direct_mapped(&input),
                CacheKind::Full => fill_fully_associative(&input),
                CacheKind::TwoWay | CacheKind::FourWay => fill_two_way(&input),
            }
        }
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&rows).context("couldn't serialise the output")?
    );
    Ok(())
}
