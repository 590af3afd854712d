use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod compute;
mod data;
mod read;
mod write;

use compute::{
    donation_counts, donation_totals, filter_committees, histogram_rows,
    small_donation_percentages,
};
use data::{AmountPolicy, TRACKED_COMMITTEES};
use read::read_merged;
use write::write_artifact;

/// Summarizes FEC individual-contribution files for the three tracked
/// 2016 presidential campaigns.
#[derive(Parser)]
#[command(name = "election-donations")]
#[command(about = "Donation statistics for the tracked campaign committees", long_about = None)]
struct Cli {
    /// Pipe-delimited bulk contribution file (no header row)
    #[arg(short = 'd', long, default_value = "itcont.txt")]
    data: PathBuf,

    /// Comma-delimited file whose first row names the columns
    #[arg(short = 'H', long, default_value = "indiv_header_file.csv")]
    header: PathBuf,

    /// Directory the four output artifacts are written under
    #[arg(short = 'o', long, default_value = "output")]
    output: PathBuf,

    /// Skip (and count) rows with non-numeric amounts instead of aborting
    #[arg(long)]
    lenient: bool,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let policy = if cli.lenient {
        AmountPolicy::SkipAndCount
    } else {
        AmountPolicy::Strict
    };

    let header = std::fs::File::open(&cli.header)
        .with_context(|| format!("opening header table {}", cli.header.display()))?;
    let body = std::fs::File::open(&cli.data)
        .with_context(|| format!("opening body table {}", cli.data.display()))?;
    let merged = read_merged(header, body, policy)?;
    info!(records = merged.len(), "source tables merged");

    let donations = filter_committees(merged, &TRACKED_COMMITTEES);
    info!(
        records = donations.len(),
        committees = ?TRACKED_COMMITTEES,
        "filtered to tracked committees"
    );

    // Each artifact is written independently; one failed write must not
    // keep the others from being attempted or reported.
    let out = &cli.output;
    let artifacts = [
        (
            "number_of_donations_per_campaign",
            write_artifact(out, "number_of_donations_per_campaign", &donation_counts(&donations)),
        ),
        (
            "donation_amount_per_campaign",
            write_artifact(out, "donation_amount_per_campaign", &donation_totals(&donations)),
        ),
        (
            "small_donations_percentage",
            write_artifact(out, "small_donations_percentage", &small_donation_percentages(&donations)),
        ),
        (
            "donation_data_for_histogram",
            write_artifact(out, "donation_data_for_histogram", &histogram_rows(&donations)),
        ),
    ];

    let mut failed = 0usize;
    for (name, result) in artifacts {
        match result {
            Ok(path) => info!(artifact = name, path = %path.display(), "artifact written"),
            Err(e) => {
                error!(artifact = name, error = %format!("{e:#}"), "artifact failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of 4 output artifacts failed");
    }
    Ok(())
}
