//! pubmed-industry - fetch PubMed papers with industry-affiliated authors
//!
//! ## Usage
//!
//! ```bash
//! pubmed-industry "cancer immunotherapy" --output papers.csv --max-results 20
//! ```

use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::Parser;
use pubmed_industry::eutils::{ClientConfig, PubMedClient, DEFAULT_MAX_RESULTS};
use pubmed_industry::export::{render_record, save_csv, DEFAULT_OUTPUT};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers and export those with company affiliations to CSV
#[derive(Parser)]
#[command(name = "pubmed-industry")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Search query for PubMed
    #[arg(value_parser = non_empty_query)]
    query: String,

    /// Output CSV file name
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Maximum number of PubMed IDs to fetch
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_MAX_RESULTS,
        value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize)
    )]
    max_results: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn non_empty_query(s: &str) -> std::result::Result<String, String> {
    if s.trim().is_empty() {
        Err("query must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so stdout only carries results)
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let client = PubMedClient::new(ClientConfig::default())?;

    info!(query = %cli.query, "Fetching papers for query");
    let ids = client.search(&cli.query, cli.max_results).await;

    if ids.is_empty() {
        println!("No papers found.");
        return Ok(());
    }

    let papers = client.fetch_details(&ids).await;

    if papers.is_empty() {
        println!("No detailed data found.");
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for paper in &papers {
        render_record(&mut out, paper).context("Failed to print record")?;
    }
    out.flush().context("Failed to flush stdout")?;
    drop(out);

    save_csv(&cli.output, &papers)
        .with_context(|| format!("Failed to write CSV to {}", cli.output.display()))?;
    println!("\nData saved to {}", cli.output.display());

    Ok(())
}
