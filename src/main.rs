//! ListingScope - business-for-sale listing browser
//!
//! A CLI tool that reads a snapshot of listings from a JSON data store,
//! filters and sorts it, and writes a report with price and region
//! insights.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Retrieval failure or other runtime error (config, output, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod normalize;
mod report;
mod store;

use analysis::Dashboard;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{ListingRow, Report, ReportMetadata};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ListingScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .listingscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the listing source, default filters, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let level = LevelFilter::from_level(args.log_level());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete workflow. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let announce = announces_status(&args, &config);

    let location = config.source_location()?.to_string();

    // Step 1: Read the snapshot, once
    if announce {
        println!("📥 Loading listings: {}", location);
    }
    let listing_store = store::open_store(&location);
    let listings = match store::load_snapshot(listing_store.as_ref(), !args.quiet).await {
        Ok(listings) => listings,
        Err(e) => {
            error!("Failed to load listings: {}", e);
            eprintln!("\n❌ Failed to load listings: {}", e);
            return Ok(1);
        }
    };

    let dashboard = Dashboard::new(&listings);
    if dashboard.is_empty() {
        warn!("Data store returned no listings");
    }

    // Handle --list-regions: print selector values and exit
    if args.list_regions {
        for region in dashboard.regions() {
            println!("{}", region);
        }
        return Ok(0);
    }

    // Step 2: Derive the views
    let criteria = config.criteria();
    let date_style = config.date_style();
    debug!("Active criteria: {:?}", criteria);

    let visible = dashboard.visible(&criteria);
    let rows: Vec<ListingRow> = visible
        .iter()
        .map(|listing| analysis::to_row(listing, &date_style))
        .collect();

    let summary = dashboard.summary(rows.len());
    let insights = dashboard.insights();

    // Step 3: Build the report
    if announce {
        println!("📝 Generating report...");
    }

    let report = Report {
        metadata: ReportMetadata {
            source: listing_store.describe(),
            generated_at: Utc::now(),
            criteria,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        summary: summary.clone(),
        regions: dashboard.regions(),
        listings: rows,
        insights,
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    write_output(&config.general.output, &output)?;

    if announce {
        println!("\n📊 Listing Summary:");
        println!(
            "   Shown: {} of {} listings",
            summary.visible_listings, summary.total_listings
        );
        println!("   Priced: {}", summary.priced_listings);
        println!("   Duration: {:.1}s", report.metadata.duration_seconds);
        println!("\n✅ Report saved to: {}", config.general.output);
    }

    Ok(0)
}

/// Whether progress lines go to stdout. They would corrupt a report or
/// region list written there.
fn announces_status(args: &Args, config: &Config) -> bool {
    !args.quiet && !args.list_regions && config.general.output != "-"
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Write the rendered report to a file, or to stdout for `-`.
fn write_output(target: &str, content: &str) -> Result<()> {
    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write report to stdout")?;
        return Ok(());
    }

    std::fs::write(target, content)
        .with_context(|| format!("Failed to write report to {}", target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> bool {
        let mut argv = vec!["listingscope", "--source", "listings.json"];
        argv.extend_from_slice(extra);
        let args = Args::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        config.merge_with_args(&args);
        announces_status(&args, &config)
    }

    #[test]
    fn test_status_lines_stay_off_stdout_output() {
        assert!(parse(&[]));
        assert!(!parse(&["--list-regions"]));
        assert!(!parse(&["--output", "-"]));
        assert!(!parse(&["--quiet"]));
    }
}
