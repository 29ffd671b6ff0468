//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::SortMode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ListingScope - browse a business-for-sale listing snapshot
///
/// Reads every listing from a JSON data store, filters and sorts them,
/// and writes a Markdown or JSON report with price and region insights.
///
/// Examples:
///   listingscope --source https://example.com/listings.json
///   listingscope --source listings.json --region Florida --sort price-low
///   listingscope --source listings.json --min-price 50000 --max-price "$250,000"
///   listingscope --source listings.json --format json --output -
///   listingscope --source listings.json --list-regions
///   listingscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Listing data store: an http(s) URL or a JSON file path
    ///
    /// Can also be set via LISTINGSCOPE_SOURCE or [source].location in
    /// .listingscope.toml.
    #[arg(short, long, value_name = "URL|FILE", env = "LISTINGSCOPE_SOURCE")]
    pub source: Option<String>,

    /// Keep listings whose name contains this text (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub name: Option<String>,

    /// Keep listings in this exact region, or "all"
    #[arg(short, long, value_name = "REGION")]
    pub region: Option<String>,

    /// Minimum price, as free text (e.g. 50000 or "$50,000")
    ///
    /// Text that is not a number means "no minimum".
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    pub min_price: Option<String>,

    /// Maximum price, as free text
    ///
    /// Text that is not a number means "no maximum".
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    pub max_price: Option<String>,

    /// Sort order (newest, oldest, price-low, price-high, name)
    #[arg(long, value_name = "MODE")]
    pub sort: Option<SortMode>,

    /// Output file path for the report, or "-" for stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .listingscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Locale for listed dates (e.g. en_US, de_DE)
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Include the year in listed dates
    #[arg(long)]
    pub show_year: bool,

    /// Print the distinct regions in the snapshot and exit
    #[arg(long)]
    pub list_regions: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .listingscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    ///
    /// A missing source is not an error here; it may still come from the
    /// config file.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref source) = self.source {
            if source.trim().is_empty() {
                return Err("Source must not be empty".to_string());
            }
        }

        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            source: Some("fixtures/listings.json".to_string()),
            name: None,
            region: None,
            min_price: None,
            max_price: None,
            sort: None,
            output: None,
            format: None,
            config: None,
            locale: None,
            show_year: false,
            list_regions: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "listingscope",
            "--source",
            "https://example.com/listings.json",
            "--region",
            "Florida",
            "--min-price",
            "$50,000",
            "--sort",
            "price-high",
            "--format",
            "json",
            "-o",
            "-",
        ])
        .unwrap();

        assert_eq!(args.region.as_deref(), Some("Florida"));
        assert_eq!(args.min_price.as_deref(), Some("$50,000"));
        assert_eq!(args.sort, Some(SortMode::PriceHigh));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.output, Some(PathBuf::from("-")));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_source() {
        let mut args = make_args();
        args.source = Some("  ".to_string());
        assert!(args.validate().is_err());

        args.source = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
