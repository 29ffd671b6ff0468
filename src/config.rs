//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.listingscope.toml` files.

use crate::analysis::parse_price_bound;
use crate::cli::OutputFormat;
use crate::models::{FilterCriteria, RegionSelector, SortMode};
use crate::normalize::DateStyle;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".listingscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data store settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Default filter and sort parameters.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report path; `-` writes to stdout.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "listings_report.md".to_string()
}

/// Where listings are read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// HTTP(S) URL or path of a JSON file.
    #[serde(default)]
    pub location: Option<String>,
}

/// Filter parameters as written by a user.
///
/// Price bounds stay text here; unparseable text means "no bound".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub min_price: String,

    #[serde(default)]
    pub max_price: String,

    #[serde(default)]
    pub sort: SortMode,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            region: default_region(),
            min_price: String::new(),
            max_price: String::new(),
            sort: SortMode::default(),
        }
    }
}

fn default_region() -> String {
    RegionSelector::WILDCARD.to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Locale for listed dates, e.g. `en_US`.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Include the year in listed dates.
    #[serde(default)]
    pub show_year: bool,

    /// Include the listings table (Markdown only).
    #[serde(default = "default_true")]
    pub include_listings: bool,

    /// Width of distribution bars, in characters.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            locale: default_locale(),
            show_year: false,
            include_listings: true,
            bar_width: default_bar_width(),
        }
    }
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bar_width() -> usize {
    20
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// where the CLI provides an explicit value.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref source) = args.source {
            self.source.location = Some(source.clone());
        }

        if let Some(ref name) = args.name {
            self.filters.name = name.clone();
        }
        if let Some(ref region) = args.region {
            self.filters.region = region.clone();
        }
        if let Some(ref min) = args.min_price {
            self.filters.min_price = min.clone();
        }
        if let Some(ref max) = args.max_price {
            self.filters.max_price = max.clone();
        }
        if let Some(sort) = args.sort {
            self.filters.sort = sort;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref locale) = args.locale {
            self.report.locale = locale.clone();
        }

        // Flags always override
        if args.show_year {
            self.report.show_year = true;
        }
    }

    /// The data store location, required for every run.
    pub fn source_location(&self) -> Result<&str> {
        match self.source.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => Ok(location),
            _ => bail!(
                "No listing source given. Use --source, LISTINGSCOPE_SOURCE, or [source].location in {}",
                DEFAULT_CONFIG_FILE
            ),
        }
    }

    /// Active filter criteria.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            name: self.filters.name.clone(),
            region: RegionSelector::parse(&self.filters.region),
            min_price: parse_price_bound(&self.filters.min_price),
            max_price: parse_price_bound(&self.filters.max_price),
            sort: self.filters.sort,
        }
    }

    /// Date rendering settings.
    pub fn date_style(&self) -> DateStyle {
        DateStyle::new(&self.report.locale, self.report.show_year)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
