//! Data models for the listing engine.
//!
//! This module contains the raw records as they arrive from the data
//! store, the filter/sort parameters, and the derived report structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Display fallback for listings without a name.
pub const UNTITLED: &str = "Untitled";

/// Link fallback for listings without a URL.
pub const NO_LINK: &str = "#";

/// Raw price as stored upstream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// Already numeric, e.g. `150000`.
    Amount(f64),
    /// Free text, e.g. `"$1,250,000"` or `"Negotiable"`.
    Text(String),
    /// Any other JSON value (bool, array, object).
    Unsupported(serde_json::Value),
}

/// Document-store timestamp object (`{ "seconds": .., "nanoseconds": .. }`).
///
/// Only JSON objects decode into this type; arrays and scalars stay
/// [`RawTimestamp::Unsupported`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct TimestampObject {
    pub seconds: Option<i64>,
    pub nanoseconds: Option<u32>,
}

/// First non-null value among `names`.
fn first_field<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| map.get(*name))
        .find(|value| !value.is_null())
}

impl TryFrom<Map<String, Value>> for TimestampObject {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let seconds = match first_field(&map, &["seconds", "_seconds"]) {
            None => None,
            Some(value) => Some(value.as_i64().ok_or("seconds must be an integer")?),
        };

        let nanoseconds = match first_field(&map, &["nanoseconds", "_nanoseconds"]) {
            None => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or("nanoseconds must be a 32-bit unsigned integer")?,
            ),
        };

        Ok(Self {
            seconds,
            nanoseconds,
        })
    }
}

/// Raw upload time as stored upstream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch milliseconds.
    Millis(f64),
    /// Textual date, e.g. `"2024-03-05T10:00:00Z"`.
    Text(String),
    /// Opaque temporal object exposing its own conversion.
    Convertible(TimestampObject),
    Unsupported(serde_json::Value),
}

/// A single listing record, read-only once fetched.
///
/// Text fields of the wrong JSON type read as absent instead of failing
/// the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawListing {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, rename = "uploadedAt")]
    pub uploaded_at: Option<RawTimestamp>,
}

/// Strings pass through; any other JSON value becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

/// Numeric ids are kept in their decimal form.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => id,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

impl RawListing {
    /// Name as used for filtering and sorting (empty when absent).
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Name as shown to a reader.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNTITLED,
        }
    }

    /// External link, `#` when absent.
    pub fn url(&self) -> &str {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => NO_LINK,
        }
    }

    /// Region label, `None` when absent or empty.
    pub fn region(&self) -> Option<&str> {
        self.state.as_deref().filter(|s| !s.is_empty())
    }
}

/// Sort order for the visible listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Most recently uploaded first
    #[default]
    Newest,
    /// Oldest upload first
    Oldest,
    /// Cheapest first
    PriceLow,
    /// Most expensive first
    PriceHigh,
    /// Alphabetical by name
    Name,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Newest => write!(f, "newest"),
            SortMode::Oldest => write!(f, "oldest"),
            SortMode::PriceLow => write!(f, "price-low"),
            SortMode::PriceHigh => write!(f, "price-high"),
            SortMode::Name => write!(f, "name"),
        }
    }
}

/// Region filter: wildcard or an exact label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionSelector {
    #[default]
    All,
    Exact(String),
}

impl RegionSelector {
    /// Wildcard value accepted from user input.
    pub const WILDCARD: &'static str = "all";

    /// Parse user input; `all` and blank input mean no region filter.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == Self::WILDCARD {
            RegionSelector::All
        } else {
            RegionSelector::Exact(trimmed.to_string())
        }
    }
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelector::All => write!(f, "{}", Self::WILDCARD),
            RegionSelector::Exact(region) => write!(f, "{}", region),
        }
    }
}

/// Active filter and sort parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    /// Case-insensitive name substring; empty disables the filter.
    pub name: String,
    pub region: RegionSelector,
    /// Lower price bound, inclusive. `None` means 0.
    pub min_price: Option<f64>,
    /// Upper price bound, inclusive. `None` means unbounded.
    pub max_price: Option<f64>,
    pub sort: SortMode,
}

impl FilterCriteria {
    /// Human-readable list of the filters that are actually active.
    pub fn describe(&self) -> Vec<String> {
        let mut active = Vec::new();

        if !self.name.is_empty() {
            active.push(format!("name contains \"{}\"", self.name));
        }
        if let RegionSelector::Exact(ref region) = self.region {
            active.push(format!("region = {}", region));
        }
        if let Some(min) = self.min_price {
            active.push(format!("price >= {}", min));
        }
        if let Some(max) = self.max_price {
            active.push(format!("price <= {}", max));
        }

        active
    }
}

/// One histogram bucket of the price distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBucket {
    pub label: String,
    /// Inclusive lower bound in dollars.
    pub lower_bound: f64,
    /// Exclusive upper bound in dollars; `None` is unbounded.
    pub upper_bound: Option<f64>,
    pub count: usize,
    pub percentage_of_max: f64,
}

impl PriceBucket {
    /// Whether `price` falls inside `[lower_bound, upper_bound)`.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower_bound && self.upper_bound.map_or(true, |upper| price < upper)
    }
}

/// Listing count for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
    pub percentage_of_max: f64,
}

/// Aggregate views over the full, unfiltered dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Insights {
    pub price_distribution: Vec<PriceBucket>,
    pub region_distribution: Vec<RegionCount>,
}

/// Summary scalars.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingSummary {
    /// Listings in the snapshot.
    pub total_listings: usize,
    /// Listings left after filtering.
    pub visible_listings: usize,
    /// Listings with a non-zero normalized price.
    pub priced_listings: usize,
    /// Mean over `priced_listings`, 0 when there are none.
    pub average_price: f64,
}

/// Display-ready projection of one visible listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    pub id: String,
    pub name: String,
    pub url: String,
    pub price: f64,
    pub price_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub uploaded_at_ms: i64,
    pub listed: String,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the snapshot was read from.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub criteria: FilterCriteria,
    /// Time spent fetching and computing, in seconds.
    pub duration_seconds: f64,
}

/// The complete listings report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: ListingSummary,
    /// Distinct region labels, ascending.
    pub regions: Vec<String>,
    /// Filtered and sorted listings.
    pub listings: Vec<ListingRow>,
    pub insights: Insights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_field_fallbacks() {
        let listing = RawListing::default();
        assert_eq!(listing.name(), "");
        assert_eq!(listing.display_name(), "Untitled");
        assert_eq!(listing.url(), "#");
        assert_eq!(listing.region(), None);

        let listing = RawListing {
            name: Some("Corner Bakery".to_string()),
            url: Some(String::new()),
            state: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(listing.display_name(), "Corner Bakery");
        assert_eq!(listing.url(), "#");
        assert_eq!(listing.region(), None);
    }

    #[test]
    fn test_deserialize_heterogeneous_fields() {
        let json = r#"[
            {"id": "a", "name": "Cafe", "price": 150000, "state": "Florida",
             "uploadedAt": 1700000000000},
            {"id": "b", "price": "$1,250,000", "uploadedAt": "2024-03-05"},
            {"id": "c", "price": null, "uploadedAt": {"seconds": 1700000000, "nanoseconds": 5}},
            {"id": "d", "price": true, "uploadedAt": {"_seconds": 1, "_nanoseconds": 0}},
            {"id": "e", "uploadedAt": [1, 2]}
        ]"#;

        let listings: Vec<RawListing> = serde_json::from_str(json).unwrap();
        assert_eq!(listings.len(), 5);
        assert_eq!(listings[0].price, Some(RawPrice::Amount(150000.0)));
        assert_eq!(
            listings[0].uploaded_at,
            Some(RawTimestamp::Millis(1_700_000_000_000.0))
        );
        assert_eq!(
            listings[1].price,
            Some(RawPrice::Text("$1,250,000".to_string()))
        );
        assert_eq!(listings[2].price, None);
        assert_eq!(
            listings[2].uploaded_at,
            Some(RawTimestamp::Convertible(TimestampObject {
                seconds: Some(1_700_000_000),
                nanoseconds: Some(5),
            }))
        );
        assert!(matches!(listings[3].price, Some(RawPrice::Unsupported(_))));
        assert_eq!(
            listings[3].uploaded_at,
            Some(RawTimestamp::Convertible(TimestampObject {
                seconds: Some(1),
                nanoseconds: Some(0),
            }))
        );
        assert!(matches!(
            listings[4].uploaded_at,
            Some(RawTimestamp::Unsupported(_))
        ));
    }

    #[test]
    fn test_array_timestamp_is_unsupported() {
        let raw: RawTimestamp = serde_json::from_str("[1, 2]").unwrap();
        assert!(matches!(raw, RawTimestamp::Unsupported(_)));

        let raw: RawTimestamp = serde_json::from_str(r#"{"seconds": "soon"}"#).unwrap();
        assert!(matches!(raw, RawTimestamp::Unsupported(_)));

        let raw: RawTimestamp = serde_json::from_str("{}").unwrap();
        assert_eq!(
            raw,
            RawTimestamp::Convertible(TimestampObject {
                seconds: None,
                nanoseconds: None,
            })
        );
    }

    #[test]
    fn test_mistyped_text_fields_read_as_absent() {
        let listing: RawListing = serde_json::from_str(
            r#"{"id": 7, "name": 42, "url": false, "state": ["Ohio"], "price": 10}"#,
        )
        .unwrap();

        assert_eq!(listing.id, "7");
        assert_eq!(listing.name, None);
        assert_eq!(listing.url(), "#");
        assert_eq!(listing.region(), None);
        assert_eq!(listing.price, Some(RawPrice::Amount(10.0)));

        let listing: RawListing = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(listing, RawListing::default());
    }

    #[test]
    fn test_region_selector_parse() {
        assert_eq!(RegionSelector::parse("all"), RegionSelector::All);
        assert_eq!(RegionSelector::parse("  "), RegionSelector::All);
        assert_eq!(
            RegionSelector::parse("Idaho"),
            RegionSelector::Exact("Idaho".to_string())
        );
        assert_eq!(RegionSelector::parse("Idaho").to_string(), "Idaho");
        assert_eq!(RegionSelector::All.to_string(), "all");
    }

    #[test]
    fn test_criteria_describe() {
        let criteria = FilterCriteria {
            name: "cafe".to_string(),
            region: RegionSelector::Exact("Florida".to_string()),
            min_price: Some(60000.0),
            max_price: None,
            sort: SortMode::PriceLow,
        };

        let active = criteria.describe();
        assert_eq!(active.len(), 3);
        assert!(active[0].contains("cafe"));
        assert!(active[1].contains("Florida"));
        assert!(active[2].contains("60000"));
        assert!(FilterCriteria::default().describe().is_empty());
    }

    #[test]
    fn test_bucket_contains() {
        let bucket = PriceBucket {
            label: "x".to_string(),
            lower_bound: 50_000.0,
            upper_bound: Some(100_000.0),
            count: 0,
            percentage_of_max: 0.0,
        };
        assert!(bucket.contains(50_000.0));
        assert!(bucket.contains(99_999.99));
        assert!(!bucket.contains(100_000.0));

        let open = PriceBucket {
            upper_bound: None,
            ..bucket
        };
        assert!(open.contains(10_000_000.0));
    }
}
