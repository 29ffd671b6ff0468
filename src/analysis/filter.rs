//! Listing filters.
//!
//! A listing is visible when it passes every active criterion. Listings
//! with an unknown price (normalized to 0) are never excluded by the price
//! range.

use crate::models::{FilterCriteria, RawListing, RegionSelector};
use crate::normalize::{normalize_price, parse_amount};

/// Parse a user-supplied price bound.
///
/// Blank or non-numeric text yields `None`, which the filter reads as the
/// default bound. Never yields `NaN`.
pub fn parse_price_bound(input: &str) -> Option<f64> {
    parse_amount(input)
}

/// Name criterion: case-insensitive substring, empty always matches.
pub fn matches_name(listing: &RawListing, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    listing
        .name()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

/// Region criterion: exact, case-sensitive label match unless wildcard.
pub fn matches_region(listing: &RawListing, selector: &RegionSelector) -> bool {
    match selector {
        RegionSelector::All => true,
        RegionSelector::Exact(region) => listing.state.as_deref() == Some(region.as_str()),
    }
}

/// Price criterion with the unknown-price exemption.
pub fn matches_price(listing: &RawListing, min: Option<f64>, max: Option<f64>) -> bool {
    let price = normalize_price(listing.price.as_ref());
    if price == 0.0 {
        return true;
    }

    let min = min.filter(|v| !v.is_nan()).unwrap_or(0.0);
    let max = max.filter(|v| !v.is_nan()).unwrap_or(f64::INFINITY);

    min <= price && price <= max
}

/// Whether a single listing passes all criteria.
pub fn matches(listing: &RawListing, criteria: &FilterCriteria) -> bool {
    matches_name(listing, &criteria.name)
        && matches_region(listing, &criteria.region)
        && matches_price(listing, criteria.min_price, criteria.max_price)
}

/// Listings passing `criteria`, in input order.
pub fn filter_listings<'a>(
    listings: &'a [RawListing],
    criteria: &FilterCriteria,
) -> Vec<&'a RawListing> {
    listings
        .iter()
        .filter(|listing| matches(listing, criteria))
        .collect()
}
