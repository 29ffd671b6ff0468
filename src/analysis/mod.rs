//! Listing analysis.
//!
//! [`Dashboard`] wraps an immutable snapshot and recomputes each derived
//! view on demand. The visible-list pipeline (filter then sort) and the
//! insight pipeline are independent of each other.

pub mod aggregator;
pub mod filter;
pub mod sort;

pub use aggregator::*;
pub use filter::{filter_listings, parse_price_bound};
pub use sort::sort_listings;

use crate::models::{FilterCriteria, Insights, ListingRow, ListingSummary, RawListing};
use crate::normalize::{
    display_price, format_listed_date, normalize_instant, normalize_price, DateStyle,
};
use tracing::debug;

/// Pull-based views over one snapshot of listings.
pub struct Dashboard<'a> {
    listings: &'a [RawListing],
}

impl<'a> Dashboard<'a> {
    pub fn new(listings: &'a [RawListing]) -> Self {
        Self { listings }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Filtered and sorted listings.
    pub fn visible(&self, criteria: &FilterCriteria) -> Vec<&'a RawListing> {
        let filtered = filter_listings(self.listings, criteria);
        debug!(
            "Filter kept {} of {} listings",
            filtered.len(),
            self.listings.len()
        );
        sort_listings(&filtered, criteria.sort)
    }

    /// Region selector values.
    pub fn regions(&self) -> Vec<String> {
        distinct_regions(self.listings)
    }

    /// Price and region distributions over the whole snapshot.
    pub fn insights(&self) -> Insights {
        insights(self.listings)
    }

    pub fn summary(&self, visible: usize) -> ListingSummary {
        summarize(self.listings, visible)
    }
}

/// Project a listing into its display form.
pub fn to_row(listing: &RawListing, style: &DateStyle) -> ListingRow {
    ListingRow {
        id: listing.id.clone(),
        name: listing.display_name().to_string(),
        url: listing.url().to_string(),
        price: normalize_price(listing.price.as_ref()),
        price_display: display_price(listing.price.as_ref()),
        region: listing.region().map(String::from),
        uploaded_at_ms: normalize_instant(listing.uploaded_at.as_ref()),
        listed: format_listed_date(listing.uploaded_at.as_ref(), style),
    }
}
