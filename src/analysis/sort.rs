//! Listing sort orders.
//!
//! Sorting is stable, so listings with equal keys keep their input order
//! (the store delivers newest uploads first).

use crate::models::{RawListing, SortMode};
use crate::normalize::{normalize_instant, normalize_price};
use feruca::Collator;
use std::cmp::Ordering;

/// Collation order for names: Unicode Collation Algorithm with the CLDR
/// root order, so accents and case are secondary to the base letters.
/// Byte order breaks exact ties.
pub fn compare_names(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b)
}

/// Return a newly ordered copy of `listings`; the input is left untouched.
pub fn sort_listings<'a>(listings: &[&'a RawListing], mode: SortMode) -> Vec<&'a RawListing> {
    let mut sorted = listings.to_vec();

    match mode {
        SortMode::Newest => sorted.sort_by_cached_key(|l| {
            std::cmp::Reverse(normalize_instant(l.uploaded_at.as_ref()))
        }),
        SortMode::Oldest => sorted.sort_by_cached_key(|l| normalize_instant(l.uploaded_at.as_ref())),
        SortMode::PriceLow => sorted.sort_by(|a, b| {
            normalize_price(a.price.as_ref()).total_cmp(&normalize_price(b.price.as_ref()))
        }),
        SortMode::PriceHigh => sorted.sort_by(|a, b| {
            normalize_price(b.price.as_ref()).total_cmp(&normalize_price(a.price.as_ref()))
        }),
        SortMode::Name => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| compare_names(&mut collator, a.name(), b.name()));
        }
    }

    sorted
}
