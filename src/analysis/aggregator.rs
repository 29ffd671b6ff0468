//! Listing aggregation and statistics.
//!
//! These views are computed over the full, unfiltered snapshot so they do
//! not move when the reader changes filters.

use crate::models::{Insights, ListingSummary, PriceBucket, RawListing, RegionCount};
use crate::normalize::normalize_price;
use std::collections::{BTreeSet, HashMap};

/// Number of regions kept in the region distribution.
pub const TOP_REGIONS: usize = 10;

/// Fixed price buckets: (label, inclusive lower, exclusive upper).
const PRICE_BUCKETS: [(&str, f64, Option<f64>); 5] = [
    ("Under $50K", 0.0, Some(50_000.0)),
    ("$50K - $100K", 50_000.0, Some(100_000.0)),
    ("$100K - $250K", 100_000.0, Some(250_000.0)),
    ("$250K - $500K", 250_000.0, Some(500_000.0)),
    ("$500K+", 500_000.0, None),
];

/// `count` as a percentage of `max`, with `max` floored at 1.
fn percentage_of(count: usize, max: usize) -> f64 {
    count as f64 / max.max(1) as f64 * 100.0
}

/// Histogram of known prices. Unknown (0) prices land in no bucket;
/// negative amounts count toward the lowest bucket.
pub fn price_distribution(listings: &[RawListing]) -> Vec<PriceBucket> {
    let mut buckets: Vec<PriceBucket> = PRICE_BUCKETS
        .iter()
        .map(|(label, lower, upper)| PriceBucket {
            label: label.to_string(),
            lower_bound: *lower,
            upper_bound: *upper,
            count: 0,
            percentage_of_max: 0.0,
        })
        .collect();

    for listing in listings {
        let price = normalize_price(listing.price.as_ref());
        if price == 0.0 {
            continue;
        }
        let price = price.max(0.0);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(price)) {
            bucket.count += 1;
        }
    }

    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &mut buckets {
        bucket.percentage_of_max = percentage_of(bucket.count, max);
    }

    buckets
}

/// Count listings per region, in order of first appearance.
pub fn count_by_region(listings: &[RawListing]) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for region in listings.iter().filter_map(RawListing::region) {
        match index.get(region) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(region, counts.len());
                counts.push((region.to_string(), 1));
            }
        }
    }

    counts
}

/// Top regions by listing count, with percentages relative to the largest
/// retained region.
pub fn region_distribution(listings: &[RawListing]) -> Vec<RegionCount> {
    let mut counts = count_by_region(listings);

    // Stable, so equal counts keep first-appearance order.
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counts.truncate(TOP_REGIONS);

    let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);

    counts
        .into_iter()
        .map(|(region, count)| RegionCount {
            region,
            count,
            percentage_of_max: percentage_of(count, max),
        })
        .collect()
}

/// Both insight views.
pub fn insights(listings: &[RawListing]) -> Insights {
    Insights {
        price_distribution: price_distribution(listings),
        region_distribution: region_distribution(listings),
    }
}

/// Distinct region labels, ascending, for a region selector.
pub fn distinct_regions(listings: &[RawListing]) -> Vec<String> {
    listings
        .iter()
        .filter_map(RawListing::region)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Summary scalars. `visible` is the size of the filtered view.
pub fn summarize(listings: &[RawListing], visible: usize) -> ListingSummary {
    let prices: Vec<f64> = listings
        .iter()
        .map(|l| normalize_price(l.price.as_ref()))
        .filter(|p| *p != 0.0)
        .collect();

    let average_price = if prices.is_empty() {
        0.0
    } else {
        prices.iter().sum::<f64>() / prices.len() as f64
    };

    ListingSummary {
        total_listings: listings.len(),
        visible_listings: visible,
        priced_listings: prices.len(),
        average_price,
    }
}
