//! Markdown report generation.
//!
//! This module renders a [`Report`] as a Markdown document or as
//! pretty-printed JSON.

use crate::config::ReportConfig;
use crate::models::{
    ListingRow, ListingSummary, PriceBucket, RegionCount, Report, ReportMetadata, NO_LINK,
};
use crate::normalize::price::format_currency;
use anyhow::Result;

const BAR_CHAR: char = '█';

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, settings: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# ListingScope Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));

    if settings.include_listings {
        output.push_str(&generate_listings_section(&report.listings));
    }

    output.push_str(&generate_price_section(
        &report.insights.price_distribution,
        settings.bar_width,
    ));
    output.push_str(&generate_top_regions_section(
        &report.insights.region_distribution,
        settings.bar_width,
    ));
    output.push_str(&generate_regions_section(&report.regions));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    let filters = metadata.criteria.describe();
    let filters = if filters.is_empty() {
        "none".to_string()
    } else {
        filters.join(", ")
    };

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Filters:** {}\n", filters));
    section.push_str(&format!("- **Sort:** `{}`\n", metadata.criteria.sort));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &ListingSummary) -> String {
    let mut section = String::new();

    let average = if summary.priced_listings == 0 {
        "n/a".to_string()
    } else {
        format_currency(summary.average_price)
    };

    section.push_str("## Summary\n\n");
    section.push_str("| Total | Shown | Priced | Average Price |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.total_listings, summary.visible_listings, summary.priced_listings, average
    ));

    section
}

/// Generate the listings table.
fn generate_listings_section(rows: &[ListingRow]) -> String {
    let mut section = String::new();

    section.push_str("## Listings\n\n");

    if rows.is_empty() {
        section.push_str("No listings match the active filters.\n\n");
        return section;
    }

    section.push_str("| # | Name | Price | Region | Listed | Link |\n");
    section.push_str("|---:|:---|---:|:---|:---|:---|\n");

    for (i, row) in rows.iter().enumerate() {
        let link = if row.url == NO_LINK {
            "-".to_string()
        } else {
            format!("[view]({})", row.url)
        };

        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            escape_cell(&row.name),
            escape_cell(&row.price_display),
            escape_cell(row.region.as_deref().unwrap_or("-")),
            if row.listed.is_empty() { "-" } else { &row.listed },
            link
        ));
    }
    section.push('\n');

    section
}

/// Generate the price distribution section.
fn generate_price_section(buckets: &[PriceBucket], bar_width: usize) -> String {
    let mut section = String::new();

    section.push_str("## Price Distribution\n\n");
    section.push_str("| Range | Listings | |\n");
    section.push_str("|:---|---:|:---|\n");

    for bucket in buckets {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            bucket.label,
            bucket.count,
            bar(bucket.percentage_of_max, bar_width)
        ));
    }
    section.push('\n');

    section
}

/// Generate the top regions section.
fn generate_top_regions_section(regions: &[RegionCount], bar_width: usize) -> String {
    let mut section = String::new();

    section.push_str("## Top Regions\n\n");

    if regions.is_empty() {
        section.push_str("No listings carry a region.\n\n");
        return section;
    }

    section.push_str("| Region | Listings | |\n");
    section.push_str("|:---|---:|:---|\n");

    for region in regions {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&region.region),
            region.count,
            bar(region.percentage_of_max, bar_width)
        ));
    }
    section.push('\n');

    section
}

/// Generate the list of region selector values.
fn generate_regions_section(regions: &[String]) -> String {
    if regions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Regions\n\n");
    for region in regions {
        section.push_str(&format!("- {}\n", region));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by ListingScope v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Text bar proportional to `percentage` of `width`.
fn bar(percentage: f64, width: usize) -> String {
    let filled = (percentage.clamp(0.0, 100.0) / 100.0 * width as f64).round() as usize;
    BAR_CHAR.to_string().repeat(filled)
}

/// Keep user text from breaking a table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterCriteria, Insights, RegionSelector, SortMode};
    use chrono::Utc;

    fn create_test_report() -> Report {
        Report {
            metadata: ReportMetadata {
                source: "fixtures/listings.json".to_string(),
                generated_at: Utc::now(),
                criteria: FilterCriteria {
                    region: RegionSelector::Exact("Florida".to_string()),
                    sort: SortMode::PriceLow,
                    ..Default::default()
                },
                duration_seconds: 0.4,
            },
            summary: ListingSummary {
                total_listings: 3,
                visible_listings: 2,
                priced_listings: 2,
                average_price: 85_000.0,
            },
            regions: vec!["Florida".to_string(), "Idaho".to_string()],
            listings: vec![
                ListingRow {
                    id: "1".to_string(),
                    name: "Gulf Coast Marina".to_string(),
                    url: "https://example.com/1".to_string(),
                    price: 50_000.0,
                    price_display: "$50,000".to_string(),
                    region: Some("Florida".to_string()),
                    uploaded_at_ms: 1_709_596_800_000,
                    listed: "Mar 5".to_string(),
                },
                ListingRow {
                    id: "3".to_string(),
                    name: "Pipe | Drain Co".to_string(),
                    url: "#".to_string(),
                    price: 0.0,
                    price_display: "Contact for pricing".to_string(),
                    region: Some("Florida".to_string()),
                    uploaded_at_ms: 0,
                    listed: String::new(),
                },
            ],
            insights: Insights {
                price_distribution: vec![PriceBucket {
                    label: "$50K - $100K".to_string(),
                    lower_bound: 50_000.0,
                    upper_bound: Some(100_000.0),
                    count: 2,
                    percentage_of_max: 100.0,
                }],
                region_distribution: vec![
                    RegionCount {
                        region: "Florida".to_string(),
                        count: 2,
                        percentage_of_max: 100.0,
                    },
                    RegionCount {
                        region: "Idaho".to_string(),
                        count: 1,
                        percentage_of_max: 50.0,
                    },
                ],
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# ListingScope Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## Listings"));
        assert!(markdown.contains("## Price Distribution"));
        assert!(markdown.contains("## Top Regions"));
        assert!(markdown.contains("Gulf Coast Marina"));
        assert!(markdown.contains("[view](https://example.com/1)"));
        assert!(markdown.contains("Pipe \\| Drain Co"));
        assert!(markdown.contains("$85,000"));
    }

    #[test]
    fn test_listings_can_be_omitted() {
        let report = create_test_report();
        let settings = ReportConfig {
            include_listings: false,
            ..Default::default()
        };
        let markdown = generate_markdown_report(&report, &settings);

        assert!(!markdown.contains("## Listings"));
        assert!(markdown.contains("## Top Regions"));
    }

    #[test]
    fn test_empty_view() {
        let section = generate_listings_section(&[]);
        assert!(section.contains("No listings match the active filters."));
        assert!(!section.contains("| # |"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let report = create_test_report();
        let section = generate_metadata_section(&report.metadata);

        assert!(section.contains("fixtures/listings.json"));
        assert!(section.contains("region = Florida"));
        assert!(section.contains("`price-low`"));
    }

    #[test]
    fn test_bars_scale_with_width() {
        assert_eq!(bar(100.0, 20).chars().count(), 20);
        assert_eq!(bar(50.0, 20).chars().count(), 10);
        assert_eq!(bar(0.0, 20), "");
        assert_eq!(bar(100.0, 0), "");

        let section = generate_top_regions_section(&create_test_report().insights.region_distribution, 4);
        assert!(section.contains("| Florida | 2 | ████ |"));
        assert!(section.contains("| Idaho | 1 | ██ |"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"listings\""));
        assert!(json.contains("\"price_distribution\""));
        assert!(json.contains("\"price_display\": \"Contact for pricing\""));
    }
}
