//! Price normalization.
//!
//! Upstream prices arrive as numbers, decorated text (`"$1,250,000"`) or
//! placeholder text (`"Negotiable"`). The numeric form drives filtering and
//! sorting; 0 means unknown.

use crate::models::RawPrice;

/// Shown when a listing carries no usable price.
pub const CONTACT_FOR_PRICING: &str = "Contact for pricing";

/// Characters stripped from price text before parsing.
fn is_decoration(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥' | ',') || c.is_whitespace()
}

/// Parse decorated amount text such as `"$1,250,000"` or `"120000 OBO"`.
///
/// Currency symbols, grouping commas and whitespace are removed, then the
/// longest leading decimal number is read. Returns `None` when there is no
/// number or it is not finite.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !is_decoration(*c)).collect();
    let prefix = numeric_prefix(&cleaned);

    if prefix.is_empty() {
        return None;
    }

    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest prefix of `s` that reads as a decimal number.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut digit_count = int_end - end;
    end = int_end;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        let frac_count = frac_end - (end + 1);
        if digit_count > 0 || frac_count > 0 {
            digit_count += frac_count;
            end = frac_end;
        }
    }

    if digit_count == 0 {
        return "";
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Numeric form of a raw price. Unknown or unparseable prices are 0.
pub fn normalize_price(raw: Option<&RawPrice>) -> f64 {
    match raw {
        Some(RawPrice::Amount(amount)) if amount.is_finite() => *amount,
        Some(RawPrice::Text(text)) => parse_amount(text).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Display form of a raw price.
pub fn display_price(raw: Option<&RawPrice>) -> String {
    match raw {
        Some(RawPrice::Amount(amount)) if *amount != 0.0 && amount.is_finite() => {
            format_currency(*amount)
        }
        Some(RawPrice::Text(text)) if !text.is_empty() => match parse_amount(text) {
            Some(amount) if amount != 0.0 => format_currency(amount),
            // Placeholder text like "Negotiable" is shown as-is.
            _ => text.clone(),
        },
        _ => CONTACT_FOR_PRICING.to_string(),
    }
}

/// Format dollars with thousands separators and no cents, e.g. `$150,000`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
