//! Field normalizers.
//!
//! Every function here is total: malformed upstream values degrade to a
//! default instead of producing an error.

pub mod price;
pub mod temporal;

pub use price::{display_price, normalize_price, parse_amount};
pub use temporal::{format_listed_date, normalize_instant, DateStyle};
