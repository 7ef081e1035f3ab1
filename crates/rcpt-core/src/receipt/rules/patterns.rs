//! Common regex patterns and literals for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Label whose following line carries the total.
pub const TOTAL_LABEL: &str = "total";

/// Rupee sign stripped before reading an amount.
pub const CURRENCY_SYMBOL: char = '₹';

/// Thousands separator stripped before reading an amount.
pub const THOUSANDS_SEPARATOR: char = ',';

lazy_static! {
    // DD/MM/YYYY, DD-MM-YY and friends, taken verbatim
    pub static ref DATE_PATTERN: Regex = Regex::new(
        r"\b([0-9]{1,2}[/\-][0-9]{1,2}[/\-](?:[0-9]{4}|[0-9]{2}))\b"
    ).unwrap();

    // Maximal runs of ASCII digits
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}
