//! Worksite address helpers.
//!
//! Addresses look like `"100 Main St Hartford Hartford CT 06103"`. The state
//! code is the two-letter token directly before the five-digit ZIP; matching
//! on that position keeps "CT" from hitting "Court St" or "CTO Plaza".

use std::sync::LazyLock;

use regex::Regex;

// The mock server's `views::extract_state` uses the same pattern.
static STATE_BEFORE_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2})\s+\d{5}").expect("valid regex"));

/// Server-side `match` pattern selecting addresses in state `code`.
///
/// Uses only constructs PostgreSQL's ARE engine and the `regex` crate agree
/// on, with no parentheses or commas (they would need quoting inside an
/// `and=(...)` group) and no `+` (form decoding turns it into a space).
pub fn state_zip_pattern(code: &str) -> String {
    format!(r"^{code}\s\s*[0-9]{{5}}|[^A-Za-z]{code}\s\s*[0-9]{{5}}")
}

/// Two-letter state code of an address, or `None` when there is no
/// code-before-ZIP token.
pub fn extract_state(address: &str) -> Option<&str> {
    STATE_BEFORE_ZIP
        .captures(address)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
