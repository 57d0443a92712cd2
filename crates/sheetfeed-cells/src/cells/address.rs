//! Cell addressing for the cells feed.
//!
//! Cells are addressed in R1C1 form (e.g., "R1C1", "R12C3") with 1-based
//! row and column indices. The same identifier is used as the batch entry id
//! and as the last path segment of the cell's feed URL.
//!
//! # Examples
//!
//! ```ignore
//! let addr = CellAddress::from_str("R2C3").unwrap();
//! assert_eq!(addr.row, 2);
//! assert_eq!(addr.col, 3);
//! assert_eq!(addr.to_string(), "R2C3");
//! assert_eq!(addr.to_a1(), "C2");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by row and column (1-based).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> CellAddress {
        CellAddress { row, col }
    }

    /// Parse a cell id in R1C1 form (e.g., "R1C1", "r10c2").
    /// Returns None if the input is invalid or either index is zero.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(id: &str) -> Option<CellAddress> {
        Self::parse_r1c1(id)
    }

    fn parse_r1c1(id: &str) -> Option<CellAddress> {
        let caps = r1c1_re()?.captures(id)?;
        let row = caps["row"].parse::<u32>().ok()?;
        let col = caps["col"].parse::<u32>().ok()?;
        if row == 0 || col == 0 {
            return None;
        }
        Some(CellAddress::new(row, col))
    }

    /// Feed-relative URL of this cell under the given cells feed.
    pub fn feed_url(&self, cell_feed_base: &str) -> String {
        cell_feed_url(cell_feed_base, self.row, self.col)
    }

    /// A1-style name of this cell (R2C3 -> "C2"), used for display only.
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_letters(self.col), self.row)
    }
}

fn r1c1_re() -> Option<&'static Regex> {
    static R1C1_RE: OnceLock<Option<Regex>> = OnceLock::new();
    R1C1_RE
        .get_or_init(|| Regex::new(r"^[Rr](?<row>[0-9]+)[Cc](?<col>[0-9]+)$").ok())
        .as_ref()
}

/// Stable per-cell identifier: `R<row>C<col>`.
pub fn cell_id(row: u32, col: u32) -> String {
    format!("R{}C{}", row, col)
}

/// Cell URL under a worksheet's cells feed: `<base>/R<row>C<col>`.
pub fn cell_feed_url(cell_feed_base: &str, row: u32, col: u32) -> String {
    format!("{}/{}", cell_feed_base, cell_id(row, col))
}

/// Convert a 1-based column index to spreadsheet-style letters (1 -> A, 26 -> Z, 27 -> AA).
pub fn col_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col as u64;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

impl std::str::FromStr for CellAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_r1c1(s).ok_or_else(|| format!("Invalid cell id: {}", s))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}C{}", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_id_format() {
        assert_eq!(cell_id(1, 1), "R1C1");
        assert_eq!(cell_id(12, 3), "R12C3");
    }

    #[test]
    fn test_cell_feed_url_appends_id() {
        let base = "https://spreadsheets.google.com/feeds/cells/s1/od7/private/full";
        assert_eq!(
            cell_feed_url(base, 3, 1),
            format!("{}/R3C1", base)
        );
        assert_eq!(CellAddress::new(3, 1).feed_url(base), cell_feed_url(base, 3, 1));
    }

    #[test]
    fn test_parse_r1c1_overflow_returns_none() {
        let huge = format!("R{}C1", "9".repeat(40));
        assert!(CellAddress::from_str(&huge).is_none());
    }

    #[test]
    fn test_r1c1_regex_is_compiled_once() {
        let first = r1c1_re().unwrap();
        let second = r1c1_re().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(CellAddress::from_str("r12c3"), Some(CellAddress::new(12, 3)));
    }

    #[test]
    fn test_parse_rejects_zero_indices() {
        assert!(CellAddress::from_str("R0C1").is_none());
        assert!(CellAddress::from_str("R1C0").is_none());
    }

    #[test]
    fn test_col_to_letters() {
        assert_eq!(col_to_letters(1), "A");
        assert_eq!(col_to_letters(26), "Z");
        assert_eq!(col_to_letters(27), "AA");
        assert_eq!(col_to_letters(52), "AZ");
        assert_eq!(CellAddress::new(2, 3).to_a1(), "C2");
    }
}
