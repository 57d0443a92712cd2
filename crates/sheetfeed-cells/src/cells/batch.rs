//! Batch construction for cell updates.
//!
//! Turns optional header titles plus a row-major value matrix into an ordered
//! list of per-cell update operations. Headers, when supplied (even empty),
//! occupy row 1 and push data rows down by one. Absent values are skipped
//! without shifting the address of any other cell.

use super::address::{CellAddress, cell_feed_url};
use super::value::CellValue;

/// A single "write this cell" operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellOp {
    pub address: CellAddress,
    /// String form of the source value.
    pub value: String,
    /// Batch entry id (`R<row>C<col>`).
    pub cell_id: String,
    /// Cell URL under the cells feed.
    pub cell_feed_url: String,
}

impl CellOp {
    pub fn row(&self) -> u32 {
        self.address.row
    }

    pub fn col(&self) -> u32 {
        self.address.col
    }
}

/// An ordered set of cell updates against one worksheet's cells feed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellBatch {
    /// Cells feed URL; also the batch feed's id.
    pub feed_url: String,
    pub ops: Vec<CellOp>,
}

impl CellBatch {
    /// Build the batch for `headers` (row 1, if given) followed by `rows`.
    ///
    /// Operations come out in row-major order.
    pub fn build(
        feed_url: &str,
        headers: Option<&[String]>,
        rows: &[Vec<Option<CellValue>>],
    ) -> Self {
        let mut batch = CellBatch {
            feed_url: feed_url.to_string(),
            ops: Vec::new(),
        };

        let header_row: Option<Vec<Option<CellValue>>> =
            headers.map(|h| h.iter().map(|t| Some(CellValue::Text(t.clone()))).collect());

        let offset = u32::from(header_row.is_some());
        if let Some(header_row) = &header_row {
            batch.push_row(1, header_row);
        }
        for (row_idx, values) in rows.iter().enumerate() {
            batch.push_row(row_idx as u32 + 1 + offset, values);
        }
        batch
    }

    fn push_row(&mut self, row: u32, values: &[Option<CellValue>]) {
        for (col_idx, value) in values.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            let address = CellAddress::new(row, col_idx as u32 + 1);
            self.ops.push(CellOp {
                address,
                value: value.to_input_value(),
                cell_id: address.to_string(),
                cell_feed_url: cell_feed_url(&self.feed_url, address.row, address.col),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Highest row and column touched by this batch, `(0, 0)` when empty.
    pub fn extent(&self) -> (u32, u32) {
        self.ops.iter().fold((0, 0), |(r, c), op| {
            (r.max(op.address.row), c.max(op.address.col))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::value::row_of;

    const FEED: &str = "https://spreadsheets.google.com/feeds/cells/spreadsheet02/od7/private/full";

    fn headers(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    fn ids(batch: &CellBatch) -> Vec<&str> {
        batch.ops.iter().map(|op| op.cell_id.as_str()).collect()
    }

    #[test]
    fn test_empty_input_builds_empty_batch() {
        let batch = CellBatch::build(FEED, None, &[]);
        assert!(batch.is_empty());
        assert_eq!(batch.extent(), (0, 0));
    }

    #[test]
    fn test_empty_headers_still_take_row_one() {
        let none: Vec<String> = Vec::new();
        let batch = CellBatch::build(FEED, Some(none.as_slice()), &[row_of(["a"])]);
        assert_eq!(ids(&batch), vec!["R2C1"]);

        let batch = CellBatch::build(FEED, Some(none.as_slice()), &[]);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_headers_take_row_one() {
        let h = headers(&["Id", "Summary"]);
        let rows = vec![row_of(["A", "B"]), vec![Some("C".into()), None]];
        let batch = CellBatch::build(FEED, Some(h.as_slice()), &rows);
        assert_eq!(ids(&batch), vec!["R1C1", "R1C2", "R2C1", "R2C2", "R3C1"]);
        assert_eq!(batch.ops[0].value, "Id");
        assert_eq!(batch.ops[4].value, "C");
        assert_eq!(batch.extent(), (3, 2));
    }

    #[test]
    fn test_rows_start_at_one_without_headers() {
        let rows = vec![row_of(["A"]), row_of(["B"])];
        let batch = CellBatch::build(FEED, None, &rows);
        assert_eq!(ids(&batch), vec!["R1C1", "R2C1"]);
    }

    #[test]
    fn test_absent_values_keep_absolute_addressing() {
        let rows = vec![vec![
            Some("".into()),
            None,
            None,
            Some("Valid".into()),
            Some(false.into()),
        ]];
        let batch = CellBatch::build(FEED, None, &rows);
        assert_eq!(ids(&batch), vec!["R1C1", "R1C4", "R1C5"]);
        let values: Vec<_> = batch.ops.iter().map(|op| op.value.as_str()).collect();
        assert_eq!(values, vec!["", "Valid", "false"]);
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![row_of(["a", "b", "c"]), row_of(["d"]), vec![], row_of(["e", "f"])];
        let batch = CellBatch::build(FEED, None, &rows);
        assert_eq!(ids(&batch), vec!["R1C1", "R1C2", "R1C3", "R2C1", "R4C1", "R4C2"]);
    }

    #[test]
    fn test_op_urls_follow_feed() {
        let batch = CellBatch::build(FEED, None, &[row_of(["x"])]);
        assert_eq!(batch.ops[0].cell_feed_url, format!("{}/R1C1", FEED));
        assert_eq!(batch.feed_url, FEED);
    }
}
