//! Cell-level model shared by the feed client.
//!
//! - [`CellAddress`], [`cell_id`], [`cell_feed_url`] - R1C1 addressing under a cells feed
//! - [`CellValue`], [`RowData`] - caller-supplied scalar values (absent = `None`)
//! - [`CellBatch`], [`CellOp`] - ordered per-cell update operations for one batch write

mod address;
mod batch;
mod value;

pub use address::{CellAddress, cell_feed_url, cell_id, col_to_letters};
pub use batch::{CellBatch, CellOp};
pub use value::{CellValue, RowData, number_to_string, row_of};
