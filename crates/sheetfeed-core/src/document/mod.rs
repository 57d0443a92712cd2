//! Spreadsheet/worksheet model and the fetch/create workflows.

mod io;
mod ops;
mod state;
mod worksheet;

pub use io::load_spreadsheet;
pub use ops::{
    DEFAULT_COL_COUNT, DEFAULT_ROW_COUNT, PendingWorksheet, WorksheetConfig, WorksheetSpec,
};
pub use state::{Row, RowCell, Spreadsheet};
pub use worksheet::Worksheet;
