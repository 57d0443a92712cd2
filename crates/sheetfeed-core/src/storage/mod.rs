//! Wire codec (Atom feeds) and local file formats.

pub mod csv;
pub mod md;
pub mod parser;
pub mod writer;

pub use csv::{CsvTable, parse_csv_rows, read_csv, write_csv};
pub use md::{render_markdown, write_markdown};
pub use parser::{
    BatchStatus, WorksheetEntry, WorksheetsFeed, parse_batch_statuses, parse_list_feed,
    parse_worksheet_entry, parse_worksheets_feed,
};
pub use writer::{write_cell_batch, write_worksheet_entry};
