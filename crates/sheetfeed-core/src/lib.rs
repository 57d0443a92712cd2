//! sheetfeed-core - spreadsheet model, Atom feed codec and sync workflows.

pub mod client;
pub mod document;
pub mod error;
pub mod request;
pub mod storage;
pub mod transport;

pub use client::{FeedClient, FeedEndpoints};
pub use document::{
    PendingWorksheet, Row, RowCell, Spreadsheet, Worksheet, WorksheetConfig, WorksheetSpec,
    load_spreadsheet,
};
pub use error::{Result, SheetError};
pub use request::{Context, ContextValue, Request, RequestId, RequestState};
pub use transport::{FeedRequest, FeedResponse, Method, Transport, TransportError};

pub use sheetfeed_cells::cells::{CellAddress, CellValue, RowData, row_of};
