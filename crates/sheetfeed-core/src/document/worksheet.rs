use super::Row;
use crate::client::FeedClient;
use crate::error::{Result, SheetError};
use crate::storage::{WorksheetEntry, parse_batch_statuses, parse_list_feed, write_cell_batch};
use log::debug;
use sheetfeed_cells::cells::{CellBatch, CellValue};

/// One worksheet: remote identity, declared dimensions and materialized rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Worksheet {
    /// Key of the owning spreadsheet (addressing only).
    pub spreadsheet_id: String,
    /// Worksheet id (od token), e.g. `od7`.
    pub id: String,
    pub title: String,
    pub row_count: u32,
    pub col_count: u32,
    /// Data rows; index 0 is the first row after the header.
    pub rows: Vec<Row>,
}

impl Worksheet {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        row_count: u32,
        col_count: u32,
    ) -> Self {
        Worksheet {
            spreadsheet_id: spreadsheet_id.into(),
            id: id.into(),
            title: title.into(),
            row_count,
            col_count,
            rows: Vec::new(),
        }
    }

    pub fn from_entry(spreadsheet_id: &str, entry: WorksheetEntry) -> Self {
        Worksheet::new(
            spreadsheet_id,
            entry.id,
            entry.title,
            entry.row_count,
            entry.col_count,
        )
    }

    /// Cells feed URL of this worksheet under the client's endpoints.
    pub fn cell_feed_url(&self, client: &FeedClient) -> String {
        client.endpoints().cells_url(&self.spreadsheet_id, &self.id)
    }

    /// Replace `rows` with the rows of a list feed response.
    ///
    /// Declared dimensions grow to cover what the feed returned, so
    /// `rows.len() <= row_count` and every row fits in `col_count`.
    pub fn populate_rows(&mut self, body: &str) -> Result<()> {
        let rows = parse_list_feed(body)?;
        let widest = rows.iter().map(Row::len).max().unwrap_or(0);
        self.row_count = self.row_count.max(rows.len() as u32);
        self.col_count = self.col_count.max(widest as u32);
        self.rows = rows;
        Ok(())
    }

    /// Re-read the list feed and replace `rows`.
    pub async fn fetch_rows(&mut self, client: &FeedClient) -> Result<()> {
        let body = client.get_list_feed(&self.spreadsheet_id, &self.id).await?;
        self.populate_rows(&body)?;
        debug!("worksheet '{}' ({}): {} row(s)", self.title, self.id, self.rows.len());
        Ok(())
    }

    /// Build the batch writing `headers` (row 1) and `row_data` to this worksheet.
    pub fn cell_batch(
        &self,
        client: &FeedClient,
        headers: Option<&[String]>,
        row_data: &[Vec<Option<CellValue>>],
    ) -> CellBatch {
        CellBatch::build(&self.cell_feed_url(client), headers, row_data)
    }

    /// Send a batch of cell updates. Rows are not touched; see [`Worksheet::add_rows`].
    pub async fn write_batch(&self, client: &FeedClient, batch: &CellBatch) -> Result<()> {
        let body = write_cell_batch(batch)?;
        let response = client.post_cell_batch(&self.spreadsheet_id, &self.id, body).await?;

        // A 2xx batch can still carry per-entry failures.
        if let Some(failed) = parse_batch_statuses(&response)
            .into_iter()
            .find(|s| !s.is_success())
        {
            return Err(SheetError::Write(failed.reason));
        }
        debug!("worksheet '{}': wrote {} cell(s)", self.title, batch.len());
        Ok(())
    }

    /// Write header and rows in one batch, then re-fetch the authoritative rows.
    ///
    /// Returns `false` without any request when there is nothing to write.
    /// On failure `rows` is left as it was.
    pub async fn add_rows(
        &mut self,
        client: &FeedClient,
        row_data: &[Vec<Option<CellValue>>],
        headers: Option<&[String]>,
    ) -> Result<bool> {
        let batch = self.cell_batch(client, headers, row_data);
        if batch.is_empty() {
            return Ok(false);
        }
        self.write_batch(client, &batch).await?;
        self.fetch_rows(client).await?;
        Ok(true)
    }
}
