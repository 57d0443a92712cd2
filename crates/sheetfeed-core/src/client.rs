//! Feed endpoints and the request helpers shared by every workflow.

use crate::error::{Result, SheetError};
use crate::transport::{FeedRequest, Method, Transport};
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://spreadsheets.google.com/feeds";
pub const GDATA_VERSION: &str = "3.0";
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// URL layout of the feed API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedEndpoints {
    pub base_url: String,
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        FeedEndpoints {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl FeedEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        FeedEndpoints {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Worksheets feed of a spreadsheet (metadata reads, worksheet creation).
    pub fn worksheets_url(&self, spreadsheet_id: &str) -> String {
        format!("{}/worksheets/{}/private/full", self.base_url, spreadsheet_id)
    }

    /// List (row) feed of a worksheet.
    pub fn list_url(&self, spreadsheet_id: &str, worksheet_id: &str) -> String {
        format!("{}/list/{}/{}/private/full", self.base_url, spreadsheet_id, worksheet_id)
    }

    /// Cells feed of a worksheet. Also the id of batch feeds sent to it.
    pub fn cells_url(&self, spreadsheet_id: &str, worksheet_id: &str) -> String {
        format!("{}/cells/{}/{}/private/full", self.base_url, spreadsheet_id, worksheet_id)
    }

    pub fn batch_url(&self, spreadsheet_id: &str, worksheet_id: &str) -> String {
        format!("{}/batch", self.cells_url(spreadsheet_id, worksheet_id))
    }
}

/// Issues the four requests the workflows need, classifying failures as
/// [`SheetError::Fetch`] (reads) or [`SheetError::Write`] (writes).
#[derive(Clone)]
pub struct FeedClient {
    transport: Arc<dyn Transport>,
    endpoints: FeedEndpoints,
}

impl fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedClient")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl FeedClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_endpoints(transport, FeedEndpoints::default())
    }

    pub fn with_endpoints(transport: Arc<dyn Transport>, endpoints: FeedEndpoints) -> Self {
        FeedClient {
            transport,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &FeedEndpoints {
        &self.endpoints
    }

    pub async fn get_worksheets_feed(&self, spreadsheet_id: &str) -> Result<String> {
        let url = self.endpoints.worksheets_url(spreadsheet_id);
        self.read(url).await
    }

    pub async fn get_list_feed(&self, spreadsheet_id: &str, worksheet_id: &str) -> Result<String> {
        let url = self.endpoints.list_url(spreadsheet_id, worksheet_id);
        self.read(url).await
    }

    /// POST a worksheet entry to the spreadsheet's worksheets feed.
    pub async fn post_worksheet(&self, spreadsheet_id: &str, entry: String) -> Result<String> {
        let request = FeedRequest::new(Method::Post, self.endpoints.worksheets_url(spreadsheet_id))
            .header("GData-Version", GDATA_VERSION)
            .body(ATOM_CONTENT_TYPE, entry);
        self.write(request).await
    }

    /// POST a batch feed of cell updates, guarded by `If-Match: *`.
    pub async fn post_cell_batch(
        &self,
        spreadsheet_id: &str,
        worksheet_id: &str,
        feed: String,
    ) -> Result<String> {
        let request =
            FeedRequest::new(Method::Post, self.endpoints.batch_url(spreadsheet_id, worksheet_id))
                .header("GData-Version", GDATA_VERSION)
                .header("If-Match", "*")
                .body(ATOM_CONTENT_TYPE, feed);
        self.write(request).await
    }

    async fn read(&self, url: String) -> Result<String> {
        debug!("GET {}", url);
        let request = FeedRequest::new(Method::Get, url).header("GData-Version", GDATA_VERSION);
        match self.transport.request(request).await {
            Ok(response) => Ok(response.body),
            Err(e) => Err(SheetError::Fetch(e.message)),
        }
    }

    async fn write(&self, request: FeedRequest) -> Result<String> {
        debug!("{} {}", request.method, request.url);
        match self.transport.request(request).await {
            Ok(response) => Ok(response.body),
            Err(e) => Err(SheetError::Write(e.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_layout() {
        let endpoints = FeedEndpoints::default();
        assert_eq!(
            endpoints.worksheets_url("spreadsheet02"),
            "https://spreadsheets.google.com/feeds/worksheets/spreadsheet02/private/full"
        );
        assert_eq!(
            endpoints.list_url("spreadsheet02", "od7"),
            "https://spreadsheets.google.com/feeds/list/spreadsheet02/od7/private/full"
        );
        assert_eq!(
            endpoints.batch_url("spreadsheet02", "od7"),
            "https://spreadsheets.google.com/feeds/cells/spreadsheet02/od7/private/full/batch"
        );
    }

    #[test]
    fn test_custom_base_trims_trailing_slash() {
        let endpoints = FeedEndpoints::new("http://localhost:8080/feeds/");
        assert_eq!(
            endpoints.cells_url("s", "od6"),
            "http://localhost:8080/feeds/cells/s/od6/private/full"
        );
    }
}
