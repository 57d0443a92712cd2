use super::{Spreadsheet, Worksheet};
use crate::client::FeedClient;
use crate::error::Result;
use crate::request::Request;
use crate::storage::{WorksheetEntry, parse_worksheets_feed};
use log::{info, warn};
use std::sync::Arc;

impl Spreadsheet {
    /// Load spreadsheet metadata and then the rows of every wanted worksheet
    /// (all of them when `wanted` is empty), in feed order.
    ///
    /// `worksheets` is replaced once metadata is in; worksheets are appended
    /// as they load, so a failure partway leaves the earlier ones in place.
    pub async fn fetch(&mut self, client: &FeedClient) -> Result<&mut Self> {
        let body = client.get_worksheets_feed(&self.id).await?;
        let feed = parse_worksheets_feed(&body)?;
        self.title = feed.title;
        self.worksheets.clear();

        for entry in self.select_entries(feed.entries) {
            let mut worksheet = Worksheet::from_entry(&self.id, entry);
            worksheet.fetch_rows(client).await?;
            self.worksheets.push(Arc::new(worksheet));
        }

        info!(
            "loaded {} worksheet(s) from {}",
            self.worksheets.len(),
            self.id
        );
        Ok(self)
    }

    fn select_entries(&self, entries: Vec<WorksheetEntry>) -> Vec<WorksheetEntry> {
        if self.wanted.is_empty() {
            return entries;
        }
        for title in &self.wanted {
            if !entries.iter().any(|e| &e.title == title) {
                warn!("worksheet '{}' not found in {}", title, self.id);
            }
        }
        entries
            .into_iter()
            .filter(|e| self.wanted.contains(&e.title))
            .collect()
    }
}

/// Construct a spreadsheet handle and fetch it, settling into a [`Request`].
pub async fn load_spreadsheet<I, S>(
    client: &FeedClient,
    id: impl Into<String>,
    wanted: I,
) -> Request<Spreadsheet>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut spreadsheet = Spreadsheet::with_wanted(id, wanted);
    let outcome = spreadsheet.fetch(client).await.map(|_| ());
    Request::settle(outcome.map(|()| spreadsheet), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use crate::transport::{FixtureTransport, Method};

    const FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gs="http://schemas.google.com/spreadsheets/2006">
<title>Config</title>
<entry><id>https://spreadsheets.google.com/feeds/worksheets/s1/private/full/od6</id><title>Environments</title><gs:rowCount>10</gs:rowCount><gs:colCount>3</gs:colCount></entry>
<entry><id>https://spreadsheets.google.com/feeds/worksheets/s1/private/full/od7</id><title>Params</title><gs:rowCount>5</gs:rowCount><gs:colCount>2</gs:colCount></entry>
</feed>"#;

    const EMPTY_LIST: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;

    fn setup() -> (Arc<FixtureTransport>, FeedClient) {
        let transport = Arc::new(FixtureTransport::new());
        transport.respond(Method::Get, "worksheets/s1/private/full", FEED);
        transport.respond(Method::Get, "list/s1/od6/private/full", EMPTY_LIST);
        transport.respond(Method::Get, "list/s1/od7/private/full", EMPTY_LIST);
        let client = FeedClient::new(transport.clone());
        (transport, client)
    }

    #[tokio::test]
    async fn test_fetch_loads_all_in_feed_order() {
        let (transport, client) = setup();
        let mut sheet = Spreadsheet::new("s1");
        sheet.fetch(&client).await.unwrap();
        assert_eq!(sheet.title.as_deref(), Some("Config"));
        let titles: Vec<_> = sheet.worksheets.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["Environments", "Params"]);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_filters_wanted_and_skips_missing() {
        let (transport, client) = setup();
        let mut sheet = Spreadsheet::with_wanted("s1", ["Params", "Nope"]);
        sheet.fetch(&client).await.unwrap();
        assert_eq!(sheet.worksheets.len(), 1);
        assert_eq!(sheet.worksheets[0].id, "od7");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_keeps_worksheets_loaded_before_failure() {
        let (transport, client) = setup();
        transport.fail(Method::Get, "list/s1/od7/private/full", 500, "Worksheet 'Params' fetch error");
        let mut sheet = Spreadsheet::new("s1");
        let err = sheet.fetch(&client).await.unwrap_err();
        assert!(matches!(err, SheetError::Fetch(_)));
        assert_eq!(err.message(), "Worksheet 'Params' fetch error");
        assert_eq!(sheet.worksheets.len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_failure_leaves_state_untouched() {
        let (transport, client) = setup();
        transport.fail(Method::Get, "worksheets/s1/private/full", 404, "Spreadsheet fetch error");
        let mut sheet = Spreadsheet::new("s1");
        sheet.worksheets.push(Arc::new(Worksheet::new("s1", "od9", "Old", 1, 1)));
        let request = load_spreadsheet(&client, "s1", Vec::<String>::new()).await;
        assert!(!request.is_resolved());

        assert!(sheet.fetch(&client).await.is_err());
        assert_eq!(sheet.worksheets.len(), 1);
        assert!(sheet.title.is_none());
    }
}
