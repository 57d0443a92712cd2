use super::{Spreadsheet, Worksheet};
use crate::client::FeedClient;
use crate::error::{Result, SheetError};
use crate::request::{ContextValue, Request};
use crate::storage::{parse_worksheet_entry, write_worksheet_entry};
use log::{debug, info};
use sheetfeed_cells::cells::RowData;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Dimensions used when the caller does not declare them (grown to fit the data).
pub const DEFAULT_ROW_COUNT: u32 = 20;
pub const DEFAULT_COL_COUNT: u32 = 20;

/// What to create: a bare title or a full configuration.
#[derive(Clone, Debug)]
pub enum WorksheetSpec {
    Title(String),
    Config(WorksheetConfig),
}

impl WorksheetSpec {
    pub fn into_config(self) -> WorksheetConfig {
        match self {
            WorksheetSpec::Title(title) => WorksheetConfig::new(title),
            WorksheetSpec::Config(config) => config,
        }
    }
}

impl From<&str> for WorksheetSpec {
    fn from(title: &str) -> Self {
        WorksheetSpec::Title(title.to_string())
    }
}

impl From<String> for WorksheetSpec {
    fn from(title: String) -> Self {
        WorksheetSpec::Title(title)
    }
}

impl From<WorksheetConfig> for WorksheetSpec {
    fn from(config: WorksheetConfig) -> Self {
        WorksheetSpec::Config(config)
    }
}

/// Options for a new worksheet.
#[derive(Clone, Debug, Default)]
pub struct WorksheetConfig {
    pub title: String,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    /// Column titles written to row 1.
    pub headers: Option<Vec<String>>,
    /// Data rows written below the header (or from row 1 without one).
    pub row_data: RowData,
    /// Handed to subscribers instead of the request itself.
    pub context: Option<ContextValue>,
}

impl WorksheetConfig {
    pub fn new(title: impl Into<String>) -> Self {
        WorksheetConfig {
            title: title.into(),
            ..WorksheetConfig::default()
        }
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn cols(mut self, cols: u32) -> Self {
        self.cols = Some(cols);
        self
    }

    pub fn headers<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(titles.into_iter().map(Into::into).collect());
        self
    }

    pub fn row_data(mut self, rows: RowData) -> Self {
        self.row_data = rows;
        self
    }

    pub fn context<T: Any + Send + Sync>(self, value: T) -> Self {
        self.shared_context(Arc::new(value))
    }

    pub fn shared_context(mut self, value: ContextValue) -> Self {
        self.context = Some(value);
        self
    }

    /// Row/column counts to declare: explicit values verbatim, otherwise the
    /// defaults grown to hold the header row (if supplied) and data.
    pub fn dimensions(&self) -> (u32, u32) {
        let header_width = self.headers.as_ref().map_or(0, Vec::len);
        let header_rows = usize::from(self.headers.is_some());
        let needed_rows = (header_rows + self.row_data.len()) as u32;
        let needed_cols = self
            .row_data
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header_width))
            .max()
            .unwrap_or(0) as u32;

        (
            self.rows.unwrap_or(DEFAULT_ROW_COUNT.max(needed_rows)),
            self.cols.unwrap_or(DEFAULT_COL_COUNT.max(needed_cols)),
        )
    }
}

/// Steps of the create-worksheet chain. Each starts only after the previous
/// one succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CreateStage {
    Created,
    Provisioning,
    Writing,
    Reconciling,
    Resolved,
}

impl fmt::Display for CreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreateStage::Created => "created",
            CreateStage::Provisioning => "provisioning",
            CreateStage::Writing => "writing",
            CreateStage::Reconciling => "reconciling",
            CreateStage::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// A create chain that has run against the server but is not yet part of a
/// spreadsheet. Settle it with [`Spreadsheet::attach_worksheet`].
#[derive(Debug)]
pub struct PendingWorksheet {
    title: String,
    stage: CreateStage,
    outcome: Result<Arc<Worksheet>>,
    context: Option<ContextValue>,
}

impl PendingWorksheet {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Spreadsheet {
    /// Create a worksheet on the server, optionally write its header and rows
    /// in one batch, re-read the rows, and append it to `worksheets`.
    ///
    /// The first failing step rejects the request with that step's literal
    /// message; later steps never run. A worksheet created before a failed
    /// write stays on the server.
    pub async fn create_worksheet(
        &mut self,
        client: &FeedClient,
        spec: impl Into<WorksheetSpec>,
    ) -> Request<Arc<Worksheet>> {
        let pending = self.provision_worksheet(client, spec).await;
        self.attach_worksheet(pending)
    }

    /// Run the create chain without touching `worksheets`. Only the
    /// spreadsheet id is read, so several chains can run at once.
    pub async fn provision_worksheet(
        &self,
        client: &FeedClient,
        spec: impl Into<WorksheetSpec>,
    ) -> PendingWorksheet {
        let config = spec.into().into_config();
        let mut stage = CreateStage::Created;

        let outcome = run_create(client, &self.id, &config, &mut stage).await;
        if let Err(e) = &outcome {
            debug!("create worksheet '{}' failed while {}: {}", config.title, stage, e);
        }
        PendingWorksheet {
            title: config.title,
            stage,
            outcome,
            context: config.context,
        }
    }

    /// Settle a finished chain: a created worksheet is appended, then the
    /// request is handed out.
    pub fn attach_worksheet(&mut self, mut pending: PendingWorksheet) -> Request<Arc<Worksheet>> {
        if let Ok(worksheet) = &pending.outcome {
            self.worksheets.push(Arc::clone(worksheet));
            advance(&mut pending.stage, CreateStage::Resolved, &pending.title);
            info!(
                "created worksheet '{}' ({}) in {} with {} row(s)",
                worksheet.title,
                worksheet.id,
                self.id,
                worksheet.rows.len()
            );
        }
        Request::settle(pending.outcome, pending.context)
    }
}

async fn run_create(
    client: &FeedClient,
    spreadsheet_id: &str,
    config: &WorksheetConfig,
    stage: &mut CreateStage,
) -> Result<Arc<Worksheet>> {
    if config.title.trim().is_empty() {
        return Err(SheetError::MissingTitle);
    }
    let (row_count, col_count) = config.dimensions();

    advance(stage, CreateStage::Provisioning, &config.title);
    let entry = write_worksheet_entry(&config.title, row_count, col_count)?;
    let response = client.post_worksheet(spreadsheet_id, entry).await?;
    let mut worksheet = Worksheet::from_entry(spreadsheet_id, parse_worksheet_entry(&response)?);
    if worksheet.title.is_empty() {
        worksheet.title = config.title.clone();
    }

    let batch = worksheet.cell_batch(client, config.headers.as_deref(), &config.row_data);
    if !batch.is_empty() {
        advance(stage, CreateStage::Writing, &config.title);
        worksheet.write_batch(client, &batch).await?;

        advance(stage, CreateStage::Reconciling, &config.title);
        worksheet.fetch_rows(client).await?;
    }

    Ok(Arc::new(worksheet))
}

fn advance(stage: &mut CreateStage, next: CreateStage, title: &str) {
    debug!("create worksheet '{}': {} -> {}", title, stage, next);
    *stage = next;
}
