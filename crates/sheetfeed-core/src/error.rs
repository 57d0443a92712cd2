//! Error types for sheetfeed core.

use thiserror::Error;

/// Errors that can occur while loading or writing spreadsheet feeds.
///
/// `Fetch` and `Write` carry the server's error text verbatim; their
/// `Display` is exactly that text.
#[derive(Error, Debug)]
pub enum SheetError {
    /// A read (worksheets feed, list feed) failed.
    #[error("{0}")]
    Fetch(String),

    /// A create or batch update failed.
    #[error("{0}")]
    Write(String),

    #[error("Malformed feed: {message}")]
    Feed { message: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Worksheet title is required")]
    MissingTitle,
}

impl SheetError {
    pub(crate) fn feed(message: impl Into<String>) -> Self {
        SheetError::Feed {
            message: message.into(),
        }
    }

    /// The message delivered to failure subscribers.
    pub fn message(&self) -> String {
        match self {
            SheetError::Fetch(msg) | SheetError::Write(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
