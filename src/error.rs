// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

// --- Report Job Error Type ---
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Database error")]
    Db(#[from] sqlx::Error),

    #[error("Spreadsheet error")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("File I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("Token refresh failed: Status={status:?}, Message='{message}'")]
    TokenRefreshFailed {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Drive API error: Status={status}, Message='{message}'")]
    DriveApi { status: StatusCode, message: String },

    #[error("Slack webhook error: Status={status}, Message='{message}'")]
    SlackApi { status: StatusCode, message: String },

    #[error("System time error: {0}")]
    TimeError(String),
}

// Helper to create context-aware IO errors
pub fn io_context<E: Into<std::io::Error>, S: Into<String>>(source: E, context: S) -> ReportError {
    ReportError::Io {
        source: source.into(),
        context: context.into(),
    }
}
