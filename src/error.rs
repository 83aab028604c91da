use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch sheet data: {0}")]
    Status(String),

    /// Raised by the CSV reader. Text handed over as `&str` is already valid
    /// UTF-8, so today this only surfaces if the reader itself fails.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DashboardError {
    /// The message shown to users in place of (or above) the charts.
    pub fn user_message(&self) -> String {
        format!("{} ({})", config::FETCH_FAILED_MESSAGE, self)
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
