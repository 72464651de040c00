//! Error types for the scraper

use thiserror::Error;

/// Errors that can occur while driving the browser or persisting results
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Browser process or tab could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Tab-level operation (create, configure, close) failed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Page navigation, history traversal or reload failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// No element matched a locator within its timeout
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A bounded wait elapsed before its condition held
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// JavaScript evaluation or element interaction failed
    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The listing page could not be loaded or exposed no entry points
    #[error("Listing unavailable: {0}")]
    ListingUnavailable(String),

    /// A site profile is structurally unusable
    #[error("Invalid site profile: {0}")]
    InvalidProfile(String),

    #[error("Failed to write output: {0}")]
    Storage(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Whether this error means "nothing was there" rather than "something broke"
    pub fn is_miss(&self) -> bool {
        matches!(self, ScrapeError::ElementNotFound(_) | ScrapeError::Timeout(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ScrapeError>;
