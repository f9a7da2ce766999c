//! Adapter interfaces for the remote help-center API.
//!
//! The pipeline only needs one capability from the network: fetch a single
//! listing page as JSON. Keeping that behind a trait lets tests drive the
//! whole pipeline from in-memory pages.

pub mod help_center;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ItemKind;

// Re-export the HTTP adapter
pub use help_center::HelpCenterClient;

/// Result of requesting one listing page
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The page was returned and decoded as JSON
    Found(serde_json::Value),

    /// The endpoint answered 404
    NotFound,
}

/// Failures that end a listing walk
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

/// Source of listing pages
#[async_trait]
pub trait PageClient: Send + Sync {
    /// First-page URL of a listing for `language`
    fn listing_url(&self, language: &str, kind: ItemKind) -> String;

    /// Fetch one page by absolute URL
    async fn get_page(&self, url: &str) -> Result<PageOutcome, FetchError>;
}
