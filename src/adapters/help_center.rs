//! HTTP adapter for the help-center REST API.
//!
//! Authenticates with an API token over HTTP Basic auth
//! (`<email>/token` as the user name, the token as the password).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{FetchError, PageClient, PageOutcome};
use crate::config::Credentials;
use crate::domain::ItemKind;

/// Help-center API client
pub struct HelpCenterClient {
    /// Base URL, e.g. `https://example.zendesk.com`
    base_url: String,
    /// Basic auth user name
    username: String,
    /// API token
    token: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HelpCenterClient {
    /// Create a client for the given credentials
    pub fn new(credentials: &Credentials, request_timeout: Duration) -> Result<Self, FetchError> {
        let base_url = credentials.base_url();
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            username: format!("{}/token", credentials.user),
            token: credentials.token.clone(),
            client,
        })
    }
}

/// Build the first-page URL of a listing under `base_url`
pub fn listing_url(base_url: &str, language: &str, kind: ItemKind) -> String {
    let url = format!(
        "{}/api/v2/help_center/{}/{}.json",
        base_url.trim_end_matches('/'),
        language.to_lowercase(),
        kind.endpoint_segment()
    );

    match kind {
        ItemKind::Articles => format!("{}?per_page=100", url),
        _ => url,
    }
}

#[async_trait]
impl PageClient for HelpCenterClient {
    fn listing_url(&self, language: &str, kind: ItemKind) -> String {
        listing_url(&self.base_url, language, kind)
    }

    async fn get_page(&self, url: &str) -> Result<PageOutcome, FetchError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(PageOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(PageOutcome::Found(value))
    }
}
