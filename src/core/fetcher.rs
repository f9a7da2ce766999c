//! Paginated listing walker.
//!
//! Follows `next_page` links until the API stops returning one,
//! accumulating the items of a single listing kind.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{FetchError, PageClient, PageOutcome};
use crate::domain::ItemKind;

/// Fetch every item of one listing, starting at `url`.
///
/// A 404 ends the walk early and keeps what was accumulated. Any other
/// failure is returned and the partial result is discarded.
#[instrument(skip(client, kind), fields(kind = %kind))]
pub async fn fetch_all<T>(
    client: &dyn PageClient,
    url: &str,
    kind: ItemKind,
) -> Result<Vec<T>, FetchError>
where
    T: DeserializeOwned,
{
    let mut items = Vec::new();
    let mut current = Some(url.to_string());

    while let Some(page_url) = current.take() {
        debug!(url = %page_url, "Fetching page");

        let page = match client.get_page(&page_url).await? {
            PageOutcome::Found(page) => page,
            PageOutcome::NotFound => {
                warn!(url = %page_url, "Endpoint not found (404), stopping pagination");
                break;
            }
        };

        match extract_items(&page, kind) {
            Some(raw) => {
                for value in raw {
                    match serde_json::from_value::<T>(value.clone()) {
                        Ok(item) => items.push(item),
                        Err(e) => warn!(
                            url = %page_url,
                            error = %e,
                            "Skipping malformed {} item",
                            kind
                        ),
                    }
                }
            }
            None => {
                let keys: Vec<&str> = page
                    .as_object()
                    .map(|o| o.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                warn!(url = %page_url, ?keys, "No {} array found in response", kind);
            }
        }

        current = next_page(&page).filter(|next| *next != page_url);
    }

    info!(count = items.len(), "Finished fetching {}", kind);
    Ok(items)
}

/// Probe the candidate fields of `kind` in order and return the first array found
pub fn extract_items(page: &Value, kind: ItemKind) -> Option<&Vec<Value>> {
    kind.candidate_fields()
        .iter()
        .find_map(|field| page.get(*field).and_then(Value::as_array))
}

/// The `next_page` link, if present and non-empty
pub fn next_page(page: &Value) -> Option<String> {
    page.get("next_page")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
