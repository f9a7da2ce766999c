//! Help-center content items.
//!
//! These mirror the listing payloads of the remote API. Only the fields the
//! backup needs are decoded; everything else in the payload is ignored.

use serde::{Deserialize, Serialize};

/// Numeric identifier shared by categories, sections and articles
pub type ItemId = u64;

/// Top-level grouping of help-center content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: ItemId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,
}

/// Grouping of articles within one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: ItemId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,

    /// Parent category (sections without one never survive filtering)
    #[serde(default)]
    pub category_id: Option<ItemId>,
}

/// A single content item with an HTML body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ItemId,

    /// Empty when the API omits the title or sends `null`
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// HTML body. `None` when the API returns `null` or omits the field.
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,

    /// Labels in the order the API lists them
    #[serde(default, deserialize_with = "null_as_default")]
    pub label_names: Vec<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub section_id: Option<ItemId>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The three listing kinds exposed by the help-center API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Categories,
    Sections,
    Articles,
}

impl ItemKind {
    /// Field names that may hold the page's item array, in priority order
    pub fn candidate_fields(self) -> &'static [&'static str] {
        match self {
            ItemKind::Categories => &["categories", "category", "results"],
            ItemKind::Sections => &["sections", "section", "results"],
            ItemKind::Articles => &["articles", "article", "results"],
        }
    }

    /// Path segment of the listing endpoint (`<segment>.json`)
    pub fn endpoint_segment(self) -> &'static str {
        match self {
            ItemKind::Categories => "categories",
            ItemKind::Sections => "sections",
            ItemKind::Articles => "articles",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint_segment())
    }
}
