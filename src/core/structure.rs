//! Structure report: the category → section → article tree as JSON.
//!
//! Unlike the backup run this applies no ignore set; it shows what the
//! help center contains so ignore files can be written against it.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument};

use crate::adapters::PageClient;
use crate::domain::{Article, Category, ItemId, ItemKind, Section};

use super::fetcher::fetch_all;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub language: String,
    pub generation_date: DateTime<Utc>,
    pub categories: Vec<CategoryNode>,
    /// Articles whose section is missing or was not listed
    pub articles_not_in_listed_sections: Vec<UnmappedArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: ItemId,
    pub name: String,
    pub html_url: String,
    pub sections: Vec<SectionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    pub id: ItemId,
    pub name: String,
    pub html_url: String,
    pub articles: Vec<ArticleLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleLeaf {
    pub id: ItemId,
    pub title: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedArticle {
    pub id: ItemId,
    pub title: String,
    pub html_url: String,
    pub section_id_referenced: Option<ItemId>,
}

fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn leaf(article: &Article) -> ArticleLeaf {
    ArticleLeaf {
        id: article.id,
        title: or_fallback(Some(&article.title), "No Title"),
        html_url: or_fallback(article.html_url.as_deref(), "No URL"),
    }
}

/// Assemble the tree from fetched listings, preserving listing order
pub fn build_structure(
    language: &str,
    generation_date: DateTime<Utc>,
    categories: &[Category],
    sections: &[Section],
    articles: &[Article],
) -> StructureReport {
    let listed_sections: HashSet<ItemId> = sections.iter().map(|s| s.id).collect();

    let mut by_section: HashMap<ItemId, Vec<ArticleLeaf>> = HashMap::new();
    let mut unmapped = Vec::new();

    for article in articles {
        match article.section_id.filter(|sid| listed_sections.contains(sid)) {
            Some(sid) => by_section.entry(sid).or_default().push(leaf(article)),
            None => {
                let leaf = leaf(article);
                unmapped.push(UnmappedArticle {
                    id: leaf.id,
                    title: leaf.title,
                    html_url: leaf.html_url,
                    section_id_referenced: article.section_id,
                });
            }
        }
    }

    let categories = categories
        .iter()
        .map(|category| CategoryNode {
            id: category.id,
            name: or_fallback(category.name.as_deref(), "Unnamed Category"),
            html_url: or_fallback(category.html_url.as_deref(), "No URL"),
            sections: sections
                .iter()
                .filter(|s| s.category_id == Some(category.id))
                .map(|section| SectionNode {
                    id: section.id,
                    name: or_fallback(section.name.as_deref(), "Unnamed Section"),
                    html_url: or_fallback(section.html_url.as_deref(), "No URL"),
                    articles: by_section.get(&section.id).cloned().unwrap_or_default(),
                })
                .collect(),
        })
        .collect();

    StructureReport {
        language: language.to_string(),
        generation_date,
        categories,
        articles_not_in_listed_sections: unmapped,
    }
}

/// Fetch all three listings and build the report
#[instrument(skip(client))]
pub async fn generate_structure(client: &dyn PageClient, language: &str) -> Result<StructureReport> {
    let categories: Vec<Category> = fetch_all(
        client,
        &client.listing_url(language, ItemKind::Categories),
        ItemKind::Categories,
    )
    .await
    .context("Failed to fetch categories")?;

    let sections: Vec<Section> = fetch_all(
        client,
        &client.listing_url(language, ItemKind::Sections),
        ItemKind::Sections,
    )
    .await
    .context("Failed to fetch sections")?;

    let articles: Vec<Article> = fetch_all(
        client,
        &client.listing_url(language, ItemKind::Articles),
        ItemKind::Articles,
    )
    .await
    .context("Failed to fetch articles")?;

    Ok(build_structure(
        language,
        Utc::now(),
        &categories,
        &sections,
        &articles,
    ))
}

/// Write the report as pretty-printed JSON
pub async fn write_structure(path: &Path, report: &StructureReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(report)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write structure file: {}", path.display()))?;

    info!(path = %path.display(), "Structure file written");
    Ok(())
}
