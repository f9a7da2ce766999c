//! The backup run.
//!
//! Fetch categories, sections and articles (in that order), filter them
//! against the ignore set, render every kept article and write it under
//! `<backup-folder>/<run-date>/<language>/`, then write the manifest.
//!
//! Fetch failures abort the run. Everything after fetching is per-article
//! and only ever skips the article at hand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::adapters::PageClient;
use crate::config::BackupConfig;
use crate::domain::{Article, Category, ItemKind, Section};

use super::fetcher::fetch_all;
use super::filter::{Hierarchy, IgnoreSet};
use super::render::{render_article, MISSING_URL};
use super::sanitize::sanitize_name;
use super::writer::{ArticleWriter, ManifestRow};

/// Category name used for articles without a kept section
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Section name used for articles without a kept section
pub const UNSECTIONED: &str = "Unsectioned";

/// Counts and paths reported at the end of a run
#[derive(Debug, Clone, Default)]
pub struct BackupSummary {
    pub base_path: PathBuf,
    pub categories_fetched: usize,
    pub categories_kept: usize,
    pub sections_fetched: usize,
    pub sections_kept: usize,
    pub articles_fetched: usize,
    pub articles_kept: usize,
    pub articles_written: usize,
    /// Kept articles without a body
    pub articles_skipped: usize,
    pub write_failures: usize,
    /// `None` when the manifest itself could not be written
    pub manifest_path: Option<PathBuf>,
}

/// Run a full backup against `client`
#[instrument(skip_all, fields(language = %config.language))]
pub async fn run_backup(client: &dyn PageClient, config: &BackupConfig) -> Result<BackupSummary> {
    let ignore = match &config.ignore_file {
        Some(path) => IgnoreSet::load(path),
        None => IgnoreSet::default(),
    };

    let base_path = config.base_run_path();
    fs::create_dir_all(&base_path)
        .await
        .with_context(|| format!("Failed to create backup folder: {}", base_path.display()))?;

    info!("Fetching categories");
    let categories: Vec<Category> = fetch_kind(client, config, ItemKind::Categories)
        .await
        .context("Failed to fetch categories")?;

    info!("Fetching sections");
    let sections: Vec<Section> = fetch_kind(client, config, ItemKind::Sections)
        .await
        .context("Failed to fetch sections")?;

    info!("Fetching articles");
    let articles: Vec<Article> = fetch_kind(client, config, ItemKind::Articles)
        .await
        .context("Failed to fetch articles")?;

    let mut summary = BackupSummary {
        base_path: base_path.clone(),
        categories_fetched: categories.len(),
        sections_fetched: sections.len(),
        articles_fetched: articles.len(),
        ..Default::default()
    };

    let hierarchy = Hierarchy::build(&ignore, categories, sections, articles);
    summary.categories_kept = hierarchy.categories.len();
    summary.sections_kept = hierarchy.sections.len();
    summary.articles_kept = hierarchy.articles.len();

    info!(
        fetched = summary.categories_fetched,
        kept = summary.categories_kept,
        "Categories filtered"
    );
    info!(
        fetched = summary.sections_fetched,
        kept = summary.sections_kept,
        "Sections filtered"
    );
    info!(
        fetched = summary.articles_fetched,
        kept = summary.articles_kept,
        "Articles filtered"
    );

    let mut writer = ArticleWriter::new(&base_path, config.flatten_sections);

    for article in &hierarchy.articles {
        if article.body.is_none() {
            info!(article_id = article.id, "Article has no body, skipping");
            summary.articles_skipped += 1;
            continue;
        }

        let (category, section) = hierarchy.placement(article);
        let category_name = match category {
            Some(c) => c.name.clone().unwrap_or_default(),
            None => UNCATEGORIZED.to_string(),
        };
        let section_name = match section {
            Some(s) => s.name.clone().unwrap_or_default(),
            None => UNSECTIONED.to_string(),
        };

        let document = render_article(article, &category_name, &section_name);
        let row = ManifestRow {
            article_id: article.id,
            category: sanitize_name(&category_name),
            section: sanitize_name(&section_name),
            file: String::new(),
            title: article.title.clone(),
            url: article
                .html_url
                .clone()
                .unwrap_or_else(|| MISSING_URL.to_string()),
        };

        match writer
            .write(row, &sanitize_name(&article.title), &document)
            .await
        {
            Ok(path) => {
                summary.articles_written += 1;
                info!(path = %path.display(), "Saved article");
            }
            Err(e) => {
                summary.write_failures += 1;
                error!(
                    article_id = article.id,
                    title = %article.title,
                    error = %format!("{:#}", e),
                    "Failed to write article"
                );
            }
        }
    }

    summary.manifest_path = match writer.write_manifest().await {
        Ok(path) => Some(path),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Failed to write manifest");
            None
        }
    };

    if summary.write_failures > 0 {
        warn!(failures = summary.write_failures, "Some articles could not be written");
    }
    info!(
        written = summary.articles_written,
        skipped = summary.articles_skipped,
        "Backup finished"
    );

    Ok(summary)
}

async fn fetch_kind<T>(
    client: &dyn PageClient,
    config: &BackupConfig,
    kind: ItemKind,
) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    let url = client.listing_url(&config.language, kind);
    Ok(fetch_all(client, &url, kind).await?)
}
