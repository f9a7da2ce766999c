//! Writing rendered articles and the run manifest.
//!
//! Output layout under the base run path:
//!
//! ```text
//! <base>/<Category>/<Section>/<Title>.md   (default)
//! <base>/<Category>/<Title>.md             (flattened)
//! <base>/_log.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::domain::ItemId;

/// Name of the manifest written at the base run path
pub const MANIFEST_FILE: &str = "_log.csv";

/// Fixed manifest header
pub const MANIFEST_HEADER: [&str; 6] = [
    "Article ID",
    "Category",
    "Section",
    "File",
    "Title",
    "Article URL",
];

/// One manifest line per written article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub article_id: ItemId,
    pub category: String,
    pub section: String,
    pub file: String,
    pub title: String,
    pub url: String,
}

/// Writes article files under a base path and collects manifest rows
pub struct ArticleWriter {
    base: PathBuf,
    flatten_sections: bool,
    rows: Vec<ManifestRow>,
}

impl ArticleWriter {
    pub fn new(base: impl Into<PathBuf>, flatten_sections: bool) -> Self {
        Self {
            base: base.into(),
            flatten_sections,
            rows: Vec::new(),
        }
    }

    /// Rows recorded so far, in write order
    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    /// Folder for an article, from already-sanitized segments
    pub fn folder_for(&self, category_segment: &str, section_segment: &str) -> PathBuf {
        if self.flatten_sections {
            self.base.join(category_segment)
        } else {
            self.base.join(category_segment).join(section_segment)
        }
    }

    /// Write one document and record it in the manifest.
    ///
    /// `row.file` is filled in with the name actually used. Returns the
    /// written path.
    pub async fn write(
        &mut self,
        mut row: ManifestRow,
        file_stem: &str,
        contents: &str,
    ) -> Result<PathBuf> {
        let folder = self.folder_for(&row.category, &row.section);
        fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("Failed to create folder: {}", folder.display()))?;

        let file_name = unique_file_name(&folder, file_stem, "md");
        let path = folder.join(&file_name);

        fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write article: {}", path.display()))?;

        debug!(path = %path.display(), "Wrote article");
        row.file = file_name;
        self.rows.push(row);
        Ok(path)
    }

    /// Write `_log.csv` with every recorded row
    pub async fn write_manifest(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.base)
            .await
            .with_context(|| format!("Failed to create folder: {}", self.base.display()))?;

        let path = self.base.join(MANIFEST_FILE);
        let bytes = manifest_csv(&self.rows)?;
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;

        info!(path = %path.display(), rows = self.rows.len(), "Manifest written");
        Ok(path)
    }
}

/// `<stem>.<ext>`, or `<stem>_<n>.<ext>` with the smallest free `n >= 1`
pub fn unique_file_name(folder: &Path, stem: &str, extension: &str) -> String {
    let base = format!("{}.{}", stem, extension);
    if !folder.join(&base).exists() {
        return base;
    }

    let mut counter = 1u32;
    loop {
        let candidate = format!("{}_{}.{}", stem, counter, extension);
        if !folder.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Encode the manifest as CSV bytes (header always present)
pub fn manifest_csv(rows: &[ManifestRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(MANIFEST_HEADER)
        .context("Failed to encode manifest header")?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to encode manifest row for article {}", row.article_id))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush manifest: {}", e))
}
