//! Ignore sets and hierarchy filtering.
//!
//! Filtering runs top-down: categories first, then sections (which also need
//! a kept parent category), then articles (which need a kept section when
//! they name one).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{Article, Category, ItemId, Section};

/// Identifiers excluded from the backup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    pub categories: HashSet<ItemId>,
    pub sections: HashSet<ItemId>,
    pub articles: HashSet<ItemId>,
}

impl IgnoreSet {
    /// Load an ignore file. Never fails: a missing or malformed file
    /// yields an empty set (with a warning).
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Ignore file not found, nothing will be ignored");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read ignore file");
                return Self::default();
            }
        };

        match Self::parse(&content) {
            Ok(set) => {
                info!(path = %path.display(), "Loaded ignore configuration");
                set.log_summary();
                set
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not parse ignore file");
                Self::default()
            }
        }
    }

    /// Parse a JSON5 document with optional `category`, `section` and
    /// `article` arrays of `{ "id": ... }` objects.
    pub fn parse(content: &str) -> Result<Self, json5::Error> {
        let doc: Value = json5::from_str(content)?;

        Ok(Self {
            categories: ids_of(&doc, "category"),
            sections: ids_of(&doc, "section"),
            articles: ids_of(&doc, "article"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.sections.is_empty() && self.articles.is_empty()
    }

    fn log_summary(&self) {
        if self.is_empty() {
            info!("Ignore file lists no ids");
            return;
        }
        for (kind, ids) in [
            ("category", &self.categories),
            ("section", &self.sections),
            ("article", &self.articles),
        ] {
            if !ids.is_empty() {
                let sorted: BTreeSet<_> = ids.iter().collect();
                info!(ids = ?sorted, "Ignoring {} ids", kind);
            }
        }
    }
}

fn ids_of(doc: &Value, field: &str) -> HashSet<ItemId> {
    match doc.get(field) {
        None | Some(Value::Null) => HashSet::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.get("id").and_then(id_value))
            .collect(),
        Some(_) => {
            warn!("'{}' in ignore file is not a list, skipping {} ignores", field, field);
            HashSet::new()
        }
    }
}

fn id_value(value: &Value) -> Option<ItemId> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Categories whose id is not ignored
pub fn filter_categories(ignore: &IgnoreSet, categories: Vec<Category>) -> Vec<Category> {
    categories
        .into_iter()
        .filter(|c| !ignore.categories.contains(&c.id))
        .collect()
}

/// Sections that are not ignored and whose category was kept
pub fn filter_sections(
    ignore: &IgnoreSet,
    kept_categories: &HashSet<ItemId>,
    sections: Vec<Section>,
) -> Vec<Section> {
    sections
        .into_iter()
        .filter(|s| !ignore.sections.contains(&s.id))
        .filter(|s| {
            s.category_id
                .map_or(false, |cid| kept_categories.contains(&cid))
        })
        .collect()
}

/// Articles that are not ignored and have no section or a kept one
pub fn filter_articles(
    ignore: &IgnoreSet,
    kept_sections: &HashSet<ItemId>,
    articles: Vec<Article>,
) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| !ignore.articles.contains(&a.id))
        .filter(|a| a.section_id.map_or(true, |sid| kept_sections.contains(&sid)))
        .collect()
}

/// Filtered content plus the lookups used to place articles
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pub categories: HashMap<ItemId, Category>,
    pub sections: HashMap<ItemId, Section>,
    /// Kept articles in fetch order
    pub articles: Vec<Article>,
}

impl Hierarchy {
    /// Apply the ignore set in dependency order
    pub fn build(
        ignore: &IgnoreSet,
        categories: Vec<Category>,
        sections: Vec<Section>,
        articles: Vec<Article>,
    ) -> Self {
        let categories: HashMap<_, _> = filter_categories(ignore, categories)
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let kept_categories: HashSet<_> = categories.keys().copied().collect();

        let sections: HashMap<_, _> = filter_sections(ignore, &kept_categories, sections)
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let kept_sections: HashSet<_> = sections.keys().copied().collect();

        let articles = filter_articles(ignore, &kept_sections, articles);

        Self {
            categories,
            sections,
            articles,
        }
    }

    /// Section and category of an article, if it has a kept section
    pub fn placement(&self, article: &Article) -> (Option<&Category>, Option<&Section>) {
        let section = article.section_id.and_then(|sid| self.sections.get(&sid));
        let category = section
            .and_then(|s| s.category_id)
            .and_then(|cid| self.categories.get(&cid));
        (category, section)
    }
}
