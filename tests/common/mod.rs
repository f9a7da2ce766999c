//! Shared fixtures: an in-memory help center.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use hcmirror::{BackupConfig, FetchError, ItemKind, PageClient, PageOutcome};

/// What the fake server answers for one URL
#[derive(Debug, Clone)]
pub enum FakePage {
    Json(Value),
    NotFound,
    Status(u16),
}

/// Serves canned pages keyed by URL and records every request
#[derive(Default)]
pub struct FakeHelpCenter {
    pages: HashMap<String, FakePage>,
    requests: Mutex<Vec<String>>,
}

impl FakeHelpCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// First-page URL the fake hands out for a listing
    pub fn first_url(kind: ItemKind) -> String {
        format!("mem://help/{}.json", kind)
    }

    pub fn page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Single-page listing of `items` under the kind's field name
    pub fn listing(self, kind: ItemKind, items: Value) -> Self {
        let mut body = serde_json::Map::new();
        body.insert(kind.endpoint_segment().to_string(), items);
        body.insert("next_page".to_string(), Value::Null);
        self.page(Self::first_url(kind), FakePage::Json(Value::Object(body)))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageClient for FakeHelpCenter {
    fn listing_url(&self, _language: &str, kind: ItemKind) -> String {
        Self::first_url(kind)
    }

    async fn get_page(&self, url: &str) -> Result<PageOutcome, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.pages.get(url) {
            Some(FakePage::Json(value)) => Ok(PageOutcome::Found(value.clone())),
            Some(FakePage::NotFound) | None => Ok(PageOutcome::NotFound),
            Some(FakePage::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
        }
    }
}

pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

pub fn backup_config(root: &Path) -> BackupConfig {
    BackupConfig {
        backup_folder: root.to_path_buf(),
        language: "en-us".to_string(),
        flatten_sections: false,
        ignore_file: None,
        run_date: run_date(),
    }
}

/// One category "Billing" (1) with one section "Invoices" (10)
pub fn billing_help_center(articles: Value) -> FakeHelpCenter {
    FakeHelpCenter::new()
        .listing(
            ItemKind::Categories,
            json!([{ "id": 1, "name": "Billing", "html_url": "https://help.example.com/c/1" }]),
        )
        .listing(
            ItemKind::Sections,
            json!([{ "id": 10, "name": "Invoices", "category_id": 1 }]),
        )
        .listing(ItemKind::Articles, articles)
}

pub fn article(id: u64, title: &str, body: Value, section_id: Value) -> Value {
    json!({
        "id": id,
        "title": title,
        "body": body,
        "html_url": format!("https://help.example.com/a/{}", id),
        "label_names": [],
        "section_id": section_id
    })
}

/// Split a rendered document into its YAML front-matter and the rest
pub fn split_front_matter(doc: &str) -> (&str, &str) {
    let rest = doc.strip_prefix("---\n").expect("front-matter start");
    let end = rest.find("\n---\n").expect("front-matter end");
    (&rest[..end + 1], &rest[end + 5..])
}

/// All manifest records, header included
pub fn read_manifest(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();

    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}
