//! Backup Pipeline Integration Tests
//!
//! Drives `run_backup` end to end against an in-memory help center and
//! checks the files and manifest it leaves on disk.

mod common;

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{json, Value};
use tempfile::TempDir;

use common::{
    article, backup_config, billing_help_center, read_manifest, split_front_matter, FakeHelpCenter,
    FakePage,
};
use hcmirror::{run_backup, ItemKind};

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    article_id: u64,
    source_url: String,
    category: String,
    section: String,
    tags: Vec<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn base_path(temp: &TempDir) -> PathBuf {
    temp.path().join("2024-05-01").join("en-us")
}

#[tokio::test]
async fn test_single_article_backup() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([article(
        100,
        "Refund Policy",
        json!("<p>Hello</p>"),
        json!(10)
    )]));

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    let file = base_path(&temp).join("Billing/Invoices/Refund_Policy.md");
    let doc = std::fs::read_to_string(&file).unwrap();
    assert!(doc.contains("\ntags: []\n"));
    assert!(doc.contains("\n# Refund Policy\n"));
    assert!(doc.ends_with("\n\nHello\n"));

    assert_eq!(summary.articles_written, 1);
    assert_eq!(summary.base_path, base_path(&temp));

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    assert_eq!(
        manifest,
        vec![
            vec!["Article ID", "Category", "Section", "File", "Title", "Article URL"],
            vec![
                "100",
                "Billing",
                "Invoices",
                "Refund_Policy.md",
                "Refund Policy",
                "https://help.example.com/a/100"
            ],
        ]
    );
}

#[tokio::test]
async fn test_ignored_category_drops_its_subtree() {
    let temp = TempDir::new().unwrap();
    let ignore_file = temp.path().join("ignore.json5");
    std::fs::write(&ignore_file, "{ category: [{ id: 1 }] // Billing\n}").unwrap();

    let client = billing_help_center(json!([
        article(100, "Refund Policy", json!("<p>Hello</p>"), json!(10)),
        article(101, "Loose", json!("<p>No section</p>"), Value::Null),
    ]));

    let mut config = backup_config(temp.path());
    config.ignore_file = Some(ignore_file);

    let summary = run_backup(&client, &config).await.unwrap();

    assert_eq!(summary.categories_kept, 0);
    assert_eq!(summary.sections_kept, 0);
    assert_eq!(summary.articles_kept, 1);
    assert!(!base_path(&temp).join("Billing").exists());

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest[1][0], "101");
    assert_eq!(manifest[1][1], "Uncategorized");
    assert_eq!(manifest[1][2], "Unsectioned");
    assert!(base_path(&temp)
        .join("Uncategorized/Unsectioned/Loose.md")
        .exists());
}

#[tokio::test]
async fn test_article_without_body_is_skipped() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([
        article(100, "Draft", Value::Null, json!(10)),
        article(101, "Empty", json!(""), json!(10)),
    ]));

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    assert_eq!(summary.articles_fetched, 2);
    assert_eq!(summary.articles_skipped, 1);
    assert_eq!(summary.articles_written, 1);
    assert!(!base_path(&temp).join("Billing/Invoices/Draft.md").exists());

    let empty = std::fs::read_to_string(base_path(&temp).join("Billing/Invoices/Empty.md")).unwrap();
    assert!(empty.ends_with("# Empty\n\n\n"));

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    let ids: Vec<&str> = manifest[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["101"]);
}

#[tokio::test]
async fn test_same_titles_get_numbered_suffixes() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([
        article(1, "FAQ", json!("<p>a</p>"), json!(10)),
        article(2, "FAQ?", json!("<p>b</p>"), json!(10)),
        article(3, "FAQ", json!("<p>c</p>"), json!(10)),
    ]));

    run_backup(&client, &backup_config(temp.path())).await.unwrap();

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    let files: Vec<(&str, &str)> = manifest[1..]
        .iter()
        .map(|r| (r[0].as_str(), r[3].as_str()))
        .collect();
    assert_eq!(
        files,
        vec![("1", "FAQ.md"), ("2", "FAQ_.md"), ("3", "FAQ_1.md")]
    );

    let third = std::fs::read_to_string(base_path(&temp).join("Billing/Invoices/FAQ_1.md")).unwrap();
    assert!(third.contains("article_id: 3\n"));
}

#[tokio::test]
async fn test_flattened_layout() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([article(
        100,
        "Refund Policy",
        json!("<p>Hello</p>"),
        json!(10)
    )]));

    let mut config = backup_config(temp.path());
    config.flatten_sections = true;
    run_backup(&client, &config).await.unwrap();

    assert!(base_path(&temp).join("Billing/Refund_Policy.md").exists());
    assert!(!base_path(&temp).join("Billing/Invoices").exists());
}

#[tokio::test]
async fn test_front_matter_round_trip() {
    let temp = TempDir::new().unwrap();
    let title = "Say \"Hi\" \\ to: #everyone";
    let client = FakeHelpCenter::new()
        .listing(
            ItemKind::Categories,
            json!([{ "id": 1, "name": "Billing & \"Payments\"" }]),
        )
        .listing(
            ItemKind::Sections,
            json!([{ "id": 10, "name": "Invoices: 2024", "category_id": 1 }]),
        )
        .listing(
            ItemKind::Articles,
            json!([{
                "id": 987654321,
                "title": title,
                "body": "<h2>Intro</h2><p>Text</p>",
                "html_url": "https://help.example.com/a/987654321?x=1&y=2",
                "label_names": ["billing", "it's \"quoted\"", "- dash"],
                "created_at": "2024-01-02T03:04:05Z",
                "section_id": 10
            }]),
        );

    run_backup(&client, &backup_config(temp.path())).await.unwrap();

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    let row = &manifest[1];
    let path = base_path(&temp).join(&row[1]).join(&row[2]).join(&row[3]);
    let doc = std::fs::read_to_string(path).unwrap();

    let (yaml, rest) = split_front_matter(&doc);
    let fm: FrontMatter = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(fm.title, title);
    assert_eq!(fm.article_id, 987654321);
    assert_eq!(fm.source_url, "https://help.example.com/a/987654321?x=1&y=2");
    assert_eq!(fm.category, "Billing & \"Payments\"");
    assert_eq!(fm.section, "Invoices: 2024");
    assert_eq!(fm.tags, vec!["billing", "it's \"quoted\"", "- dash"]);
    assert_eq!(fm.created_at.as_deref(), Some("2024-01-02T03:04:05Z"));
    assert!(fm.updated_at.is_none());

    assert_eq!(rest, format!("\n# {}\n\n## Intro\n\nText\n", title));
}

#[tokio::test]
async fn test_pagination_and_early_404() {
    let temp = TempDir::new().unwrap();
    let first = FakeHelpCenter::first_url(ItemKind::Articles);
    let client = billing_help_center(Value::Null)
        .page(
            first.clone(),
            FakePage::Json(json!({
                "articles": [article(1, "One", json!("<p>1</p>"), json!(10))],
                "next_page": "mem://help/articles.json?page=2"
            })),
        )
        .page(
            "mem://help/articles.json?page=2",
            FakePage::Json(json!({
                "results": [article(2, "Two", json!("<p>2</p>"), json!(10))],
                "next_page": "mem://help/articles.json?page=3"
            })),
        )
        .page("mem://help/articles.json?page=3", FakePage::NotFound);

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    assert_eq!(summary.articles_fetched, 2);
    assert_eq!(summary.articles_written, 2);
    assert_eq!(
        client.requests(),
        vec![
            FakeHelpCenter::first_url(ItemKind::Categories),
            FakeHelpCenter::first_url(ItemKind::Sections),
            first,
            "mem://help/articles.json?page=2".to_string(),
            "mem://help/articles.json?page=3".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_missing_listing_is_empty_not_fatal() {
    let temp = TempDir::new().unwrap();
    let client = FakeHelpCenter::new();

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    assert_eq!(summary.categories_fetched, 0);
    assert_eq!(summary.articles_written, 0);
    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    assert_eq!(manifest.len(), 1);
}

#[tokio::test]
async fn test_http_error_aborts_run() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([]))
        .page(FakeHelpCenter::first_url(ItemKind::Sections), FakePage::Status(500));

    let err = run_backup(&client, &backup_config(temp.path()))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to fetch sections"));
    assert!(!base_path(&temp).join("_log.csv").exists());
    assert!(!client
        .requests()
        .contains(&FakeHelpCenter::first_url(ItemKind::Articles)));
}

#[tokio::test]
async fn test_malformed_items_are_skipped() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([
        { "title": "No id", "body": "<p>x</p>", "section_id": 10 },
        article(5, "Fine", json!("<p>ok</p>"), json!(10)),
    ]));

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    assert_eq!(summary.articles_fetched, 1);
    assert_eq!(summary.articles_written, 1);
}

#[tokio::test]
async fn test_null_title_is_written_as_unnamed() {
    let temp = TempDir::new().unwrap();
    let client = billing_help_center(json!([
        { "id": 5, "title": null, "body": "<p>x</p>", "section_id": 10 },
    ]));

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    assert_eq!(summary.articles_fetched, 1);
    assert_eq!(summary.articles_written, 1);

    let doc = std::fs::read_to_string(base_path(&temp).join("Billing/Invoices/Unnamed.md")).unwrap();
    assert!(doc.contains("title: \"\"\n"));

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    assert_eq!(manifest[1][0], "5");
    assert_eq!(manifest[1][3], "Unnamed.md");
}

#[tokio::test]
async fn test_write_failure_skips_article_and_continues() {
    let temp = TempDir::new().unwrap();
    // A plain file where the category folder should go
    std::fs::create_dir_all(base_path(&temp)).unwrap();
    std::fs::write(base_path(&temp).join("Billing"), "not a folder").unwrap();

    let client = billing_help_center(json!([
        article(100, "Refund Policy", json!("<p>Hello</p>"), json!(10)),
        article(101, "Loose", json!("<p>No section</p>"), Value::Null),
    ]));

    let summary = run_backup(&client, &backup_config(temp.path())).await.unwrap();

    assert_eq!(summary.write_failures, 1);
    assert_eq!(summary.articles_written, 1);
    assert!(base_path(&temp)
        .join("Uncategorized/Unsectioned/Loose.md")
        .exists());

    let manifest = read_manifest(&base_path(&temp).join("_log.csv"));
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest[1][0], "101");
}
