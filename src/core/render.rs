//! Article → Markdown document.
//!
//! Layout of a rendered article:
//!
//! ```text
//! ---
//! title: "Refund Policy"
//! article_id: 42
//! source_url: "https://help.example.com/articles/42"
//! category: "Billing"
//! section: "Invoices"
//! tags: []
//! created_at: "2024-01-02T03:04:05Z"
//! updated_at: "2024-02-03T04:05:06Z"
//! ---
//!
//! # Refund Policy
//!
//! <converted body>
//! ```

use std::fmt::Write as _;

use tracing::warn;

use super::html::html_to_markdown;
use crate::domain::Article;

/// Body text used when the HTML could not be converted
pub const CONVERSION_PLACEHOLDER: &str = "[Content could not be converted to Markdown]";

/// Source URL written when the article has none
pub const MISSING_URL: &str = "URL_Not_Available";

/// Render one article with its resolved category and section display names
pub fn render_article(article: &Article, category: &str, section: &str) -> String {
    let body = match article.body.as_deref() {
        Some(html) => convert_body(article, html),
        None => String::new(),
    };

    let mut doc = front_matter(article, category, section);
    doc.push('\n');
    let heading = format!("# {}", heading_text(&article.title));
    let _ = writeln!(doc, "{}", heading.trim_end());
    doc.push('\n');
    doc.push_str(&body);
    doc.push('\n');
    doc
}

/// Title as the text of a single-line ATX heading
fn heading_text(title: &str) -> String {
    let mut text = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.starts_with('#') {
        text.insert(0, '\\');
    }
    // A trailing `#` run after a space reads as a closing sequence
    let kept = text.trim_end_matches('#').len();
    if kept < text.len() && text[..kept].ends_with(' ') {
        text.insert(kept, '\\');
    }

    text
}

fn convert_body(article: &Article, html: &str) -> String {
    match html_to_markdown(html) {
        Ok(markdown) => markdown,
        Err(e) => {
            warn!(article_id = article.id, error = %e, "Body conversion failed, using placeholder");
            CONVERSION_PLACEHOLDER.to_string()
        }
    }
}

/// The `---` delimited YAML block, including the closing delimiter line
pub fn front_matter(article: &Article, category: &str, section: &str) -> String {
    let mut out = String::from("---\n");

    let _ = writeln!(out, "title: {}", yaml_quote(&article.title));
    let _ = writeln!(out, "article_id: {}", article.id);
    let _ = writeln!(
        out,
        "source_url: {}",
        yaml_quote(article.html_url.as_deref().unwrap_or(MISSING_URL))
    );
    let _ = writeln!(out, "category: {}", yaml_quote(category));
    let _ = writeln!(out, "section: {}", yaml_quote(section));

    if article.label_names.is_empty() {
        out.push_str("tags: []\n");
    } else {
        out.push_str("tags:\n");
        for label in &article.label_names {
            let _ = writeln!(out, "  - {}", yaml_quote(label));
        }
    }

    if let Some(created) = article.created_at.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "created_at: {}", yaml_quote(created));
    }
    if let Some(updated) = article.updated_at.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "updated_at: {}", yaml_quote(updated));
    }

    out.push_str("---\n");
    out
}

/// YAML double-quoted scalar
fn yaml_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');

    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }

    out.push('"');
    out
}
