//! Core backup logic.
//!
//! This module contains:
//! - Fetcher: Paginated listing walker
//! - Filter: Ignore sets and hierarchy filtering
//! - Sanitize: File-system safe names
//! - Html / Render: Article bodies and front-matter to Markdown
//! - Writer: Article files and the CSV manifest
//! - Pipeline: The end-to-end backup run
//! - Structure: JSON report of the content tree

pub mod fetcher;
pub mod filter;
pub mod html;
pub mod pipeline;
pub mod render;
pub mod sanitize;
pub mod structure;
pub mod writer;

// Re-export commonly used types
pub use fetcher::fetch_all;
pub use filter::{filter_articles, filter_categories, filter_sections, Hierarchy, IgnoreSet};
pub use html::{html_to_markdown, ConvertError};
pub use pipeline::{run_backup, BackupSummary};
pub use render::render_article;
pub use sanitize::sanitize_name;
pub use structure::{build_structure, generate_structure, write_structure, StructureReport};
pub use writer::{ArticleWriter, ManifestRow};
