//! hcmirror - Mirror a help center into Markdown files
//!
//! Fetches every category, section and article from a help-center API and
//! writes one Markdown file per article (with YAML front-matter) plus a CSV
//! manifest, for offline backup and archival diffing.
//!
//! # Architecture
//!
//! The backup is a single sequential pass:
//! - Fetch the three paginated listings
//! - Drop ignored items top-down (category → section → article)
//! - Render each kept article and write it under its category/section folder
//! - Write `_log.csv` listing every file written
//!
//! # Modules
//!
//! - `adapters`: Remote API access (PageClient, HelpCenterClient)
//! - `core`: Fetching, filtering, rendering and writing
//! - `domain`: Data structures (Category, Section, Article)
//! - `config`: Credentials and settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Back up everything into backups_md/<date>/en-us/
//! hcmirror backup
//!
//! # One folder per category, skipping ids listed in ignore.json5
//! hcmirror backup --no-section --ignore-file ignore.json5
//!
//! # Dump the content tree
//! hcmirror structure --output structure.json --lang en-us
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{FetchError, HelpCenterClient, PageClient, PageOutcome};
pub use config::{BackupConfig, Credentials};
pub use crate::core::{run_backup, BackupSummary, IgnoreSet};
pub use domain::{Article, Category, ItemId, ItemKind, Section};
