//! Domain types for hcmirror.
//!
//! This module contains the content items fetched from the help center:
//! - Category, Section, Article
//! - ItemKind: which listing an item comes from

pub mod content;

// Re-export commonly used types
pub use content::{Article, Category, ItemId, ItemKind, Section};
