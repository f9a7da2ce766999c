//! Command-line interface for hcmirror.
//!
//! Provides commands for backing up the help center as Markdown and for
//! dumping its category/section/article structure as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::HelpCenterClient;
use crate::config::{self, BackupConfig, Credentials, Settings};
use crate::core::{generate_structure, run_backup, write_structure};

/// hcmirror - Mirror a help center into Markdown files
#[derive(Parser, Debug)]
#[command(name = "hcmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up every article as a Markdown file
    Backup {
        /// Place articles directly under category folders, without section subfolders
        #[arg(long)]
        no_section: bool,

        /// JSON5 file listing category, section or article ids to ignore
        #[arg(long)]
        ignore_file: Option<PathBuf>,
    },

    /// Write the category/section/article structure as JSON
    Structure {
        /// Output file
        #[arg(short, long, default_value = "zendesk_structure.json")]
        output: PathBuf,

        /// Language code of the help-center content (e.g. en-us, es, fr)
        #[arg(long)]
        lang: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        // A missing .env is fine; the variables may come from the shell
        dotenvy::dotenv().ok();

        let settings = config::load_settings()?;

        match self.command {
            Commands::Backup {
                no_section,
                ignore_file,
            } => backup(&settings, no_section, ignore_file).await,
            Commands::Structure { output, lang } => {
                let language = lang.unwrap_or_else(|| settings.language.clone());
                structure(&settings, &output, &language).await
            }
        }
    }
}

fn client_for(settings: &Settings) -> Result<HelpCenterClient> {
    let credentials = Credentials::from_env()?;
    HelpCenterClient::new(&credentials, settings.request_timeout)
        .context("Failed to create HTTP client")
}

async fn backup(settings: &Settings, no_section: bool, ignore_file: Option<PathBuf>) -> Result<()> {
    let client = client_for(settings)?;
    let config = BackupConfig::new(settings, no_section, ignore_file);

    let summary = run_backup(&client, &config).await?;

    println!("Backup written to {}", summary.base_path.display());
    println!(
        "  categories: {} fetched, {} kept",
        summary.categories_fetched, summary.categories_kept
    );
    println!(
        "  sections:   {} fetched, {} kept",
        summary.sections_fetched, summary.sections_kept
    );
    println!(
        "  articles:   {} fetched, {} kept, {} written, {} without body, {} failed",
        summary.articles_fetched,
        summary.articles_kept,
        summary.articles_written,
        summary.articles_skipped,
        summary.write_failures
    );
    match &summary.manifest_path {
        Some(path) => println!("  manifest:   {}", path.display()),
        None => eprintln!("  manifest:   not written"),
    }

    Ok(())
}

async fn structure(settings: &Settings, output: &Path, language: &str) -> Result<()> {
    let client = client_for(settings)?;

    let report = generate_structure(&client, language).await?;
    write_structure(output, &report).await?;

    println!(
        "Structure for '{}' written to {} ({} categories, {} unmapped articles)",
        language,
        output.display(),
        report.categories.len(),
        report.articles_not_in_listed_sections.len()
    );
    Ok(())
}
