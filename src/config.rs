//! Configuration: book metadata, directory layout and conversion settings.
//!
//! Sources are layered, highest priority first:
//!
//! 1. Environment variables (`QUIRE_` prefix, `__` between levels, e.g.
//!    `QUIRE_CONVERT__CONCURRENCY=4` or `QUIRE_BOOK__TITLE=...`)
//! 2. A TOML file (`--config FILE`, or `quire.toml` in the working directory)
//! 3. Built-in defaults
//!
//! A minimal file only needs the `[book]` table:
//!
//! ```toml
//! [book]
//! title = "A Practical Guide to Evil"
//! author = "ErraticErrata"
//! publisher = "stormbeta"
//! identifier = "urn:uuid:af4f5de9-3468-4eb3-b847-055283ed17da"
//! description = "The Empire stands triumphant."
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file looked up in the working directory when none is given.
const DEFAULT_CONFIG_NAME: &str = "quire";

/// Static per-book metadata written into the OPF and NCX.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    /// Unique identifier, usually a `urn:uuid:` URN.
    pub identifier: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub assets: BookAssets,
}

impl BookMetadata {
    /// Create metadata with the required fields; everything else defaults.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publisher: String::new(),
            identifier: identifier.into(),
            description: String::new(),
            language: default_language(),
            assets: BookAssets::default(),
        }
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Filenames of the fixed book assets provided by the scaffold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookAssets {
    pub ncx: String,
    pub cover_xhtml: String,
    pub cover_image: String,
    pub cover_media_type: String,
}

impl Default for BookAssets {
    fn default() -> Self {
        Self {
            ncx: "toc.ncx".to_string(),
            cover_xhtml: "cover.xhtml".to_string(),
            cover_image: "cover.png".to_string(),
            cover_media_type: "image/png".to_string(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Where inputs are read from and the book tree is written to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathsConfig {
    /// Downloaded `*.html` chapter pages.
    pub cache_dir: PathBuf,
    /// JSON array of `{ "title": ... }`, one per chapter.
    pub manifest: PathBuf,
    /// Static tree copied into `book_dir`.
    pub scaffold_dir: PathBuf,
    pub book_dir: PathBuf,
    /// Directory holding `content.opf` and the NCX.
    pub content_dir: PathBuf,
    /// Converted `*.xhtml` chapters.
    pub chapters_dir: PathBuf,
}

/// Chapter conversion settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertConfig {
    /// Maximum number of chapters converted at once.
    pub concurrency: usize,
    pub title_selector: String,
    pub content_selector: String,
    /// Re-parse every generated chapter with an XML reader before writing it.
    pub verify_xhtml: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::pool::DEFAULT_WIDTH,
            title_selector: "h1.entry-title".to_string(),
            content_selector: ".entry-content".to_string(),
            verify_xhtml: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

/// Complete tool configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuireConfig {
    pub book: BookMetadata,
    pub paths: PathsConfig,
    pub convert: ConvertConfig,
    pub log: LogConfig,
}

/// Load configuration from defaults, an optional file and the environment.
///
/// With `path = None`, `quire.toml` in the working directory is used if it
/// exists. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<QuireConfig> {
    let convert = ConvertConfig::default();
    let mut builder = Config::builder()
        .set_default("paths.cache_dir", "cache")?
        .set_default("paths.manifest", "cache/chapters.json")?
        .set_default("paths.scaffold_dir", "scaffolding")?
        .set_default("paths.book_dir", "book")?
        .set_default("paths.content_dir", "book/OEBPS")?
        .set_default("paths.chapters_dir", "book/OEBPS/chapters")?
        .set_default("convert.concurrency", convert.concurrency as u64)?
        .set_default("convert.title_selector", convert.title_selector)?
        .set_default("convert.content_selector", convert.content_selector)?
        .set_default("convert.verify_xhtml", convert.verify_xhtml)?
        .set_default("log.level", "info")?;

    builder = match path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
    };

    builder = builder.add_source(
        Environment::with_prefix("QUIRE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config: QuireConfig = builder.build()?.try_deserialize()?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &QuireConfig) -> Result<()> {
    if config.book.title.trim().is_empty() {
        return Err(Error::Config("book.title cannot be empty".to_string()));
    }
    if config.book.identifier.trim().is_empty() {
        return Err(Error::Config("book.identifier cannot be empty".to_string()));
    }
    if config.convert.concurrency == 0 {
        return Err(Error::Config(
            "convert.concurrency must be at least 1".to_string(),
        ));
    }
    crate::dom::Selector::parse(&config.convert.title_selector)?;
    crate::dom::Selector::parse(&config.convert.content_selector)?;
    Ok(())
}

/// Log the effective configuration.
pub fn log_config(config: &QuireConfig) {
    tracing::info!(
        title = %config.book.title,
        author = %config.book.author,
        identifier = %config.book.identifier,
        "book"
    );
    tracing::info!(
        cache = %config.paths.cache_dir.display(),
        manifest = %config.paths.manifest.display(),
        scaffold = %config.paths.scaffold_dir.display(),
        book = %config.paths.book_dir.display(),
        chapters = %config.paths.chapters_dir.display(),
        "paths"
    );
    tracing::debug!(
        concurrency = config.convert.concurrency,
        title_selector = %config.convert.title_selector,
        content_selector = %config.convert.content_selector,
        verify_xhtml = config.convert.verify_xhtml,
        "conversion"
    );
}
