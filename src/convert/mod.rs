//! Conversion of cached chapter pages into XHTML content documents.
//!
//! Every `*.html` file in the cache directory becomes `<stem>.xhtml` in the
//! content directory. Conversions run on a [`BoundedPool`], and
//! [`Converter::convert_all`] only returns once every one has settled.
//!
//! ```no_run
//! use quire::convert::Converter;
//!
//! # async fn run() -> quire::Result<()> {
//! let written = Converter::new()
//!     .with_concurrency(4)
//!     .convert_all("cache".as_ref(), "book/OEBPS/chapters".as_ref())
//!     .await?;
//! println!("{} chapters", written.len());
//! # Ok(())
//! # }
//! ```

mod chapter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Instrument;

pub use chapter::{ChapterDocument, ChapterRules, clean_content, extract_chapter};

use crate::config::ConvertConfig;
use crate::dom::{Selector, decode_utf8};
use crate::error::{Error, Result};
use crate::pool::{BoundedPool, DEFAULT_WIDTH};
use crate::util::list_files;
use crate::xml::check_well_formed;

/// Extension of cached chapter pages.
pub const SOURCE_SUFFIX: &str = ".html";
/// Extension of converted chapters.
pub const OUTPUT_EXTENSION: &str = "xhtml";

/// One cached chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSource {
    /// Absolute path of the page.
    pub path: PathBuf,
    /// File name, including the `.html` extension.
    pub filename: String,
}

impl ChapterSource {
    /// Name of the converted file: the source stem with an `.xhtml` extension.
    pub fn output_name(&self) -> String {
        let stem = self
            .filename
            .strip_suffix(SOURCE_SUFFIX)
            .unwrap_or(&self.filename);
        format!("{stem}.{OUTPUT_EXTENSION}")
    }
}

/// List the cached chapter pages in `cache_dir`, sorted by file name.
pub async fn list_chapter_sources(cache_dir: &Path) -> Result<Vec<ChapterSource>> {
    let cache_dir = crate::util::normalize_path(cache_dir)?;
    let sources = list_files(&cache_dir, SOURCE_SUFFIX)
        .await?
        .into_iter()
        .map(|file| ChapterSource {
            path: file.path,
            filename: file.name,
        })
        .collect();
    Ok(sources)
}

/// Converts chapter pages with shared, immutable settings.
#[derive(Debug, Clone)]
pub struct Converter {
    rules: Arc<ChapterRules>,
    language: String,
    concurrency: usize,
    verify_xhtml: bool,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// A converter with the default selectors, `en` and a pool of 10.
    pub fn new() -> Self {
        Self {
            rules: Arc::new(ChapterRules::default()),
            language: "en".to_string(),
            concurrency: DEFAULT_WIDTH,
            verify_xhtml: true,
        }
    }

    /// Build a converter from the `[convert]` configuration table.
    ///
    /// Both selectors are parsed up front so a typo fails before any file
    /// is touched.
    pub fn with_config(config: &ConvertConfig) -> Result<Self> {
        Selector::parse(&config.title_selector)?;
        Selector::parse(&config.content_selector)?;
        Ok(Self {
            rules: Arc::new(ChapterRules {
                title_selector: config.title_selector.clone(),
                content_selector: config.content_selector.clone(),
            }),
            language: "en".to_string(),
            concurrency: config.concurrency.max(1),
            verify_xhtml: config.verify_xhtml,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the `xml:lang` written on every chapter.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_verify_xhtml(mut self, verify: bool) -> Self {
        self.verify_xhtml = verify;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn rules(&self) -> &ChapterRules {
        &self.rules
    }

    /// Convert one page and write it into `content_dir`.
    ///
    /// The work runs inside a `convert_chapter` span that stays open from
    /// the read until the output is written or the conversion fails.
    pub async fn convert_one(
        &self,
        source: &ChapterSource,
        content_dir: &Path,
    ) -> Result<ChapterDocument> {
        let span = tracing::debug_span!("convert_chapter", file = %source.filename);
        self.convert_in_span(source, content_dir).instrument(span).await
    }

    async fn convert_in_span(&self, source: &ChapterSource, content_dir: &Path) -> Result<ChapterDocument> {
        tracing::debug!("reading");
        let bytes = tokio::fs::read(&source.path)
            .await
            .map_err(|e| Error::io(&source.path, e))?;

        // The DOM lives only inside `render`, so nothing parsed survives
        // past this point whichever way it went.
        let (document, xhtml) = self.render(&bytes, &source.path)?;

        let output = content_dir.join(source.output_name());
        self.verify(&xhtml, &output)?;

        tokio::fs::write(&output, xhtml)
            .await
            .map_err(|e| Error::io(&output, e))?;

        tracing::debug!(title = %document.title, "converted");
        Ok(document)
    }

    fn render(&self, bytes: &[u8], path: &Path) -> Result<(ChapterDocument, String)> {
        let html = decode_utf8(bytes).ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            message: "not valid UTF-8".to_string(),
        })?;
        let document = extract_chapter(&html, &self.rules, path)?;
        let xhtml = document.to_xhtml(&self.language);
        Ok((document, xhtml))
    }

    fn verify(&self, xhtml: &str, output: &Path) -> Result<()> {
        if !self.verify_xhtml {
            return Ok(());
        }
        check_well_formed(xhtml).map_err(|message| Error::MalformedOutput {
            path: output.to_path_buf(),
            message,
        })
    }

    /// Convert every cached page in `cache_dir` into `content_dir`.
    ///
    /// Returns the converted chapters in file name order. When any
    /// conversion fails, the others still run to completion and keep their
    /// output; the error of the earliest failing page is returned.
    pub async fn convert_all(
        &self,
        cache_dir: &Path,
        content_dir: &Path,
    ) -> Result<Vec<ChapterDocument>> {
        let sources = list_chapter_sources(cache_dir).await?;
        let total = sources.len();
        tracing::info!(
            chapters = total,
            concurrency = self.concurrency,
            from = %cache_dir.display(),
            "converting chapters"
        );

        let converter = self.clone();
        let content_dir: Arc<Path> = Arc::from(content_dir);
        let documents = BoundedPool::new(self.concurrency)
            .run(sources, move |source| {
                let converter = converter.clone();
                let content_dir = content_dir.clone();
                async move { converter.convert_one(&source, &content_dir).await }
            })
            .await?;

        tracing::info!(chapters = total, "all chapters converted");
        Ok(documents)
    }
}
