//! # quire
//!
//! Assemble an EPUB from a directory of downloaded web-serial chapter pages.
//!
//! ## Pipeline
//!
//! 1. [`Converter`] turns every cached `*.html` page into a standalone XHTML
//!    chapter, at most ten at a time.
//! 2. [`PackageAssembler`] pairs the converted files with a JSON list of
//!    titles and writes `content.opf` and `toc.ncx`, while copying a static
//!    scaffold (mimetype, `META-INF`, cover) into the book directory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quire::{BookMetadata, Converter, PackageLayout, assemble};
//!
//! # async fn run() -> quire::Result<()> {
//! Converter::new()
//!     .convert_all("cache".as_ref(), "book/OEBPS/chapters".as_ref())
//!     .await?;
//!
//! let metadata = BookMetadata::new(
//!     "A Practical Guide to Evil",
//!     "ErraticErrata",
//!     "urn:uuid:af4f5de9-3468-4eb3-b847-055283ed17da",
//! );
//! let layout = PackageLayout {
//!     scaffold_dir: "scaffolding".into(),
//!     book_dir: "book".into(),
//!     content_dir: "book/OEBPS".into(),
//!     chapters_dir: "book/OEBPS/chapters".into(),
//!     manifest: "cache/chapters.json".into(),
//! };
//! assemble(&layout, &metadata).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod dom;
pub mod error;
pub mod package;
pub mod pool;
pub mod util;
pub mod xml;

pub use config::{BookAssets, BookMetadata, QuireConfig, load_config};
pub use convert::{ChapterDocument, ChapterSource, Converter, list_chapter_sources};
pub use error::{Error, Result};
pub use package::{
    AssembleReport, ChapterRecord, ManifestEntry, PackageAssembler, PackageLayout, assemble,
    derive_chapter_records, render_ncx, render_opf,
};
pub use pool::BoundedPool;
