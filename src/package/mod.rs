//! EPUB package assembly: OPF, NCX and the static scaffold.
//!
//! Packaging only looks at the converted chapter files on disk, never at
//! conversion state. Reading order is the byte-wise order of chapter file
//! names, and the Nth title in the JSON manifest belongs to the Nth file.

mod ncx;
mod opf;
mod records;
mod scaffold;

use std::path::{Path, PathBuf};

pub use ncx::render_ncx;
pub use opf::{OPF_FILENAME, render_opf};
pub use records::{ChapterRecord, ManifestEntry, derive_chapter_records, read_manifest};
pub use scaffold::copy_scaffold;

use crate::config::{BookMetadata, PathsConfig};
use crate::error::{Error, Result};

/// Directories and files involved in packaging a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub scaffold_dir: PathBuf,
    pub book_dir: PathBuf,
    pub content_dir: PathBuf,
    pub chapters_dir: PathBuf,
    pub manifest: PathBuf,
}

impl From<&PathsConfig> for PackageLayout {
    fn from(paths: &PathsConfig) -> Self {
        Self {
            scaffold_dir: paths.scaffold_dir.clone(),
            book_dir: paths.book_dir.clone(),
            content_dir: paths.content_dir.clone(),
            chapters_dir: paths.chapters_dir.clone(),
            manifest: paths.manifest.clone(),
        }
    }
}

/// What [`assemble`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleReport {
    pub scaffold_files: usize,
    pub chapters: Vec<ChapterRecord>,
    pub opf_path: PathBuf,
    pub ncx_path: PathBuf,
}

/// Builds the package documents for one book.
#[derive(Debug, Clone)]
pub struct PackageAssembler {
    metadata: BookMetadata,
}

impl PackageAssembler {
    pub fn new(metadata: BookMetadata) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &BookMetadata {
        &self.metadata
    }

    /// Copy the scaffold while deriving and writing the OPF and NCX.
    ///
    /// Waits for the copy and both writes to settle. If more than one
    /// failed, the scaffold error wins, then the OPF, then the NCX. Nothing
    /// already written is removed.
    pub async fn assemble(&self, layout: &PackageLayout) -> Result<AssembleReport> {
        tracing::info!(
            book = %layout.book_dir.display(),
            chapters = %layout.chapters_dir.display(),
            "assembling package"
        );

        let (scaffold, documents) = tokio::join!(
            copy_scaffold(&layout.scaffold_dir, &layout.book_dir),
            self.write_documents(layout),
        );

        let scaffold_files = scaffold?;
        let (chapters, opf_path, ncx_path) = documents?;

        tracing::info!(
            chapters = chapters.len(),
            scaffold_files,
            opf = %opf_path.display(),
            "package assembled"
        );
        Ok(AssembleReport {
            scaffold_files,
            chapters,
            opf_path,
            ncx_path,
        })
    }

    async fn write_documents(
        &self,
        layout: &PackageLayout,
    ) -> Result<(Vec<ChapterRecord>, PathBuf, PathBuf)> {
        let records =
            derive_chapter_records(&layout.content_dir, &layout.chapters_dir, &layout.manifest)
                .await?;

        let opf_path = layout.content_dir.join(OPF_FILENAME);
        let ncx_path = layout.content_dir.join(&self.metadata.assets.ncx);
        let opf = render_opf(&records, &self.metadata);
        let ncx = render_ncx(&records, &self.metadata);

        let (opf_written, ncx_written) = tokio::join!(
            write_file(&opf_path, opf),
            write_file(&ncx_path, ncx),
        );
        opf_written?;
        ncx_written?;

        Ok((records, opf_path, ncx_path))
    }
}

/// Assemble a book with the given metadata. See [`PackageAssembler::assemble`].
pub async fn assemble(layout: &PackageLayout, metadata: &BookMetadata) -> Result<AssembleReport> {
    PackageAssembler::new(metadata.clone()).assemble(layout).await
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), "written");
    Ok(())
}
