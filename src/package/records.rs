//! Ordered chapter list shared by the OPF and NCX.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::util::{href_to, list_files};

/// Extension of converted chapters listed for packaging.
const CHAPTER_SUFFIX: &str = ".xhtml";

/// One entry of the JSON title manifest. Other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub title: String,
}

/// A chapter as it appears in the package manifest, spine and navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    /// Chapter file name, also used as the manifest item id.
    pub id: String,
    pub title: String,
    /// Location of the chapter relative to the content directory.
    pub href: String,
}

/// Read the JSON title manifest.
pub async fn read_manifest(manifest_path: &Path) -> Result<Vec<ManifestEntry>> {
    let manifest_error = |source| Error::Manifest {
        path: manifest_path.to_path_buf(),
        source,
    };
    let contents = tokio::fs::read(manifest_path)
        .await
        .map_err(|e| manifest_error(serde_json::Error::io(e)))?;
    serde_json::from_slice(&contents).map_err(manifest_error)
}

/// Build the chapter list from the converted files and the title manifest.
///
/// Files are taken in byte-wise file name order and paired with titles by
/// position.
pub async fn derive_chapter_records(
    content_dir: &Path,
    chapters_dir: &Path,
    manifest_path: &Path,
) -> Result<Vec<ChapterRecord>> {
    let titles = read_manifest(manifest_path).await?;
    let files = list_files(chapters_dir, CHAPTER_SUFFIX).await?;
    let names: Vec<String> = files.into_iter().map(|file| file.name).collect();

    let records = pair_titles(names, titles, |name| href_to(content_dir, chapters_dir, name))?;
    tracing::debug!(
        chapters = records.len(),
        dir = %chapters_dir.display(),
        "derived chapter records"
    );
    Ok(records)
}

/// Zip sorted file names with manifest titles.
pub(crate) fn pair_titles<F>(
    names: Vec<String>,
    titles: Vec<ManifestEntry>,
    href: F,
) -> Result<Vec<ChapterRecord>>
where
    F: Fn(&str) -> Result<String>,
{
    if titles.len() < names.len() {
        return Err(Error::ManifestMismatch {
            chapters: names.len(),
            titles: titles.len(),
            first_untitled: names[titles.len()].clone(),
        });
    }
    if titles.len() > names.len() {
        tracing::warn!(
            chapters = names.len(),
            titles = titles.len(),
            "title manifest has more entries than chapters"
        );
    }

    names
        .into_iter()
        .zip(titles)
        .map(|(name, entry)| {
            Ok(ChapterRecord {
                href: href(&name)?,
                id: name,
                title: entry.title,
            })
        })
        .collect()
}
