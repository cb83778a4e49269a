//! Copy of the static book skeleton (mimetype, META-INF, cover, styles).

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Windows thumbnail caches are often locked and never belong in a book.
const SKIPPED_FILE: &str = "Thumbs.db";

/// Recursively copy `scaffold_dir` into `book_dir`.
///
/// Existing files are overwritten and missing directories are created.
/// Returns the number of files copied.
pub async fn copy_scaffold(scaffold_dir: &Path, book_dir: &Path) -> Result<usize> {
    let mut pending: Vec<(PathBuf, PathBuf)> =
        vec![(scaffold_dir.to_path_buf(), book_dir.to_path_buf())];
    let mut copied = 0;

    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to)
            .await
            .map_err(|e| Error::io(&to, e))?;

        let mut entries = tokio::fs::read_dir(&from)
            .await
            .map_err(|e| Error::io(&from, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(&from, e))? {
            let source = entry.path();
            let target = to.join(entry.file_name());
            let file_type = entry.file_type().await.map_err(|e| Error::io(&source, e))?;

            if file_type.is_dir() {
                pending.push((source, target));
            } else if entry.file_name() == SKIPPED_FILE {
                tracing::debug!(path = %source.display(), "skipping");
            } else {
                tokio::fs::copy(&source, &target)
                    .await
                    .map_err(|e| Error::io(&target, e))?;
                copied += 1;
            }
        }
    }

    tracing::debug!(
        files = copied,
        from = %scaffold_dir.display(),
        to = %book_dir.display(),
        "scaffold copied"
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn test_copies_tree_and_skips_thumbs() {
        let tmp = tempfile::tempdir().unwrap();
        let scaffold = tmp.path().join("scaffolding");
        fs::create_dir_all(scaffold.join("META-INF")).unwrap();
        fs::create_dir_all(scaffold.join("OEBPS/images")).unwrap();
        fs::write(scaffold.join("mimetype"), "application/epub+zip").unwrap();
        fs::write(scaffold.join("META-INF/container.xml"), "<container/>").unwrap();
        fs::write(scaffold.join("OEBPS/cover.xhtml"), "<html/>").unwrap();
        fs::write(scaffold.join("OEBPS/images/Thumbs.db"), "junk").unwrap();
        fs::write(scaffold.join("Thumbs.db"), "junk").unwrap();

        let book = tmp.path().join("book");
        let copied = copy_scaffold(&scaffold, &book).await.unwrap();

        assert_eq!(copied, 3);
        assert_eq!(
            fs::read_to_string(book.join("mimetype")).unwrap(),
            "application/epub+zip"
        );
        assert!(book.join("META-INF/container.xml").is_file());
        assert!(book.join("OEBPS/cover.xhtml").is_file());
        assert!(book.join("OEBPS/images").is_dir());
        assert!(!book.join("Thumbs.db").exists());
        assert!(!book.join("OEBPS/images/Thumbs.db").exists());
    }

    #[tokio::test]
    async fn test_overwrites_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let scaffold = tmp.path().join("scaffolding");
        let book = tmp.path().join("book");
        fs::create_dir_all(&scaffold).unwrap();
        fs::create_dir_all(&book).unwrap();
        fs::write(scaffold.join("mimetype"), "application/epub+zip").unwrap();
        fs::write(book.join("mimetype"), "stale").unwrap();
        fs::write(book.join("extra.txt"), "kept").unwrap();

        copy_scaffold(&scaffold, &book).await.unwrap();
        assert_eq!(
            fs::read_to_string(book.join("mimetype")).unwrap(),
            "application/epub+zip"
        );
        assert_eq!(fs::read_to_string(book.join("extra.txt")).unwrap(), "kept");
    }

    #[tokio::test]
    async fn test_missing_scaffold_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = copy_scaffold(&missing, &tmp.path().join("book")).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));
    }
}
