//! Path helpers shared by conversion and packaging.

use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::{Error, Result};

/// Bytes that cannot appear literally in one segment of a relative URL.
const HREF_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A regular file found by [`list_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFile {
    pub name: String,
    pub path: PathBuf,
}

/// List regular files in `dir` whose name ends with `suffix`, sorted by name.
///
/// Names are compared byte-wise. Subdirectories and names that are not
/// valid UTF-8 are skipped.
pub async fn list_files(dir: &Path, suffix: &str) -> Result<Vec<ListedFile>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(dir, e))? {
        let path = entry.path();
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %path.display(), "skipping non UTF-8 file name");
            continue;
        };
        if !name.ends_with(suffix) {
            continue;
        }
        let file_type = entry.file_type().await.map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            continue;
        }
        files.push(ListedFile { name, path });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Make `path` absolute against the working directory and fold `.` and `..`.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Relative path from directory `from` to `to`, joined with `/`.
///
/// Returns an empty string when both name the same directory.
pub fn relative_path(from: &Path, to: &Path) -> Result<String> {
    let from = normalize_path(from)?;
    let to = normalize_path(to)?;
    Ok(relative_components(&from, &to))
}

fn relative_components(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat_n("..".to_string(), from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// `href` of `filename` as seen from `from`, when the file lives in `dir`.
///
/// Every segment is percent-encoded, so names with spaces, `#` or `%`
/// still resolve to the file.
pub fn href_to(from: &Path, dir: &Path, filename: &str) -> Result<String> {
    let prefix = relative_path(from, dir)?;
    let mut href = String::new();
    for segment in prefix.split('/').filter(|s| !s.is_empty()) {
        href.extend(utf8_percent_encode(segment, HREF_SEGMENT));
        href.push('/');
    }
    href.extend(utf8_percent_encode(filename, HREF_SEGMENT));
    Ok(href)
}
