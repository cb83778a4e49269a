//! Extraction and cleaning of a single chapter page.

use std::path::Path;

use crate::dom::{ArenaDom, ArenaNodeId, Selector, escape_text, inner_xhtml, parse_html};
use crate::error::{Error, Result};

/// Attribute value that only restates the default text direction.
const DEFAULT_DIR: &str = "ltr";

/// Which parts of a page hold the chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRules {
    /// First match is the heading whose text becomes the chapter title.
    pub title_selector: String,
    /// First match is the container whose children become the chapter body.
    pub content_selector: String,
}

impl Default for ChapterRules {
    fn default() -> Self {
        Self {
            title_selector: "h1.entry-title".to_string(),
            content_selector: ".entry-content".to_string(),
        }
    }
}

/// A chapter ready to be written as an XHTML content document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDocument {
    /// Text content of the page heading, unescaped.
    pub title: String,
    /// Serialized inner markup of the cleaned content container.
    pub body: String,
}

impl ChapterDocument {
    /// Render the standalone XHTML 1.1 document for this chapter.
    pub fn to_xhtml(&self, language: &str) -> String {
        let title = escape_text(&self.title);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
  <head>
    <meta http-equiv="Content-Type" content="application/xhtml+xml; charset=utf-8" />
    <title>{title}</title>
  </head>
  <body>
    <h1>{title}</h1>

    {body}
  </body>
</html>"#,
            lang = crate::dom::escape_attr(language),
            title = title,
            body = self.body,
        )
    }
}

/// Pull the title and cleaned body out of a chapter page.
///
/// `path` is only used to label errors. The parsed DOM is owned by this
/// function and released before it returns, whichever way it returns.
pub fn extract_chapter(html: &str, rules: &ChapterRules, path: &Path) -> Result<ChapterDocument> {
    let title_selector = Selector::parse(&rules.title_selector)?;
    let content_selector = Selector::parse(&rules.content_selector)?;

    let mut parsed = parse_html(html);
    if !parsed.errors.is_empty() {
        tracing::debug!(
            file = %path.display(),
            count = parsed.errors.len(),
            first = %parsed.errors[0],
            "html parse errors recovered"
        );
    }
    let dom = &mut parsed.dom;

    let heading = title_selector
        .select_first(dom)
        .ok_or_else(|| Error::structure(path, format!("no element matches `{title_selector}`")))?;
    let title = dom.text_of(heading);

    let container = content_selector
        .select_first(dom)
        .ok_or_else(|| Error::structure(path, format!("no element matches `{content_selector}`")))?;

    clean_content(dom, container).map_err(|what| Error::structure(path, what))?;
    let body = inner_xhtml(dom, container);

    Ok(ChapterDocument { title, body })
}

/// Strip site navigation and redundant attributes from a content container.
///
/// The first and last element children are the previous/next chapter links
/// and are removed by position. Remaining direct element children lose a
/// `dir="ltr"` attribute.
pub fn clean_content(dom: &mut ArenaDom, container: ArenaNodeId) -> std::result::Result<(), String> {
    let children: Vec<ArenaNodeId> = dom.element_children(container).collect();
    let [first, .., last] = children[..] else {
        return Err(format!(
            "content container has {} element children, expected navigation links before and after the text",
            children.len()
        ));
    };

    dom.detach(first);
    dom.detach(last);

    for child in &children[1..children.len() - 1] {
        if dom.get_attr(*child, "dir") == Some(DEFAULT_DIR) {
            dom.remove_attr(*child, "dir");
        }
    }

    Ok(())
}
