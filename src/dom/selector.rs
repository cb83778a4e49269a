//! Compiled CSS selectors and `querySelector`-style lookup over an ArenaDom.

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::SelectorList;

use super::arena::{ArenaDom, ArenaNodeId};
use super::element_ref::{ElementRef, PageSelectors};
use crate::error::{Error, Result};

/// A parsed selector list, e.g. `h1.entry-title` or `.entry-content, article`.
pub struct Selector {
    source: String,
    list: SelectorList<PageSelectors>,
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(
            &PageSelectors,
            &mut parser,
            selectors::parser::ParseRelative::No,
        )
        .map_err(|_| Error::Selector {
            selector: source.to_string(),
        })?;

        Ok(Self {
            source: source.to_string(),
            list,
        })
    }

    /// The selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether the element `id` matches any selector in the list.
    pub fn matches(&self, dom: &ArenaDom, id: ArenaNodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(dom, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );

        self.list.slice().iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }

    /// First matching element in document order, like DOM `querySelector`.
    pub fn select_first(&self, dom: &ArenaDom) -> Option<ArenaNodeId> {
        dom.descendants(dom.document())
            .find(|&id| self.matches(dom, id))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn first(html: &str, selector: &str) -> Option<String> {
        let parsed = parse_html(html);
        let dom = &parsed.dom;
        Selector::parse(selector)
            .unwrap()
            .select_first(dom)
            .map(|id| dom.text_of(id))
    }

    #[test]
    fn test_tag_and_class() {
        let html = r#"<h1>Site</h1><h1 class="entry-title">Chapter 1</h1>"#;
        assert_eq!(first(html, "h1.entry-title").as_deref(), Some("Chapter 1"));
        assert_eq!(first(html, "h1").as_deref(), Some("Site"));
        assert_eq!(first(html, "h2"), None);
    }

    #[test]
    fn test_class_among_many() {
        let html = r#"<div class="post entry-content wide">Body</div>"#;
        assert_eq!(first(html, ".entry-content").as_deref(), Some("Body"));
        assert_eq!(first(html, ".entry"), None);
    }

    #[test]
    fn test_first_in_document_order() {
        let html = r#"<div class="c"><span class="c">inner</span></div><p class="c">later</p>"#;
        assert_eq!(first(html, ".c").as_deref(), Some("inner"));
    }

    #[test]
    fn test_id_attribute_and_combinators() {
        let html = r#"<article id="post"><div dir="ltr"><p>Direct</p></div></article>"#;
        assert_eq!(first(html, "#post p").as_deref(), Some("Direct"));
        assert_eq!(first(html, "article > p"), None);
        assert_eq!(first(html, "div[dir=ltr] > p").as_deref(), Some("Direct"));
    }

    #[test]
    fn test_selector_list() {
        let html = r#"<section class="body">Fallback</section>"#;
        assert_eq!(
            first(html, ".entry-content, section.body").as_deref(),
            Some("Fallback")
        );
    }

    #[test]
    fn test_invalid_selector() {
        let err = Selector::parse("h1..entry").unwrap_err();
        assert!(matches!(err, Error::Selector { ref selector } if selector == "h1..entry"));
        assert!(Selector::parse("").is_err());
    }
}
