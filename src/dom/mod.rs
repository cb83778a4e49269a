//! HTML parsing and querying for cached chapter pages.
//!
//! Pages are parsed with html5ever into an arena DOM ([`ArenaDom`]),
//! queried with CSS selectors ([`Selector`]) and written back out as XHTML
//! fragments ([`inner_xhtml`]).
//!
//! # Example
//!
//! ```
//! use quire::dom::{parse_html, inner_xhtml, Selector};
//!
//! let parsed = parse_html(r#"<div class="entry-content"><p>Hi<br>there</p></div>"#);
//! let content = Selector::parse(".entry-content")?
//!     .select_first(&parsed.dom)
//!     .unwrap();
//! assert_eq!(inner_xhtml(&parsed.dom, content), "<p>Hi<br/>there</p>");
//! # Ok::<(), quire::Error>(())
//! ```

mod arena;
mod element_ref;
mod selector;
mod serialize;
mod tree_sink;

use std::borrow::Cow;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use element_ref::{ElementRef, PageSelectors};
pub use selector::Selector;
pub use serialize::{escape_attr, escape_text, inner_xhtml, outer_xhtml};
pub(crate) use serialize::is_xml_char;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

/// A parsed HTML document together with the parser's recoverable errors.
pub struct ParsedDocument {
    pub dom: ArenaDom,
    /// Diagnostics html5ever reported while recovering from tag soup.
    pub errors: Vec<Cow<'static, str>>,
}

/// Parse an HTML document.
///
/// html5ever follows the browser algorithm, so this never fails; malformed
/// markup is repaired and reported in [`ParsedDocument::errors`].
pub fn parse_html(html: &str) -> ParsedDocument {
    let sink = ArenaSink::new();
    let sink = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    let (dom, errors) = sink.into_parts();
    ParsedDocument { dom, errors }
}

/// Decode raw page bytes as strict UTF-8, skipping a leading byte order mark.
///
/// Returns `None` if the bytes are not valid UTF-8.
pub fn decode_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
}
