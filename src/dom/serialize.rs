//! XHTML fragment serializer for ArenaDom subtrees.
//!
//! Produces XML-compatible markup (`innerHTML` of an element, but with void
//! elements self-closed and text escaped for XML), so the result can be
//! embedded verbatim into an XHTML content document. Foreign content such as
//! inline SVG gets the namespace declarations an XML reader needs, and
//! characters XML 1.0 cannot carry are dropped.

use html5ever::{Namespace, Prefix, ns};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// HTML void elements; these never have children and self-close in XHTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Serialize the children of `id`, like DOM `innerHTML`.
pub fn inner_xhtml(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let default_ns = dom.element_namespace(id).cloned().unwrap_or(ns!(html));
    let mut writer = Writer::new(dom);
    for child in dom.children(id) {
        writer.node(child, &default_ns);
    }
    writer.out
}

/// Serialize `id` itself and its subtree, like DOM `outerHTML`.
pub fn outer_xhtml(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let parent = dom.get(id).map_or(ArenaNodeId::NONE, |n| n.parent);
    let default_ns = dom.element_namespace(parent).cloned().unwrap_or(ns!(html));
    let mut writer = Writer::new(dom);
    writer.node(id, &default_ns);
    writer.out
}

struct Writer<'a> {
    dom: &'a ArenaDom,
    out: String,
    /// Attribute prefixes declared by enclosing elements of the fragment.
    bound: Vec<Prefix>,
}

impl<'a> Writer<'a> {
    fn new(dom: &'a ArenaDom) -> Self {
        Self {
            dom,
            out: String::new(),
            bound: Vec::new(),
        }
    }

    /// `default_ns` is the namespace an unprefixed element inherits here.
    fn node(&mut self, id: ArenaNodeId, default_ns: &Namespace) {
        let Some(node) = self.dom.get(id) else {
            return;
        };

        match &node.data {
            ArenaNodeData::Text(text) => self.out.push_str(&escape_text(text)),
            ArenaNodeData::Comment(text) => self.comment(text),
            ArenaNodeData::Element { name, attrs, .. } => {
                let tag: &str = &name.local;
                if !is_xml_name(tag) {
                    tracing::debug!(tag, "unwrapping element whose name is not valid XML");
                    self.children(id, default_ns);
                    return;
                }

                self.out.push('<');
                self.out.push_str(tag);
                if name.ns != *default_ns {
                    self.out.push_str(" xmlns=\"");
                    self.out.push_str(&escape_attr(&name.ns));
                    self.out.push('"');
                }
                let scope = self.bound.len();
                for attr in attrs {
                    self.attr(attr);
                }

                if name.ns == ns!(html) && VOID_ELEMENTS.contains(&tag) {
                    self.out.push_str("/>");
                } else {
                    self.out.push('>');
                    self.children(id, &name.ns);
                    self.out.push_str("</");
                    self.out.push_str(tag);
                    self.out.push('>');
                }
                self.bound.truncate(scope);
            }
            ArenaNodeData::Document => self.children(id, default_ns),
            ArenaNodeData::Doctype { .. } => {}
        }
    }

    fn children(&mut self, id: ArenaNodeId, default_ns: &Namespace) {
        for child in self.dom.children(id) {
            self.node(child, default_ns);
        }
    }

    fn comment(&mut self, text: &str) {
        // XML comments may not contain "--" or end in "-"
        self.out.push_str("<!--");
        let mut prev = None;
        for c in text.chars().filter(|&c| is_xml_char(c)) {
            if c == '-' && prev == Some('-') {
                self.out.push(' ');
            }
            self.out.push(c);
            prev = Some(c);
        }
        if prev == Some('-') {
            self.out.push(' ');
        }
        self.out.push_str("-->");
    }

    fn attr(&mut self, attr: &Attribute) {
        let name = &attr.name;
        // Declarations are rewritten from element namespaces instead
        if name.ns == ns!(xmlns) || (name.prefix.is_none() && &*name.local == "xmlns") {
            return;
        }
        if !is_xml_name(&name.local) {
            tracing::debug!(attr = %&*name.local, "dropping attribute whose name is not valid XML");
            return;
        }

        if let Some(prefix) = &name.prefix
            && &**prefix != "xml"
            && !self.bound.contains(prefix)
        {
            self.out.push_str(" xmlns:");
            self.out.push_str(prefix);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attr(&name.ns));
            self.out.push('"');
            self.bound.push(prefix.clone());
        }

        self.out.push(' ');
        if let Some(prefix) = &name.prefix {
            self.out.push_str(prefix);
            self.out.push(':');
        }
        self.out.push_str(&name.local);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attr(&attr.value));
        self.out.push('"');
    }
}

/// Whether `c` matches the XML 1.0 `Char` production.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Unprefixed names that survive a namespace-aware XML reader.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '\u{B7}'))
}

/// Escape text content for XML.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            c if is_xml_char(c) => result.push(c),
            _ => {}
        }
    }
    result
}

/// Escape a double-quoted attribute value for XML.
///
/// Tabs and line breaks become character references so attribute value
/// normalization does not turn them into spaces.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\t' => result.push_str("&#9;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            c if is_xml_char(c) => result.push(c),
            _ => {}
        }
    }
    result
}
