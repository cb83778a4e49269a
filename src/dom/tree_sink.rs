//! html5ever TreeSink implementation for ArenaDom.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// Name reported for handles that are not elements.
static NO_NAME: QualName = QualName {
    prefix: None,
    ns: html5ever::ns!(),
    local: html5ever::local_name!(""),
};

/// Builds an ArenaDom from parser callbacks.
///
/// html5ever's TreeSink takes `&self` everywhere, so the DOM sits behind a
/// RefCell. Recoverable parse errors are collected rather than dropped.
#[derive(Default)]
pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
    errors: RefCell<Vec<Cow<'static, str>>>,
}

/// Where a new child goes.
#[derive(Clone, Copy)]
enum Place {
    End(ArenaNodeId),
    Before(ArenaNodeId),
}

impl ArenaSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the sink and return the DOM with the parser's diagnostics.
    pub fn into_parts(self) -> (ArenaDom, Vec<Cow<'static, str>>) {
        (self.dom.into_inner(), self.errors.into_inner())
    }

    /// Attach a node or a run of text at `at`. Text appended at the end of
    /// a parent merges into a trailing text node.
    fn place(&self, at: Place, child: NodeOrText<ArenaNodeId>) {
        let mut dom = self.dom.borrow_mut();
        match (at, child) {
            (Place::End(parent), NodeOrText::AppendNode(node)) => dom.append(parent, node),
            (Place::End(parent), NodeOrText::AppendText(text)) => dom.append_text(parent, &text),
            (Place::Before(sibling), NodeOrText::AppendNode(node)) => {
                dom.detach(node);
                dom.insert_before(sibling, node);
            }
            (Place::Before(sibling), NodeOrText::AppendText(text)) => {
                let node = dom.create_text(text.to_string());
                dom.insert_before(sibling, node);
            }
        }
    }

    fn parent_of(&self, id: ArenaNodeId) -> ArenaNodeId {
        self.dom
            .borrow()
            .get(id)
            .map_or(ArenaNodeId::NONE, |n| n.parent)
    }
}

fn convert_attrs(attrs: Vec<Html5Attribute>) -> impl Iterator<Item = Attribute> {
    attrs.into_iter().map(|a| Attribute {
        name: a.name,
        value: a.value.to_string(),
    })
}

impl TreeSink for ArenaSink {
    type Handle = ArenaNodeId;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> ArenaNodeId {
        self.dom.borrow().document()
    }

    fn elem_name<'a>(&'a self, target: &'a ArenaNodeId) -> &'a QualName {
        let dom = self.dom.borrow();
        let Some(ArenaNodeData::Element { name, .. }) = dom.get(*target).map(|n| &n.data) else {
            return &NO_NAME;
        };
        // SAFETY: nodes are never removed from the arena, and html5ever
        // consumes the returned name before it asks the sink to allocate
        // another node, so the backing vector is not reallocated while this
        // reference is in use.
        unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
    }

    fn create_element(&self, name: QualName, attrs: Vec<Html5Attribute>, _flags: ElementFlags) -> ArenaNodeId {
        let attrs = convert_attrs(attrs).collect();
        self.dom.borrow_mut().create_element(name, attrs)
    }

    fn create_comment(&self, text: StrTendril) -> ArenaNodeId {
        self.dom.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> ArenaNodeId {
        // Only reachable from foreign content; an empty comment keeps the tree shape.
        self.dom.borrow_mut().create_comment(String::new())
    }

    fn append(&self, parent: &ArenaNodeId, child: NodeOrText<ArenaNodeId>) {
        self.place(Place::End(*parent), child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &ArenaNodeId,
        prev_element: &ArenaNodeId,
        child: NodeOrText<ArenaNodeId>,
    ) {
        if self.parent_of(*element).is_some() {
            self.place(Place::Before(*element), child);
        } else {
            self.place(Place::End(*prev_element), child);
        }
    }

    fn append_before_sibling(&self, sibling: &ArenaNodeId, new_node: NodeOrText<ArenaNodeId>) {
        self.place(Place::Before(*sibling), new_node);
    }

    fn append_doctype_to_document(&self, name: StrTendril, public_id: StrTendril, system_id: StrTendril) {
        let mut dom = self.dom.borrow_mut();
        let doctype = dom.create_doctype(name.to_string(), public_id.to_string(), system_id.to_string());
        let document = dom.document();
        dom.append(document, doctype);
    }

    fn get_template_contents(&self, target: &ArenaNodeId) -> ArenaNodeId {
        // Template contents stay inline under the template element.
        *target
    }

    fn same_node(&self, x: &ArenaNodeId, y: &ArenaNodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn add_attrs_if_missing(&self, target: &ArenaNodeId, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        let Some(ArenaNodeData::Element { attrs: existing, .. }) = dom.get_mut(*target).map(|n| &mut n.data) else {
            return;
        };
        for attr in convert_attrs(attrs) {
            if !existing.iter().any(|a| a.name == attr.name) {
                existing.push(attr);
            }
        }
    }

    fn remove_from_parent(&self, target: &ArenaNodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &ArenaNodeId, new_parent: &ArenaNodeId) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(*node).collect();
        for child in children {
            dom.detach(child);
            dom.append(*new_parent, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_html;

    #[test]
    fn test_text_and_attributes() {
        let parsed = parse_html(r#"<div id="main" class="container header"><p>Hello</p></div>"#);
        let dom = &parsed.dom;

        let div = dom.find_by_tag("div").unwrap();
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.element_classes(div), ["container", "header"]);

        let p = dom.find_by_tag("p").unwrap();
        let text = dom.children(p).next().unwrap();
        assert_eq!(dom.text_content(text), Some("Hello"));
    }

    #[test]
    fn test_misnested_markup_is_recovered() {
        let parsed = parse_html("<div><p>One<p>Two</div><b><i>bold</b>italic</i>");
        let dom = &parsed.dom;

        let div = dom.find_by_tag("div").unwrap();
        assert_eq!(dom.element_children(div).count(), 2);
        assert!(!parsed.errors.is_empty());
    }

    #[test]
    fn test_foster_parented_text_lands_before_table() {
        let parsed = parse_html("<div><table>stray<tr><td>cell</td></tr></table></div>");
        let dom = &parsed.dom;

        let div = dom.find_by_tag("div").unwrap();
        let first = dom.children(div).next().unwrap();
        assert_eq!(dom.text_content(first), Some("stray"));
        assert_eq!(dom.text_of(dom.find_by_tag("td").unwrap()), "cell");
    }
}
