//! Delegated HTML parsing.
//!
//! The engine does not implement an HTML tokenizer or tree builder;
//! parsing is handed to [html5ever](https://github.com/servo/html5ever)
//! and its RcDom output is walked into the willow-dom arena. This crate is
//! the whole of that glue: the host-facing callback shape is
//! `parse_html(text) → tree of (tag, attrs, text, children)`.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use willow_dom::{DomTree, ElementData, NodeId, NodeType};

/// Parse an HTML document into a willow-dom tree.
///
/// Parse errors never surface; html5ever recovers per the HTML standard
/// and we render whatever tree it produces.
#[must_use]
pub fn parse_html(html: &str) -> DomTree {
    let opts = ParseOpts::default();
    let dom: RcDom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        // reading from an in-memory slice cannot fail
        .unwrap_or_else(|_| RcDom::default());

    let mut tree = DomTree::new();
    convert_node(&dom.document, &mut tree, NodeId::ROOT);
    tree
}

/// Convert one html5ever node (and its subtree) into the arena.
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, parent);
            }
        }

        // doctype and processing instructions carry no rendering content
        NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {}

        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if text.is_empty() {
                return;
            }
            let node = tree.alloc(NodeType::Text(text));
            tree.append_child(parent, node);
        }

        NodeData::Comment { contents } => {
            let node = tree.alloc(NodeType::Comment(contents.to_string()));
            tree.append_child(parent, node);
        }

        NodeData::Element { name, attrs, .. } => {
            let tag_name = name.local.to_string();
            let attributes: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let node = tree.alloc(NodeType::Element(ElementData::new(tag_name, attributes)));
            tree.append_child(parent, node);
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_an_element_tree() {
        let tree = parse_html("<html><body><p id=\"x\">hi <b>there</b></p></body></html>");
        let html = tree.document_element().expect("document element");
        assert_eq!(tree.as_element(html).unwrap().tag_name, "html");

        let p = tree
            .descendants(html)
            .find(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == "p"))
            .expect("p element");
        assert_eq!(tree.as_element(p).unwrap().id(), Some("x"));
        assert_eq!(tree.text_content(p), "hi there");
    }

    #[test]
    fn implied_elements_are_inserted() {
        // the HTML parser inserts html/head/body around bare content
        let tree = parse_html("<p>solo</p>");
        let html = tree.document_element().expect("document element");
        let tags: Vec<String> = tree
            .descendants(html)
            .filter_map(|id| tree.as_element(id).map(|e| e.tag_name.clone()))
            .collect();
        assert!(tags.contains(&"body".to_string()));
        assert!(tags.contains(&"p".to_string()));
    }

    #[test]
    fn comments_are_kept_but_inert() {
        let tree = parse_html("<body><!-- note --><p>x</p></body>");
        let html = tree.document_element().unwrap();
        assert_eq!(tree.text_content(html).trim(), "x");
    }
}
