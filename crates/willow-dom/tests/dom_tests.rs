//! Tests for the arena tree: construction, traversal, mutation, state bits,
//! and dirty-flag propagation.

use willow_dom::{DomTree, ElementData, NodeId, NodeType, ParsedNode};

/// Helper to create an element node and return its `NodeId`.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag, [])))
}

// ========== construction and traversal ==========

#[test]
fn test_append_child_links_siblings() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, a);
    tree.append_child(parent, b);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.parent(b), Some(parent));
}

#[test]
fn test_ancestors_terminate_at_root() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let body = alloc_element(&mut tree, "body");
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, body);
    tree.append_child(body, p);

    let chain: Vec<NodeId> = tree.ancestors(p).collect();
    assert_eq!(chain, vec![body, html, NodeId::ROOT]);
}

#[test]
fn test_descendants_document_order() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(html, body);
    tree.append_child(body, p);

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, head, body, p]);
}

#[test]
fn test_from_parsed_builds_tree() {
    let parsed = ParsedNode::Element {
        tag: "html".to_string(),
        attrs: vec![],
        children: vec![ParsedNode::Element {
            tag: "body".to_string(),
            attrs: vec![("CLASS".to_string(), "main".to_string())],
            children: vec![ParsedNode::Text("hello".to_string())],
        }],
    };
    let tree = DomTree::from_parsed(&parsed);

    let html = tree.document_element().unwrap();
    assert_eq!(tree.as_element(html).unwrap().tag_name, "html");
    let body = tree.children(html)[0];
    // attribute names are lowercased on entry
    assert!(tree.as_element(body).unwrap().has_class("main"));
    assert_eq!(tree.text_content(body), "hello");
}

// ========== remove_child ==========

#[test]
fn test_remove_child_fixes_sibling_links() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_eq!(tree.parent(b), None);
}

// ========== attributes ==========

#[test]
fn test_attribute_names_case_insensitive() {
    let mut tree = DomTree::new();
    let input = alloc_element(&mut tree, "input");
    tree.append_child(NodeId::ROOT, input);
    tree.set_attribute(input, "MaxLength", "12");

    let data = tree.as_element(input).unwrap();
    assert_eq!(data.attr("maxlength"), Some("12"));
    assert_eq!(data.attr("MAXLENGTH"), Some("12"));
    assert_eq!(data.attr_f32("maxlength"), Some(12.0));
}

#[test]
fn test_attribute_insertion_order_preserved() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, div);
    tree.set_attribute(div, "b", "2");
    tree.set_attribute(div, "a", "1");
    tree.set_attribute(div, "c", "3");

    let keys: Vec<&String> = tree.as_element(div).unwrap().attrs.keys().collect();
    assert_eq!(keys, ["b", "a", "c"]);
}

// ========== state bits ==========

#[test]
fn test_state_bits_attribute_derived() {
    let mut tree = DomTree::new();
    let input = alloc_element(&mut tree, "input");
    tree.append_child(NodeId::ROOT, input);
    tree.set_attribute(input, "disabled", "");
    tree.set_attribute(input, "required", "");

    let data = tree.as_element(input).unwrap();
    assert_eq!(data.state_bit("disabled"), Some(true));
    assert_eq!(data.state_bit("enabled"), Some(false));
    assert_eq!(data.state_bit("required"), Some(true));
    assert_eq!(data.state_bit("optional"), Some(false));
    // value attribute is absent, so the input is blank
    assert_eq!(data.state_bit("blank"), Some(true));
    // unknown pseudo-class names are out of the supported set
    assert_eq!(data.state_bit("nth-of-kind"), None);
}

#[test]
fn test_link_states_need_href() {
    let mut tree = DomTree::new();
    let a = alloc_element(&mut tree, "a");
    tree.append_child(NodeId::ROOT, a);

    assert_eq!(tree.as_element(a).unwrap().state_bit("link"), Some(false));

    tree.set_attribute(a, "href", "page.html");
    assert_eq!(tree.as_element(a).unwrap().state_bit("link"), Some(true));
    assert_eq!(tree.as_element(a).unwrap().state_bit("visited"), Some(false));

    tree.set_state(a, |s| s.visited = true);
    assert_eq!(tree.as_element(a).unwrap().state_bit("link"), Some(false));
    assert_eq!(tree.as_element(a).unwrap().state_bit("visited"), Some(true));
}

// ========== dirty flags ==========

#[test]
fn test_set_attribute_dirties_style() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, div);
    tree.clear_style_dirty();
    tree.clear_layout_dirty();

    tree.set_attribute(div, "class", "boxed");
    assert!(tree.is_style_dirty());
    assert!(tree.is_layout_dirty());
}

#[test]
fn test_state_change_dirties_only_on_change() {
    let mut tree = DomTree::new();
    let a = alloc_element(&mut tree, "a");
    tree.append_child(NodeId::ROOT, a);
    tree.clear_style_dirty();

    // Setting hover to its current value is not a change.
    tree.set_state(a, |s| s.hover = false);
    assert!(!tree.is_style_dirty());

    tree.set_state(a, |s| s.hover = true);
    assert!(tree.is_style_dirty());
}

#[test]
fn test_style_dirty_flows_to_descendants() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let body = alloc_element(&mut tree, "body");
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, body);
    tree.append_child(body, p);
    tree.clear_style_dirty();

    tree.mark_style_dirty(body);

    assert!(tree.get(body).unwrap().style_dirty);
    // inherited values may change for the subtree
    assert!(tree.get(p).unwrap().style_dirty);
    // and the ancestor chain needs relayout
    assert!(tree.get(html).unwrap().layout_dirty);
    assert!(!tree.get(html).unwrap().style_dirty);
}
