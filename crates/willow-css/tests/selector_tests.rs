//! Selector parsing, specificity, and matching tests.

use willow_css::selector::{AttrOp, Selector, Specificity, parse_selector};
use willow_dom::{DomTree, ElementData, NodeId, NodeType};

fn alloc(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = tree.alloc(NodeType::Element(ElementData::new(
        tag,
        attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
    )));
    tree.append_child(parent, id);
    id
}

// ========== parsing ==========

#[test]
fn test_parse_simple_selectors() {
    assert_eq!(parse_selector("div").unwrap(), Selector::Tag("div".into()));
    assert_eq!(parse_selector("#x").unwrap(), Selector::Id("x".into()));
    assert_eq!(parse_selector(".a").unwrap(), Selector::Class("a".into()));
    assert_eq!(parse_selector("*").unwrap(), Selector::Any);
    assert_eq!(
        parse_selector(":hover").unwrap(),
        Selector::State("hover".into())
    );
    assert_eq!(
        parse_selector("[href]").unwrap(),
        Selector::HasAttr("href".into())
    );
}

#[test]
fn test_parse_compound() {
    let sel = parse_selector("div.note#main").unwrap();
    assert_eq!(
        sel,
        Selector::And(vec![
            Selector::Tag("div".into()),
            Selector::Class("note".into()),
            Selector::Id("main".into()),
        ])
    );
}

#[test]
fn test_parse_combinators() {
    let sel = parse_selector("ul > li").unwrap();
    assert!(matches!(sel, Selector::DirectChild(..)));
    let sel = parse_selector("div a").unwrap();
    assert!(matches!(sel, Selector::Descendant(..)));
    let sel = parse_selector("h1 + p").unwrap();
    assert!(matches!(sel, Selector::NextSibling(..)));
    let sel = parse_selector("h1 ~ p").unwrap();
    assert!(matches!(sel, Selector::SubsequentSibling(..)));
}

#[test]
fn test_parse_attr_operators() {
    for (text, op) in [
        ("[a=b]", AttrOp::Exact),
        ("[a~=b]", AttrOp::Includes),
        ("[a|=b]", AttrOp::DashMatch),
        ("[a^=b]", AttrOp::Prefix),
        ("[a$=b]", AttrOp::Suffix),
        ("[a*=b]", AttrOp::Substring),
    ] {
        assert_eq!(
            parse_selector(text).unwrap(),
            Selector::Attr("a".into(), op, "b".into()),
            "for {text}"
        );
    }
}

#[test]
fn test_parse_not() {
    let sel = parse_selector("div:not(.hidden)").unwrap();
    assert_eq!(
        sel,
        Selector::And(vec![
            Selector::Tag("div".into()),
            Selector::Not(Box::new(Selector::Class("hidden".into()))),
        ])
    );
}

#[test]
fn test_parse_comma_list() {
    let sel = parse_selector("h1, h2").unwrap();
    assert_eq!(
        sel,
        Selector::Or(vec![Selector::Tag("h1".into()), Selector::Tag("h2".into())])
    );
}

#[test]
fn test_invalid_selectors_error() {
    assert!(parse_selector("").is_err());
    assert!(parse_selector(">").is_err());
    assert!(parse_selector("div >").is_err());
    assert!(parse_selector("#").is_err());
}

// ========== specificity ==========

#[test]
fn test_specificity_values() {
    assert_eq!(parse_selector("#a").unwrap().specificity(), Specificity(1, 0, 0));
    assert_eq!(parse_selector(".a.b").unwrap().specificity(), Specificity(0, 2, 0));
    assert_eq!(parse_selector("div a").unwrap().specificity(), Specificity(0, 0, 2));
    assert_eq!(parse_selector("*").unwrap().specificity(), Specificity(0, 0, 0));
}

#[test]
fn test_specificity_composes_additively() {
    assert_eq!(
        parse_selector("div#a .b:hover").unwrap().specificity(),
        Specificity(1, 2, 1)
    );
}

#[test]
fn test_not_adopts_inner_specificity() {
    assert_eq!(
        parse_selector(":not(#a)").unwrap().specificity(),
        Specificity(1, 0, 0)
    );
}

#[test]
fn test_specificity_orders_lexicographically() {
    let id = parse_selector("#a").unwrap().specificity();
    let classes = parse_selector(".a.b.c.d").unwrap().specificity();
    assert!(id > classes, "one id outranks any number of classes");
}

// ========== matching ==========

#[test]
fn test_match_tag_id_class() {
    let mut tree = DomTree::new();
    let div = alloc(&mut tree, NodeId::ROOT, "div", &[("id", "x"), ("class", "a b")]);

    assert!(parse_selector("div").unwrap().matches(&tree, div));
    assert!(parse_selector("DIV").unwrap().matches(&tree, div));
    assert!(parse_selector("#x").unwrap().matches(&tree, div));
    assert!(parse_selector(".a").unwrap().matches(&tree, div));
    assert!(parse_selector(".b").unwrap().matches(&tree, div));
    assert!(!parse_selector(".c").unwrap().matches(&tree, div));
    assert!(parse_selector("div.a#x").unwrap().matches(&tree, div));
}

#[test]
fn test_match_attr_operators() {
    let mut tree = DomTree::new();
    let a = alloc(
        &mut tree,
        NodeId::ROOT,
        "a",
        &[("href", "https://example.com/page.html"), ("lang", "en-US")],
    );

    assert!(parse_selector("[href]").unwrap().matches(&tree, a));
    assert!(parse_selector("[href^=https]").unwrap().matches(&tree, a));
    assert!(parse_selector("[href$=.html]").unwrap().matches(&tree, a));
    assert!(parse_selector("[href*=example]").unwrap().matches(&tree, a));
    assert!(parse_selector("[lang|=en]").unwrap().matches(&tree, a));
    assert!(!parse_selector("[lang|=e]").unwrap().matches(&tree, a));
    assert!(!parse_selector("[href=https]").unwrap().matches(&tree, a));
}

#[test]
fn test_match_includes_operator() {
    let mut tree = DomTree::new();
    let div = alloc(&mut tree, NodeId::ROOT, "div", &[("data-tags", "one two three")]);
    assert!(parse_selector("[data-tags~=two]").unwrap().matches(&tree, div));
    assert!(!parse_selector("[data-tags~=tw]").unwrap().matches(&tree, div));
}

#[test]
fn test_match_descendant_and_child() {
    let mut tree = DomTree::new();
    let section = alloc(&mut tree, NodeId::ROOT, "section", &[]);
    let div = alloc(&mut tree, section, "div", &[]);
    let p = alloc(&mut tree, div, "p", &[]);

    assert!(parse_selector("section p").unwrap().matches(&tree, p));
    assert!(parse_selector("div > p").unwrap().matches(&tree, p));
    assert!(!parse_selector("section > p").unwrap().matches(&tree, p));
    assert!(parse_selector("section > div > p").unwrap().matches(&tree, p));
}

#[test]
fn test_match_sibling_combinators() {
    let mut tree = DomTree::new();
    let parent = alloc(&mut tree, NodeId::ROOT, "div", &[]);
    let h1 = alloc(&mut tree, parent, "h1", &[]);
    let p1 = alloc(&mut tree, parent, "p", &[]);
    let p2 = alloc(&mut tree, parent, "p", &[]);
    let _ = h1;

    assert!(parse_selector("h1 + p").unwrap().matches(&tree, p1));
    assert!(!parse_selector("h1 + p").unwrap().matches(&tree, p2));
    assert!(parse_selector("h1 ~ p").unwrap().matches(&tree, p2));
    assert!(parse_selector("p + p").unwrap().matches(&tree, p2));
}

#[test]
fn test_match_state_bits() {
    let mut tree = DomTree::new();
    let button = alloc(&mut tree, NodeId::ROOT, "button", &[]);

    let hover = parse_selector(":hover").unwrap();
    assert!(!hover.matches(&tree, button));
    tree.set_state(button, |s| s.hover = true);
    assert!(hover.matches(&tree, button));

    let disabled = parse_selector(":disabled").unwrap();
    assert!(!disabled.matches(&tree, button));
    tree.set_attribute(button, "disabled", "");
    assert!(disabled.matches(&tree, button));
    assert!(!parse_selector(":enabled").unwrap().matches(&tree, button));
}

#[test]
fn test_unknown_pseudo_class_never_matches() {
    let mut tree = DomTree::new();
    let div = alloc(&mut tree, NodeId::ROOT, "div", &[]);
    let sel = parse_selector(":first-of-kind").unwrap();
    assert!(!sel.matches(&tree, div));
    // but it still parses and carries pseudo-class specificity
    assert_eq!(sel.specificity(), Specificity(0, 1, 0));
}

#[test]
fn test_match_not() {
    let mut tree = DomTree::new();
    let div = alloc(&mut tree, NodeId::ROOT, "div", &[("class", "shown")]);
    assert!(parse_selector("div:not(.hidden)").unwrap().matches(&tree, div));
    assert!(!parse_selector("div:not(.shown)").unwrap().matches(&tree, div));
}

#[test]
fn test_or_matches_any_branch() {
    let mut tree = DomTree::new();
    let h2 = alloc(&mut tree, NodeId::ROOT, "h2", &[]);
    assert!(parse_selector("h1, h2, h3").unwrap().matches(&tree, h2));
    assert!(!parse_selector("h1, h3").unwrap().matches(&tree, h2));
}

#[test]
fn test_matching_is_pure() {
    let mut tree = DomTree::new();
    let div = alloc(&mut tree, NodeId::ROOT, "div", &[("class", "a")]);
    let sel = parse_selector("div.a").unwrap();
    // repeated matching gives the same result and mutates nothing
    for _ in 0..3 {
        assert!(sel.matches(&tree, div));
    }
    assert_eq!(tree.as_element(div).unwrap().attr("class"), Some("a"));
}
