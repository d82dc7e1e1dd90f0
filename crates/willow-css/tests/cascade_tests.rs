//! Cascade and inheritance tests over the full pipeline
//! (HTML → sheets → cascaded declarations → computed styles).

use std::collections::HashMap;
use std::sync::Arc;

use willow_css::style::compute::{StyleEnv, compute_tree};
use willow_css::style::intern::StyleInterner;
use willow_css::values::Color;
use willow_css::{ComputedStyle, cascaded_styles, parse_sheet};
use willow_dom::{DomTree, NodeId};

fn pipeline(html: &str, css: &str) -> (DomTree, HashMap<NodeId, Arc<ComputedStyle>>) {
    let tree = willow_html::parse_html(html);
    let sheet = parse_sheet(css);
    let env = StyleEnv {
        viewport: (900.0, 600.0),
        default_font_size: 16.0,
    };
    let cascaded = cascaded_styles(&tree, &[sheet], env.viewport);
    let mut interner = StyleInterner::new();
    let styles = compute_tree(&tree, &cascaded, &env, &mut interner);
    (tree, styles)
}

fn find(tree: &DomTree, tag: &str) -> NodeId {
    tree.iter_all()
        .find(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == tag))
        .unwrap_or_else(|| panic!("no <{tag}> in tree"))
}

#[test]
fn test_source_order_tie_break() {
    // same selector, same specificity: the later declaration wins
    let (tree, styles) = pipeline(
        "<p>x</p>",
        "p { color: red } p { color: blue }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(0, 0, 255));
}

#[test]
fn test_important_beats_specificity() {
    let (tree, styles) = pipeline(
        "<p id=\"x\">x</p>",
        "p { color: red !important } p#x { color: blue }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(255, 0, 0));
}

#[test]
fn test_higher_specificity_wins() {
    let (tree, styles) = pipeline(
        "<p id=\"x\" class=\"c\">x</p>",
        "#x { color: green } .c { color: red } p { color: blue }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(0, 128, 0));
}

#[test]
fn test_inline_style_overrides_sheet() {
    let (tree, styles) = pipeline(
        "<p style=\"color: lime\">x</p>",
        "p { color: red }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(0, 255, 0));
}

#[test]
fn test_important_sheet_beats_inline() {
    let (tree, styles) = pipeline(
        "<p style=\"color: lime\">x</p>",
        "p { color: red !important }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(255, 0, 0));
}

#[test]
fn test_inheritance_without_own_declaration() {
    let (tree, styles) = pipeline(
        "<div><p><span>deep</span></p></div>",
        "div { color: teal; font-size: 20px }",
    );
    let span = find(&tree, "span");
    let div = find(&tree, "div");
    assert_eq!(styles[&span].color(), styles[&div].color());
    assert!((styles[&span].font_size() - 20.0).abs() < 1e-3);
}

#[test]
fn test_non_inherited_property_does_not_flow() {
    let (tree, styles) = pipeline(
        "<div><p>x</p></div>",
        "div { background-color: red }",
    );
    let p = find(&tree, "p");
    let bg = styles[&p].get("background-color").and_then(|v| v.as_color());
    assert_eq!(bg, Some(Color::TRANSPARENT));
}

#[test]
fn test_tag_defaults_apply_below_author_rules() {
    let (tree, styles) = pipeline("<div><a href=\"x\">link</a></div>", "");
    let a = find(&tree, "a");
    // <a> is blue by element default
    assert_eq!(styles[&a].color(), Color::rgb(0, 0, 255));

    let (tree, styles) = pipeline("<a href=\"x\">link</a>", "a { color: black }");
    let a = find(&tree, "a");
    assert_eq!(styles[&a].color(), Color::BLACK);
}

#[test]
fn test_media_query_gates_with_viewport() {
    let tree = willow_html::parse_html("<p>x</p>");
    let sheet = parse_sheet("@media (min-width: 600px) { p { color: red } }");
    let mut interner = StyleInterner::new();

    let wide = StyleEnv {
        viewport: (900.0, 600.0),
        default_font_size: 16.0,
    };
    let cascaded = cascaded_styles(&tree, &[sheet.clone()], wide.viewport);
    let styles = compute_tree(&tree, &cascaded, &wide, &mut interner);
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(255, 0, 0));

    let narrow = StyleEnv {
        viewport: (400.0, 600.0),
        default_font_size: 16.0,
    };
    let cascaded = cascaded_styles(&tree, &[sheet], narrow.viewport);
    let styles = compute_tree(&tree, &cascaded, &narrow, &mut interner);
    assert_eq!(styles[&p].color(), Color::BLACK);
}

#[test]
fn test_state_pseudo_class_in_cascade() {
    let mut tree = willow_html::parse_html("<a href=\"x\">link</a>");
    let sheet = parse_sheet("a:hover { color: red }");
    let env = StyleEnv {
        viewport: (900.0, 600.0),
        default_font_size: 16.0,
    };
    let mut interner = StyleInterner::new();
    let a = find(&tree, "a");

    let cascaded = cascaded_styles(&tree, &[sheet.clone()], env.viewport);
    let styles = compute_tree(&tree, &cascaded, &env, &mut interner);
    assert_eq!(styles[&a].color(), Color::rgb(0, 0, 255), "not hovered yet");

    tree.set_state(a, |s| s.hover = true);
    let cascaded = cascaded_styles(&tree, &[sheet], env.viewport);
    let styles = compute_tree(&tree, &cascaded, &env, &mut interner);
    assert_eq!(styles[&a].color(), Color::rgb(255, 0, 0), "hovered");
}

#[test]
fn test_interning_shares_identical_styles() {
    let (tree, styles) = pipeline(
        "<div><p>one</p><p>two</p></div>",
        "p { color: red }",
    );
    let ids: Vec<NodeId> = tree
        .iter_all()
        .filter(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == "p"))
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(
        Arc::ptr_eq(&styles[&ids[0]], &styles[&ids[1]]),
        "identical computed styles share one interned instance"
    );
}

#[test]
fn test_custom_property_inherits_to_descendants() {
    let (tree, styles) = pipeline(
        "<div><p>x</p></div>",
        "div { --accent: #112233 } p { color: var(--accent) }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles[&p].color(), Color::rgb(0x11, 0x22, 0x33));
}

#[test]
fn test_cascade_is_reproducible() {
    // the cascade and computation are pure functions of their inputs
    let (tree1, styles1) = pipeline("<p class=\"a\">x</p>", ".a { color: red }");
    let (tree2, styles2) = pipeline("<p class=\"a\">x</p>", ".a { color: red }");
    let p1 = find(&tree1, "p");
    let p2 = find(&tree2, "p");
    assert_eq!(*styles1[&p1], *styles2[&p2]);
}
