//! Value computation tests: round-trips from declaration text to typed
//! computed values through the full sheet pipeline.

use willow_css::style::compute::{StyleEnv, compute_tree};
use willow_css::style::intern::StyleInterner;
use willow_css::values::{Color, ComputedValue};
use willow_css::{cascaded_styles, parse_sheet};
use willow_dom::{DomTree, ElementData, NodeId, NodeType};

/// Build a single-element document, apply the css, and return the
/// element's computed style.
fn computed_for(css: &str) -> std::sync::Arc<willow_css::ComputedStyle> {
    let mut tree = DomTree::new();
    let html = tree.alloc(NodeType::Element(ElementData::new("html", [])));
    let div = tree.alloc(NodeType::Element(ElementData::new("div", [])));
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, div);

    let sheet = parse_sheet(&format!("div {{ {css} }}"));
    let env = StyleEnv {
        viewport: (900.0, 600.0),
        default_font_size: 16.0,
    };
    let cascaded = cascaded_styles(&tree, &[sheet], env.viewport);
    let mut interner = StyleInterner::new();
    let styles = compute_tree(&tree, &cascaded, &env, &mut interner);
    styles[&div].clone()
}

fn assert_length(css: &str, key: &str, expected: f32) {
    let style = computed_for(css);
    let Some(ComputedValue::Length(v)) = style.get(key) else {
        panic!("{key} did not compute to a length for '{css}' (got {:?})", style.get(key));
    };
    assert!((v - expected).abs() < 1e-3, "{css}: {v} != {expected}");
}

#[test]
fn test_absolute_length_units() {
    assert_length("width: 10px", "width", 10.0);
    assert_length("width: 1in", "width", 96.0);
    assert_length("width: 1pc", "width", 16.0);
    assert_length("width: 3pt", "width", 4.0);
    assert_length("width: 1cm", "width", 37.8);
    assert_length("width: 4Q", "width", 3.78);
}

#[test]
fn test_viewport_units() {
    assert_length("width: 10vw", "width", 90.0);
    assert_length("height: 10vh", "height", 60.0);
    assert_length("width: 10vmin", "width", 60.0);
    assert_length("width: 10vmax", "width", 90.0);
}

#[test]
fn test_font_relative_units() {
    // html (the parent) carries the default 16px font size
    assert_length("margin-top: 2em", "margin-top", 32.0);
    assert_length("margin-top: 2rem", "margin-top", 32.0);
}

#[test]
fn test_colors_round_trip() {
    let cases = [
        ("color: red", Color::rgb(255, 0, 0)),
        ("color: #00ff00", Color::rgb(0, 255, 0)),
        ("color: #00f8", Color::rgba(0, 0, 255, 0x88)),
        ("color: rgb(1, 2, 3)", Color::rgb(1, 2, 3)),
        ("color: hsl(0, 100%, 50%)", Color::rgb(255, 0, 0)),
        ("color: hwb(120 0% 0%)", Color::rgb(0, 255, 0)),
        ("color: transparent", Color::TRANSPARENT),
        ("color: rebeccapurple", Color::rgb(0x66, 0x33, 0x99)),
    ];
    for (css, expected) in cases {
        let style = computed_for(css);
        assert_eq!(style.color(), expected, "for '{css}'");
    }
}

#[test]
fn test_calc_values() {
    assert_length("width: calc(10px + 20px)", "width", 30.0);
    assert_length("width: calc(2 * 15px)", "width", 30.0);
    // pi and e literals
    let style = computed_for("line-height: calc(pi / pi)");
    assert_eq!(style.get("line-height"), Some(&ComputedValue::Number(1.0)));
}

#[test]
fn test_calc_with_percentage_defers() {
    let style = computed_for("width: calc(100% - 30px)");
    assert!(
        matches!(style.get("width"), Some(ComputedValue::Calc(_))),
        "mixed percentage calc stays deferred until layout"
    );
}

#[test]
fn test_angle_time_resolution_units() {
    let style = computed_for("font-style: oblique 200grad");
    let Some(ComputedValue::FontStyle(fs)) = style.get("font-style") else {
        panic!("font-style did not compute");
    };
    assert!((fs.angle - 180.0).abs() < 1e-3);
}

#[test]
fn test_keyword_values() {
    let style = computed_for("display: block; position: sticky; box-sizing: border-box");
    assert_eq!(style.display(), willow_css::style::DisplayKind::Block);
    assert_eq!(style.position(), willow_css::style::PositionKind::Sticky);
    assert_eq!(style.box_sizing(), willow_css::style::BoxSizing::BorderBox);
}

#[test]
fn test_font_family_list() {
    let style = computed_for("font-family: \"Liberation Sans\", Arial, sans-serif");
    assert_eq!(
        style.get("font-family"),
        Some(&ComputedValue::Families(vec![
            "Liberation Sans".to_string(),
            "Arial".to_string(),
            "sans-serif".to_string(),
        ]))
    );
}

#[test]
fn test_background_image_urls() {
    let style = computed_for("background-image: url(bg.png)");
    let Some(ComputedValue::Images(layers)) = style.get("background-image") else {
        panic!("background-image did not compute");
    };
    assert_eq!(layers.len(), 1);

    let style = computed_for("background-image: none");
    assert_eq!(style.get("background-image"), Some(&ComputedValue::Images(vec![])));
}

#[test]
fn test_border_shorthand_through_sheet() {
    let style = computed_for("border: 2px dashed blue");
    assert_eq!(style.get("border-left-width"), Some(&ComputedValue::Length(2.0)));
    assert_eq!(
        style.get("border-top-style").and_then(ComputedValue::as_keyword),
        Some("dashed")
    );
    assert_eq!(
        style.get("border-bottom-color"),
        Some(&ComputedValue::Color(Color::rgb(0, 0, 255)))
    );
}

#[test]
fn test_border_width_zeroed_by_default_style() {
    // no border-style declared → style is none → width coerced to 0
    let style = computed_for("border-top-width: 5px");
    assert_eq!(style.get("border-top-width"), Some(&ComputedValue::Length(0.0)));
}

#[test]
fn test_invalid_declaration_keeps_rest_of_rule() {
    let style = computed_for("width: banana; height: 40px");
    assert_eq!(style.get("width"), Some(&ComputedValue::Auto));
    assert_eq!(style.get("height"), Some(&ComputedValue::Length(40.0)));
}

#[test]
fn test_custom_property_and_var() {
    let style = computed_for("--pad: 12px; padding-left: var(--pad)");
    assert_eq!(style.get("padding-left"), Some(&ComputedValue::Length(12.0)));
}

#[test]
fn test_all_unset() {
    let style = computed_for("color: red; all: unset");
    // 'all: unset' comes later in the block and resets color to the
    // inherited value (the root's default black)
    assert_eq!(style.color(), Color::BLACK);
}
