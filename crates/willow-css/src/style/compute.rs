//! Style computation: from input declarations to fully computed styles.
//!
//! [§ 4 Value Processing](https://www.w3.org/TR/css-cascade-4/#value-stages)
//!
//! For each element the input style is assembled as
//! `element_default(tag) < external_cascaded < inline` and every property
//! is resolved to a typed value:
//!
//! 1. already-computed values pass through;
//! 2. `var(--name)` references substitute from the resolved custom
//!    properties;
//! 3. the global keywords resolve (`inherit`, `initial`, `unset`,
//!    `revert`);
//! 4. the property's acceptor runs; invalid values are reported and
//!    treated as `unset`.
//!
//! Priority properties (`color`, `font-size`, custom properties) compute
//! first so later acceptors can read them from the parent context. After
//! all properties, border and outline widths are forced to zero where the
//! corresponding style is `none`/`hidden`.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use willow_common::warning::warn_once;
use willow_dom::{DomTree, NodeId};

use crate::style::defaults::tag_default;
use crate::style::intern::StyleInterner;
use crate::style::registry::{self, ComputeContext};
use crate::style::{
    BORDER_STYLE_KEYS, BORDER_WIDTH_KEYS, ComputedStyle, Style, StyleValue, is_custom,
};
use crate::values::{Accept, ComputedValue, DEFAULT_FONT_SIZE};

/// The engine-level inputs style computation depends on.
#[derive(Debug, Clone, Copy)]
pub struct StyleEnv {
    /// Viewport size in px (for `vw`/`vh`/`vmin`/`vmax`).
    pub viewport: (f32, f32),
    /// The configured default font size (`font-size: medium`).
    pub default_font_size: f32,
}

impl Default for StyleEnv {
    fn default() -> Self {
        Self {
            viewport: (900.0, 600.0),
            default_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Compute every element's style, top-down, sharing identical results
/// through the interner.
///
/// `cascaded` is the external layer from [`crate::style::cascade`]; the
/// inline layer is parsed from each element's `style` attribute here.
#[must_use]
pub fn compute_tree(
    tree: &DomTree,
    cascaded: &HashMap<NodeId, Style>,
    env: &StyleEnv,
    interner: &mut StyleInterner,
) -> HashMap<NodeId, Arc<ComputedStyle>> {
    let mut styles: HashMap<NodeId, Arc<ComputedStyle>> = HashMap::new();
    let root_parent = ComputedStyle::root_parent(env.default_font_size);
    let mut root_font_size: Option<f32> = None;

    for id in tree.iter_all() {
        let Some(data) = tree.as_element(id) else {
            continue;
        };
        let inline = data
            .attr("style")
            .map(crate::parser::parse_inline_style)
            .unwrap_or_default();
        let external = cascaded.get(&id).cloned().unwrap_or_default();
        // inline overrides external for same-importance declarations
        let input = inline.join(&external);

        let parent_arc: Option<Arc<ComputedStyle>> =
            tree.ancestors(id).find_map(|anc| styles.get(&anc).cloned());
        let parent_style: &ComputedStyle = parent_arc.as_deref().unwrap_or(&root_parent);

        let computed = compute_element(&data.tag_name, &input, parent_style, env, root_font_size);
        if root_font_size.is_none() {
            // the first element in tree order is the document element
            root_font_size = Some(computed.font_size());
        }
        let _ = styles.insert(id, interner.intern(computed));
    }
    styles
}

/// Compute one element's full style from its assembled input style.
#[must_use]
pub fn compute_element(
    tag: &str,
    input: &Style,
    parent: &ComputedStyle,
    env: &StyleEnv,
    root_font_size: Option<f32>,
) -> ComputedStyle {
    // element_default(tag) < (external < inline)
    let mut resolved: IndexMap<String, StyleValue> = tag_default(tag).without_importance();
    for (name, value) in input.without_importance() {
        let _ = resolved.insert(name, value);
    }
    // inherit custom properties the input does not set itself
    for (name, value) in parent.iter() {
        if is_custom(name) && !resolved.contains_key(name) {
            let _ = resolved.insert(name.clone(), StyleValue::Computed(value.clone()));
        }
    }

    // priority keys first, otherwise keep declaration order
    let mut keys: Vec<&String> = resolved.keys().collect();
    keys.sort_by_key(|k| !registry::has_priority(k));
    let keys: Vec<String> = keys.into_iter().cloned().collect();

    let mut parent_ctx = parent.clone();
    let mut out = ComputedStyle::empty();
    for key in keys {
        let value = resolved.get(&key).expect("key from this map").clone();
        let computed = compute_value(tag, &key, value, &parent_ctx, env, root_font_size);
        if registry::has_priority(&key) {
            parent_ctx.insert(key.clone(), computed.clone());
        }
        out.insert(key, computed);
    }

    // a border with style none/hidden has no width; likewise the outline
    for (style_key, width_key) in BORDER_STYLE_KEYS.iter().zip(BORDER_WIDTH_KEYS.iter()) {
        if border_style_hides(&out, style_key) {
            out.insert(*width_key, ComputedValue::Length(0.0));
        }
    }
    if border_style_hides(&out, "outline-style") {
        out.insert("outline-width", ComputedValue::Length(0.0));
    }
    out
}

fn border_style_hides(style: &ComputedStyle, key: &str) -> bool {
    matches!(
        style.get(key).and_then(ComputedValue::as_keyword),
        Some("none" | "hidden")
    )
}

/// Compute a single property value.
fn compute_value(
    tag: &str,
    key: &str,
    value: StyleValue,
    parent: &ComputedStyle,
    env: &StyleEnv,
    root_font_size: Option<f32>,
) -> ComputedValue {
    match value {
        StyleValue::Computed(v) => v,
        StyleValue::Raw(raw) => compute_raw(tag, key, &raw, parent, env, root_font_size, 0),
    }
}

/// Resolve a raw value string, following global-keyword redirections.
#[allow(clippy::too_many_arguments)]
fn compute_raw(
    tag: &str,
    key: &str,
    raw: &str,
    parent: &ComputedStyle,
    env: &StyleEnv,
    root_font_size: Option<f32>,
    depth: u8,
) -> ComputedValue {
    if depth > 8 {
        warn_once("CSS", &format!("value resolution loop for '{key}: {raw}'"));
        return ComputedValue::kw(raw);
    }
    let redirect = |new_raw: &str, depth: u8| {
        compute_raw(tag, key, new_raw, parent, env, root_font_size, depth + 1)
    };

    let raw = substitute_vars(raw, parent);
    let raw = raw.trim();

    if is_custom(key) {
        return ComputedValue::kw(raw);
    }
    let Some(prop_def) = registry::lookup(key) else {
        // unknown names cannot reach here through the cascade, but stay
        // total anyway
        return ComputedValue::kw(raw);
    };

    match raw {
        "inherit" => match parent.get(key) {
            Some(v) => v.clone(),
            // above the root there is nothing to inherit from
            None => redirect(prop_def.initial, depth),
        },
        "initial" => redirect(prop_def.initial, depth),
        "unset" => redirect(prop_def.unset(), depth),
        "revert" => {
            if prop_def.inherits {
                redirect("inherit", depth)
            } else {
                // consult the tag-default table
                match tag_default(tag).get(key) {
                    Some((StyleValue::Computed(v), _)) => v.clone(),
                    Some((StyleValue::Raw(r), _)) if r != "revert" => {
                        let r = r.clone();
                        redirect(&r, depth)
                    }
                    _ => redirect(prop_def.initial, depth),
                }
            }
        }
        _ => {
            let ctx = ComputeContext {
                parent,
                viewport: Some(env.viewport),
                root_font_size: Some(root_font_size.unwrap_or(env.default_font_size)),
                default_font_size: Some(env.default_font_size),
            };
            match prop_def.accept(raw, &ctx) {
                Accept::Value(v) => v,
                Accept::Deferred | Accept::Invalid => {
                    warn_once("CSS", &format!("uncomputable property ({key}: {raw})"));
                    redirect(prop_def.unset(), depth)
                }
            }
        }
    }
}

/// Substitute `var(--name)` references from the resolved custom
/// properties. One pass, left to right; replacement text is not rescanned.
fn substitute_vars(raw: &str, parent: &ComputedStyle) -> String {
    if !raw.contains("var(") {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find("var(") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 4..];
        let Some(close) = after.find(')') else {
            out.push_str(&rest[idx..]);
            return out;
        };
        let name = after[..close].trim();
        match parent.get(name) {
            Some(value) => out.push_str(&value.to_string()),
            None => warn_once("CSS", &format!("undefined custom property '{name}'")),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Color;

    fn env() -> StyleEnv {
        StyleEnv::default()
    }

    fn root() -> ComputedStyle {
        ComputedStyle::root_parent(16.0)
    }

    fn style_with(decls: &[(&str, &str)]) -> Style {
        crate::style::shorthand::process(
            decls
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string(), false))
                .collect(),
        )
    }

    #[test]
    fn every_registered_property_is_present() {
        let computed = compute_element("div", &Style::new(), &root(), &env(), None);
        for name in registry::property_names() {
            assert!(computed.get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn inherited_property_flows_down() {
        let mut parent = root();
        parent.insert("color", ComputedValue::Color(Color::rgb(1, 2, 3)));
        let computed = compute_element("div", &Style::new(), &parent, &env(), None);
        assert_eq!(computed.color(), Color::rgb(1, 2, 3));
    }

    #[test]
    fn em_resolves_against_parent_font_size() {
        let mut parent = root();
        parent.insert("font-size", ComputedValue::Length(20.0));
        let input = style_with(&[("margin-top", "2em")]);
        let computed = compute_element("div", &input, &parent, &env(), None);
        assert_eq!(computed.get("margin-top"), Some(&ComputedValue::Length(40.0)));
    }

    #[test]
    fn own_font_size_feeds_own_em() {
        // priority ordering: font-size computes first, then em against it
        let input = style_with(&[("font-size", "20px"), ("padding-left", "1em")]);
        let computed = compute_element("div", &input, &root(), &env(), None);
        assert_eq!(computed.get("padding-left"), Some(&ComputedValue::Length(20.0)));
    }

    #[test]
    fn currentcolor_uses_own_color() {
        let input = style_with(&[("color", "red"), ("border-top-color", "currentcolor")]);
        let computed = compute_element("div", &input, &root(), &env(), None);
        assert_eq!(
            computed.get("border-top-color"),
            Some(&ComputedValue::Color(Color::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn var_substitution() {
        let input = style_with(&[("--main", "#00ff00"), ("color", "var(--main)")]);
        let computed = compute_element("div", &input, &root(), &env(), None);
        assert_eq!(computed.color(), Color::rgb(0, 255, 0));
    }

    #[test]
    fn invalid_value_falls_back_to_unset() {
        let mut parent = root();
        parent.insert("color", ComputedValue::Color(Color::rgb(9, 9, 9)));
        let mut input = Style::new();
        input.insert("color", StyleValue::Raw("notacolor".into()), false);
        let computed = compute_element("div", &input, &parent, &env(), None);
        // color inherits, so unset means the parent value
        assert_eq!(computed.color(), Color::rgb(9, 9, 9));
    }

    #[test]
    fn hidden_border_style_zeroes_width() {
        let input = style_with(&[("border-top-width", "5px"), ("border-top-style", "none")]);
        let computed = compute_element("div", &input, &root(), &env(), None);
        assert_eq!(computed.get("border-top-width"), Some(&ComputedValue::Length(0.0)));
    }

    #[test]
    fn revert_consults_tag_defaults() {
        let input = style_with(&[("display", "revert")]);
        let computed = compute_element("div", &input, &root(), &env(), None);
        assert_eq!(computed.display(), crate::style::DisplayKind::Block);
    }

    #[test]
    fn global_keywords() {
        let mut parent = root();
        parent.insert("color", ComputedValue::Color(Color::rgb(5, 6, 7)));
        let input = style_with(&[("color", "inherit"), ("display", "unset")]);
        let computed = compute_element("span", &input, &parent, &env(), None);
        assert_eq!(computed.color(), Color::rgb(5, 6, 7));
        // display does not inherit: unset = initial = inline
        assert_eq!(computed.display(), crate::style::DisplayKind::Inline);
    }
}
