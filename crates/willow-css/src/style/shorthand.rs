//! Declaration processing: validation, precomputation, and shorthand
//! expansion.
//!
//! [CSS Cascading Level 4 § 1.2 Shorthand properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
//!
//! Runs before the cascade stores declarations. Directional shorthands
//! split 1/2/3/4 value forms onto their four longhands; smart shorthands
//! (`border`, `border-<side>`, `outline`) dispatch each token to the first
//! not-yet-assigned component that validates it; `overflow` splits onto
//! its two axes; `all` accepts only the global keywords and fans out to
//! every registered property. Custom properties bypass validation and are
//! stored verbatim.
//!
//! Values that do not depend on context are computed here already; the
//! rest stay raw for the cascade.

use willow_common::warning::warn_once;

use crate::style::registry::{self, ComputeContext};
use crate::style::{
    BORDER_COLOR_KEYS, BORDER_RADIUS_KEYS, BORDER_STYLE_KEYS, BORDER_WIDTH_KEYS, ComputedStyle,
    INSET_KEYS, MARGIN_KEYS, OVERFLOW_KEYS, PADDING_KEYS, Style, StyleValue, is_custom,
};
use crate::values::{Accept, ComputedValue, scan};

/// The CSS-wide keywords.
pub const GLOBAL_VALUES: [&str; 4] = ["inherit", "initial", "unset", "revert"];

/// Directional shorthand → its four longhands.
const DIR_SHORTHANDS: [(&str, [&str; 4]); 7] = [
    ("margin", MARGIN_KEYS),
    ("padding", PADDING_KEYS),
    ("border-width", BORDER_WIDTH_KEYS),
    ("border-style", BORDER_STYLE_KEYS),
    ("border-color", BORDER_COLOR_KEYS),
    ("border-radius", BORDER_RADIUS_KEYS),
    ("inset", INSET_KEYS),
];

/// Smart shorthand → the component slots its tokens are dispatched over.
/// Slot order decides ties, width before style before color.
const SMART_SHORTHANDS: [(&str, &[&str]); 6] = [
    ("border", &["border-width", "border-style", "border-color"]),
    (
        "border-top",
        &["border-top-width", "border-top-style", "border-top-color"],
    ),
    (
        "border-right",
        &["border-right-width", "border-right-style", "border-right-color"],
    ),
    (
        "border-bottom",
        &["border-bottom-width", "border-bottom-style", "border-bottom-color"],
    ),
    (
        "border-left",
        &["border-left-width", "border-left-style", "border-left-color"],
    ),
    ("outline", &["outline-width", "outline-style", "outline-color"]),
];

fn dir_shorthand(name: &str) -> Option<[&'static str; 4]> {
    DIR_SHORTHANDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, keys)| *keys)
}

fn smart_shorthand(name: &str) -> Option<&'static [&'static str]> {
    SMART_SHORTHANDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, slots)| *slots)
}

/// Check whether a value is valid for a property, possibly computing it.
///
/// Returns `None` when invalid; otherwise the (maybe precomputed) value.
/// Global keywords stay raw for the computation stage; context-dependent
/// values stay raw because the parse-time context is detached.
#[must_use]
pub fn is_valid(key: &str, value: &str) -> Option<StyleValue> {
    if value == "inherit" {
        return Some(StyleValue::Raw(value.to_string()));
    }
    if is_custom(key) {
        return Some(StyleValue::Computed(ComputedValue::kw(value)));
    }
    if let Some(prop_def) = registry::lookup(key) {
        if value == "initial" {
            return is_valid(key, prop_def.initial);
        }
        if value == "unset" {
            return is_valid(key, prop_def.unset());
        }
        if value == "revert" {
            return Some(StyleValue::Raw(
                if prop_def.inherits { "inherit" } else { "revert" }.to_string(),
            ));
        }
        let parent = ComputedStyle::empty();
        let ctx = ComputeContext::detached(&parent);
        return match prop_def.accept(value, &ctx) {
            Accept::Value(v) => Some(StyleValue::Computed(v)),
            Accept::Deferred => Some(StyleValue::Raw(value.to_string())),
            Accept::Invalid => None,
        };
    }
    // a directional shorthand name stands in for its longhands when smart
    // shorthands validate their tokens
    if let Some(keys) = dir_shorthand(key) {
        return is_valid(keys[0], value);
    }
    None
}

/// Distribute a split directional shorthand onto four sides.
///
/// 1 value → all four; 2 → vertical/horizontal; 3 → top, horizontal,
/// bottom; 4 → top, right, bottom, left.
fn distribute4<'a>(values: &[&'a str]) -> Option<[&'a str; 4]> {
    match *values {
        [a] => Some([a, a, a, a]),
        [v, h] => Some([v, h, v, h]),
        [t, h, b] => Some([t, h, b, h]),
        [t, r, b, l] => Some([t, r, b, l]),
        _ => None,
    }
}

enum Processed {
    /// A final value for this property.
    Single(StyleValue),
    /// Expanded declarations; each must be reprocessed.
    Expanded(Vec<(String, String)>),
}

/// Process one declaration, expanding shorthands.
fn process_property(key: &str, value: &str) -> Result<Processed, String> {
    if is_custom(key) {
        return Ok(Processed::Single(StyleValue::Computed(ComputedValue::kw(
            value,
        ))));
    }
    let parts = scan::split_value(value);
    if key == "all" {
        // 'all' can only set the global keywords, e.g. 'all: unset'
        if parts.len() != 1 || !GLOBAL_VALUES.contains(&parts[0]) {
            return Err("'all' only accepts a single global keyword".to_string());
        }
        return Ok(Processed::Expanded(
            registry::property_names()
                .map(|name| (name.to_string(), value.to_string()))
                .collect(),
        ));
    }
    if key == "border-radius" && value.contains('/') {
        let halves = scan::split_top_level(value, '/');
        if halves.len() != 2 {
            return Err("border-radius takes at most one '/'".to_string());
        }
        let horizontal = distribute4(&scan::split_value(halves[0]))
            .ok_or_else(|| format!("too many values: {}", halves[0]))?;
        let vertical = distribute4(&scan::split_value(halves[1]))
            .ok_or_else(|| format!("too many values: {}", halves[1]))?;
        return Ok(Processed::Expanded(
            BORDER_RADIUS_KEYS
                .iter()
                .zip(horizontal.iter().zip(vertical.iter()))
                .map(|(key, (x, y))| ((*key).to_string(), format!("{x} {y}")))
                .collect(),
        ));
    }
    if key == "overflow" {
        let [x, y] = match parts.as_slice() {
            [both] => [*both, *both],
            [x, y] => [*x, *y],
            _ => return Err(format!("too many values: {}/2", parts.len())),
        };
        return Ok(Processed::Expanded(vec![
            (OVERFLOW_KEYS[0].to_string(), x.to_string()),
            (OVERFLOW_KEYS[1].to_string(), y.to_string()),
        ]));
    }
    if let Some(keys) = dir_shorthand(key) {
        let sides =
            distribute4(&parts).ok_or_else(|| format!("too many values: {}/4", parts.len()))?;
        return Ok(Processed::Expanded(
            keys.iter()
                .zip(sides.iter())
                .map(|(key, v)| ((*key).to_string(), (*v).to_string()))
                .collect(),
        ));
    }
    if let Some(slots) = smart_shorthand(key) {
        if parts.len() > slots.len() {
            return Err(format!("too many values: {}, max {}", parts.len(), slots.len()));
        }
        if let [single] = parts.as_slice() {
            if GLOBAL_VALUES.contains(single) {
                return Ok(Processed::Expanded(
                    slots
                        .iter()
                        .map(|slot| ((*slot).to_string(), (*single).to_string()))
                        .collect(),
                ));
            }
        }
        // dispatch each token to the first free slot that accepts it
        let mut free: Vec<&str> = slots.to_vec();
        let mut expanded = Vec::with_capacity(parts.len());
        for token in &parts {
            let slot_index = free
                .iter()
                .position(|slot| is_valid(slot, token).is_some())
                .ok_or_else(|| format!("invalid value found in shorthand: {token}"))?;
            expanded.push((free.remove(slot_index).to_string(), (*token).to_string()));
        }
        return Ok(Processed::Expanded(expanded));
    }
    if registry::lookup(key).is_none() {
        return Err("unknown property".to_string());
    }
    is_valid(key, value)
        .map(Processed::Single)
        .ok_or_else(|| "invalid value".to_string())
}

/// Unpack shorthands, filter and report invalid declarations.
fn process_input(decls: Vec<(String, String)>) -> Vec<(String, StyleValue)> {
    let mut queue: std::collections::VecDeque<(String, String)> = decls.into();
    let mut done: Vec<(String, StyleValue)> = Vec::new();
    while let Some((key, value)) = queue.pop_front() {
        match process_property(&key, value.trim()) {
            Ok(Processed::Single(v)) => done.push((key, v)),
            Ok(Processed::Expanded(parts)) => queue.extend(parts),
            Err(reason) => warn_once("CSS", &format!("{reason} ({key}: {value})")),
        }
    }
    done
}

/// Process a list of raw declarations into a [`Style`].
///
/// Non-important declarations land first, then important ones, so an
/// important declaration for the same name wins within one block.
#[must_use]
pub fn process(decls: Vec<(String, String, bool)>) -> Style {
    let (important, normal): (Vec<_>, Vec<_>) =
        decls.into_iter().partition(|(_, _, imp)| *imp);
    let strip = |v: Vec<(String, String, bool)>| {
        v.into_iter().map(|(k, val, _)| (k, val)).collect::<Vec<_>>()
    };
    let mut style = Style::new();
    for (key, value) in process_input(strip(normal)) {
        style.insert(key, value, false);
    }
    for (key, value) in process_input(strip(important)) {
        style.insert(key, value, true);
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(style: &Style, key: &str) -> Option<String> {
        style.get(key).map(|(v, _)| match v {
            StyleValue::Raw(s) => s.clone(),
            StyleValue::Computed(c) => c.to_string(),
        })
    }

    #[test]
    fn margin_distributes() {
        let style = process(vec![("margin".into(), "1px 2px".into(), false)]);
        assert_eq!(raw(&style, "margin-top").as_deref(), Some("1px"));
        assert_eq!(raw(&style, "margin-right").as_deref(), Some("2px"));
        assert_eq!(raw(&style, "margin-bottom").as_deref(), Some("1px"));
        assert_eq!(raw(&style, "margin-left").as_deref(), Some("2px"));
    }

    #[test]
    fn three_value_form() {
        let style = process(vec![("padding".into(), "1px 2px 3px".into(), false)]);
        assert_eq!(raw(&style, "padding-top").as_deref(), Some("1px"));
        assert_eq!(raw(&style, "padding-right").as_deref(), Some("2px"));
        assert_eq!(raw(&style, "padding-bottom").as_deref(), Some("3px"));
        assert_eq!(raw(&style, "padding-left").as_deref(), Some("2px"));
    }

    #[test]
    fn border_dispatches_tokens() {
        let style = process(vec![("border".into(), "solid medium red".into(), false)]);
        assert_eq!(raw(&style, "border-top-style").as_deref(), Some("solid"));
        assert_eq!(raw(&style, "border-left-width").as_deref(), Some("3px"));
        assert_eq!(raw(&style, "border-bottom-color").as_deref(), Some("#ff0000"));
    }

    #[test]
    fn border_rejects_leftover_token() {
        let style = process(vec![("border".into(), "solid dashed".into(), false)]);
        // both tokens validate only the style slot; the second is left
        // unassigned, so the whole declaration drops
        assert!(style.is_empty());
    }

    #[test]
    fn overflow_axes() {
        let style = process(vec![("overflow".into(), "hidden scroll".into(), false)]);
        assert_eq!(raw(&style, "overflow-x").as_deref(), Some("hidden"));
        assert_eq!(raw(&style, "overflow-y").as_deref(), Some("scroll"));
    }

    #[test]
    fn border_radius_slash() {
        let style = process(vec![("border-radius".into(), "1px 2px / 3px".into(), false)]);
        assert_eq!(raw(&style, "border-top-left-radius").as_deref(), Some("1px 3px"));
        assert_eq!(raw(&style, "border-top-right-radius").as_deref(), Some("2px 3px"));
    }

    #[test]
    fn all_requires_global_keyword() {
        let style = process(vec![("all".into(), "unset".into(), false)]);
        assert!(style.get("display").is_some());
        assert!(style.get("color").is_some());

        let style = process(vec![("all".into(), "red".into(), false)]);
        assert!(style.is_empty());
    }

    #[test]
    fn custom_properties_bypass_validation() {
        let style = process(vec![("--brand".into(), "12px solid".into(), false)]);
        assert_eq!(raw(&style, "--brand").as_deref(), Some("12px solid"));
    }

    #[test]
    fn unknown_property_drops() {
        let style = process(vec![("colr".into(), "red".into(), false)]);
        assert!(style.is_empty());
    }

    #[test]
    fn important_wins_within_block() {
        let style = process(vec![
            ("color".into(), "red".into(), true),
            ("color".into(), "blue".into(), false),
        ]);
        let (_, important) = style.get("color").unwrap();
        assert!(*important);
    }
}
