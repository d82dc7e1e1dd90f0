//! Style representation: input declarations and fully computed styles.
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! An input [`Style`] maps property names to `(value, important)` pairs,
//! where the value is either a raw token string or a value already computed
//! at parse time (precomputation is allowed for anything that does not
//! depend on context). A [`ComputedStyle`] maps every registered property
//! to a typed [`ComputedValue`]; equivalent maps are collapsed to one
//! shared instance by the interner.

pub mod cascade;
pub mod compute;
pub mod defaults;
pub mod intern;
pub mod registry;
pub mod shorthand;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::values::{Color, ComputedValue, DEFAULT_FONT_SIZE};

/// The side order used by every four-sided property tuple.
pub const DIRECTIONS: [&str; 4] = ["top", "right", "bottom", "left"];

/// Margin longhands in side order.
pub const MARGIN_KEYS: [&str; 4] = ["margin-top", "margin-right", "margin-bottom", "margin-left"];
/// Padding longhands in side order.
pub const PADDING_KEYS: [&str; 4] =
    ["padding-top", "padding-right", "padding-bottom", "padding-left"];
/// Border width longhands in side order.
pub const BORDER_WIDTH_KEYS: [&str; 4] = [
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
];
/// Border style longhands in side order.
pub const BORDER_STYLE_KEYS: [&str; 4] = [
    "border-top-style",
    "border-right-style",
    "border-bottom-style",
    "border-left-style",
];
/// Border color longhands in side order.
pub const BORDER_COLOR_KEYS: [&str; 4] = [
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
];
/// Border radius longhands in corner order (the `border-radius` shorthand's
/// 1/2/3/4-value distribution maps onto this order exactly like the side
/// shorthands map onto [`DIRECTIONS`]).
pub const BORDER_RADIUS_KEYS: [&str; 4] = [
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
];
/// Inset longhands in side order.
pub const INSET_KEYS: [&str; 4] = ["top", "right", "bottom", "left"];
/// The two overflow longhands.
pub const OVERFLOW_KEYS: [&str; 2] = ["overflow-x", "overflow-y"];

/// Whether a property name is a custom property (`--name`).
#[must_use]
pub fn is_custom(name: &str) -> bool {
    name.starts_with("--")
}

/// A declared value: raw source text or an already-computed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StyleValue {
    /// Unparsed token text (context-dependent values stay raw until
    /// computation).
    Raw(String),
    /// A value computed at parse time.
    Computed(ComputedValue),
}

impl StyleValue {
    /// The raw text, if this value is still uncomputed.
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(s) => Some(s),
            Self::Computed(_) => None,
        }
    }
}

/// An input style: property name → `(value, important)`.
///
/// Insertion order is preserved; later insertions of the same name replace
/// the earlier value (the fuse step of the cascade).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    decls: IndexMap<String, (StyleValue, bool)>,
}

impl Style {
    /// An empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Set a declaration, replacing any existing value for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: StyleValue, important: bool) {
        let _ = self.decls.insert(name.into(), (value, important));
    }

    /// Get a declaration.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&(StyleValue, bool)> {
        self.decls.get(name)
    }

    /// Iterate declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &(StyleValue, bool))> {
        self.decls.iter()
    }

    /// Join two styles, preferring `self`.
    ///
    /// A declaration from `other` only wins when `self` has no declaration
    /// for the name, or `other`'s is `!important` and `self`'s is not.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut fused = self.clone();
        for (name, (value, important)) in &other.decls {
            match fused.decls.get(name) {
                None => {
                    let _ = fused.decls.insert(name.clone(), (value.clone(), *important));
                }
                Some((_, existing_important)) if *important && !existing_important => {
                    let _ = fused.decls.insert(name.clone(), (value.clone(), *important));
                }
                Some(_) => {}
            }
        }
        fused
    }

    /// Drop the importance flags, producing `name → value` in order.
    #[must_use]
    pub fn without_importance(&self) -> IndexMap<String, StyleValue> {
        self.decls
            .iter()
            .map(|(k, (v, _))| (k.clone(), v.clone()))
            .collect()
    }
}

/// A fully computed style: every registered property present, every value
/// typed. Shared by identity through the interner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ComputedStyle {
    map: BTreeMap<String, ComputedValue>,
}

impl ComputedStyle {
    /// An empty computed style (used as the parse-time parent context).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The synthetic parent context for the root element: only the
    /// priority properties a root acceptor may consult.
    #[must_use]
    pub fn root_parent(default_font_size: f32) -> Self {
        let mut map = BTreeMap::new();
        let _ = map.insert(
            "font-size".to_string(),
            ComputedValue::Length(default_font_size),
        );
        let _ = map.insert("color".to_string(), ComputedValue::Color(Color::BLACK));
        let _ = map.insert("font-weight".to_string(), ComputedValue::Number(400.0));
        Self { map }
    }

    /// Get a property's computed value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComputedValue> {
        self.map.get(name)
    }

    /// Set a property's computed value.
    pub fn insert(&mut self, name: impl Into<String>, value: ComputedValue) {
        let _ = self.map.insert(name.into(), value);
    }

    /// Iterate properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ComputedValue)> {
        self.map.iter()
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the style has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The computed font size in px (falls back to the UA default).
    #[must_use]
    pub fn font_size(&self) -> f32 {
        match self.get("font-size") {
            Some(ComputedValue::Length(v) | ComputedValue::Number(v)) => *v,
            _ => DEFAULT_FONT_SIZE,
        }
    }

    /// The computed foreground color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.get("color").and_then(ComputedValue::as_color).unwrap_or(Color::BLACK)
    }

    /// A four-sided property tuple in side order.
    ///
    /// # Panics
    ///
    /// Panics if a key is missing; computed styles always carry every
    /// registered property.
    #[must_use]
    pub fn sides(&self, keys: [&str; 4]) -> [&ComputedValue; 4] {
        keys.map(|k| {
            self.get(k)
                .unwrap_or_else(|| panic!("computed style is missing '{k}'"))
        })
    }

    /// The computed display kind.
    #[must_use]
    pub fn display(&self) -> DisplayKind {
        self.keyword_or_default("display")
    }

    /// The computed position scheme.
    #[must_use]
    pub fn position(&self) -> PositionKind {
        self.keyword_or_default("position")
    }

    /// The computed box sizing.
    #[must_use]
    pub fn box_sizing(&self) -> BoxSizing {
        self.keyword_or_default("box-sizing")
    }

    /// The computed text alignment.
    #[must_use]
    pub fn text_align(&self) -> TextAlign {
        self.keyword_or_default("text-align")
    }

    fn keyword_or_default<T: std::str::FromStr + Default>(&self, key: &str) -> T {
        self.get(key)
            .and_then(ComputedValue::as_keyword)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// `display` values.
///
/// [CSS Display Level 3](https://www.w3.org/TR/css-display-3/)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DisplayKind {
    /// Inline-level box.
    #[default]
    Inline,
    /// Block-level box.
    Block,
    /// No box at all; the subtree is not rendered.
    None,
}

/// `position` values.
///
/// [CSS Positioned Layout Level 3](https://www.w3.org/TR/css-position-3/)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PositionKind {
    /// Normal flow.
    #[default]
    Static,
    /// Normal flow (offsetting is not implemented, like sticky).
    Relative,
    /// Out of flow, positioned from the containing block's insets.
    Absolute,
    /// Treated as in-flow with no offsetting.
    Sticky,
    /// Out of flow, positioned like absolute here.
    Fixed,
}

impl PositionKind {
    /// Whether boxes with this scheme take part in normal flow.
    #[must_use]
    pub fn in_flow(self) -> bool {
        matches!(self, Self::Static | Self::Relative | Self::Sticky)
    }
}

/// `box-sizing` values.
///
/// [CSS Box Sizing Level 3](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum BoxSizing {
    /// `width`/`height` describe the content box.
    #[default]
    ContentBox,
    /// `width`/`height` describe the border box.
    BorderBox,
}

/// `text-align` values.
///
/// [CSS Text Level 3](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TextAlign {
    /// Left-packed lines.
    #[default]
    Left,
    /// Right-packed lines.
    Right,
    /// Centered lines.
    Center,
    /// Slack distributed between items (never after the last).
    Justify,
}

/// Pack directional longhands back into their shorthand for readable
/// debug output (1/2/3/4 value forms).
#[must_use]
pub fn pack_longhands(props: &IndexMap<String, String>) -> IndexMap<String, String> {
    let shorthands: [(&str, [&str; 4]); 7] = [
        ("margin", MARGIN_KEYS),
        ("padding", PADDING_KEYS),
        ("border-width", BORDER_WIDTH_KEYS),
        ("border-style", BORDER_STYLE_KEYS),
        ("border-color", BORDER_COLOR_KEYS),
        ("border-radius", BORDER_RADIUS_KEYS),
        ("inset", INSET_KEYS),
    ];
    let mut out = props.clone();
    for (shorthand, keys) in shorthands {
        if !keys.iter().all(|k| out.contains_key(*k)) {
            continue;
        }
        let values: Vec<String> = keys
            .iter()
            .filter_map(|k| out.shift_remove(*k))
            .collect();
        let [t, r, b, l] = [&values[0], &values[1], &values[2], &values[3]];
        let packed = if t == r && r == b && b == l {
            t.clone()
        } else if t == b && r == l {
            format!("{t} {r}")
        } else if r == l {
            format!("{t} {r} {b}")
        } else {
            format!("{t} {r} {b} {l}")
        };
        let _ = out.insert(shorthand.to_string(), packed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_prefers_self_unless_important() {
        let mut inline = Style::new();
        inline.insert("color", StyleValue::Raw("red".into()), false);
        let mut external = Style::new();
        external.insert("color", StyleValue::Raw("blue".into()), false);
        external.insert("display", StyleValue::Raw("block".into()), false);

        let fused = inline.join(&external);
        assert_eq!(
            fused.get("color").unwrap().0.as_raw(),
            Some("red"),
            "inline wins at equal importance"
        );
        assert!(fused.get("display").is_some());

        let mut important_external = Style::new();
        important_external.insert("color", StyleValue::Raw("blue".into()), true);
        let fused = inline.join(&important_external);
        assert_eq!(fused.get("color").unwrap().0.as_raw(), Some("blue"));
    }

    #[test]
    fn pack_longhands_forms() {
        let mut props = IndexMap::new();
        for key in MARGIN_KEYS {
            let _ = props.insert(key.to_string(), "10px".to_string());
        }
        let packed = pack_longhands(&props);
        assert_eq!(packed.get("margin"), Some(&"10px".to_string()));

        let mut props = IndexMap::new();
        for (key, v) in MARGIN_KEYS.iter().zip(["1px", "2px", "3px", "2px"]) {
            let _ = props.insert((*key).to_string(), v.to_string());
        }
        let packed = pack_longhands(&props);
        assert_eq!(packed.get("margin"), Some(&"1px 2px 3px".to_string()));
    }
}
