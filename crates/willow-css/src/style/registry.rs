//! The property registry.
//!
//! Each supported property carries its initial value (as source text), an
//! optional keyword-to-computed map, an [`Acceptor`], and whether it
//! inherits. Acceptors turn raw value strings into computed values against
//! a [`ComputeContext`]; "depends on a parent property not yet computed"
//! is the explicit [`Accept::Deferred`] outcome, which the computation
//! engine handles by honoring the property priority order.

use std::sync::LazyLock;

use indexmap::IndexMap;
use willow_common::warning::warn_once;

use crate::style::{
    BORDER_COLOR_KEYS, BORDER_RADIUS_KEYS, BORDER_STYLE_KEYS, BORDER_WIDTH_KEYS, ComputedStyle,
    INSET_KEYS, MARGIN_KEYS, PADDING_KEYS, is_custom,
};
use crate::values::calc::{CalcKind, accept_calc};
use crate::values::{
    Accept, Color, ComputedValue, FontStyle, ImageSource, absolute_length_factor, angle_factor,
    resolution_factor, scan, time_factor,
};

/// The context an acceptor computes against.
///
/// At parse time (declaration precomputation) the optional fields are
/// `None` and the parent style is empty, so anything context-dependent
/// comes back [`Accept::Deferred`] and stays raw until the cascade.
#[derive(Debug, Clone, Copy)]
pub struct ComputeContext<'a> {
    /// The parent element's computed style (plus this element's own
    /// priority properties once they are computed).
    pub parent: &'a ComputedStyle,
    /// Viewport size in px, when known.
    pub viewport: Option<(f32, f32)>,
    /// The root element's font size, when known.
    pub root_font_size: Option<f32>,
    /// The engine's configured default font size, when known.
    pub default_font_size: Option<f32>,
}

impl<'a> ComputeContext<'a> {
    /// The parse-time context: nothing contextual available.
    #[must_use]
    pub fn detached(parent: &'a ComputedStyle) -> Self {
        Self {
            parent,
            viewport: None,
            root_font_size: None,
            default_font_size: None,
        }
    }

    /// The parent's computed font size, if present.
    #[must_use]
    pub fn parent_font_size(&self) -> Option<f32> {
        match self.parent.get("font-size") {
            Some(ComputedValue::Length(v) | ComputedValue::Number(v)) => Some(*v),
            _ => None,
        }
    }
}

/// An acceptor takes a raw value string and a context and produces a
/// computed value, defers, or rejects.
pub trait Acceptor: Sync {
    /// Offer a raw value to this acceptor.
    fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept;
}

/// A keyword's computed form in a property's keyword map.
#[derive(Debug, Clone, Copy)]
pub enum KeywordValue {
    /// The keyword computes to itself.
    Same,
    /// The keyword computes to a different keyword.
    Kw(&'static str),
    /// The `auto` sentinel.
    Auto,
    /// The `normal` sentinel.
    Normal,
    /// A fixed length in px.
    Px(f32),
    /// A fixed number.
    Num(f32),
    /// An empty background layer list (`none`).
    NoImages,
}

impl KeywordValue {
    fn to_value(self, word: &str) -> ComputedValue {
        match self {
            Self::Same => ComputedValue::kw(word),
            Self::Kw(s) => ComputedValue::kw(s),
            Self::Auto => ComputedValue::Auto,
            Self::Normal => ComputedValue::Normal,
            Self::Px(v) => ComputedValue::Length(v),
            Self::Num(v) => ComputedValue::Number(v),
            Self::NoImages => ComputedValue::Images(Vec::new()),
        }
    }
}

/// One registered property.
pub struct PropertyDef {
    /// The initial value, as source text.
    pub initial: &'static str,
    /// Keyword-to-computed map, consulted before the acceptor.
    pub keywords: &'static [(&'static str, KeywordValue)],
    /// The value acceptor.
    pub acceptor: &'static dyn Acceptor,
    /// Whether the property inherits.
    pub inherits: bool,
}

impl PropertyDef {
    /// Offer a value: keyword map first, then the acceptor.
    #[must_use]
    pub fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept {
        let value = value.trim();
        for (word, kw) in self.keywords {
            if value.eq_ignore_ascii_case(word) {
                return Accept::Value(kw.to_value(word));
            }
        }
        self.acceptor.accept(value, ctx)
    }

    /// What `unset` means for this property: `inherit` when it inherits,
    /// else its initial value.
    #[must_use]
    pub fn unset(&self) -> &'static str {
        if self.inherits { "inherit" } else { self.initial }
    }
}

/// Look up a property definition.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static PropertyDef> {
    REGISTRY.get(name)
}

/// All registered property names, in registry order.
pub fn property_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

/// Whether the property computes before the others so acceptors can read
/// it from the parent context (`currentcolor`, `em`, `var()`).
#[must_use]
pub fn has_priority(name: &str) -> bool {
    name == "color" || name == "font-size" || is_custom(name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Dimension acceptance
// ─────────────────────────────────────────────────────────────────────────────

/// The value families a [`DimensionAcceptor`] admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Lengths (px and convertible units).
    Length,
    /// Percentages.
    Percentage,
    /// Angles.
    Angle,
    /// Times.
    Time,
    /// Resolutions.
    Resolution,
    /// Unitless numbers.
    Number,
}

/// Accepts dimensions, percentages, numbers, and `calc()` of those,
/// restricted to a set of [`ValueKind`]s.
pub struct DimensionAcceptor {
    /// The admitted value families.
    pub kinds: &'static [ValueKind],
}

impl DimensionAcceptor {
    fn allows(&self, kind: ValueKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn check_kind(&self, value: ComputedValue) -> Accept {
        let kind = match &value {
            ComputedValue::Length(_) => ValueKind::Length,
            ComputedValue::Percentage(_) => ValueKind::Percentage,
            ComputedValue::Angle(_) => ValueKind::Angle,
            ComputedValue::Time(_) => ValueKind::Time,
            ComputedValue::Resolution(_) => ValueKind::Resolution,
            ComputedValue::Number(_) => ValueKind::Number,
            ComputedValue::Calc(expr) => match expr.kind() {
                CalcKind::Length => ValueKind::Length,
                CalcKind::Percentage => ValueKind::Percentage,
                CalcKind::Angle => ValueKind::Angle,
                CalcKind::Number => ValueKind::Number,
            },
            _ => return Accept::Invalid,
        };
        if self.allows(kind) {
            Accept::Value(value)
        } else {
            Accept::Invalid
        }
    }
}

impl Acceptor for DimensionAcceptor {
    fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept {
        let value = value.trim();
        // "0 can be written without a unit"
        if value == "0" {
            if self.allows(ValueKind::Length) {
                return Accept::Value(ComputedValue::Length(0.0));
            }
            if self.allows(ValueKind::Number) {
                return Accept::Value(ComputedValue::Number(0.0));
            }
            return Accept::Value(ComputedValue::Percentage(0.0));
        }
        if value.starts_with("calc(") {
            let resolver = |num: f32, unit: &str| resolve_unit(num, unit, ctx);
            return match accept_calc(value, &resolver) {
                Accept::Value(v) => self.check_kind(v),
                other => other,
            };
        }
        if let Some((num, unit)) = scan::split_units(value) {
            return match resolve_unit(num, &unit, ctx) {
                Accept::Value(v) => self.check_kind(v),
                other => other,
            };
        }
        if self.allows(ValueKind::Number) {
            if let Some(num) = scan::parse_number(value) {
                return Accept::Value(ComputedValue::Number(num));
            }
        }
        Accept::Invalid
    }
}

/// Canonicalize one dimension against the context.
///
/// See <https://developer.mozilla.org/en-US/docs/Web/CSS/length> for the
/// unit families. Context-dependent units (`em`, `rem`, viewport units)
/// defer when the context does not carry what they need.
fn resolve_unit(num: f32, unit: &str, ctx: &ComputeContext) -> Accept {
    if unit == "%" {
        return Accept::Value(ComputedValue::Percentage(num));
    }
    if let Some(factor) = absolute_length_factor(unit) {
        return Accept::Value(ComputedValue::Length(num * factor));
    }
    match unit {
        "em" => ctx
            .parent_font_size()
            .map_or(Accept::Deferred, |fs| {
                Accept::Value(ComputedValue::Length(num * fs))
            }),
        "rem" => ctx.root_font_size.map_or(Accept::Deferred, |fs| {
            Accept::Value(ComputedValue::Length(num * fs))
        }),
        "vw" | "vh" | "vmin" | "vmax" => ctx.viewport.map_or(Accept::Deferred, |(w, h)| {
            let reference = match unit {
                "vw" => w,
                "vh" => h,
                "vmin" => w.min(h),
                _ => w.max(h),
            };
            Accept::Value(ComputedValue::Length(num * 0.01 * reference))
        }),
        _ => {
            if let Some(factor) = angle_factor(unit) {
                Accept::Value(ComputedValue::Angle(num * factor))
            } else if let Some(factor) = time_factor(unit) {
                Accept::Value(ComputedValue::Time(num * factor))
            } else if let Some(factor) = resolution_factor(unit) {
                Accept::Value(ComputedValue::Resolution(num * factor))
            } else {
                Accept::Invalid
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Specialized acceptors
// ─────────────────────────────────────────────────────────────────────────────

struct ColorAcceptor;

impl Acceptor for ColorAcceptor {
    fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept {
        if value.eq_ignore_ascii_case("currentcolor") {
            return match ctx.parent.get("color") {
                Some(ComputedValue::Color(c)) => Accept::Value(ComputedValue::Color(*c)),
                _ => Accept::Deferred,
            };
        }
        Color::parse(value).map_or(Accept::Invalid, |c| Accept::Value(ComputedValue::Color(c)))
    }
}

/// [§ 2.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolute keywords step a 1.2 ladder around the default size; `smaller`/
/// `larger` step relative to the parent; lengths/percentages resolve
/// against the parent's font size immediately, so the computed value is
/// always a length.
struct FontSizeAcceptor;

/// The absolute keyword ladder: keyword → exponent over 1.2.
const ABS_FONT_SIZE: [(&str, i32); 8] = [
    ("xx-small", -3),
    ("x-small", -2),
    ("small", -1),
    ("medium", 0),
    ("large", 1),
    ("x-large", 2),
    ("xx-large", 3),
    ("xxx-large", 4),
];

impl Acceptor for FontSizeAcceptor {
    fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept {
        for (word, exp) in ABS_FONT_SIZE {
            if value.eq_ignore_ascii_case(word) {
                return ctx.default_font_size.map_or(Accept::Deferred, |base| {
                    Accept::Value(ComputedValue::Length(base * 1.2f32.powi(exp)))
                });
            }
        }
        if value.eq_ignore_ascii_case("smaller") || value.eq_ignore_ascii_case("larger") {
            let exp = if value.eq_ignore_ascii_case("larger") { 1 } else { -1 };
            return ctx.parent_font_size().map_or(Accept::Deferred, |parent| {
                Accept::Value(ComputedValue::Length(parent * 1.2f32.powi(exp)))
            });
        }
        match LENGTH_PERCENTAGE.accept(value, ctx) {
            Accept::Value(v) => {
                let Some(parent) = ctx.parent_font_size() else {
                    return Accept::Deferred;
                };
                let calc = crate::values::Calculator::new(parent);
                calc.resolve(&v, None, Some(parent))
                    .map_or(Accept::Invalid, |px| {
                        Accept::Value(ComputedValue::Length(px))
                    })
            }
            other => other,
        }
    }
}

/// [CSS Fonts § relative weights](https://drafts.csswg.org/css-fonts/#relative-weights)
struct FontWeightAcceptor;

impl Acceptor for FontWeightAcceptor {
    fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept {
        let relative = value.eq_ignore_ascii_case("lighter") || value.eq_ignore_ascii_case("bolder");
        if relative {
            let Some(ComputedValue::Number(parent)) = ctx.parent.get("font-weight") else {
                return Accept::Deferred;
            };
            let parent = *parent;
            let mapped = if value.eq_ignore_ascii_case("lighter") {
                match parent {
                    p if p < 100.0 => p,
                    p if p < 550.0 => 100.0,
                    p if p < 700.0 => 400.0,
                    p if p <= 1000.0 => 700.0,
                    _ => return Accept::Invalid,
                }
            } else {
                match parent {
                    p if p < 350.0 => 400.0,
                    p if p < 550.0 => 700.0,
                    p if p < 900.0 => 900.0,
                    p => p,
                }
            };
            return Accept::Value(ComputedValue::Number(mapped));
        }
        match scan::parse_number(value) {
            Some(n) if n > 0.0 && n <= 1000.0 => Accept::Value(ComputedValue::Number(n)),
            _ => Accept::Invalid,
        }
    }
}

struct FontStyleAcceptor;

impl Acceptor for FontStyleAcceptor {
    fn accept(&self, value: &str, _ctx: &ComputeContext) -> Accept {
        FontStyle::parse(value).map_or(Accept::Invalid, |fs| {
            Accept::Value(ComputedValue::FontStyle(fs))
        })
    }
}

/// `font-family` is a comma-separated preference list; quotes strip.
struct FontFamilyAcceptor;

impl Acceptor for FontFamilyAcceptor {
    fn accept(&self, value: &str, _ctx: &ComputeContext) -> Accept {
        let families: Vec<String> = scan::split_top_level(value, ',')
            .into_iter()
            .map(|f| scan::remove_quotes(f.trim()).to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if families.is_empty() {
            Accept::Invalid
        } else {
            Accept::Value(ComputedValue::Families(families))
        }
    }
}

/// `background-image: url(...) ...` - layers that fail to parse are
/// reported and skipped, the rest of the list survives.
struct BackgroundImageAcceptor;

impl Acceptor for BackgroundImageAcceptor {
    fn accept(&self, value: &str, _ctx: &ComputeContext) -> Accept {
        let mut layers = Vec::new();
        for part in scan::split_value(value) {
            if let Some(args) = scan::css_func(part, "url", false) {
                layers.push(ImageSource::Url(scan::remove_quotes(args[0].trim()).to_string()));
            } else {
                warn_once("CSS", &format!("background-image only supports urls right now ({part})"));
            }
        }
        Accept::Value(ComputedValue::Images(layers))
    }
}

/// `border-*-radius`: one or two length-percentages per corner.
struct BorderRadiusAcceptor;

impl Acceptor for BorderRadiusAcceptor {
    fn accept(&self, value: &str, ctx: &ComputeContext) -> Accept {
        let parts = scan::split_value(value);
        if parts.is_empty() || parts.len() > 2 {
            return Accept::Invalid;
        }
        let mut axes = Vec::with_capacity(2);
        for part in &parts {
            match LENGTH_PERCENTAGE.accept(part, ctx) {
                Accept::Value(v) => axes.push(v),
                other => return other,
            }
        }
        let x = axes[0].clone();
        let y = axes.get(1).cloned().unwrap_or_else(|| x.clone());
        Accept::Value(ComputedValue::Pair(Box::new((x, y))))
    }
}

/// For keyword-only properties: anything not in the keyword map is
/// invalid.
struct NoAcceptor;

impl Acceptor for NoAcceptor {
    fn accept(&self, _value: &str, _ctx: &ComputeContext) -> Accept {
        Accept::Invalid
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Acceptor instances
// ─────────────────────────────────────────────────────────────────────────────

/// Length only.
pub static LENGTH: DimensionAcceptor = DimensionAcceptor {
    kinds: &[ValueKind::Length],
};
/// Length or percentage.
pub static LENGTH_PERCENTAGE: DimensionAcceptor = DimensionAcceptor {
    kinds: &[ValueKind::Length, ValueKind::Percentage],
};
/// Number, length, or percentage (line-height).
pub static NUMBER_LENGTH_PERCENTAGE: DimensionAcceptor = DimensionAcceptor {
    kinds: &[ValueKind::Number, ValueKind::Length, ValueKind::Percentage],
};

static COLOR: ColorAcceptor = ColorAcceptor;
static FONT_SIZE: FontSizeAcceptor = FontSizeAcceptor;
static FONT_WEIGHT: FontWeightAcceptor = FontWeightAcceptor;
static FONT_STYLE: FontStyleAcceptor = FontStyleAcceptor;
static FONT_FAMILY: FontFamilyAcceptor = FontFamilyAcceptor;
static BACKGROUND_IMAGE: BackgroundImageAcceptor = BackgroundImageAcceptor;
static BORDER_RADIUS: BorderRadiusAcceptor = BorderRadiusAcceptor;
static NONE: NoAcceptor = NoAcceptor;

// ─────────────────────────────────────────────────────────────────────────────
// Keyword tables
// ─────────────────────────────────────────────────────────────────────────────

const AUTO_KW: &[(&str, KeywordValue)] = &[("auto", KeywordValue::Auto)];
const NORMAL_KW: &[(&str, KeywordValue)] = &[("normal", KeywordValue::Normal)];
const DISPLAY_KW: &[(&str, KeywordValue)] = &[
    ("inline", KeywordValue::Same),
    ("block", KeywordValue::Same),
    ("none", KeywordValue::Same),
];
const POSITION_KW: &[(&str, KeywordValue)] = &[
    ("static", KeywordValue::Same),
    ("relative", KeywordValue::Same),
    ("absolute", KeywordValue::Same),
    ("sticky", KeywordValue::Same),
    ("fixed", KeywordValue::Same),
];
const BOX_SIZING_KW: &[(&str, KeywordValue)] = &[
    ("content-box", KeywordValue::Same),
    ("border-box", KeywordValue::Same),
];
const TEXT_ALIGN_KW: &[(&str, KeywordValue)] = &[
    ("left", KeywordValue::Same),
    ("right", KeywordValue::Same),
    ("center", KeywordValue::Same),
    ("justify", KeywordValue::Same),
];
/// Keyword widths copied from Firefox.
const BORDER_WIDTH_KW: &[(&str, KeywordValue)] = &[
    ("thin", KeywordValue::Px(1.0)),
    ("medium", KeywordValue::Px(3.0)),
    ("thick", KeywordValue::Px(5.0)),
];
const BORDER_STYLE_KW: &[(&str, KeywordValue)] = &[
    ("none", KeywordValue::Same),
    ("hidden", KeywordValue::Same),
    ("dotted", KeywordValue::Same),
    ("dashed", KeywordValue::Same),
    ("solid", KeywordValue::Same),
    ("double", KeywordValue::Same),
    ("groove", KeywordValue::Same),
    ("ridge", KeywordValue::Same),
    ("inset", KeywordValue::Same),
    ("outset", KeywordValue::Same),
];
const FONT_WEIGHT_KW: &[(&str, KeywordValue)] = &[
    ("normal", KeywordValue::Num(400.0)),
    ("bold", KeywordValue::Num(700.0)),
];
const BACKGROUND_IMAGE_KW: &[(&str, KeywordValue)] = &[("none", KeywordValue::NoImages)];
/// Only overlay scroll bars are implemented, so `auto` computes to
/// `scroll`; the bar only shows when there actually is overflow.
const OVERFLOW_KW: &[(&str, KeywordValue)] = &[
    ("auto", KeywordValue::Kw("scroll")),
    ("scroll", KeywordValue::Same),
    ("clip", KeywordValue::Same),
    ("visible", KeywordValue::Same),
    ("hidden", KeywordValue::Same),
];
const CURSOR_KW: &[(&str, KeywordValue)] = &[
    ("auto", KeywordValue::Auto),
    ("default", KeywordValue::Same),
    ("none", KeywordValue::Same),
    ("pointer", KeywordValue::Same),
    ("progress", KeywordValue::Same),
    ("wait", KeywordValue::Same),
    ("crosshair", KeywordValue::Same),
    ("text", KeywordValue::Same),
    ("move", KeywordValue::Same),
    ("not-allowed", KeywordValue::Same),
    ("n-resize", KeywordValue::Same),
    ("e-resize", KeywordValue::Same),
    ("s-resize", KeywordValue::Same),
    ("w-resize", KeywordValue::Same),
    ("ne-resize", KeywordValue::Same),
    ("nw-resize", KeywordValue::Same),
    ("se-resize", KeywordValue::Same),
    ("sw-resize", KeywordValue::Same),
    ("ew-resize", KeywordValue::Same),
    ("ns-resize", KeywordValue::Same),
    ("nesw-resize", KeywordValue::Same),
    ("nwse-resize", KeywordValue::Same),
];

// ─────────────────────────────────────────────────────────────────────────────
// The registry
// ─────────────────────────────────────────────────────────────────────────────

const fn def(
    initial: &'static str,
    keywords: &'static [(&'static str, KeywordValue)],
    acceptor: &'static dyn Acceptor,
    inherits: bool,
) -> PropertyDef {
    PropertyDef {
        initial,
        keywords,
        acceptor,
        inherits,
    }
}

static REGISTRY: LazyLock<IndexMap<&'static str, PropertyDef>> = LazyLock::new(|| {
    let mut map: IndexMap<&'static str, PropertyDef> = IndexMap::new();
    let mut put = |name: &'static str, prop_def: PropertyDef| {
        let _ = map.insert(name, prop_def);
    };

    put("color", def("canvastext", &[], &COLOR, true));
    put("font-weight", def("normal", FONT_WEIGHT_KW, &FONT_WEIGHT, true));
    put("font-family", def("Arial", &[], &FONT_FAMILY, true));
    put("font-size", def("medium", &[], &FONT_SIZE, true));
    put("font-style", def("normal", &[], &FONT_STYLE, true));
    put(
        "line-height",
        def("normal", NORMAL_KW, &NUMBER_LENGTH_PERCENTAGE, true),
    );
    put("word-spacing", def("normal", NORMAL_KW, &LENGTH_PERCENTAGE, true));
    put("text-align", def("left", TEXT_ALIGN_KW, &NONE, false));
    put("display", def("inline", DISPLAY_KW, &NONE, false));
    put("background-color", def("transparent", &[], &COLOR, false));
    put(
        "background-image",
        def("none", BACKGROUND_IMAGE_KW, &BACKGROUND_IMAGE, false),
    );
    // TODO: width also wants max-content/min-content/fit-content
    put("width", def("auto", AUTO_KW, &LENGTH_PERCENTAGE, false));
    put("height", def("auto", AUTO_KW, &LENGTH_PERCENTAGE, false));
    put("position", def("static", POSITION_KW, &NONE, false));
    put("box-sizing", def("content-box", BOX_SIZING_KW, &NONE, false));
    // insets default to auto so the top-else-bottom / left-else-right
    // fallback in positioned layout stays meaningful
    for key in INSET_KEYS {
        put(key, def("auto", AUTO_KW, &LENGTH_PERCENTAGE, false));
    }
    for key in MARGIN_KEYS {
        put(key, def("0", AUTO_KW, &LENGTH_PERCENTAGE, false));
    }
    for key in PADDING_KEYS {
        put(key, def("0", AUTO_KW, &LENGTH_PERCENTAGE, false));
    }
    for key in BORDER_WIDTH_KEYS {
        put(key, def("medium", BORDER_WIDTH_KW, &LENGTH, false));
    }
    for key in BORDER_STYLE_KEYS {
        put(key, def("none", BORDER_STYLE_KW, &NONE, false));
    }
    for key in BORDER_COLOR_KEYS {
        put(key, def("currentcolor", &[], &COLOR, false));
    }
    for key in BORDER_RADIUS_KEYS {
        put(key, def("0", &[], &BORDER_RADIUS, false));
    }
    put("outline-width", def("medium", BORDER_WIDTH_KW, &LENGTH, false));
    put("outline-style", def("none", BORDER_STYLE_KW, &NONE, false));
    put("outline-color", def("currentcolor", &[], &COLOR, false));
    put("outline-offset", def("0", &[], &LENGTH, false));
    put("cursor", def("auto", CURSOR_KW, &NONE, false));
    put("overflow-x", def("auto", OVERFLOW_KW, &NONE, false));
    put("overflow-y", def("auto", OVERFLOW_KW, &NONE, false));

    map
});

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_parent(parent: &ComputedStyle) -> ComputeContext<'_> {
        ComputeContext {
            parent,
            viewport: Some((800.0, 600.0)),
            root_font_size: Some(16.0),
            default_font_size: Some(16.0),
        }
    }

    #[test]
    fn length_units_canonicalize() {
        let parent = ComputedStyle::root_parent(16.0);
        let ctx = ctx_with_parent(&parent);
        assert_eq!(
            LENGTH.accept("1in", &ctx),
            Accept::Value(ComputedValue::Length(96.0))
        );
        assert_eq!(
            LENGTH.accept("2em", &ctx),
            Accept::Value(ComputedValue::Length(32.0))
        );
        assert_eq!(
            LENGTH.accept("10vw", &ctx),
            Accept::Value(ComputedValue::Length(80.0))
        );
        assert_eq!(LENGTH.accept("50%", &ctx), Accept::Invalid);
    }

    #[test]
    fn relative_units_defer_without_context() {
        let parent = ComputedStyle::empty();
        let ctx = ComputeContext::detached(&parent);
        assert_eq!(LENGTH.accept("2em", &ctx), Accept::Deferred);
        assert_eq!(LENGTH.accept("10vw", &ctx), Accept::Deferred);
        assert_eq!(
            LENGTH.accept("10px", &ctx),
            Accept::Value(ComputedValue::Length(10.0))
        );
    }

    #[test]
    fn font_size_keywords_and_relatives() {
        let mut parent = ComputedStyle::empty();
        parent.insert("font-size", ComputedValue::Length(20.0));
        let ctx = ctx_with_parent(&parent);
        let prop_def = lookup("font-size").unwrap();
        assert_eq!(
            prop_def.accept("medium", &ctx),
            Accept::Value(ComputedValue::Length(16.0))
        );
        let Accept::Value(ComputedValue::Length(larger)) = prop_def.accept("larger", &ctx) else {
            panic!("larger should compute");
        };
        assert!((larger - 24.0).abs() < 1e-3);
        assert_eq!(
            prop_def.accept("150%", &ctx),
            Accept::Value(ComputedValue::Length(30.0))
        );
    }

    #[test]
    fn font_weight_ladders() {
        let mut parent = ComputedStyle::empty();
        parent.insert("font-weight", ComputedValue::Number(400.0));
        let ctx = ctx_with_parent(&parent);
        let prop_def = lookup("font-weight").unwrap();
        assert_eq!(
            prop_def.accept("bolder", &ctx),
            Accept::Value(ComputedValue::Number(700.0))
        );
        assert_eq!(
            prop_def.accept("lighter", &ctx),
            Accept::Value(ComputedValue::Number(100.0))
        );
        assert_eq!(
            prop_def.accept("bold", &ctx),
            Accept::Value(ComputedValue::Number(700.0))
        );
        assert_eq!(prop_def.accept("1500", &ctx), Accept::Invalid);
    }

    #[test]
    fn currentcolor_defers_then_resolves() {
        let parent = ComputedStyle::empty();
        let ctx = ComputeContext::detached(&parent);
        let prop_def = lookup("border-top-color").unwrap();
        assert_eq!(prop_def.accept("currentcolor", &ctx), Accept::Deferred);

        let mut parent = ComputedStyle::empty();
        parent.insert("color", ComputedValue::Color(Color::rgb(1, 2, 3)));
        let ctx = ctx_with_parent(&parent);
        assert_eq!(
            prop_def.accept("currentcolor", &ctx),
            Accept::Value(ComputedValue::Color(Color::rgb(1, 2, 3)))
        );
    }

    #[test]
    fn border_radius_pairs() {
        let parent = ComputedStyle::empty();
        let ctx = ComputeContext::detached(&parent);
        let prop_def = lookup("border-top-left-radius").unwrap();
        let Accept::Value(ComputedValue::Pair(pair)) = prop_def.accept("5px 10%", &ctx) else {
            panic!("expected a pair");
        };
        assert_eq!(pair.0, ComputedValue::Length(5.0));
        assert_eq!(pair.1, ComputedValue::Percentage(10.0));
        assert_eq!(prop_def.accept("1px 2px 3px", &ctx), Accept::Invalid);
    }

    #[test]
    fn overflow_auto_maps_to_scroll() {
        let parent = ComputedStyle::empty();
        let ctx = ComputeContext::detached(&parent);
        let prop_def = lookup("overflow-x").unwrap();
        assert_eq!(prop_def.accept("auto", &ctx), Accept::Value(ComputedValue::kw("scroll")));
    }
}
