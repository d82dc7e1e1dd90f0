//! CSS value types and unit resolution.
//!
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! All dimensions are canonicalized at parse time: lengths to px, angles to
//! degrees, times to seconds, resolutions to dpi. Percentages and `calc()`
//! expressions containing percentages stay symbolic until layout supplies a
//! reference value.

pub mod calc;
pub mod color;
pub mod scan;

use serde::Serialize;

use crate::error::BugError;
pub use calc::{CalcExpr, CalcKind, CalcOp};
pub use color::Color;

/// User agent default font size.
///
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
/// "Initial: medium" - we define medium as 16px per common browser convention.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Default oblique angle for `font-style: oblique` without an angle.
///
/// [§ 2.4 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
/// "oblique <angle>? ... lack of an <angle> represents 14deg"
pub const DEFAULT_OBLIQUE_ANGLE: f32 = 14.0;

/// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
///
/// Conversion factor from an absolute length unit to px, or `None` if the
/// unit is not an absolute length unit.
#[must_use]
pub fn absolute_length_factor(unit: &str) -> Option<f32> {
    // "1in = 2.54cm = 96px", "1pc = 1/6 in", "1pt = 1/72 in", "1Q = 1/40 cm"
    match unit {
        "px" => Some(1.0),
        "cm" => Some(37.8),
        "mm" => Some(3.78),
        "Q" | "q" => Some(0.945),
        "in" => Some(96.0),
        "pc" => Some(16.0),
        "pt" => Some(4.0 / 3.0),
        _ => None,
    }
}

/// [§ 5.1 Relative lengths](https://www.w3.org/TR/css-values-4/#relative-lengths)
///
/// Whether the unit is one of the supported font- or viewport-relative
/// length units.
#[must_use]
pub fn is_relative_length_unit(unit: &str) -> bool {
    matches!(unit, "em" | "rem" | "vw" | "vh" | "vmin" | "vmax")
}

/// [§ 6.2 Angle units](https://www.w3.org/TR/css-values-4/#angles)
///
/// Conversion factor from an angle unit to degrees. `pirad` lets style text
/// write `1.5pirad` instead of `calc(1.5rad*pi)`.
#[must_use]
pub fn angle_factor(unit: &str) -> Option<f32> {
    match unit {
        "deg" => Some(1.0),
        "grad" => Some(360.0 / 400.0),
        "rad" => Some(360.0 / (2.0 * std::f32::consts::PI)),
        "turn" => Some(360.0),
        "pirad" => Some(180.0),
        _ => None,
    }
}

/// [§ 6.3 Duration units](https://www.w3.org/TR/css-values-4/#time)
///
/// Conversion factor from a time unit to seconds.
#[must_use]
pub fn time_factor(unit: &str) -> Option<f32> {
    match unit {
        "s" => Some(1.0),
        "ms" => Some(0.001),
        _ => None,
    }
}

/// [§ 6.5 Resolution units](https://www.w3.org/TR/css-values-4/#resolution)
///
/// Conversion factor from a resolution unit to dpi.
#[must_use]
pub fn resolution_factor(unit: &str) -> Option<f32> {
    match unit {
        "dpi" => Some(1.0),
        "dpcm" => Some(2.54),
        "x" | "dppx" => Some(96.0),
        _ => None,
    }
}

/// A reference to a drawable background layer.
///
/// [§ 3.6 background-image](https://www.w3.org/TR/css-backgrounds-3/#background-image)
///
/// The core never loads pixels; it records the source and the host's paint
/// backend resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ImageSource {
    /// `url(...)` - fetched by the host.
    Url(String),
}

/// Computed `font-style`.
///
/// [§ 2.4 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontStyle {
    /// The style keyword.
    pub kind: FontStyleKind,
    /// Oblique angle in degrees (meaningful for `oblique` only).
    pub angle: f32,
}

/// The `font-style` keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FontStyleKind {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyph forms.
    Italic,
    /// Slanted upright glyphs.
    Oblique,
}

impl FontStyle {
    /// Parse from the first one or two whitespace-separated tokens of a
    /// `font-style` value (`oblique 10deg`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_ascii_whitespace();
        let kind: FontStyleKind = parts.next()?.parse().ok()?;
        let angle = match parts.next() {
            Some(s) if kind == FontStyleKind::Oblique => {
                let (num, unit) = scan::split_units(s)?;
                num * angle_factor(&unit)?
            }
            Some(_) => return None,
            None => DEFAULT_OBLIQUE_ANGLE,
        };
        Some(Self { kind, angle })
    }
}

/// A fully computed property value.
///
/// This is the single value vocabulary shared by the property registry, the
/// cascade, and layout. Dimensions carry canonical units; `Calc` is the
/// deferred form kept when a `calc()` expression still contains a
/// percentage that only layout can resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComputedValue {
    /// A resolved length in px.
    Length(f32),
    /// A percentage, resolved against a context at layout time.
    Percentage(f32),
    /// An angle in degrees.
    Angle(f32),
    /// A time in seconds.
    Time(f32),
    /// A resolution in dpi.
    Resolution(f32),
    /// A unitless number.
    Number(f32),
    /// The `auto` sentinel, distinct from any number.
    Auto,
    /// The `normal` sentinel, distinct from any number.
    Normal,
    /// An sRGB color with 8-bit components.
    Color(Color),
    /// A computed keyword (enumerated property values, custom property
    /// text, and anything stored verbatim).
    Keyword(String),
    /// Computed `font-style`.
    FontStyle(FontStyle),
    /// A `font-family` list in preference order.
    Families(Vec<String>),
    /// Background image layers; empty means `none`.
    Images(Vec<ImageSource>),
    /// A two-axis pair, used for `border-*-radius` corners.
    Pair(Box<(ComputedValue, ComputedValue)>),
    /// A deferred `calc()` expression.
    Calc(CalcExpr),
}

impl ComputedValue {
    /// Shorthand for a keyword value.
    #[must_use]
    pub fn kw(s: &str) -> Self {
        Self::Keyword(s.to_string())
    }

    /// The keyword text, if this is a keyword.
    #[must_use]
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Self::Keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is the `auto` sentinel.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The color, if this is a color value.
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl Eq for ComputedValue {}

#[allow(clippy::derived_hash_with_manual_eq)]
impl std::hash::Hash for ComputedValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Floats hash by bit pattern; computed values never hold NaN, so
        // bitwise equality and `PartialEq` agree.
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Length(v)
            | Self::Percentage(v)
            | Self::Angle(v)
            | Self::Time(v)
            | Self::Resolution(v)
            | Self::Number(v) => v.to_bits().hash(state),
            Self::Auto | Self::Normal => {}
            Self::Color(c) => c.hash(state),
            Self::Keyword(s) => s.hash(state),
            Self::FontStyle(fs) => {
                fs.kind.hash(state);
                fs.angle.to_bits().hash(state);
            }
            Self::Families(f) => f.hash(state),
            Self::Images(i) => i.hash(state),
            Self::Pair(p) => {
                p.0.hash(state);
                p.1.hash(state);
            }
            Self::Calc(c) => c.hash(state),
        }
    }
}

impl std::fmt::Display for ComputedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length(v) => write!(f, "{v}px"),
            Self::Percentage(v) => write!(f, "{v}%"),
            Self::Angle(v) => write!(f, "{v}deg"),
            Self::Time(v) => write!(f, "{v}s"),
            Self::Resolution(v) => write!(f, "{v}dpi"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Auto => write!(f, "auto"),
            Self::Normal => write!(f, "normal"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Keyword(s) => write!(f, "{s}"),
            Self::FontStyle(fs) => {
                if fs.kind == FontStyleKind::Oblique {
                    write!(f, "oblique {}deg", fs.angle)
                } else {
                    write!(f, "{}", fs.kind)
                }
            }
            Self::Families(fam) => write!(f, "{}", fam.join(", ")),
            Self::Images(images) => {
                if images.is_empty() {
                    write!(f, "none")
                } else {
                    let urls: Vec<String> = images
                        .iter()
                        .map(|ImageSource::Url(u)| format!("url({u})"))
                        .collect();
                    write!(f, "{}", urls.join(", "))
                }
            }
            Self::Pair(p) => write!(f, "{} {}", p.0, p.1),
            Self::Calc(c) => write!(f, "calc({c})"),
        }
    }
}

/// The result of offering a raw value string to an acceptor.
///
/// The source system signalled "depends on a parent property that is not
/// computed yet" by raising; here that is an explicit variant the cascade
/// handles by honoring the property priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum Accept {
    /// The value is valid and fully computed.
    Value(ComputedValue),
    /// The value may be valid but needs a parent property that has not
    /// been computed yet (e.g. `em` before `font-size`).
    Deferred,
    /// The value is not valid for this property.
    Invalid,
}

impl Accept {
    /// Apply a function to the computed value, passing the other variants
    /// through.
    #[must_use]
    pub fn map(self, f: impl FnOnce(ComputedValue) -> ComputedValue) -> Self {
        match self {
            Self::Value(v) => Self::Value(f(v)),
            other => other,
        }
    }

    /// The computed value, if any.
    #[must_use]
    pub fn value(self) -> Option<ComputedValue> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Resolves computed values into used numbers during layout.
///
/// Takes a value, an optional `auto` substitute and the reference value for
/// percentages, and returns a plain number:
///
/// - numbers and resolved dimensions pass through,
/// - `auto`/`normal` become the `auto_val`,
/// - percentages multiply with the percentage reference,
/// - deferred `calc()` trees are folded leaf-by-leaf.
///
/// Asking for `auto` without an `auto_val`, or a percentage without any
/// reference, is an internal invariant violation ([`BugError`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator {
    /// Fallback percentage reference used when a call site passes `None`.
    pub default_perc: Option<f32>,
}

impl Calculator {
    /// Create a calculator whose percentages resolve against `perc`.
    #[must_use]
    pub fn new(perc: f32) -> Self {
        Self {
            default_perc: Some(perc),
        }
    }

    /// Resolve a single value to a used number.
    ///
    /// # Errors
    ///
    /// Returns [`BugError`] if the value needs a substitute this call did
    /// not provide (see type-level docs).
    pub fn resolve(
        &self,
        value: &ComputedValue,
        auto_val: Option<f32>,
        perc_val: Option<f32>,
    ) -> Result<f32, BugError> {
        match value {
            ComputedValue::Number(v)
            | ComputedValue::Length(v)
            | ComputedValue::Angle(v)
            | ComputedValue::Time(v)
            | ComputedValue::Resolution(v) => Ok(*v),
            ComputedValue::Auto | ComputedValue::Normal => {
                auto_val.ok_or_else(|| BugError::new("this attribute cannot be auto"))
            }
            ComputedValue::Percentage(p) => {
                let reference = perc_val
                    .or(self.default_perc)
                    .ok_or_else(|| BugError::new("this attribute cannot be a percentage"))?;
                Ok(p * reference * 0.01)
            }
            ComputedValue::Calc(expr) => self.resolve_calc(expr, auto_val, perc_val),
            other => Err(BugError::new(format!("unsupported value in calc: {other}"))),
        }
    }

    fn resolve_calc(
        &self,
        expr: &CalcExpr,
        auto_val: Option<f32>,
        perc_val: Option<f32>,
    ) -> Result<f32, BugError> {
        match expr {
            CalcExpr::Length(v) | CalcExpr::Angle(v) | CalcExpr::Number(v) => Ok(*v),
            CalcExpr::Percentage(p) => {
                self.resolve(&ComputedValue::Percentage(*p), auto_val, perc_val)
            }
            CalcExpr::Op { left, op, right } => {
                let l = self.resolve_calc(left, auto_val, perc_val)?;
                let r = self.resolve_calc(right, auto_val, perc_val)?;
                let folded = match op {
                    CalcOp::Add => l + r,
                    CalcOp::Sub => l - r,
                    CalcOp::Mul => l * r,
                    CalcOp::Div => {
                        if r == 0.0 {
                            return Err(BugError::new("calc division by zero at resolve time"));
                        }
                        l / r
                    }
                };
                Ok(folded)
            }
        }
    }

    /// Resolve a pair of values with shared substitutes.
    ///
    /// # Errors
    ///
    /// Propagates the first [`BugError`] from [`Calculator::resolve`].
    pub fn resolve2(
        &self,
        values: (&ComputedValue, &ComputedValue),
        auto_val: Option<f32>,
        perc_val: Option<f32>,
    ) -> Result<(f32, f32), BugError> {
        Ok((
            self.resolve(values.0, auto_val, perc_val)?,
            self.resolve(values.1, auto_val, perc_val)?,
        ))
    }

    /// Resolve a four-sided property tuple with shared substitutes.
    ///
    /// # Errors
    ///
    /// Propagates the first [`BugError`] from [`Calculator::resolve`].
    pub fn resolve4(
        &self,
        values: [&ComputedValue; 4],
        auto_val: Option<f32>,
        perc_val: Option<f32>,
    ) -> Result<[f32; 4], BugError> {
        Ok([
            self.resolve(values[0], auto_val, perc_val)?,
            self.resolve(values[1], auto_val, perc_val)?,
            self.resolve(values[2], auto_val, perc_val)?,
            self.resolve(values[3], auto_val, perc_val)?,
        ])
    }
}
