//! Color values.
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! Accepted syntaxes: the full named-color table (plus `transparent` and
//! the `canvastext` system color), `#RGB[A]`/`#RRGGBB[AA]` hex notation,
//! and the `rgb()`/`rgba()`/`hsl()`/`hsla()`/`hwb()` functions with either
//! comma-separated or space-and-slash argument lists. Components may use
//! `calc()`.
//!
//! `currentcolor` is handled by the property acceptor, since it needs the
//! parent style.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use super::calc::{accept_calc, numeric_units};
use super::{Accept, ComputedValue, angle_factor, scan};

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
///
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black (also the `canvastext` system color).
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color from 8-bit channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color from 8-bit channels with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    const fn from_packed(packed: u32) -> Self {
        Self::rgb(
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        )
    }

    /// The same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// "The syntax of a <hex-color> is a <hash-token> token whose value
    /// consists of 3, 4, 6, or 8 hexadecimal digits." Shorter digit groups
    /// replicate: `#abc` is `#aabbcc`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(&s.repeat(2 / s.len()), 16).ok();
        match hex.len() {
            3 | 4 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                let a = if hex.len() == 4 { channel(&hex[3..4])? } else { 255 };
                Some(Self::rgba(r, g, b, a))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        NAMED_COLORS.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Parse any supported color syntax except `currentcolor`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        if let Some((name, args)) = color_function(value) {
            return apply_color_function(name, &args);
        }
        Self::from_named(value)
    }
}

/// Split a `rgb()`/`hsl()`/`hwb()` notation into its function name and
/// normalized arguments. The modern space-and-slash form is rewritten into
/// the comma form (`rgb(1 2 3 / .5)` → `["1", "2", "3", ".5"]`).
fn color_function(value: &str) -> Option<(&'static str, Vec<String>)> {
    for name in ["rgba", "rgb", "hsla", "hsl", "hwb"] {
        if let Some(args) = scan::css_func(value, name, true) {
            let args: Vec<String> = if args.len() == 1 {
                args[0]
                    .replace('/', " ")
                    .split_ascii_whitespace()
                    .map(str::to_string)
                    .collect()
            } else {
                args.iter().map(|a| (*a).to_string()).collect()
            };
            let canonical = match name {
                "rgba" => "rgb",
                "hsla" => "hsl",
                other => other,
            };
            return Some((canonical, args));
        }
    }
    None
}

fn apply_color_function(name: &str, args: &[String]) -> Option<Color> {
    let (channels, alpha) = match args.len() {
        3 => (&args[..3], None),
        4 => (&args[..3], Some(&args[3])),
        _ => return None,
    };
    let base = match name {
        "rgb" => {
            let mut ch = [0u8; 3];
            for (slot, arg) in ch.iter_mut().zip(channels) {
                *slot = rgb_channel(arg)?;
            }
            Color::rgb(ch[0], ch[1], ch[2])
        }
        "hsl" => {
            let h = hue(&channels[0])?;
            let s = fraction(&channels[1])?;
            let l = fraction(&channels[2])?;
            hsl_to_rgb(h, s, l)
        }
        "hwb" => {
            let h = hue(&channels[0])?;
            let w = fraction(&channels[1])?;
            let b = fraction(&channels[2])?;
            hwb_to_rgb(h, w, b)
        }
        _ => return None,
    };
    match alpha {
        Some(a) => {
            let a = number_percentage(a, 1.0)?.clamp(0.0, 1.0);
            Some(base.with_alpha(float_to_channel(a * 255.0)))
        }
        None => Some(base),
    }
}

/// A `<number>` or `<percentage>` (or calc thereof), resolved against
/// `perc_ref` as the 100% value.
fn number_percentage(text: &str, perc_ref: f32) -> Option<f32> {
    if text.starts_with("calc(") {
        return match accept_calc(text, &numeric_units) {
            Accept::Value(ComputedValue::Number(n)) => Some(n),
            Accept::Value(ComputedValue::Percentage(p)) => Some(p * perc_ref * 0.01),
            _ => None,
        };
    }
    if let Some((num, unit)) = scan::split_units(text) {
        return (unit == "%").then_some(num * perc_ref * 0.01);
    }
    scan::parse_number(text)
}

/// [§ 4.1 The RGB functions](https://www.w3.org/TR/css-color-4/#funcdef-rgb)
///
/// A channel is a number (0-255) or percentage; fractional values in
/// (0, 1] are treated as fractions of 255.
fn rgb_channel(text: &str) -> Option<u8> {
    let mut v = number_percentage(text, 255.0)?;
    if v > 0.0 && v <= 1.0 {
        v *= 255.0;
    }
    Some(float_to_channel(v))
}

/// A percentage resolved to a fraction in [0, 1].
fn fraction(text: &str) -> Option<f32> {
    number_percentage(text, 1.0).map(|v| v.clamp(0.0, 1.0))
}

/// [§ 7.1 Hue](https://www.w3.org/TR/css-color-4/#typedef-hue)
///
/// A number (degrees) or an angle dimension, normalized to [0, 360).
fn hue(text: &str) -> Option<f32> {
    let degrees = if text.starts_with("calc(") {
        match accept_calc(text, &numeric_units) {
            Accept::Value(ComputedValue::Number(n) | ComputedValue::Angle(n)) => n,
            _ => return None,
        }
    } else if let Some((num, unit)) = scan::split_units(text) {
        num * angle_factor(&unit)?
    } else {
        scan::parse_number(text)?
    };
    Some(degrees.rem_euclid(360.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

/// [§ 7 HSL Colors](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp {
        hp if hp < 1.0 => (c, x, 0.0),
        hp if hp < 2.0 => (x, c, 0.0),
        hp if hp < 3.0 => (0.0, c, x),
        hp if hp < 4.0 => (0.0, x, c),
        hp if hp < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color::rgb(
        float_to_channel((r1 + m) * 255.0),
        float_to_channel((g1 + m) * 255.0),
        float_to_channel((b1 + m) * 255.0),
    )
}

/// [§ 8 HWB Colors](https://www.w3.org/TR/css-color-4/#the-hwb-notation)
fn hwb_to_rgb(h: f32, w: f32, b: f32) -> Color {
    if w + b >= 1.0 {
        let gray = float_to_channel(w / (w + b) * 255.0);
        return Color::rgb(gray, gray, gray);
    }
    let pure = hsl_to_rgb(h, 1.0, 0.5);
    let mix = |channel: u8| {
        let c = f32::from(channel) / 255.0;
        float_to_channel((c * (1.0 - w - b) + w) * 255.0)
    };
    Color::rgb(mix(pure.r), mix(pure.g), mix(pure.b))
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The full named-color table, plus `transparent`
/// ([§ 6.3](https://www.w3.org/TR/css-color-4/#transparent-color)) and the
/// `canvastext` system color ([§ 6.4](https://www.w3.org/TR/css-color-4/#css-system-colors)).
static NAMED_COLORS: LazyLock<HashMap<&'static str, Color>> = LazyLock::new(|| {
    let mut map: HashMap<&'static str, Color> = NAMED_COLOR_TABLE
        .iter()
        .map(|&(name, packed)| (name, Color::from_packed(packed)))
        .collect();
    let _ = map.insert("transparent", Color::TRANSPARENT);
    let _ = map.insert("canvastext", Color::BLACK);
    map
});

#[rustfmt::skip]
const NAMED_COLOR_TABLE: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff), ("antiquewhite", 0xfaebd7), ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4), ("azure", 0xf0ffff), ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4), ("black", 0x000000), ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff), ("blueviolet", 0x8a2be2), ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887), ("cadetblue", 0x5f9ea0), ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e), ("coral", 0xff7f50), ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc), ("crimson", 0xdc143c), ("cyan", 0x00ffff),
    ("darkblue", 0x00008b), ("darkcyan", 0x008b8b), ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9), ("darkgreen", 0x006400), ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b), ("darkmagenta", 0x8b008b), ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00), ("darkorchid", 0x9932cc), ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a), ("darkseagreen", 0x8fbc8f), ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f), ("darkslategrey", 0x2f4f4f), ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3), ("deeppink", 0xff1493), ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969), ("dimgrey", 0x696969), ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222), ("floralwhite", 0xfffaf0), ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff), ("gainsboro", 0xdcdcdc), ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700), ("goldenrod", 0xdaa520), ("gray", 0x808080),
    ("green", 0x008000), ("greenyellow", 0xadff2f), ("grey", 0x808080),
    ("honeydew", 0xf0fff0), ("hotpink", 0xff69b4), ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082), ("ivory", 0xfffff0), ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa), ("lavenderblush", 0xfff0f5), ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd), ("lightblue", 0xadd8e6), ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff), ("lightgoldenrodyellow", 0xfafad2), ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90), ("lightgrey", 0xd3d3d3), ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a), ("lightseagreen", 0x20b2aa), ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899), ("lightslategrey", 0x778899), ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0), ("lime", 0x00ff00), ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6), ("magenta", 0xff00ff), ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa), ("mediumblue", 0x0000cd), ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db), ("mediumseagreen", 0x3cb371), ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a), ("mediumturquoise", 0x48d1cc), ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970), ("mintcream", 0xf5fffa), ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5), ("navajowhite", 0xffdead), ("navy", 0x000080),
    ("oldlace", 0xfdf5e6), ("olive", 0x808000), ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500), ("orangered", 0xff4500), ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa), ("palegreen", 0x98fb98), ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093), ("papayawhip", 0xffefd5), ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f), ("pink", 0xffc0cb), ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6), ("purple", 0x800080), ("rebeccapurple", 0x663399),
    ("red", 0xff0000), ("rosybrown", 0xbc8f8f), ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513), ("salmon", 0xfa8072), ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57), ("seashell", 0xfff5ee), ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0), ("skyblue", 0x87ceeb), ("slateblue", 0x6a5acd),
    ("slategray", 0x708090), ("slategrey", 0x708090), ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f), ("steelblue", 0x4682b4), ("tan", 0xd2b48c),
    ("teal", 0x008080), ("thistle", 0xd8bfd8), ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0), ("violet", 0xee82ee), ("wheat", 0xf5deb3),
    ("white", 0xffffff), ("whitesmoke", 0xf5f5f5), ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_notations() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#f00f"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#2563eb"), Some(Color::rgb(0x25, 0x63, 0xeb)));
        assert_eq!(
            Color::from_hex("#00000080"),
            Some(Color::rgba(0, 0, 0, 0x80))
        );
        assert_eq!(Color::from_hex("#12345"), None);
    }

    #[test]
    fn named_colors() {
        assert_eq!(Color::from_named("rebeccapurple"), Some(Color::rgb(0x66, 0x33, 0x99)));
        assert_eq!(Color::from_named("Transparent"), Some(Color::TRANSPARENT));
        assert_eq!(Color::from_named("canvastext"), Some(Color::BLACK));
        assert_eq!(Color::from_named("not-a-color"), None);
    }

    #[test]
    fn rgb_functions() {
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("rgb(100%, 0%, 0%)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(
            Color::parse("rgba(0, 0, 0, 50%)"),
            Some(Color::rgba(0, 0, 0, 128))
        );
        assert_eq!(
            Color::parse("rgb(255 0 0 / 0.5)"),
            Some(Color::rgba(255, 0, 0, 128))
        );
    }

    #[test]
    fn hsl_functions() {
        assert_eq!(Color::parse("hsl(0, 100%, 50%)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("hsl(120, 100%, 50%)"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(
            Color::parse("hsl(240deg 100% 50%)"),
            Some(Color::rgb(0, 0, 255))
        );
    }

    #[test]
    fn hwb_functions() {
        assert_eq!(Color::parse("hwb(0 0% 0%)"), Some(Color::rgb(255, 0, 0)));
        // white + black over 100% normalizes to gray
        assert_eq!(Color::parse("hwb(0 100% 100%)"), Some(Color::rgb(128, 128, 128)));
    }

    #[test]
    fn calc_components() {
        assert_eq!(
            Color::parse("rgb(calc(100% / 2), 0, 0)"),
            Some(Color::rgb(128, 0, 0))
        );
    }
}
