//! Per-tag default styles and the built-in user-agent sheet.
//!
//! [HTML § Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! The tag table is the `element_default(tag)` layer of the cascade: a
//! small static map of processed declarations per tag, laid over the
//! absolute defaults (every registered property at `inherit` or its
//! initial value). Elements that only convey information to the runtime
//! (`head`, `style`, `script`, ...) default to `display: none`.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::style::registry;
use crate::style::shorthand::process;
use crate::style::{Style, StyleValue};

/// The user-agent sheet applied below all author sheets.
pub const UA_SHEET: &str = "
a:visited {
    color: purple
}
input:focus {
    outline: solid rgb(45, 140, 180) medium;
}
";

/// The absolute default for every registered property: `inherit` for
/// inherited properties, the initial value otherwise (exactly what
/// `unset` resolves to).
static ABS_DEFAULT: LazyLock<Style> = LazyLock::new(|| {
    let mut style = Style::new();
    for name in registry::property_names() {
        let prop_def = registry::lookup(name).expect("registered name");
        style.insert(name, StyleValue::Raw(prop_def.unset().to_string()), false);
    }
    style
});

fn style_of(decls: &[(&str, &str)]) -> Style {
    process(
        decls
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string(), false))
            .collect(),
    )
}

static TAG_DEFAULTS: LazyLock<HashMap<&'static str, Style>> = LazyLock::new(|| {
    let mut map: HashMap<&'static str, Style> = HashMap::new();

    // the root does not inherit: every inherited property starts at its
    // initial value here
    let html_decls: Vec<(String, String, bool)> = registry::property_names()
        .filter_map(|name| {
            let prop_def = registry::lookup(name)?;
            prop_def
                .inherits
                .then(|| (name.to_string(), prop_def.initial.to_string(), false))
        })
        .chain(std::iter::once((
            "display".to_string(),
            "block".to_string(),
            false,
        )))
        .collect();
    let _ = map.insert("html", process(html_decls).join(&ABS_DEFAULT));

    let mut put = |tag: &'static str, decls: &[(&str, &str)]| {
        let _ = map.insert(tag, style_of(decls).join(&ABS_DEFAULT));
    };

    put("body", &[("display", "block")]);
    put("div", &[("display", "block")]);
    put("p", &[("display", "block"), ("margin", "1em 0")]);
    put("span", &[("display", "inline")]);
    put(
        "h1",
        &[("display", "block"), ("font-size", "2em"), ("margin", ".1em 0")],
    );
    put(
        "h2",
        &[("display", "block"), ("font-size", "1.5em"), ("margin", ".1em 0")],
    );
    put("br", &[("width", "100%"), ("height", "1em")]);
    put("a", &[("color", "blue"), ("cursor", "pointer")]);
    put("center", &[("display", "block"), ("text-align", "center")]);
    put("button", &[("cursor", "pointer"), ("text-align", "center")]);
    put(
        "input",
        &[
            ("border-style", "solid"),
            ("border-radius", "3px"),
            ("outline-offset", "1px"),
            ("padding", "3px"),
        ],
    );
    put("strong", &[("font-weight", "bold")]);
    // information-only elements render nothing
    for tag in ["head", "title", "style", "script", "link", "meta"] {
        put(tag, &[("display", "none")]);
    }

    map
});

/// The default style for a tag (the absolute defaults for unknown tags).
#[must_use]
pub fn tag_default(tag: &str) -> &'static Style {
    TAG_DEFAULTS
        .get(tag.to_ascii_lowercase().as_str())
        .unwrap_or(&ABS_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_is_block() {
        let style = tag_default("div");
        let (value, _) = style.get("display").unwrap();
        assert!(matches!(value, StyleValue::Computed(v) if v.as_keyword() == Some("block")));
    }

    #[test]
    fn unknown_tag_gets_absolute_defaults() {
        let style = tag_default("blink");
        let (value, _) = style.get("color").unwrap();
        assert_eq!(value.as_raw(), Some("inherit"));
        let (value, _) = style.get("display").unwrap();
        // non-inherited: the initial value, left for computation
        assert_eq!(value.as_raw(), Some("inline"));
    }

    #[test]
    fn head_is_hidden() {
        let style = tag_default("head");
        let (value, _) = style.get("display").unwrap();
        assert!(matches!(value, StyleValue::Computed(v) if v.as_keyword() == Some("none")));
    }
}
