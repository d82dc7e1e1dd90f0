//! Small string scanners shared by the value acceptors.
//!
//! Acceptors consume raw declaration value strings (functional notations
//! intact), so they need a few primitives: top-level whitespace splitting
//! that respects parentheses and quotes, functional-notation unwrapping,
//! and dimension splitting.

/// Split a value on top-level whitespace.
///
/// Whitespace inside parentheses or quotes does not split, so
/// `calc(100% - 30px) auto` yields two chunks.
#[must_use]
pub fn split_value(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = None;
    for (i, c) in value.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_ascii_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

/// Unwrap a single expected functional notation: `name(args)`.
///
/// Returns the comma-separated argument chunks (trimmed), or the whole
/// inside as one chunk when `split_args` is false. `None` when the value is
/// not that function.
#[must_use]
pub fn css_func<'a>(value: &'a str, name: &str, split_args: bool) -> Option<Vec<&'a str>> {
    let rest = value.strip_prefix(name)?.strip_prefix('(')?;
    let inside = rest.strip_suffix(')')?;
    if split_args {
        Some(split_top_level(inside, ',').into_iter().map(str::trim).collect())
    } else {
        Some(vec![inside])
    }
}

/// Split on a separator at parenthesis depth zero.
#[must_use]
pub fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Split a dimension or percentage into its number and lowercased unit.
///
/// `"30px"` → `(30.0, "px")`, `"50%"` → `(50.0, "%")`. Returns `None` when
/// the text is not exactly `<number><unit>`.
#[must_use]
pub fn split_units(text: &str) -> Option<(f32, String)> {
    let unit_start = text
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit()
                || c == '.'
                || ((c == '+' || c == '-') && i == 0)
                || ((c == 'e' || c == 'E')
                    && text[i + 1..]
                        .chars()
                        .next()
                        .is_some_and(|n| n.is_ascii_digit() || n == '+' || n == '-')
                    && text[..i].chars().any(|p| p.is_ascii_digit())))
        })
        .map(|(i, _)| i)?;
    if unit_start == 0 {
        return None;
    }
    let num: f32 = text[..unit_start].parse().ok()?;
    let unit = &text[unit_start..];
    if unit.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
        return None;
    }
    Some((num, unit.to_ascii_lowercase()))
}

/// Parse a bare number (no unit).
#[must_use]
pub fn parse_number(text: &str) -> Option<f32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    // reject trailing garbage that f32::parse would also reject, but
    // accept the scanf-style forms (.5, 1., 2e3)
    text.parse().ok()
}

/// Strip one matching pair of single or double quotes.
#[must_use]
pub fn remove_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(stripped) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return stripped;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_value_respects_parens() {
        assert_eq!(
            split_value("calc(100% - 30px) auto 1px"),
            vec!["calc(100% - 30px)", "auto", "1px"]
        );
    }

    #[test]
    fn split_value_respects_quotes() {
        assert_eq!(
            split_value("url(\"a b.png\") none"),
            vec!["url(\"a b.png\")", "none"]
        );
    }

    #[test]
    fn css_func_unwraps_args() {
        assert_eq!(
            css_func("rgb(1, 2, 3)", "rgb", true),
            Some(vec!["1", "2", "3"])
        );
        assert_eq!(css_func("url(x.png)", "url", false), Some(vec!["x.png"]));
        assert_eq!(css_func("rgb(1,2,3)", "hsl", true), None);
    }

    #[test]
    fn split_units_basic() {
        assert_eq!(split_units("30px"), Some((30.0, "px".to_string())));
        assert_eq!(split_units("-1.5em"), Some((-1.5, "em".to_string())));
        assert_eq!(split_units("50%"), Some((50.0, "%".to_string())));
        assert_eq!(split_units("px"), None);
        assert_eq!(split_units("30"), None);
    }
}
