//! Media queries.
//!
//! [Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/)
//!
//! Supported surface: viewport dimension features
//! (`(min-width: 600px)`, `(max-height: 400px)`, `(width: 900px)`),
//! composable with `and`, comma (= or), and `not`, plus the `all`/`screen`/
//! `print` media types. Values must be in `px`.

use serde::Serialize;

use crate::values::scan;

/// The viewport dimensions a query is evaluated against.
pub type MediaValue = (f32, f32);

/// Which viewport dimension a feature tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    /// Viewport width.
    Width,
    /// Viewport height.
    Height,
}

/// The comparison carried by a dimension feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    /// `min-*`: viewport value must be at least the feature value.
    Min,
    /// `max-*`: viewport value must be at most the feature value.
    Max,
    /// The bare feature: exact match.
    Exact,
}

/// A parsed media query tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MediaQuery {
    /// All sub-clauses must match (`and`).
    All(Vec<MediaQuery>),
    /// Any sub-clause may match (comma).
    AnyOf(Vec<MediaQuery>),
    /// Negation (`not`).
    Not(Box<MediaQuery>),
    /// A viewport dimension comparison.
    Feature {
        /// Width or height.
        dim: Dimension,
        /// min-/max-/exact.
        cmp: Comparison,
        /// The reference value in px.
        value: f32,
    },
    /// A media type that always matches (`all`, `screen`).
    Always,
    /// A media type that never matches here (`print`).
    Never,
}

impl MediaQuery {
    /// Evaluate the query against a viewport.
    #[must_use]
    pub fn matches(&self, media: MediaValue) -> bool {
        match self {
            Self::All(subs) => subs.iter().all(|q| q.matches(media)),
            Self::AnyOf(subs) => subs.iter().any(|q| q.matches(media)),
            Self::Not(sub) => !sub.matches(media),
            Self::Feature { dim, cmp, value } => {
                let actual = match dim {
                    Dimension::Width => media.0,
                    Dimension::Height => media.1,
                };
                match cmp {
                    Comparison::Min => actual >= *value,
                    Comparison::Max => actual <= *value,
                    Comparison::Exact => (actual - *value).abs() < 0.5,
                }
            }
            Self::Always => true,
            Self::Never => false,
        }
    }

    /// Parse an `@media` prelude.
    ///
    /// Returns `None` when the prelude is not in the supported grammar;
    /// the caller drops the whole block with a diagnostic.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let branches = scan::split_top_level(text, ',');
        if branches.len() > 1 {
            let parsed: Option<Vec<Self>> = branches.iter().map(|b| Self::parse(b)).collect();
            return Some(Self::AnyOf(parsed?));
        }
        parse_and_clause(text)
    }
}

/// `clause ("and" clause)*`
fn parse_and_clause(text: &str) -> Option<MediaQuery> {
    let parts = split_on_and(text.trim());
    if parts.len() > 1 {
        let parsed: Option<Vec<MediaQuery>> =
            parts.iter().map(|p| parse_atom(p.trim())).collect();
        return Some(MediaQuery::All(parsed?));
    }
    parse_atom(text.trim())
}

fn parse_atom(text: &str) -> Option<MediaQuery> {
    if let Some(rest) = text.strip_prefix("not ").or_else(|| text.strip_prefix("not(")) {
        // put the paren back for the `not(...)` spelling
        let inner = if text.as_bytes()[3] == b'(' {
            format!("({rest}")
        } else {
            rest.to_string()
        };
        return Some(MediaQuery::Not(Box::new(parse_and_clause(&inner)?)));
    }
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        // either a feature or a nested clause
        if inner.contains(" and ") || inner.contains(',') || inner.starts_with("not") {
            return MediaQuery::parse(inner);
        }
        return parse_feature(inner);
    }
    match text {
        "all" | "screen" => Some(MediaQuery::Always),
        "print" => Some(MediaQuery::Never),
        _ => None,
    }
}

/// `(feature: value)` with the parens already stripped.
fn parse_feature(inner: &str) -> Option<MediaQuery> {
    let (name, value) = inner.split_once(':')?;
    let (cmp, dim_name) = match name.trim() {
        n if n.starts_with("min-") => (Comparison::Min, &n[4..]),
        n if n.starts_with("max-") => (Comparison::Max, &n[4..]),
        n => (Comparison::Exact, n),
    };
    let dim = match dim_name {
        "width" => Dimension::Width,
        "height" => Dimension::Height,
        _ => return None,
    };
    let (num, unit) = scan::split_units(value.trim())?;
    if unit != "px" {
        return None;
    }
    Some(MediaQuery::Feature {
        dim,
        cmp,
        value: num,
    })
}

/// Split on the word `and` at paren depth zero.
fn split_on_and(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'a' if depth == 0
                && text[i..].starts_with("and")
                && text[..i].ends_with(|c: char| c.is_ascii_whitespace() || c == ')')
                && text[i + 3..].starts_with(|c: char| c.is_ascii_whitespace() || c == '(') =>
            {
                parts.push(&text[start..i]);
                start = i + 3;
                i += 3;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_width() {
        let q = MediaQuery::parse("(min-width: 600px)").unwrap();
        assert!(q.matches((800.0, 600.0)));
        assert!(!q.matches((500.0, 600.0)));
    }

    #[test]
    fn and_composition() {
        let q = MediaQuery::parse("(min-width: 600px) and (max-width: 900px)").unwrap();
        assert!(q.matches((700.0, 0.0)));
        assert!(!q.matches((1000.0, 0.0)));
        assert!(!q.matches((500.0, 0.0)));
    }

    #[test]
    fn comma_is_or() {
        let q = MediaQuery::parse("(max-width: 400px), (min-width: 900px)").unwrap();
        assert!(q.matches((300.0, 0.0)));
        assert!(q.matches((1000.0, 0.0)));
        assert!(!q.matches((600.0, 0.0)));
    }

    #[test]
    fn negation() {
        let q = MediaQuery::parse("not (min-width: 600px)").unwrap();
        assert!(q.matches((500.0, 0.0)));
        assert!(!q.matches((700.0, 0.0)));
    }

    #[test]
    fn screen_and_feature() {
        let q = MediaQuery::parse("screen and (min-height: 100px)").unwrap();
        assert!(q.matches((0.0, 200.0)));
        assert!(!q.matches((0.0, 50.0)));
    }

    #[test]
    fn unsupported_is_none() {
        assert!(MediaQuery::parse("(orientation: landscape)").is_none());
        assert!(MediaQuery::parse("(min-width: 10em)").is_none());
    }
}
