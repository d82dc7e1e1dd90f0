//! CSS selector parsing and matching.
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!
//! A selector is a tree of [`Selector`] variants with an additive
//! [`Specificity`] and a pure `matches` test against an element in the
//! tree. Parsing runs right-to-left: repeatedly take a simple chunk off
//! the end of the string, then an optional combinator, recursing for the
//! left-hand side. A top-level comma produces [`Selector::Or`].
//!
//! Pseudo-classes resolve against the element's fixed state-bit set
//! (`:hover`, `:focus`, `:disabled`, ...); names outside that set parse
//! successfully but never match, so the rest of the rule survives.
//! `:not(...)` recurses into this parser.

use serde::Serialize;
use willow_dom::{DomTree, NodeId};

use crate::error::InvalidSelector;

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// "count the number of ID selectors (= A) ... class selectors, attribute
/// selectors, and pseudo-classes (= B) ... type selectors and
/// pseudo-elements (= C)". Compared lexicographically; composition sums
/// component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Component-wise sum.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// The value-comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum AttrOp {
    /// `[attr=value]` - exact match.
    #[strum(serialize = "=")]
    Exact,
    /// `[attr~=value]` - whitespace-separated word list contains the value.
    #[strum(serialize = "~=")]
    Includes,
    /// `[attr|=value]` - exactly the value, or the value followed by `-`.
    #[strum(serialize = "|=")]
    DashMatch,
    /// `[attr^=value]` - prefix match.
    #[strum(serialize = "^=")]
    Prefix,
    /// `[attr$=value]` - suffix match.
    #[strum(serialize = "$=")]
    Suffix,
    /// `[attr*=value]` - substring match.
    #[strum(serialize = "*=")]
    Substring,
}

impl AttrOp {
    /// Test an actual attribute value against the selector's value.
    #[must_use]
    pub fn test(self, wanted: &str, actual: &str) -> bool {
        match self {
            Self::Exact => wanted == actual,
            Self::Includes => actual.split_ascii_whitespace().any(|w| w == wanted),
            Self::DashMatch => {
                actual == wanted || actual.strip_prefix(wanted).is_some_and(|r| r.starts_with('-'))
            }
            Self::Prefix => actual.starts_with(wanted),
            Self::Suffix => actual.ends_with(wanted),
            Self::Substring => actual.contains(wanted),
        }
    }
}

/// A parsed CSS selector.
///
/// [§ 3 Selector syntax and structure](https://www.w3.org/TR/selectors-4/#structure)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Selector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors): `div`
    Tag(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors): `#main`
    Id(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html): `.active`
    Class(String),
    /// A state pseudo-class consulting the element's state bits: `:hover`.
    /// Names outside the supported bit set never match.
    State(String),
    /// `[attr]` - the attribute is present.
    HasAttr(String),
    /// `[attr <op> value]` - attribute value comparison.
    Attr(String, AttrOp, String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector): `*`
    Any,
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation): `:not(sel)`
    Not(Box<Selector>),
    /// A compound selector: all parts must match the same element.
    And(Vec<Selector>),
    /// A selector list (top-level comma): any branch may match.
    Or(Vec<Selector>),
    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators):
    /// `parent > child`
    DirectChild(Box<Selector>, Box<Selector>),
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators):
    /// `ancestor descendant`
    Descendant(Box<Selector>, Box<Selector>),
    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators):
    /// `prev + self`
    NextSibling(Box<Selector>, Box<Selector>),
    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators):
    /// `prev ~ self`
    SubsequentSibling(Box<Selector>, Box<Selector>),
}

impl Selector {
    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    ///
    /// Additive through composition; `:not()` adopts its argument's
    /// specificity. For a selector list the branch maximum is reported
    /// (each branch carries its own in the cascade, which splits lists
    /// into separate rules before sorting).
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        match self {
            Self::Id(_) => Specificity(1, 0, 0),
            Self::Class(_) | Self::State(_) | Self::HasAttr(_) | Self::Attr(..) => {
                Specificity(0, 1, 0)
            }
            Self::Tag(_) => Specificity(0, 0, 1),
            Self::Any => Specificity(0, 0, 0),
            Self::Not(inner) => inner.specificity(),
            Self::And(parts) => parts
                .iter()
                .fold(Specificity::default(), |acc, s| acc.add(s.specificity())),
            Self::Or(parts) => parts
                .iter()
                .map(Self::specificity)
                .max()
                .unwrap_or_default(),
            Self::DirectChild(a, b)
            | Self::Descendant(a, b)
            | Self::NextSibling(a, b)
            | Self::SubsequentSibling(a, b) => a.specificity().add(b.specificity()),
        }
    }

    /// [§ 2 Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Test this selector against an element. Pure: no side effects, so
    /// results are cacheable while the element's attributes and states are
    /// unchanged. Non-element nodes never match.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(data) = tree.as_element(id) else {
            return false;
        };
        match self {
            Self::Tag(tag) => data.tag_name.eq_ignore_ascii_case(tag),
            Self::Id(wanted) => data.id() == Some(wanted.as_str()),
            Self::Class(class) => data.has_class(class),
            Self::State(name) => data.state_bit(name).unwrap_or(false),
            Self::HasAttr(name) => data.attr(name).is_some(),
            Self::Attr(name, op, value) => {
                data.attr(name).is_some_and(|actual| op.test(value, actual))
            }
            Self::Any => true,
            Self::Not(inner) => !inner.matches(tree, id),
            Self::And(parts) => parts.iter().all(|s| s.matches(tree, id)),
            Self::Or(parts) => parts.iter().any(|s| s.matches(tree, id)),
            Self::DirectChild(parent_sel, child_sel) => {
                child_sel.matches(tree, id)
                    && tree
                        .parent(id)
                        .is_some_and(|parent| parent_sel.matches(tree, parent))
            }
            Self::Descendant(ancestor_sel, desc_sel) => {
                desc_sel.matches(tree, id)
                    && tree.ancestors(id).any(|anc| ancestor_sel.matches(tree, anc))
            }
            Self::NextSibling(prev_sel, self_sel) => {
                self_sel.matches(tree, id)
                    && tree
                        .preceding_siblings(id)
                        .find(|&sib| tree.as_element(sib).is_some())
                        .is_some_and(|prev| prev_sel.matches(tree, prev))
            }
            Self::SubsequentSibling(prev_sel, self_sel) => {
                self_sel.matches(tree, id)
                    && tree
                        .preceding_siblings(id)
                        .any(|sib| prev_sel.matches(tree, sib))
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag(t) => write!(f, "{t}"),
            Self::Id(i) => write!(f, "#{i}"),
            Self::Class(c) => write!(f, ".{c}"),
            Self::State(s) => write!(f, ":{s}"),
            Self::HasAttr(a) => write!(f, "[{a}]"),
            Self::Attr(name, op, value) => write!(f, "[{name}{op}\"{value}\"]"),
            Self::Any => write!(f, "*"),
            Self::Not(inner) => write!(f, ":not({inner})"),
            Self::And(parts) => {
                for part in parts {
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Self::Or(parts) => {
                let rendered: Vec<String> = parts.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join(", "))
            }
            Self::DirectChild(a, b) => write!(f, "{a} > {b}"),
            Self::Descendant(a, b) => write!(f, "{a} {b}"),
            Self::NextSibling(a, b) => write!(f, "{a} + {b}"),
            Self::SubsequentSibling(a, b) => write!(f, "{a} ~ {b}"),
        }
    }
}

/// Parse a selector string.
///
/// [§ 19 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
///
/// # Errors
///
/// Returns [`InvalidSelector`] with the offending substring when the text
/// cannot be parsed.
pub fn parse_selector(text: &str) -> Result<Selector, InvalidSelector> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InvalidSelector("empty selector".to_string()));
    }
    let branches = split_top_level_commas(text);
    if branches.len() > 1 {
        let parsed: Result<Vec<Selector>, InvalidSelector> =
            branches.iter().map(|b| parse_selector(b)).collect();
        return Ok(Selector::Or(parsed?));
    }
    parse_complex(text)
}

/// Parse one complex selector (no top-level commas), right-to-left.
fn parse_complex(text: &str) -> Result<Selector, InvalidSelector> {
    let mut rest = text.trim_end();
    let mut chunks: Vec<&str> = Vec::new();
    loop {
        let (remaining, chunk) =
            take_simple_chunk(rest).ok_or_else(|| InvalidSelector(rest.to_string()))?;
        chunks.insert(0, chunk);
        if remaining.trim().is_empty() {
            return proc_chunks(&chunks);
        }
        match take_combinator(remaining) {
            Some((left_text, comb)) => {
                if left_text.trim().is_empty() {
                    return Err(InvalidSelector(format!(
                        "combinator '{comb}' is not surrounded by selectors in '{text}'"
                    )));
                }
                let right = proc_chunks(&chunks)?;
                let left = parse_complex(left_text)?;
                return Ok(match comb {
                    '>' => Selector::DirectChild(Box::new(left), Box::new(right)),
                    '+' => Selector::NextSibling(Box::new(left), Box::new(right)),
                    '~' => Selector::SubsequentSibling(Box::new(left), Box::new(right)),
                    _ => Selector::Descendant(Box::new(left), Box::new(right)),
                });
            }
            // no combinator: the compound continues directly to the left
            None => rest = remaining,
        }
    }
}

/// Take a combinator off the end: `>`/`+`/`~`, or pure whitespace (the
/// descendant combinator, reported as `' '`). `None` when the text ends
/// directly in more simple-selector text (a compound selector).
fn take_combinator(text: &str) -> Option<(&str, char)> {
    let trimmed = text.trim_end();
    if let Some(last) = trimmed.chars().next_back() {
        if matches!(last, '>' | '+' | '~') {
            return Some((&trimmed[..trimmed.len() - 1], last));
        }
    }
    if trimmed.len() < text.len() && !trimmed.is_empty() {
        return Some((trimmed, ' '));
    }
    None
}

/// Take one simple selector chunk off the end of the string.
///
/// Chunks: `*`, `#id`, `.class`, `:pseudo`, `:not(...)`, `[attr]`,
/// `[attr<op>value]`, `tag`.
fn take_simple_chunk(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_end();
    let last = text.chars().next_back()?;
    if last == ']' {
        let open = find_matching_open(text, '[', ']')?;
        return Some((&text[..open], &text[open..]));
    }
    if last == ')' {
        // a functional pseudo-class: scan to its '(' then back over ':name'
        let open = find_matching_open(text, '(', ')')?;
        let head = &text[..open];
        let ident_start = head
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_ident_char(c))
            .last()
            .map(|(i, _)| i)?;
        let mut name_start = ident_start;
        let before = &head[..ident_start];
        if before.ends_with("::") {
            name_start -= 2;
        } else if before.ends_with(':') {
            name_start -= 1;
        } else {
            return None;
        }
        return Some((&text[..name_start], &text[name_start..]));
    }
    if last == '*' {
        return Some((&text[..text.len() - 1], &text[text.len() - 1..]));
    }
    if !is_ident_char(last) {
        return None;
    }
    // scan back over the identifier, then an optional prefix sigil
    let ident_start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident_char(c))
        .last()
        .map(|(i, _)| i)?;
    let with_prefix = text[..ident_start]
        .chars()
        .next_back()
        .filter(|&c| matches!(c, '#' | '.' | ':'))
        .map_or(ident_start, |c| {
            let mut start = ident_start - c.len_utf8();
            // allow the '::' pseudo-element form
            if c == ':' && text[..start].ends_with(':') {
                start -= 1;
            }
            start
        });
    Some((&text[..with_prefix], &text[with_prefix..]))
}

/// Find the byte index of the `open` bracket matching the final `close`.
fn find_matching_open(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices().rev() {
        if c == close {
            depth += 1;
        } else if c == open {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Merge right-to-left collected chunks into one (compound) selector.
fn proc_chunks(chunks: &[&str]) -> Result<Selector, InvalidSelector> {
    let mut parts: Vec<Selector> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        parts.push(proc_single(chunk)?);
    }
    if parts.len() == 1 {
        Ok(parts.remove(0))
    } else {
        Ok(Selector::And(parts))
    }
}

/// Build a single simple selector from one chunk.
fn proc_single(chunk: &str) -> Result<Selector, InvalidSelector> {
    let invalid = || InvalidSelector(chunk.to_string());
    if chunk == "*" {
        return Ok(Selector::Any);
    }
    if let Some(id) = chunk.strip_prefix('#') {
        return Ok(Selector::Id(id.to_string()));
    }
    if let Some(class) = chunk.strip_prefix('.') {
        return Ok(Selector::Class(class.to_string()));
    }
    if chunk.starts_with('[') {
        return proc_attr(chunk).ok_or_else(invalid);
    }
    if let Some(pseudo) = chunk.strip_prefix(':') {
        // pseudo-elements (`::before`) take the same never-matching path
        // as unknown pseudo-classes
        let pseudo = pseudo.strip_prefix(':').unwrap_or(pseudo);
        if let Some(rest) = pseudo.strip_prefix("not(") {
            let inner = rest.strip_suffix(')').ok_or_else(invalid)?;
            return Ok(Selector::Not(Box::new(parse_selector(inner)?)));
        }
        if pseudo.is_empty() || !pseudo.chars().all(is_ident_char) {
            return Err(invalid());
        }
        return Ok(Selector::State(pseudo.to_ascii_lowercase()));
    }
    if chunk.chars().all(is_ident_char) && !chunk.is_empty() {
        return Ok(Selector::Tag(chunk.to_ascii_lowercase()));
    }
    Err(invalid())
}

/// Parse the inside of `[...]`.
fn proc_attr(chunk: &str) -> Option<Selector> {
    let inner = chunk.strip_prefix('[')?.strip_suffix(']')?.trim();
    // two-character operators first, then bare '='
    for (needle, op) in [
        ("~=", AttrOp::Includes),
        ("|=", AttrOp::DashMatch),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("*=", AttrOp::Substring),
        ("=", AttrOp::Exact),
    ] {
        if let Some((name, value)) = inner.split_once(needle) {
            let name = name.trim().to_ascii_lowercase();
            let value = crate::values::scan::remove_quotes(value.trim()).to_string();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return None;
            }
            return Some(Selector::Attr(name, op, value));
        }
    }
    if inner.is_empty() || !inner.chars().all(is_ident_char) {
        return None;
    }
    Some(Selector::HasAttr(inner.to_ascii_lowercase()))
}

/// Split on commas at bracket depth zero (the selector-list separator).
pub(crate) fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
