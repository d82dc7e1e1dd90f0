//! Stylesheet and inline-style parsing.
//!
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! Works over the spanned token stream: rule preludes and declaration
//! values are sliced straight out of the source text, so raw values reach
//! the acceptor layer with their functional notations intact and in source
//! order. On a syntactic error the parser emits a diagnostic and skips to
//! the next rule-level boundary (`;` inside a block, `}` ending a block).

use willow_common::warning::warn_once;

use crate::cssom::{MediaRule, Rule, SourceSheet, StyleRule};
use crate::media::MediaQuery;
use crate::selector::parse_selector;
use crate::style::{Style, is_custom, shorthand};
use crate::tokenizer::{CssToken, SpannedToken, tokenize};

/// Parse a whole style sheet.
///
/// Never fails; invalid rules and declarations are dropped with
/// diagnostics, valid ones survive.
#[must_use]
pub fn parse_sheet(source: &str) -> SourceSheet {
    let tokens = tokenize(source);
    let mut parser = SheetParser {
        source,
        tokens: &tokens,
        pos: 0,
    };
    SourceSheet {
        rules: parser.parse_rules(false),
    }
}

/// Parse an inline style string (the contents of a `style` attribute).
///
/// The simpler path: split on `;`, then on the first `:`, strip
/// `!important`, process shorthands.
#[must_use]
pub fn parse_inline_style(source: &str) -> Style {
    let source = source
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');
    let mut decls = Vec::new();
    for piece in crate::values::scan::split_top_level(source, ';') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let Some((name, value)) = piece.split_once(':') else {
            warn_once("CSS", &format!("invalid style declaration ({piece})"));
            continue;
        };
        let name = normalize_property_name(name.trim());
        let (value, important) = split_important(value);
        decls.push((name, value.to_string(), important));
    }
    shorthand::process(decls)
}

/// Property names are ASCII case-insensitive; custom properties are not.
fn normalize_property_name(name: &str) -> String {
    if is_custom(name) {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Strip a trailing `!important` (any case, any spacing) off a value.
fn split_important(value: &str) -> (&str, bool) {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(prefix_len) = lower.strip_suffix("important").map(str::len) {
        let before = trimmed[..prefix_len].trim_end();
        if let Some(stripped) = before.strip_suffix('!') {
            return (stripped.trim_end(), true);
        }
    }
    (trimmed, false)
}

struct SheetParser<'a> {
    source: &'a str,
    tokens: &'a [SpannedToken],
    pos: usize,
}

impl<'a> SheetParser<'a> {
    fn peek(&self) -> Option<&'a CssToken> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn bump(&mut self) -> Option<&'a SpannedToken> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(CssToken::Whitespace)) {
            self.pos += 1;
        }
    }

    /// Byte offset of the current token's start (or end of source).
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.start)
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ///
    /// When `in_block`, stops before the enclosing `}`.
    fn parse_rules(&mut self, in_block: bool) -> Vec<Rule> {
        let mut rules = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return rules,
                Some(CssToken::RightBrace) if in_block => return rules,
                Some(CssToken::RightBrace) => {
                    // stray '}' at top level: parse error, skip it
                    warn_once("CSS", "unexpected '}' at top level");
                    let _ = self.bump();
                }
                // "<CDO-token> / <CDC-token>: do nothing" (top level)
                Some(CssToken::Cdo | CssToken::Cdc) => {
                    let _ = self.bump();
                }
                Some(CssToken::AtKeyword(_)) => {
                    if let Some(rule) = self.parse_at_rule() {
                        rules.push(rule);
                    }
                }
                Some(_) => rules.extend(self.parse_style_rules()),
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn parse_at_rule(&mut self) -> Option<Rule> {
        let Some(SpannedToken {
            token: CssToken::AtKeyword(name),
            ..
        }) = self.bump()
        else {
            return None;
        };
        let name = name.clone();
        let prelude_start = self.offset();
        // scan the prelude: up to ';' (statement form) or '{' (block form)
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => {
                    warn_once("CSS", &format!("unterminated @{name} rule"));
                    return None;
                }
                Some(CssToken::Semicolon) if depth == 0 => {
                    let prelude = self.source[prelude_start..self.offset()].trim().to_string();
                    let _ = self.bump();
                    return self.finish_statement_at_rule(&name, &prelude);
                }
                Some(CssToken::LeftBrace) if depth == 0 => {
                    let prelude = self.source[prelude_start..self.offset()].trim().to_string();
                    let _ = self.bump();
                    return self.finish_block_at_rule(&name, &prelude);
                }
                Some(t) if t.opens_block() => {
                    depth += 1;
                    let _ = self.bump();
                }
                Some(t) if t.closes_block() => {
                    depth = depth.saturating_sub(1);
                    let _ = self.bump();
                }
                Some(_) => {
                    let _ = self.bump();
                }
            }
        }
    }

    fn finish_statement_at_rule(&mut self, name: &str, prelude: &str) -> Option<Rule> {
        match name {
            "import" => Some(Rule::Import(import_url(prelude))),
            other => {
                warn_once("CSS", &format!("unsupported at-rule @{other} dropped"));
                None
            }
        }
    }

    fn finish_block_at_rule(&mut self, name: &str, prelude: &str) -> Option<Rule> {
        match name {
            "media" => {
                let query = MediaQuery::parse(prelude);
                let content = SourceSheet {
                    rules: self.parse_rules(true),
                };
                self.expect_right_brace();
                match query {
                    Some(query) => Some(Rule::Media(MediaRule { query, content })),
                    None => {
                        warn_once("CSS", &format!("invalid media query '{prelude}' dropped"));
                        None
                    }
                }
            }
            "page" => {
                self.skip_block();
                Some(Rule::Page)
            }
            other => {
                warn_once("CSS", &format!("unsupported at-rule @{other} dropped"));
                self.skip_block();
                None
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    ///
    /// A comma-separated selector list produces one rule per branch (they
    /// share the declaration block but carry their own specificity
    /// through the cascade); a branch that fails to parse drops alone.
    fn parse_style_rules(&mut self) -> Vec<Rule> {
        let prelude_start = self.offset();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => {
                    // "This is a parse error. Return nothing."
                    let prelude = self.source[prelude_start..].trim();
                    if !prelude.is_empty() {
                        warn_once("CSS", &format!("rule without a block dropped ({prelude})"));
                    }
                    self.pos = self.tokens.len();
                    return Vec::new();
                }
                Some(CssToken::LeftBrace) if depth == 0 => break,
                Some(t) if t.opens_block() => {
                    depth += 1;
                    let _ = self.bump();
                }
                Some(t) if t.closes_block() => {
                    depth = depth.saturating_sub(1);
                    let _ = self.bump();
                }
                Some(_) => {
                    let _ = self.bump();
                }
            }
        }
        let selector_text = self.source[prelude_start..self.offset()].trim().to_string();
        let _ = self.bump(); // '{'
        let decls = self.parse_declarations();
        self.expect_right_brace();

        let style = shorthand::process(decls);
        let mut rules = Vec::new();
        for branch in crate::selector::split_top_level_commas(&selector_text) {
            match parse_selector(branch) {
                Ok(selector) => {
                    let specificity = selector.specificity();
                    rules.push(Rule::Style(StyleRule {
                        selector,
                        specificity,
                        style: style.clone(),
                    }));
                }
                Err(err) => warn_once("CSS", &format!("{err}; selector branch dropped")),
            }
        }
        rules
    }

    /// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    ///
    /// Consumes declarations until the enclosing `}`. Each syntactically
    /// broken declaration skips to the next `;` at this nesting level and
    /// leaves the rest of the block intact.
    fn parse_declarations(&mut self) -> Vec<(String, String, bool)> {
        let mut decls = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(CssToken::RightBrace) => return decls,
                Some(CssToken::Semicolon) => {
                    let _ = self.bump();
                }
                Some(CssToken::Ident(_)) => {
                    let Some(SpannedToken {
                        token: CssToken::Ident(name),
                        ..
                    }) = self.bump()
                    else {
                        unreachable!("peeked an ident");
                    };
                    let name = normalize_property_name(name);
                    self.skip_whitespace();
                    if self.peek() == Some(&CssToken::Colon) {
                        let _ = self.bump();
                        let value_start = self.offset();
                        let value_end = self.skip_component_values();
                        let raw = self.source[value_start..value_end].trim();
                        let (value, important) = split_important(raw);
                        if value.is_empty() {
                            warn_once("CSS", &format!("declaration '{name}' has no value"));
                        } else {
                            decls.push((name, value.to_string(), important));
                        }
                    } else {
                        warn_once("CSS", &format!("expected ':' after '{name}'"));
                        let _ = self.skip_component_values();
                    }
                }
                Some(other) => {
                    warn_once("CSS", &format!("unexpected token in declaration block: {other:?}"));
                    let _ = self.skip_component_values();
                }
            }
        }
    }

    /// Skip to the next top-level `;` or the enclosing `}`; returns the
    /// byte offset just past the last value token.
    fn skip_component_values(&mut self) -> usize {
        let mut depth = 0usize;
        let mut end = self.offset();
        loop {
            match self.peek() {
                None => return end,
                Some(CssToken::Semicolon) if depth == 0 => {
                    let _ = self.bump();
                    return end;
                }
                Some(CssToken::RightBrace) if depth == 0 => return end,
                Some(t) => {
                    if t.opens_block() {
                        depth += 1;
                    } else if t.closes_block() {
                        depth = depth.saturating_sub(1);
                    }
                    let spanned = self.bump().expect("peeked a token");
                    end = spanned.end;
                }
            }
        }
    }

    fn expect_right_brace(&mut self) {
        self.skip_whitespace();
        if matches!(self.peek(), Some(CssToken::RightBrace)) {
            let _ = self.bump();
        }
    }

    /// Skip a whole `{...}` block body (the `{` is already consumed).
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump().map(|t| &t.token) {
                None => return,
                Some(CssToken::LeftBrace) => depth += 1,
                Some(CssToken::RightBrace) => depth -= 1,
                Some(_) => {}
            }
        }
    }
}

/// Extract the URL from an `@import` prelude: `url(...)`, `url("...")`,
/// or a bare string.
fn import_url(prelude: &str) -> String {
    use crate::values::scan;
    let prelude = prelude.trim();
    if let Some(args) = scan::css_func(prelude, "url", false) {
        return scan::remove_quotes(args[0].trim()).to_string();
    }
    scan::remove_quotes(prelude).to_string()
}
