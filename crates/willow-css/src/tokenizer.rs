//! CSS tokenizer.
//!
//! [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)
//!
//! Follows the CSS Syntax Module Level 3 consume-a-token algorithm. Every
//! token carries its byte span in the source, so the parser can slice raw
//! declaration values (functional notations intact, source order preserved)
//! instead of re-serializing a component tree. Comments are discarded here.

/// A token with its byte range in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: CssToken,
    /// Byte offset of the token's first character.
    pub start: usize,
    /// Byte offset one past the token's last character.
    pub end: usize,
}

/// [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)
///
/// The token vocabulary. Numeric tokens carry their numeric value; string
/// and ident tokens carry their (unescaped) text.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    /// `<ident-token>`
    Ident(String),
    /// `<function-token>` - an ident immediately followed by `(`.
    Function(String),
    /// `<at-keyword-token>` - `@` followed by an ident (value without `@`).
    AtKeyword(String),
    /// `<hash-token>` - `#` followed by ident characters.
    Hash {
        /// The text after `#`.
        value: String,
        /// Whether the hash would be a valid identifier (`id` type flag).
        is_id: bool,
    },
    /// `<string-token>`
    String(String),
    /// `<bad-string-token>` - an unterminated string hit a newline.
    BadString,
    /// `<url-token>` - the unquoted `url(...)` form.
    Url(String),
    /// `<bad-url-token>`
    BadUrl,
    /// `<number-token>`
    Number(f32),
    /// `<percentage-token>`
    Percentage(f32),
    /// `<dimension-token>`
    Dimension {
        /// The numeric value.
        value: f32,
        /// The unit identifier, as written.
        unit: String,
    },
    /// `<whitespace-token>` (a run of whitespace collapses to one token)
    Whitespace,
    /// `<CDO-token>` (`<!--`)
    Cdo,
    /// `<CDC-token>` (`-->`)
    Cdc,
    /// `<colon-token>`
    Colon,
    /// `<semicolon-token>`
    Semicolon,
    /// `<comma-token>`
    Comma,
    /// `<[-token>`
    LeftBracket,
    /// `<]-token>`
    RightBracket,
    /// `<(-token>`
    LeftParen,
    /// `<)-token>`
    RightParen,
    /// `<{-token>`
    LeftBrace,
    /// `<}-token>`
    RightBrace,
    /// `<delim-token>`
    Delim(char),
}

impl CssToken {
    /// Whether this token opens a nested construct (`(`, `[`, `{`, or a
    /// function).
    #[must_use]
    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            Self::Function(_) | Self::LeftParen | Self::LeftBracket | Self::LeftBrace
        )
    }

    /// Whether this token closes a nested construct.
    #[must_use]
    pub fn closes_block(&self) -> bool {
        matches!(self, Self::RightParen | Self::RightBracket | Self::RightBrace)
    }
}

/// Tokenize a style sheet.
///
/// Never fails: per the spec, malformed input produces `BadString`/`BadUrl`
/// or delim tokens and the parser's error recovery takes it from there.
#[must_use]
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    let mut t = Tokenizer::new(source);
    let mut out = Vec::new();
    loop {
        let start = t.byte_pos();
        let Some(token) = t.consume_token() else {
            break;
        };
        out.push(SpannedToken {
            token,
            start,
            end: t.byte_pos(),
        });
    }
    out
}

struct Tokenizer<'a> {
    source: &'a str,
    /// (byte offset, char) pairs; `pos` indexes into this.
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
        }
    }

    fn byte_pos(&self) -> usize {
        self.chars.get(self.pos).map_or(self.source.len(), |&(b, _)| b)
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).map(|&(_, c)| c);
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn reconsume(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|&(_, c)| c)
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// Returns `None` at end of input (the EOF token is implicit).
    fn consume_token(&mut self) -> Option<CssToken> {
        // "Consume comments."
        self.consume_comments();

        let c = self.consume()?;
        Some(match c {
            // "Consume as much whitespace as possible."
            c if is_whitespace(c) => {
                self.consume_whitespace();
                CssToken::Whitespace
            }

            '"' | '\'' => self.consume_string_token(c),

            '#' => {
                // "If the next input code point is an ident code point or
                // the next two are a valid escape, create a <hash-token>."
                if self.peek().is_some_and(is_ident_code_point)
                    || self.is_valid_escape(self.peek(), self.peek_at(1))
                {
                    let is_id = self.would_start_ident_sequence();
                    let value = self.consume_ident_sequence();
                    CssToken::Hash { value, is_id }
                } else {
                    CssToken::Delim('#')
                }
            }

            '(' => CssToken::LeftParen,
            ')' => CssToken::RightParen,

            '+' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    CssToken::Delim('+')
                }
            }

            ',' => CssToken::Comma,

            '-' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    self.pos += 2;
                    CssToken::Cdc
                } else if self.peek().is_some_and(is_ident_start_code_point)
                    || self.peek() == Some('-')
                    || self.is_valid_escape(self.peek(), self.peek_at(1))
                {
                    // an ident sequence starting with `-` (including the
                    // `--custom-property` form)
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    CssToken::Delim('-')
                }
            }

            '.' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    CssToken::Delim('.')
                }
            }

            ':' => CssToken::Colon,
            ';' => CssToken::Semicolon,

            '<' => {
                // "If the next 3 input code points are U+0021 U+002D U+002D
                // (!--), consume them and return a <CDO-token>."
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    self.pos += 3;
                    CssToken::Cdo
                } else {
                    CssToken::Delim('<')
                }
            }

            '@' => {
                if self.would_start_ident_sequence() {
                    CssToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CssToken::Delim('@')
                }
            }

            '[' => CssToken::LeftBracket,

            '\\' => {
                if self.is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    // "This is a parse error."
                    CssToken::Delim('\\')
                }
            }

            ']' => CssToken::RightBracket,
            '{' => CssToken::LeftBrace,
            '}' => CssToken::RightBrace,

            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            c => CssToken::Delim(c),
        })
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.pos += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending: char) -> CssToken {
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(c) if c == ending => return CssToken::String(value),
                None => return CssToken::String(value),
                Some('\n') => {
                    // "This is a parse error."
                    self.reconsume();
                    return CssToken::BadString;
                }
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => {
                        self.pos += 1;
                    }
                    Some(_) => {
                        if let Some(c) = self.consume_escaped_code_point() {
                            value.push(c);
                        }
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> CssToken {
        let value = self.consume_number();
        if self.would_start_ident_sequence() {
            let unit = self.consume_ident_sequence();
            CssToken::Dimension { value, unit }
        } else if self.peek() == Some('%') {
            self.pos += 1;
            CssToken::Percentage(value)
        } else {
            CssToken::Number(value)
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> CssToken {
        let string = self.consume_ident_sequence();

        if string.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            self.pos += 1;
            self.consume_whitespace();
            // A quoted url stays a function; the parser reads the string.
            match self.peek() {
                Some('"' | '\'') => CssToken::Function(string),
                _ => self.consume_url_token(),
            }
        } else if self.peek() == Some('(') {
            self.pos += 1;
            CssToken::Function(string)
        } else {
            CssToken::Ident(string)
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> CssToken {
        let mut value = String::new();
        self.consume_whitespace();
        loop {
            match self.consume() {
                Some(')') | None => return CssToken::Url(value),
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    match self.peek() {
                        Some(')') => {
                            self.pos += 1;
                            return CssToken::Url(value);
                        }
                        None => return CssToken::Url(value),
                        _ => {
                            self.consume_bad_url_remnants();
                            return CssToken::BadUrl;
                        }
                    }
                }
                Some('"' | '\'' | '(') => {
                    // "This is a parse error."
                    self.consume_bad_url_remnants();
                    return CssToken::BadUrl;
                }
                Some('\\') => {
                    if self.is_valid_escape(Some('\\'), self.peek()) {
                        if let Some(c) = self.consume_escaped_code_point() {
                            value.push(c);
                        }
                    } else {
                        self.consume_bad_url_remnants();
                        return CssToken::BadUrl;
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') => {
                    if self.is_valid_escape(Some('\\'), self.peek()) {
                        let _ = self.consume_escaped_code_point();
                    }
                }
                _ => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if self.is_valid_escape(Some('\\'), self.peek()) => {
                    if let Some(c) = self.consume_escaped_code_point() {
                        result.push(c);
                    }
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.13 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> f32 {
        let mut repr = String::new();
        if matches!(self.peek(), Some('+' | '-')) {
            repr.extend(self.consume());
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            repr.extend(self.consume());
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.extend(self.consume());
            repr.extend(self.consume());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                repr.extend(self.consume());
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let next = self.peek_at(1);
            let has_sign = matches!(next, Some('+' | '-'));
            let digit_pos = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_pos).is_some_and(|c| c.is_ascii_digit()) {
                repr.extend(self.consume());
                if has_sign {
                    repr.extend(self.consume());
                }
                repr.extend(self.consume());
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    repr.extend(self.consume());
                }
            }
        }
        repr.parse().unwrap_or(0.0)
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> Option<char> {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                for _ in 0..5 {
                    if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        hex.extend(self.consume());
                    } else {
                        break;
                    }
                }
                if self.peek().is_some_and(is_whitespace) {
                    self.pos += 1;
                }
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                // Zero, surrogates, and out-of-range map to U+FFFD.
                if code_point == 0
                    || (0xD800..=0xDFFF).contains(&code_point)
                    || code_point > 0x0010_FFFF
                {
                    Some('\u{FFFD}')
                } else {
                    char::from_u32(code_point)
                }
            }
            // "EOF: This is a parse error."
            None => Some('\u{FFFD}'),
            Some(c) => Some(c),
        }
    }

    /// [§ 4.3.8 Valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_valid_escape(&self, first: Option<char>, second: Option<char>) -> bool {
        first == Some('\\') && second != Some('\n')
    }

    /// [§ 4.3.9 Would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    ///
    /// Looks at the next three unconsumed code points.
    fn would_start_ident_sequence(&self) -> bool {
        match self.peek() {
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(is_ident_start_code_point)
                    || second == Some('-')
                    || self.is_valid_escape(second, self.peek_at(2))
            }
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => self.is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// [§ 4.3.10 Would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self) -> bool {
        match self.peek() {
            Some('+' | '-') => {
                let second = self.peek_at(1);
                if second.is_some_and(|c| c.is_ascii_digit()) {
                    return true;
                }
                second == Some('.') && self.peek_at(2).is_some_and(|c| c.is_ascii_digit())
            }
            Some('.') => self.peek_at(1).is_some_and(|c| c.is_ascii_digit()),
            Some(c) if c.is_ascii_digit() => true,
            _ => false,
        }
    }
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}
