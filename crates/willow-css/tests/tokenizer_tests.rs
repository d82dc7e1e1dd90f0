//! Tokenizer tests: token kinds, spans, comments, and recovery inputs.

use willow_css::tokenizer::{CssToken, tokenize};

fn kinds(source: &str) -> Vec<CssToken> {
    tokenize(source)
        .into_iter()
        .map(|t| t.token)
        .filter(|t| *t != CssToken::Whitespace)
        .collect()
}

#[test]
fn test_simple_rule() {
    let tokens = kinds("p { color: red; }");
    assert_eq!(
        tokens,
        vec![
            CssToken::Ident("p".to_string()),
            CssToken::LeftBrace,
            CssToken::Ident("color".to_string()),
            CssToken::Colon,
            CssToken::Ident("red".to_string()),
            CssToken::Semicolon,
            CssToken::RightBrace,
        ]
    );
}

#[test]
fn test_numbers_and_dimensions() {
    let tokens = kinds("10 1.5px 50% -3e2");
    assert_eq!(
        tokens,
        vec![
            CssToken::Number(10.0),
            CssToken::Dimension {
                value: 1.5,
                unit: "px".to_string()
            },
            CssToken::Percentage(50.0),
            CssToken::Number(-300.0),
        ]
    );
}

#[test]
fn test_comments_are_discarded() {
    let tokens = kinds("/* note */ p /* x */ {}");
    assert_eq!(
        tokens,
        vec![
            CssToken::Ident("p".to_string()),
            CssToken::LeftBrace,
            CssToken::RightBrace,
        ]
    );
}

#[test]
fn test_hash_tokens() {
    // a hash starting with an ident code point carries the id flag; a
    // digit-leading hex color does not
    let tokens = kinds("#main #2563eb");
    assert_eq!(
        tokens,
        vec![
            CssToken::Hash {
                value: "main".to_string(),
                is_id: true
            },
            CssToken::Hash {
                value: "2563eb".to_string(),
                is_id: false
            },
        ]
    );
}

#[test]
fn test_at_keyword_and_function() {
    let tokens = kinds("@media calc(1px)");
    assert_eq!(
        tokens,
        vec![
            CssToken::AtKeyword("media".to_string()),
            CssToken::Function("calc".to_string()),
            CssToken::Dimension {
                value: 1.0,
                unit: "px".to_string()
            },
            CssToken::RightParen,
        ]
    );
}

#[test]
fn test_url_forms() {
    let tokens = kinds("url(plain.png) url(\"quoted.png\")");
    assert_eq!(tokens[0], CssToken::Url("plain.png".to_string()));
    // a quoted url stays a function with a string inside
    assert_eq!(tokens[1], CssToken::Function("url".to_string()));
    assert_eq!(tokens[2], CssToken::String("quoted.png".to_string()));
}

#[test]
fn test_custom_property_ident() {
    let tokens = kinds("--main-color: red");
    assert_eq!(tokens[0], CssToken::Ident("--main-color".to_string()));
}

#[test]
fn test_strings_and_escapes() {
    let tokens = kinds("\"hello\" '\\41'");
    assert_eq!(tokens[0], CssToken::String("hello".to_string()));
    assert_eq!(tokens[1], CssToken::String("A".to_string()));
}

#[test]
fn test_bad_string_on_newline() {
    let tokens = kinds("\"broken\nrest");
    assert_eq!(tokens[0], CssToken::BadString);
}

#[test]
fn test_spans_slice_the_source() {
    let source = "margin: calc(100% - 30px);";
    let tokens = tokenize(source);
    let calc = tokens
        .iter()
        .find(|t| matches!(t.token, CssToken::Function(_)))
        .unwrap();
    assert_eq!(&source[calc.start..calc.end], "calc(");
    let last_value_token = tokens
        .iter()
        .rfind(|t| matches!(t.token, CssToken::RightParen))
        .unwrap();
    // slicing from the function start to the paren end recovers the
    // functional notation intact
    assert_eq!(&source[calc.start..last_value_token.end], "calc(100% - 30px)");
}

#[test]
fn test_cdo_cdc() {
    let tokens = kinds("<!-- p {} -->");
    assert_eq!(tokens[0], CssToken::Cdo);
    assert_eq!(*tokens.last().unwrap(), CssToken::Cdc);
}
