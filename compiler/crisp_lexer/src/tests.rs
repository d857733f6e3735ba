#![allow(clippy::unwrap_used)]

use super::*;
use crisp_ir::{NumberParts, TimeUnit};
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).unwrap().tokens.kinds()
}

fn word(s: &str) -> TokenKind {
    TokenKind::Word(s.to_string())
}

fn number(mantissa: &str, power: Option<u32>, time_unit: Option<TimeUnit>) -> TokenKind {
    TokenKind::Number(NumberParts {
        mantissa: mantissa.to_string(),
        power,
        time_unit,
    })
}

#[test]
fn test_lex_command_line() {
    assert_eq!(
        kinds("set $x 5e18\n"),
        vec![
            word("set"),
            TokenKind::Variable("$x".to_string()),
            number("5", Some(18), None),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_number_suffixes() {
    assert_eq!(
        kinds("1.2e18mo 30d 5m 1.5"),
        vec![
            number("1.2", Some(18), Some(TimeUnit::Month)),
            number("30", None, Some(TimeUnit::Day)),
            number("5", None, Some(TimeUnit::Minute)),
            number("1.5", None, None),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_hex_literal_needs_boundary() {
    let glued = format!("0x{}01zz", "0".repeat(38));
    let out = lex(&format!("exec {glued} foo")).unwrap();
    assert_eq!(
        out.tokens.kinds(),
        vec![word("exec"), TokenKind::Error, word("foo"), TokenKind::Eof]
    );
    assert_eq!(out.errors.len(), 1);
    assert_eq!(
        out.errors[0].kind,
        LexErrorKind::InvalidHexLiteral { literal: glued }
    );
    assert_eq!(out.errors[0].code(), crisp_diagnostic::ErrorCode::E0001);

    // Delimiters still end a literal.
    let addr = format!("0x{}", "ab".repeat(20));
    assert!(!lex(&format!("({addr}, {addr})")).unwrap().has_errors());
}

#[test]
fn test_lex_address_vs_bytes() {
    let addr = format!("0x{}", "ab".repeat(20));
    let long = format!("0x{}", "a".repeat(41));
    assert_eq!(
        kinds(&format!("{addr} {long} 0x1234")),
        vec![
            TokenKind::Address(addr.clone()),
            TokenKind::Bytes(long.clone()),
            TokenKind::Bytes("0x1234".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_words_helpers_options() {
    assert_eq!(
        kinds("ar:connect token-manager:0 @token.balance(x) --value"),
        vec![
            word("ar:connect"),
            word("token-manager:0"),
            TokenKind::Helper("token.balance".to_string()),
            TokenKind::LParen,
            word("x"),
            TokenKind::RParen,
            TokenKind::Option("value".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_call_expression_separator() {
    assert_eq!(
        kinds("token::balanceOf(@me)"),
        vec![
            word("token"),
            TokenKind::ColonColon,
            word("balanceOf"),
            TokenKind::LParen,
            TokenKind::Helper("me".to_string()),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_strings_and_escapes() {
    assert_eq!(
        kinds(r#"print "a\nb" 'it\'s'"#),
        vec![
            word("print"),
            TokenKind::String("a\nb".to_string()),
            TokenKind::String("it's".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_comments_and_keywords() {
    assert_eq!(
        kinds("set $ok true # trailing\nfalse"),
        vec![
            word("set"),
            TokenKind::Variable("$ok".to_string()),
            TokenKind::True,
            TokenKind::Newline,
            TokenKind::False,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_operators() {
    assert_eq!(
        kinds("(1 + 2 - 3 * 4 / 5 ^ 6)")
            .into_iter()
            .filter(TokenKind::is_operator)
            .count(),
        5
    );
}

#[test]
fn test_lex_errors_continue() {
    let out = lex("set % \"open\nprint 1").unwrap();
    assert_eq!(out.errors.len(), 2);
    assert_eq!(
        out.errors[0].kind,
        LexErrorKind::InvalidCharacter { found: '%' }
    );
    assert_eq!(out.errors[1].kind, LexErrorKind::UnterminatedString);
    // Lexing resumes on the next line.
    assert!(out
        .tokens
        .kinds()
        .contains(&TokenKind::Word("print".to_string())));
}

#[test]
fn test_lex_invalid_escape_span() {
    let out = lex(r#""a\qb""#).unwrap();
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].span, Span::new(2, 4));
}

#[test]
fn test_lex_spans_adjacency() {
    let out = lex("transfer(address)").unwrap();
    let word = out.tokens.get(0).unwrap();
    let paren = out.tokens.get(1).unwrap();
    assert!(word.span.is_adjacent_to(paren.span));

    let out = lex("exec (1)").unwrap();
    assert!(!out
        .tokens
        .get(0)
        .unwrap()
        .span
        .is_adjacent_to(out.tokens.get(1).unwrap().span));
}

#[test]
fn test_exponent_overflow() {
    let out = lex("1e99999999999").unwrap();
    assert_eq!(out.errors[0].kind, LexErrorKind::ExponentOverflow);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn number_literals_round_trip_parts(
            int in "[1-9][0-9]{0,6}",
            frac in proptest::option::of("[0-9]{1,4}"),
            power in proptest::option::of(0u32..40),
            unit in proptest::option::of(prop_oneof![
                Just("s"), Just("m"), Just("h"), Just("d"), Just("w"), Just("mo"), Just("y")
            ]),
        ) {
            let mantissa = match &frac {
                Some(f) => format!("{int}.{f}"),
                None => int.clone(),
            };
            let mut src = mantissa.clone();
            if let Some(p) = power {
                src.push_str(&format!("e{p}"));
            }
            if let Some(u) = unit {
                src.push_str(u);
            }
            let toks = kinds(&src);
            prop_assert_eq!(toks.len(), 2);
            prop_assert_eq!(
                &toks[0],
                &number(&mantissa, power, unit.and_then(TimeUnit::from_suffix))
            );
        }

        #[test]
        fn lexing_never_panics(src in "\\PC{0,64}") {
            let kinds = lex(&src).unwrap().tokens.kinds();
            prop_assert_eq!(kinds.last(), Some(&TokenKind::Eof));
        }
    }
}
