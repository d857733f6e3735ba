//! Logos token definitions.
//!
//! `RawToken` only classifies slices; payloads are extracted in `convert`.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"#[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("::")]
    ColonColon,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,

    // An address and a 40-digit bytes run have the same length; address wins.
    #[regex(r"0x[0-9a-fA-F]{40}", priority = 10)]
    Address,
    #[regex(r"0x[0-9a-fA-F]*", priority = 5)]
    Bytes,
    // Hex digits run straight into a word character: `0x12zz`.
    #[regex(r"0x[0-9a-fA-F]*[g-zG-Z_][0-9a-zA-Z_]*")]
    BadHex,

    #[regex(r"[0-9]+(\.[0-9]+)?(e[0-9]+)?(mo|[smhdwy])?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    #[regex(r"'([^'\\\n]|\\.)*")]
    UnterminatedString,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    Variable,
    #[regex(r"@[a-zA-Z][a-zA-Z0-9_.]*")]
    Helper,
    #[regex(r"--[a-zA-Z][a-zA-Z0-9\-]*")]
    Option,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-.]*(:[a-zA-Z0-9_\-.]+)*")]
    Word,
}
