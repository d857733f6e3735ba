//! Token types produced by the crisp lexer.

use super::Span;
use std::fmt;

/// A token with its span in the source.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Duration suffix of a number literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Parse a literal suffix (`s`, `m`, `h`, `d`, `w`, `mo`, `y`).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "s" => TimeUnit::Second,
            "m" => TimeUnit::Minute,
            "h" => TimeUnit::Hour,
            "d" => TimeUnit::Day,
            "w" => TimeUnit::Week,
            "mo" => TimeUnit::Month,
            "y" => TimeUnit::Year,
            _ => return None,
        })
    }

    /// Length of one unit in seconds. A month is 30 days, a year 365.
    pub const fn seconds(self) -> u64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Week => 604_800,
            TimeUnit::Month => 2_592_000,
            TimeUnit::Year => 31_536_000,
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Minute => "m",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
            TimeUnit::Week => "w",
            TimeUnit::Month => "mo",
            TimeUnit::Year => "y",
        }
    }
}

/// Decomposed number literal: `<mantissa>[e<power>][<unit>]`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NumberParts {
    /// Digits as written, possibly with one `.`.
    pub mantissa: String,
    pub power: Option<u32>,
    pub time_unit: Option<TimeUnit>,
}

/// Token kinds for crisp.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// `0x` followed by exactly 40 hex digits.
    Address(String),
    /// Any other `0x` hex run.
    Bytes(String),
    Number(NumberParts),
    /// String literal with escapes already cooked.
    String(String),
    True,
    False,
    /// `$name` (stored with the sigil).
    Variable(String),
    /// `@name` (stored without the sigil).
    Helper(String),
    /// `--name` (stored without the dashes).
    Option(String),
    /// Command names, identifiers and bare words.
    Word(String),

    LParen,
    RParen,
    Comma,
    ColonColon,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    Newline,
    /// Unrecognized input; the lexer has already reported it.
    Error,
    Eof,
}

impl TokenKind {
    /// Short human-readable description used in parse errors.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Address(_) => "address",
            TokenKind::Bytes(_) => "bytes literal",
            TokenKind::Number(_) => "number",
            TokenKind::String(_) => "string",
            TokenKind::True | TokenKind::False => "boolean",
            TokenKind::Variable(_) => "variable",
            TokenKind::Helper(_) => "helper",
            TokenKind::Option(_) => "option",
            TokenKind::Word(_) => "identifier",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Comma => "`,`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Caret => "`^`",
            TokenKind::Newline => "end of line",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of input",
        }
    }

    /// Whether this token is an arithmetic operator.
    #[inline]
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Caret
        )
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Address(s) => write!(f, "Address({s})"),
            TokenKind::Bytes(s) => write!(f, "Bytes({s})"),
            TokenKind::Number(n) => {
                write!(f, "Number({}", n.mantissa)?;
                if let Some(p) = n.power {
                    write!(f, "e{p}")?;
                }
                if let Some(u) = n.time_unit {
                    write!(f, "{}", u.suffix())?;
                }
                write!(f, ")")
            }
            TokenKind::String(s) => write!(f, "String({s:?})"),
            TokenKind::True => write!(f, "True"),
            TokenKind::False => write!(f, "False"),
            TokenKind::Variable(s) => write!(f, "Variable({s})"),
            TokenKind::Helper(s) => write!(f, "Helper(@{s})"),
            TokenKind::Option(s) => write!(f, "Option(--{s})"),
            TokenKind::Word(s) => write!(f, "Word({s})"),
            other => write!(f, "{}", other.display_name()),
        }
    }
}

/// Lexer output: tokens terminated by a single `Eof`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token kinds only; handy in tests.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
