use std::fmt;

/// Stable codes for crisp diagnostics.
///
/// The leading digit is the phase that reports the problem: 0 for the
/// lexer, 1 for the parser, 2 for evaluation. `W` codes are warnings.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unrecognised character
    E0001,
    /// Unterminated string literal
    E0002,
    /// Malformed number literal
    E0003,

    /// Unexpected token
    E1001,
    /// Expected an argument or expression
    E1002,
    /// Unclosed `(` or function signature
    E1003,
    /// Expected a command name
    E1004,
    /// Block argument followed by more positional arguments
    E1005,
    /// Option without a value
    E1006,

    /// Invalid input or argument
    E2001,
    /// Module, command, helper or binding not found
    E2002,
    /// Capability call failed
    E2003,
    /// Capability call returned something unexpected
    E2004,
    /// Capability unavailable in this mode
    E2005,
    /// Interpretation superseded by a newer request
    E2006,

    /// Warning logged by a module while running
    W2001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::W2001 => "W2001",
        }
    }

    /// Lexer or parser error.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self.as_str().as_bytes(), [b'E', b'0' | b'1', ..])
    }

    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
