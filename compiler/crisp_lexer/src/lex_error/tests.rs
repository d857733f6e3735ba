use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_codes_by_kind() {
    let at = Span::new(0, 1);
    assert_eq!(
        LexError::new(at, LexErrorKind::InvalidCharacter { found: '%' }).code(),
        ErrorCode::E0001
    );
    assert_eq!(
        LexError::new(at, LexErrorKind::UnterminatedString).code(),
        ErrorCode::E0002
    );
    assert_eq!(
        LexError::new(at, LexErrorKind::ExponentOverflow).code(),
        ErrorCode::E0003
    );
}

#[test]
fn test_to_diagnostic() {
    let err = LexError::new(Span::new(4, 6), LexErrorKind::InvalidEscape { escape_char: 'q' });
    let diag = err.to_diagnostic();
    assert_eq!(diag.message, "unknown escape sequence `\\q`");
    assert_eq!(diag.primary_span(), Some(Span::new(4, 6)));
    assert_eq!(diag.notes.len(), 1);
}
