use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E1006)
        .with_message("option `--value` has no value")
        .with_label(Span::new(10, 17), "expected a value after this")
        .with_label(Span::new(0, 4), "in this command")
        .with_help("write `--value 1e18`");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(10, 17)));
    assert_eq!(diag.help, vec!["write `--value 1e18`".to_string()]);
    assert_eq!(
        diag.to_string(),
        "error [E1006]: option `--value` has no value"
    );
}

#[test]
fn test_count_by_severity() {
    let diagnostics = [
        Diagnostic::error(ErrorCode::E2002),
        Diagnostic::warning(ErrorCode::W2001),
        Diagnostic::warning(ErrorCode::W2001),
    ];
    assert_eq!(count_by_severity(&diagnostics), (1, 2));
    assert_eq!(count_by_severity(&[]), (0, 0));
}

#[test]
fn test_error_code_phases() {
    assert!(ErrorCode::E0002.is_syntax_error());
    assert!(ErrorCode::E1005.is_syntax_error());
    assert!(ErrorCode::E2003.is_eval_error());
    assert!(!ErrorCode::E2003.is_syntax_error());
    assert!(ErrorCode::W2001.is_warning());
    assert!(!ErrorCode::W2001.is_eval_error());
}
