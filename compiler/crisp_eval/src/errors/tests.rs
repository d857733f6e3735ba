use super::*;
use crisp_ir::LineCol;
use pretty_assertions::assert_eq;

fn loc(line: u32) -> Location {
    Location::new(LineCol { line, col: 0 }, LineCol { line, col: 4 })
}

#[test]
fn test_innermost_origin_wins() {
    let err = invalid("bad")
        .in_helper("id", Some(loc(2)))
        .in_command("exec", Some(loc(1)));
    assert_eq!(
        err.origin,
        Some(ErrorOrigin::Helper {
            name: "id".to_string()
        })
    );
    assert_eq!(err.loc, Some(loc(2)));
    assert_eq!(err.to_string(), "@id: bad");
}

#[test]
fn test_command_display() {
    let err = not_found("no such module").in_command("load", None);
    assert_eq!(err.to_string(), "load: no such module");
    assert_eq!(err.kind.code(), ErrorCode::E2002);
}

#[test]
fn test_binding_error_is_invalid() {
    let err: EvalError = BindingError::AlreadyExists {
        frame: crate::bindings::FrameKind::Local,
        namespace: crate::bindings::Namespace::User,
        name: "$x".to_string(),
    }
    .into();
    assert_eq!(err.kind, EvalErrorKind::Invalid);
    assert!(err.message.contains("$x"));
}

#[test]
fn test_to_diagnostic_uses_location() {
    let source = "set $x 1\nexec $x\n";
    let index = LineIndex::new(source);
    let err = invalid("boom").in_command("exec", Some(loc(2)));
    let diag = err.to_diagnostic(&index);
    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.primary_span(), Some(Span::new(9, 13)));
    assert_eq!(diag.message, "exec: boom");
}
