use super::*;

// =============================================================================
// extract_message
// =============================================================================

#[test]
fn extract_message_reads_field() {
    assert_eq!(extract_message(r#"{"message":"The title field is required."}"#).as_deref(), Some("The title field is required."));
}

#[test]
fn extract_message_ignores_blank_and_missing() {
    assert_eq!(extract_message(r#"{"message":"   "}"#), None);
    assert_eq!(extract_message(r#"{"errors":{}}"#), None);
    assert_eq!(extract_message("<html>502</html>"), None);
    assert_eq!(extract_message(""), None);
}

// =============================================================================
// classify
// =============================================================================

#[test]
fn classify_401_is_auth_rejection() {
    let err = classify(401, r#"{"message":"Unauthenticated."}"#, "fallback");
    assert!(err.is_auth_rejection());
    assert_eq!(err.message(), "Unauthenticated.");
    assert_eq!(err.status(), Some(401));
}

#[test]
fn classify_422_is_rejected_with_backend_message() {
    let err = classify(422, r#"{"message":"The email has already been taken."}"#, "fallback");
    assert_eq!(err, ApiError::Rejected { status: 422, message: "The email has already been taken.".into() });
    assert!(!err.is_auth_rejection());
}

#[test]
fn classify_500_uses_fallback_without_body_message() {
    let err = classify(500, "Internal Server Error", "Failed to load posts.");
    assert_eq!(err, ApiError::Server { status: 500, message: "Failed to load posts.".into() });
    assert_eq!(err.error_code(), "E_SERVER");
}

#[test]
fn classify_unexpected_redirect_is_server() {
    let err = classify(302, "", "fallback");
    assert!(matches!(err, ApiError::Server { status: 302, .. }));
}

#[test]
fn display_is_the_user_message() {
    let err = ApiError::Network { message: "Failed to delete post.".into(), detail: "connection refused".into() };
    assert_eq!(err.to_string(), "Failed to delete post.");
    assert_eq!(err.status(), None);
}
