use super::*;

#[test]
fn rejection_maps_to_credentials_message() {
    let err = LoginError::from(SubmitError::AuthRejected { status: 401, detail: Some("Incorrect".into()) });
    assert_eq!(err.user_message(), LoginMessage::CredentialsRejected);
    assert_eq!(err.user_message().to_string(), "Login failed. Please check your credentials.");
    assert_eq!(err.error_code(), "E_AUTH_REJECTED");
    assert!(!err.retryable());
}

#[test]
fn transport_maps_to_try_again() {
    let err = LoginError::from(SubmitError::TransportFailure("connection refused".into()));
    assert_eq!(err.user_message(), LoginMessage::TryAgain);
    assert_eq!(err.user_message().as_str(), "Login failed. Please try again.");
    assert_eq!(err.error_code(), "E_TRANSPORT");
    assert!(err.retryable());
}

#[test]
fn malformed_token_maps_to_try_again() {
    let err = LoginError::from(ProcessError::Decode(DecodeError::MalformedToken("payload is not JSON")));
    assert!(matches!(err, LoginError::MalformedToken(_)));
    assert_eq!(err.user_message(), LoginMessage::TryAgain);
    assert_eq!(err.error_code(), "E_MALFORMED_TOKEN");
    assert!(!err.retryable());
}

#[test]
fn storage_failure_maps_to_try_again() {
    let err = LoginError::from(ProcessError::Storage(StorageError::NoStateDir));
    assert!(matches!(err, LoginError::Storage(StorageError::NoStateDir)));
    assert_eq!(err.user_message(), LoginMessage::TryAgain);
    assert_eq!(err.error_code(), "E_STORAGE");
}

#[test]
fn user_messages_never_include_server_detail() {
    let err = LoginError::AuthRejected { status: 500, detail: Some("Traceback: psycopg2 error".into()) };
    let shown = err.user_message().to_string();
    assert!(!shown.contains("psycopg2"));
    assert!(!shown.contains("500"));
}
