use super::*;

#[test]
fn from_form_requires_both_fields() {
    assert_eq!(Credentials::from_form("", "secret"), Err("Enter both username and password."));
    assert_eq!(Credentials::from_form("alice", ""), Err("Enter both username and password."));
    assert_eq!(Credentials::from_form("", ""), Err("Enter both username and password."));
}

#[test]
fn from_form_keeps_values_verbatim() {
    let creds = Credentials::from_form(" alice ", "p@ss word").unwrap();
    assert_eq!(creds.username(), " alice ");
    assert_eq!(creds.form_fields(), [("username", " alice "), ("password", "p@ss word")]);
}

#[test]
fn debug_redacts_password() {
    let creds = Credentials::new("bob", "hunter2");
    let rendered = format!("{creds:?}");
    assert!(rendered.contains("bob"));
    assert!(!rendered.contains("hunter2"));
}
