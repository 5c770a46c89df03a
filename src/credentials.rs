//! Username/password pair collected by the login form.

use std::fmt;

const MISSING_FIELDS_MESSAGE: &str = "Enter both username and password.";

/// Credentials for a single login attempt. Never persisted, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Build credentials from raw form input, requiring both fields.
    ///
    /// # Errors
    ///
    /// Returns the form message when either field is empty.
    pub fn from_form(username: &str, password: &str) -> Result<Self, &'static str> {
        if username.is_empty() || password.is_empty() {
            return Err(MISSING_FIELDS_MESSAGE);
        }
        Ok(Self::new(username, password))
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Key/value pairs in the order the token endpoint expects them.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, &str); 2] {
        [("username", self.username.as_str()), ("password", self.password.as_str())]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;
