//! Login payload validation and password comparison.

use std::fmt;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Raw body of `POST /login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Returned when the login payload is malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    EmptyLogin,
    EmptyPassword,
}

impl LoginValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyLogin => "login",
            Self::EmptyPassword => "password",
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLogin => write!(f, "login must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// The login is trimmed; the password keeps caller-provided whitespace so
/// that comparison sees exactly what was typed.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login: String,
    password: String,
}

impl LoginCredentials {
    pub fn try_from_parts(login: &str, password: &str) -> Result<Self, LoginValidationError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(LoginValidationError::EmptyLogin);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            login: login.to_string(),
            password: password.to_string(),
        })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(request: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&request.login, &request.password)
    }
}

// Never print the password
impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Compare a supplied password with the stored one.
///
/// Both sides are hashed first so the comparison always covers 32 bytes
/// regardless of input length, and the digests are compared without an
/// early exit.
pub fn passwords_match(supplied: &str, stored: &str) -> bool {
    let supplied = Sha256::digest(supplied.as_bytes());
    let stored = Sha256::digest(stored.as_bytes());
    supplied
        .iter()
        .zip(stored.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_login_but_not_password() {
        let creds = LoginCredentials::try_from_parts("  admin ", " pass ").unwrap();
        assert_eq!(creds.login(), "admin");
        assert_eq!(creds.password(), " pass ");
    }

    #[test]
    fn rejects_blank_fields() {
        assert_eq!(
            LoginCredentials::try_from_parts("   ", "x").unwrap_err(),
            LoginValidationError::EmptyLogin
        );
        assert_eq!(
            LoginCredentials::try_from_parts("admin", "").unwrap_err(),
            LoginValidationError::EmptyPassword
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = LoginCredentials::try_from_parts("admin", "hunter2").unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn password_comparison() {
        assert!(passwords_match("verysttrongpass1111", "verysttrongpass1111"));
        assert!(!passwords_match("abrakadabra", "random"));
        assert!(!passwords_match("", "random"));
        assert!(!passwords_match("Random", "random"));
    }
}
