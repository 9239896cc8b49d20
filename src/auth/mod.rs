pub mod credentials;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::database::models::User;

pub use credentials::{passwords_match, LoginCredentials, LoginRequest, LoginValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub login: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` pushes the expiry past the representable range
    pub fn new(user: &User, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours))
            })?
            .timestamp();

        Ok(Self {
            sub: user.id.clone(),
            login: user.login.clone(),
            exp,
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Token handed back by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until expiry
    pub expires_in: i64,
}

/// Signing and verification keys derived from the configured secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(user, self.expiry_hours)?;
        let expires_in = claims.exp - claims.iat;

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

        Ok(IssuedToken { token, expires_in })
    }

    /// Verify signature and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_user;

    #[test]
    fn issued_token_validates_with_same_secret() {
        let keys = JwtKeys::new("secret", 1).unwrap();
        let user = create_test_user();

        let issued = keys.issue(&user).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = keys.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.login, user.login);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = JwtKeys::new("secret-a", 1).unwrap();
        let verifier = JwtKeys::new("secret-b", 1).unwrap();

        let issued = issuer.issue(&create_test_user()).unwrap();
        assert!(matches!(
            verifier.validate(&issued.token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::new("secret", 1).unwrap();
        let claims = Claims {
            sub: "1".to_string(),
            login: "old".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn huge_lifetime_fails_instead_of_panicking() {
        let keys = JwtKeys::new("secret", 10_000_000_000).unwrap();
        assert!(matches!(
            keys.issue(&create_test_user()),
            Err(JwtError::TokenGeneration(_))
        ));

        let keys = JwtKeys::new("secret", u64::MAX).unwrap();
        assert!(keys.issue(&create_test_user()).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(JwtKeys::new("", 1), Err(JwtError::InvalidSecret)));
    }
}
