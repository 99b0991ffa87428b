use crate::{config::Config, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The authenticated user.
    pub user: TokenUser,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and verifies HS256 access tokens signed with the server secret.
///
/// Built once at startup from [`Config`] and shared by the login route and
/// [`AuthMiddleware`](crate::auth::AuthMiddleware).
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.token_secret, config.token_ttl_days)
    }

    /// Generates a signed token for `user`, valid for the configured number of days.
    ///
    /// # Returns
    /// Returns `AppError::InternalServerError` if the expiry overflows or encoding fails.
    pub fn issue(&self, user: &TokenUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            user: user.clone(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a JWT string and decodes its claims.
    ///
    /// Signature and expiry are both checked.
    ///
    /// # Returns
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid,
    /// or it has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> TokenUser {
        TokenUser {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            username: "Alice".to_string(),
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = TokenService::new("test_secret_for_gen_verify", 30);
        let user = alice();
        let token = tokens.issue(&user).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user, user);

        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_expiration() {
        let secret = "test_secret_for_expiration";
        let tokens = TokenService::new(secret, 30);

        let issued = Utc::now() - Duration::days(31);
        let expired = Utc::now() - Duration::hours(2);
        let claims_expired = Claims {
            user: alice(),
            iat: issued.timestamp() as usize,
            exp: expired.timestamp() as usize,
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        match tokens.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("ExpiredSignature")),
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = TokenService::new("one_secret", 30);
        let verifier = TokenService::new("a_completely_different_secret", 30);
        let token = issuer.issue(&alice()).unwrap();

        match verifier.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("InvalidSignature")),
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        let tokens = TokenService::new("secret", 30);
        assert!(matches!(
            tokens.verify("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
