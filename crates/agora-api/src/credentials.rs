//! Password hashing and bearer-token issuance.
//!
//! Tokens are stateless: a token stays valid until it expires, there is no
//! revocation list.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;

use agora_types::api::Claims;

/// Token settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

/// The only failure `validate_token` reports. Bad signature, expiry,
/// malformed input and a missing subject are deliberately indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

pub struct Credentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl Credentials {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            token_ttl: config.token_ttl,
        }
    }

    /// Hash a password with Argon2id and a fresh salt.
    pub fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
            .to_string();
        Ok(hash)
    }

    /// False on mismatch and on a stored hash that does not parse.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn issue_token(&self, subject: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.token_ttl).timestamp().max(0) as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Returns the subject claim of a well-signed, unexpired token.
    pub fn validate_token(&self, token: &str) -> Result<String, InvalidToken> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|_| InvalidToken)?;

        if data.claims.sub.is_empty() {
            return Err(InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(ttl: Duration) -> Credentials {
        Credentials::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl: ttl,
        })
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let creds = credentials(Duration::minutes(30));
        let hash = creds.hash_password("pw1").unwrap();

        assert_ne!(hash, "pw1");
        assert!(creds.verify_password("pw1", &hash));
        assert!(!creds.verify_password("pw2", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let creds = credentials(Duration::minutes(30));
        assert_ne!(creds.hash_password("same").unwrap(), creds.hash_password("same").unwrap());
    }

    #[test]
    fn long_passwords_are_not_truncated() {
        let creds = credentials(Duration::minutes(30));
        let long = "a".repeat(200);
        let hash = creds.hash_password(&long).unwrap();

        // Differs only in the final byte.
        let mut almost = "a".repeat(199);
        almost.push('b');
        assert!(creds.verify_password(&long, &hash));
        assert!(!creds.verify_password(&almost, &hash));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        let creds = credentials(Duration::minutes(30));
        assert!(!creds.verify_password("pw1", "not-a-phc-string"));
    }

    #[test]
    fn token_round_trips_subject() {
        let creds = credentials(Duration::minutes(30));
        let token = creds.issue_token("alice@x.com").unwrap();
        assert_eq!(creds.validate_token(&token), Ok("alice@x.com".to_string()));
    }

    #[test]
    fn expired_token_is_invalid() {
        let creds = credentials(Duration::minutes(-5));
        let token = creds.issue_token("alice@x.com").unwrap();
        assert_eq!(creds.validate_token(&token), Err(InvalidToken));
    }

    #[test]
    fn token_signed_with_another_secret_is_invalid() {
        let ours = credentials(Duration::minutes(30));
        let theirs = Credentials::new(&AuthConfig {
            jwt_secret: "someone-else".to_string(),
            token_ttl: Duration::minutes(30),
        });
        let token = theirs.issue_token("alice@x.com").unwrap();
        assert_eq!(ours.validate_token(&token), Err(InvalidToken));
    }

    #[test]
    fn malformed_and_subjectless_tokens_are_invalid() {
        let creds = credentials(Duration::minutes(30));
        assert_eq!(creds.validate_token("not.a.jwt"), Err(InvalidToken));
        assert_eq!(creds.validate_token(""), Err(InvalidToken));

        let empty_subject = creds.issue_token("").unwrap();
        assert_eq!(creds.validate_token(&empty_subject), Err(InvalidToken));

        #[derive(serde::Serialize)]
        struct NoSubject {
            exp: usize,
        }
        let exp = (Utc::now() + Duration::minutes(30)).timestamp() as usize;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSubject { exp },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(creds.validate_token(&token), Err(InvalidToken));
    }
}
