//! Authentication for the single configured principal
//!
//! Provides:
//! - Salted Argon2id password hashes
//! - Signed, time-limited access tokens
//! - The [`Authenticator`] that checks a username/password pair and issues a token
//!
//! ## Token Format
//!
//! `base64url(claims JSON) "." base64url(HMAC-SHA256(secret, claims JSON))`
//!
//! Claims carry the principal (`sub`), issue and expiry times in unix
//! seconds, and a random token id (`jti`) used for revocation.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::core::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const COMPARE_KEY: &[u8] = b"tomostudy/constant-time-compare";

fn mac_with_key(key: &[u8]) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(key).ok()
}

/// Compare two byte strings without leaking where they differ
pub fn constant_time_eq(expected: &[u8], presented: &[u8]) -> bool {
    let (Some(mut left), Some(mut right)) = (mac_with_key(COMPARE_KEY), mac_with_key(COMPARE_KEY))
    else {
        return false;
    };
    left.update(expected);
    right.update(presented);
    let expected_tag = left.finalize().into_bytes();
    right.verify_slice(&expected_tag).is_ok()
}

// =============================================================================
// Password hashes
// =============================================================================

/// Hash a password with a fresh random salt and the default Argon2id cost
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Hash a password with the given salt and cost, in PHC string format
/// (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<digest>`)
pub fn hash_password_with_salt(
    password: &str,
    salt: &[u8],
    params: Params,
) -> Result<String, password_hash::Error> {
    let salt = SaltString::encode_b64(salt)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check a password against a stored hash. The cost comes from the hash
/// itself. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Tokens
// =============================================================================

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal the token was issued to
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Token id
    pub jti: Uuid,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// The authenticated identity carried by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            expires_at: claims.expires_at(),
            username: claims.sub,
            token_id: claims.jti,
        }
    }
}

/// A freshly issued token and its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies signed tokens
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> IssuedToken {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            jti: Uuid::new_v4(),
        };
        let body = serde_json::to_vec(&claims).unwrap_or_default();
        let signature = self.sign(&body);
        IssuedToken {
            token: format!(
                "{}.{}",
                URL_SAFE_NO_PAD.encode(&body),
                URL_SAFE_NO_PAD.encode(signature)
            ),
            claims,
        }
    }

    /// Check signature and expiry. Anything unparseable is `InvalidToken`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (body, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let body = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let mut mac = mac_with_key(&self.secret).ok_or(AuthError::InvalidToken)?;
        mac.update(&body);
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims: Claims = serde_json::from_slice(&body).map_err(|_| AuthError::InvalidToken)?;
        if claims.is_expired_at(now) {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        match mac_with_key(&self.secret) {
            Some(mut mac) => {
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            None => Vec::new(),
        }
    }
}

// =============================================================================
// Authenticator
// =============================================================================

/// Credentials of the single configured principal
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    /// Stored hash, see [`hash_password`]
    pub password_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Verifies the configured principal and issues tokens
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
    tokens: TokenCodec,
}

impl Authenticator {
    pub fn new(credentials: Credentials, tokens: TokenCodec) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Check the pair and issue a token.
    ///
    /// Both checks always run; a wrong username and a wrong password fail
    /// with the same error.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let user_ok = constant_time_eq(self.credentials.username.as_bytes(), username.as_bytes());
        let password_ok = verify_password(password, &self.credentials.password_hash);
        if !(user_ok && password_ok) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.tokens.issue(&self.credentials.username, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-32-bytes-long!!!";

    fn authenticator(ttl: Duration) -> Authenticator {
        Authenticator::new(
            Credentials {
                username: "admin".into(),
                password_hash: hash_password_with_salt("correct horse", b"unit-salt", cheap())
                    .unwrap(),
            },
            TokenCodec::new(SECRET, ttl),
        )
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    // --- passwords ---

    fn cheap() -> Params {
        Params::new(8, 1, 1, None).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("s3cret").unwrap();
        assert!(stored.starts_with("$argon2id$v=19$"));
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("s3cret ", &stored));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password_with_salt("same", b"first-salt", cheap()).unwrap();
        let b = hash_password_with_salt("same", b"second-salt", cheap()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fixed_salt_is_deterministic() {
        let a = hash_password_with_salt("pw", b"0123456789abcdef", cheap()).unwrap();
        let b = hash_password_with_salt("pw", b"0123456789abcdef", cheap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_verify_uses_cost_from_hash() {
        let stored = hash_password_with_salt("pw", b"0123456789abcdef", cheap()).unwrap();
        assert!(stored.contains("m=8,t=1,p=1"));
        assert!(verify_password("pw", &stored));
        assert!(!verify_password("PW", &stored));
    }

    #[test]
    fn test_short_salt_is_rejected() {
        assert!(hash_password_with_salt("pw", b"abc", cheap()).is_err());
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        for stored in [
            "",
            "plain",
            "bcrypt$x$y",
            "hmac-sha256$c2FsdA$ZGlnZXN0",
            "$argon2id$v=19$m=8,t=1,p=1$!!$!!",
        ] {
            assert!(!verify_password("pw", stored), "{stored:?}");
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"key", b"key"));
        assert!(!constant_time_eq(b"key", b"kez"));
        assert!(!constant_time_eq(b"key", b"key2"));
        assert!(!constant_time_eq(b"key", b""));
    }

    // --- tokens ---

    #[test]
    fn test_issue_then_verify() {
        let codec = TokenCodec::new(SECRET, Duration::minutes(5));
        let issued = codec.issue("admin", at(1_000));
        let claims = codec.verify(&issued.token, at(1_010)).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp, 1_300);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_oversized_ttl_saturates() {
        let codec = TokenCodec::new(SECRET, Duration::seconds(i64::MAX / 1000));
        let issued = codec.issue("admin", Utc::now());
        assert_eq!(issued.claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
    }

    #[test]
    fn test_one_second_token_expires() {
        let codec = TokenCodec::new(SECRET, Duration::seconds(1));
        let issued = codec.issue("admin", at(5_000));
        assert_eq!(
            codec.verify(&issued.token, at(5_002)),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let issued = TokenCodec::new(b"other".to_vec(), Duration::hours(1)).issue("admin", at(0));
        let codec = TokenCodec::new(SECRET, Duration::hours(1));
        assert_eq!(codec.verify(&issued.token, at(1)), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_tampered_claims_are_invalid() {
        let codec = TokenCodec::new(SECRET, Duration::hours(1));
        let issued = codec.issue("admin", at(0));
        let (_, signature) = issued.token.split_once('.').unwrap();
        let forged_claims = Claims {
            sub: "mallory".into(),
            ..issued.claims
        };
        let forged = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap()),
            signature
        );
        assert_eq!(codec.verify(&forged, at(1)), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_garbage_tokens_are_invalid() {
        let codec = TokenCodec::new(SECRET, Duration::hours(1));
        for token in ["", "abc", "a.b", "....", "%%%.%%%"] {
            assert_eq!(codec.verify(token, at(0)), Err(AuthError::InvalidToken), "{token:?}");
        }
    }

    // --- authenticator ---

    #[test]
    fn test_authenticate_success_issues_token_for_principal() {
        let auth = authenticator(Duration::hours(12));
        let issued = auth.authenticate("admin", "correct horse", at(0)).unwrap();
        assert_eq!(issued.claims.sub, "admin");
        assert_eq!(issued.claims.exp, 12 * 3600);
    }

    #[test]
    fn test_authenticate_failures_are_identical() {
        let auth = authenticator(Duration::hours(12));
        let wrong_user = auth.authenticate("root", "correct horse", at(0)).unwrap_err();
        let wrong_password = auth.authenticate("admin", "battery staple", at(0)).unwrap_err();
        assert_eq!(wrong_user, AuthError::InvalidCredentials);
        assert_eq!(wrong_user, wrong_password);
        assert_eq!(wrong_user.to_string(), wrong_password.to_string());
    }

    #[test]
    fn test_principal_from_claims() {
        let claims = Claims {
            sub: "admin".into(),
            iat: 0,
            exp: 60,
            jti: Uuid::nil(),
        };
        let principal = Principal::from(claims);
        assert_eq!(principal.username, "admin");
        assert_eq!(principal.expires_at, at(60));
    }
}
