//! Operator authentication: password hashing and bearer tokens
//!
//! # Architecture
//!
//! - Passwords are stored as SHA-256 over a per-user random salt followed by
//!   the password, both hex encoded
//! - Bearer tokens are compact HS256 JWTs (`header.payload.signature`,
//!   base64url without padding) signed with the service token secret
//! - The token secret comes from configuration or, failing that, from the
//!   `settings` table where it is generated on first use
//!
//! # Pure Functions
//!
//! Everything here except `load_token_secret` is a pure function. No HTTP
//! framework dependencies; the service wraps these in axum middleware.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

type HmacSha256 = Hmac<Sha256>;

/// Settings key holding the generated token secret
pub const TOKEN_SECRET_KEY: &str = "token_secret";

const SALT_BYTES: usize = 16;
const SECRET_BYTES: usize = 32;
const MAX_TOKEN_LEN: usize = 4096;

// ========================================
// Error Types
// ========================================

/// Token validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not three base64url segments, or undecodable JSON
    Malformed(String),

    /// Header names an algorithm other than HS256
    UnsupportedAlgorithm(String),

    /// Signature does not match
    InvalidSignature,

    /// Token past its `exp` claim
    Expired { exp: i64, now: i64 },
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed(reason) => write!(f, "Malformed token: {}", reason),
            TokenError::UnsupportedAlgorithm(alg) => {
                write!(f, "Unsupported token algorithm: {}", alg)
            }
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::Expired { .. } => write!(f, "Token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

// ========================================
// Passwords
// ========================================

/// Generate a random salt (32 hex chars)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Hash a password with the given salt
///
/// # Examples
///
/// ```
/// use payfix_common::auth::hash_password;
///
/// let hash = hash_password("password1", "00ff");
/// assert_eq!(hash.len(), 64); // SHA-256 is 64 hex chars
/// assert_eq!(hash, hash_password("password1", "00ff"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against a stored hash and salt
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    constant_time_eq(calculated.as_bytes(), expected_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Tokens
// ========================================

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    pub username: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

/// Issue a signed token for a user
pub fn issue_token(
    secret: &str,
    user_id: &str,
    username: &str,
    ttl_seconds: i64,
    now: DateTime<Utc>,
) -> String {
    let header = TokenHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp(),
        exp: now.timestamp() + ttl_seconds,
    };

    // Serializing plain structs of strings and integers cannot fail
    let header_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap_or_default());
    let claims_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
    let signing_input = format!("{}.{}", header_part, claims_part);
    let signature = URL_SAFE_NO_PAD.encode(sign(secret, &signing_input));

    format!("{}.{}", signing_input, signature)
}

/// Verify a token's signature and expiry, returning its claims
///
/// # Examples
///
/// ```
/// use payfix_common::auth::{issue_token, verify_token};
///
/// let now = chrono::Utc::now();
/// let token = issue_token("secret", "user-1", "operator1", 900, now);
/// let claims = verify_token("secret", &token, now).unwrap();
/// assert_eq!(claims.username, "operator1");
///
/// assert!(verify_token("other-secret", &token, now).is_err());
/// ```
pub fn verify_token(
    secret: &str,
    token: &str,
    now: DateTime<Utc>,
) -> Result<TokenClaims, TokenError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(TokenError::Malformed("token exceeds max length".to_string()));
    }

    let mut parts = token.split('.');
    let (Some(header_part), Some(claims_part), Some(sig_part), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed("expected three segments".to_string()));
    };

    let header: TokenHeader = decode_segment(header_part)?;
    if header.alg != "HS256" {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let provided = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    let mut mac = new_mac(secret);
    mac.update(header_part.as_bytes());
    mac.update(b".");
    mac.update(claims_part.as_bytes());
    mac.verify_slice(&provided)
        .map_err(|_| TokenError::InvalidSignature)?;

    let claims: TokenClaims = decode_segment(claims_part)?;
    let now = now.timestamp();
    if claims.exp <= now {
        return Err(TokenError::Expired {
            exp: claims.exp,
            now,
        });
    }

    Ok(claims)
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length")
}

fn sign(secret: &str, signing_input: &str) -> Vec<u8> {
    let mut mac = new_mac(secret);
    mac.update(signing_input.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Generate a random token secret (64 hex chars)
pub fn generate_token_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

// ========================================
// Token Secret Management
// ========================================

/// Load the token secret from the settings table, generating it if missing
#[cfg(feature = "sqlx")]
pub async fn load_token_secret(db: &SqlitePool) -> crate::Result<String> {
    if let Some(secret) = crate::db::get_setting(db, TOKEN_SECRET_KEY).await? {
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    let secret = generate_token_secret();
    crate::db::set_setting(db, TOKEN_SECRET_KEY, &secret).await?;
    tracing::info!("Generated new token secret");
    Ok(secret)
}

// ========================================
// Tests
// ========================================
