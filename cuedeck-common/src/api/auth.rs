//! Session authentication via a signed cookie
//!
//! # Architecture
//!
//! - `/api/login` checks the posted username/password against the
//!   configured credentials
//! - On success the server issues a stateless token: a base64url JSON
//!   payload plus a SHA-256 signature over payload and session secret
//! - Every protected request presents the token in the `session` cookie;
//!   the server only needs the secret to verify it
//! - Tokens expire after the configured TTL
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions.
//! No HTTP framework dependencies (Axum, etc.) - those are in the server crate.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Credentials;

/// Cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "session";

/// Tolerated clock drift for tokens issued "in the future"
pub const CLOCK_SKEW_SECS: i64 = 60;

// ========================================
// Error Types
// ========================================

/// Session validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Token is not `payload.signature` or the payload does not decode
    Malformed(String),

    /// Signature does not match the payload
    InvalidSignature,

    /// Token older than the session TTL
    Expired { issued_at: i64, now: i64 },

    /// Token issued further in the future than clock skew allows
    IssuedInFuture { issued_at: i64, now: i64 },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Malformed(reason) => write!(f, "Malformed session token: {}", reason),
            SessionError::InvalidSignature => write!(f, "Invalid session signature"),
            SessionError::Expired { issued_at, now } => {
                write!(f, "Session expired (issued {}s ago)", now - issued_at)
            }
            SessionError::IssuedInFuture { issued_at, now } => {
                write!(f, "Session issued {}s in the future", issued_at - now)
            }
        }
    }
}

impl std::error::Error for SessionError {}

// ========================================
// Credentials
// ========================================

/// Check a login attempt against the configured credentials
///
/// Both fields are compared in constant time.
///
/// # Examples
///
/// ```
/// use cuedeck_common::api::auth::check_credentials;
/// use cuedeck_common::config::Credentials;
///
/// let expected = Credentials {
///     username: "stage".to_string(),
///     password: "manager".to_string(),
/// };
/// assert!(check_credentials("stage", "manager", &expected));
/// assert!(!check_credentials("stage", "wrong", &expected));
/// ```
pub fn check_credentials(username: &str, password: &str, expected: &Credentials) -> bool {
    let user_ok = constant_time_eq(username.as_bytes(), expected.username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), expected.password.as_bytes());
    user_ok & pass_ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Generate a random session secret (64 hex chars)
///
/// Used when credentials are configured without `SESSION_SECRET`; sessions
/// then do not survive a restart.
pub fn generate_session_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Session Tokens
// ========================================

/// Payload of a signed session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub username: String,
    /// Unix epoch seconds
    pub issued_at: i64,
}

impl SessionToken {
    /// New token issued now
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            issued_at: Utc::now().timestamp(),
        }
    }

    /// Encode as `base64url(json).hex(sha256)`
    pub fn encode(&self, secret: &str) -> String {
        // Serializing two plain fields cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = sign(&payload, secret);
        format!("{}.{}", payload, signature)
    }

    /// Decode and verify a token against the current time
    pub fn decode(token: &str, secret: &str, ttl_secs: i64) -> Result<Self, SessionError> {
        Self::decode_at(token, secret, ttl_secs, Utc::now().timestamp())
    }

    /// Decode and verify a token against an explicit `now` (epoch seconds)
    ///
    /// # Examples
    ///
    /// ```
    /// use cuedeck_common::api::auth::{SessionError, SessionToken};
    ///
    /// let token = SessionToken { username: "stage".into(), issued_at: 1_000 };
    /// let encoded = token.encode("secret");
    ///
    /// assert_eq!(SessionToken::decode_at(&encoded, "secret", 100, 1_050).unwrap(), token);
    /// assert!(matches!(
    ///     SessionToken::decode_at(&encoded, "secret", 100, 1_200),
    ///     Err(SessionError::Expired { .. })
    /// ));
    /// ```
    pub fn decode_at(
        token: &str,
        secret: &str,
        ttl_secs: i64,
        now: i64,
    ) -> Result<Self, SessionError> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| SessionError::Malformed("missing signature".to_string()))?;

        let expected = sign(payload, secret);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return Err(SessionError::InvalidSignature);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SessionError::Malformed(format!("payload encoding: {}", e)))?;
        let session: SessionToken = serde_json::from_slice(&json)
            .map_err(|e| SessionError::Malformed(format!("payload json: {}", e)))?;

        if session.issued_at - now > CLOCK_SKEW_SECS {
            return Err(SessionError::IssuedInFuture {
                issued_at: session.issued_at,
                now,
            });
        }
        if now - session.issued_at > ttl_secs {
            return Err(SessionError::Expired {
                issued_at: session.issued_at,
                now,
            });
        }

        Ok(session)
    }
}

/// Signature over an encoded payload
///
/// # Algorithm
///
/// 1. Concatenate payload, `.`, and the session secret
/// 2. Calculate SHA-256 of the concatenated string
/// 3. Return as 64 hex characters
pub fn sign(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b".");
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ========================================
// Cookie Helpers
// ========================================

/// `Set-Cookie` value for a freshly issued session
pub fn session_cookie(token: &str, ttl_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE_NAME, token, ttl_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that clears the session
pub fn expired_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Extract a cookie value from a `Cookie` request header
///
/// # Examples
///
/// ```
/// use cuedeck_common::api::auth::cookie_value;
///
/// assert_eq!(cookie_value("theme=dark; session=abc.def", "session"), Some("abc.def"));
/// assert_eq!(cookie_value("theme=dark", "session"), None);
/// ```
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

// ========================================
// Tests
// ========================================
