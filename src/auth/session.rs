//! Session management
//!
//! The session payload is an HMAC-signed token stored in a cookie. It
//! carries only the user's identifier plus timestamps; the user record is
//! re-fetched from the store on every request, so a deleted user simply
//! becomes anonymous.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Name of the session cookie held by the client.
pub const SESSION_COOKIE: &str = "session";

/// Serialized session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Authenticated user's id
    pub user_id: i64,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for a user, valid for `max_age` seconds.
    pub fn new(user_id: i64, max_age: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(max_age),
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
pub fn create_session_token(
    session: &Session,
    secret: &str,
) -> Result<String, crate::error::AppError> {
    use base64::{engine::general_purpose, Engine as _};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let payload =
        serde_json::to_string(session).map_err(|e| crate::error::AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Internal(anyhow::anyhow!("HMAC init failed: {e}")))?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// Returns `None` for malformed, tampered, or expired tokens; the caller
/// treats all of those as an anonymous request.
pub fn verify_session_token(token: &str, secret: &str) -> Option<Session> {
    use base64::{engine::general_purpose, Engine as _};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let (payload_b64, signature_b64) = token.split_once('.')?;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload_b64.as_bytes());

    let signature = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    mac.verify_slice(&signature).ok()?;

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let session: Session = serde_json::from_slice(&payload_bytes).ok()?;

    if session.is_expired() {
        return None;
    }

    Some(session)
}

/// Build the session cookie carrying a signed token.
///
/// No Max-Age: the cookie lives for the browser session, the token itself
/// embeds the expiry.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie used to clear the session on logout.
pub fn removal_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Start a session for a user and build its cookie.
pub fn establish_session(
    config: &crate::config::AppConfig,
    user_id: i64,
) -> Result<Cookie<'static>, crate::error::AppError> {
    let session = Session::new(user_id, config.auth.session_max_age);
    let token = create_session_token(&session, &config.auth.session_secret)?;
    Ok(session_cookie(token, config.should_use_secure_cookies()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-32-bytes-long!!!";

    #[test]
    fn token_round_trip() {
        let session = Session::new(42, 3600);
        let token = create_session_token(&session, SECRET).unwrap();

        let decoded = verify_session_token(&token, SECRET).expect("valid token verifies");
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.created_at, session.created_at);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let session = Session::new(42, 3600);
        let token = create_session_token(&session, SECRET).unwrap();

        let mut tampered = token.clone();
        tampered.insert(1, 'x');
        assert!(verify_session_token(&tampered, SECRET).is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let session = Session::new(42, 3600);
        let token = create_session_token(&session, SECRET).unwrap();

        assert!(verify_session_token(&token, "another-secret-key-32-bytes-long").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let session = Session::new(42, -1);
        let token = create_session_token(&session, SECRET).unwrap();

        assert!(verify_session_token(&token, SECRET).is_none());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(verify_session_token("", SECRET).is_none());
        assert!(verify_session_token("no-dot-here", SECRET).is_none());
        assert!(verify_session_token("a.b.c", SECRET).is_none());
    }
}
