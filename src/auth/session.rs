//! Signed admin session cookie
//!
//! The cookie value is `base64url(json).base64url(hmac_sha256(json))`.
//! Nothing is stored server-side: a cookie is valid as long as its MAC
//! verifies under the configured secret and `expires_at` is in the future.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Session payload carried by the cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("malformed session token")]
    Malformed,
    #[error("session signature mismatch")]
    BadSignature,
    #[error("session expired")]
    Expired,
    #[error("session not logged in")]
    LoggedOut,
    #[error("session payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("unusable session secret")]
    Key,
}

/// Seals and opens session cookies, and builds the `Set-Cookie` values.
#[derive(Clone)]
pub struct SessionKeys {
    mac: HmacSha256,
    cookie_name: String,
    max_age: Duration,
    secure: bool,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("cookie_name", &self.cookie_name)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(
        secret: &[u8],
        cookie_name: &str,
        max_age: Duration,
        secure: bool,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret).map_err(|_| SessionError::Key)?,
            cookie_name: cookie_name.to_string(),
            max_age,
            secure,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// A fresh logged-in session for `username`, valid for `max_age`.
    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> SessionData {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        SessionData {
            is_logged_in: true,
            username: Some(username.to_string()),
            expires_at: now.timestamp().saturating_add(max_age),
        }
    }

    pub fn seal(&self, data: &SessionData) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(data)?;
        let tag = self.mac(&payload).finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    pub fn unseal(&self, token: &str, now: DateTime<Utc>) -> Result<SessionData, SessionError> {
        let (payload_b64, tag_b64) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| SessionError::Malformed)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| SessionError::Malformed)?;

        self.mac(&payload)
            .verify_slice(&tag)
            .map_err(|_| SessionError::BadSignature)?;

        let data: SessionData = serde_json::from_slice(&payload)?;
        if data.expires_at <= now.timestamp() {
            return Err(SessionError::Expired);
        }
        if !data.is_logged_in {
            return Err(SessionError::LoggedOut);
        }
        Ok(data)
    }

    /// Find and open this site's session cookie in `headers`.
    /// `None` if the request carries no session cookie at all.
    pub fn from_headers(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Option<Result<SessionData, SessionError>> {
        read_cookie(headers, &self.cookie_name).map(|token| self.unseal(token, now))
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn set_cookie(&self, token: &str) -> String {
        self.cookie_header(token, self.max_age.as_secs())
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.cookie_header("", 0)
    }

    fn cookie_header(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn mac(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac
    }
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
