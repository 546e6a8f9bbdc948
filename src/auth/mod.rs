pub mod credentials;
pub mod session;
pub mod throttle;

use std::net::IpAddr;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use chrono::Utc;

use crate::config::SiteConfig;
use session::{SessionData, SessionError, SessionKeys};
use throttle::LoginThrottle;

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Too many failed attempts, try again later")]
    LockedOut,
    #[error("Could not create session: {0}")]
    Session(#[from] SessionError),
}

/// The single admin account: credentials, session sealing and the
/// failed-login throttle.
#[derive(Debug)]
pub struct AdminAuth {
    username: String,
    password_hash: String,
    sessions: SessionKeys,
    throttle: LoginThrottle,
}

impl AdminAuth {
    pub fn from_config(config: &SiteConfig) -> Result<Self, SessionError> {
        Ok(Self {
            username: config.admin_username.clone(),
            password_hash: config.admin_password_hash.clone(),
            sessions: SessionKeys::new(
                config.session_secret.as_bytes(),
                &config.session_cookie,
                Duration::from_secs(config.session_max_age_secs),
                config.secure_cookies,
            )?,
            throttle: LoginThrottle::new(
                config.login_max_failures,
                Duration::from_secs(config.login_lockout_secs),
            ),
        })
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    /// Check credentials for a login from `ip`. On success returns the
    /// sealed cookie token ready for [`SessionKeys::set_cookie`].
    pub async fn login(
        &self,
        ip: IpAddr,
        username: &str,
        password: &str,
    ) -> Result<String, LoginError> {
        if self.throttle.is_locked(ip, Instant::now()) {
            tracing::warn!("[auth] [login_locked] ip={}", ip);
            return Err(LoginError::LockedOut);
        }

        // bcrypt is deliberately slow; keep it off the async workers
        let expected_user = self.username.clone();
        let hash = self.password_hash.clone();
        let user = username.to_string();
        let pass = password.to_string();
        let matched = tokio::task::spawn_blocking(move || {
            credentials::verify_credentials(&expected_user, &hash, &user, &pass)
        })
        .await
        .unwrap_or_else(|e| {
            tracing::error!("[auth] [verify_panicked] {}", e);
            false
        });

        if !matched {
            self.throttle.record_failure(ip, Instant::now());
            tracing::info!("[auth] [login_failed] ip={} user={}", ip, username);
            return Err(LoginError::InvalidCredentials);
        }

        self.throttle.clear(ip);
        let session = self.sessions.issue(username, Utc::now());
        let token = self.sessions.seal(&session)?;
        tracing::info!("[auth] [login] ip={} user={}", ip, username);
        Ok(token)
    }

    /// The logged-in session carried by `headers`, if any. Cookies that
    /// fail to open are logged and treated as absent.
    pub fn session(&self, headers: &HeaderMap) -> Option<SessionData> {
        match self.sessions.from_headers(headers, Utc::now())? {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("[auth] [session_rejected] {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;
    use std::net::Ipv4Addr;

    fn auth(max_failures: u32) -> AdminAuth {
        let hash = bcrypt::hash("Ala2019a", 4).unwrap();
        let yaml = format!(
            r#"
sql_ip: "127.0.0.1"
sql_id: "user"
sql_db: "travel"
admin_password_hash: "{hash}"
session_secret: "0123456789abcdef0123456789abcdef"
login_max_failures: {max_failures}
"#
        );
        AdminAuth::from_config(&SiteConfig::from_str(&yaml).unwrap()).unwrap()
    }

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_login_issues_openable_cookie() {
        let auth = auth(5);
        let token = auth.login(IP, "Holiday Travel Admin", "Ala2019a").await.unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("admin_session={token}")).unwrap(),
        );
        let session = auth.session(&headers).unwrap();
        assert!(session.is_logged_in);
        assert_eq!(session.username.as_deref(), Some("Holiday Travel Admin"));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let auth = auth(5);
        let err = auth.login(IP, "Holiday Travel Admin", "nope").await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_lockout_blocks_correct_password() {
        let auth = auth(2);
        for _ in 0..2 {
            let _ = auth.login(IP, "Holiday Travel Admin", "nope").await;
        }
        let err = auth
            .login(IP, "Holiday Travel Admin", "Ala2019a")
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::LockedOut));
    }

    #[test]
    fn test_forged_cookie_ignored() {
        let auth = auth(5);
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("admin_session=e30.AAAA"));
        assert!(auth.session(&headers).is_none());
    }
}
