//! Site configuration module
//!
//! Parses and manages the web server configuration from a YAML file.
//! Secrets can be overridden from the environment so the checked-in file
//! never has to carry them.
//!
//! Uses serde_yaml for parsing - define the struct and serde handles
//! the parsing and type conversion, `validate` handles the rest.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::auth::credentials::is_bcrypt_hash;
use crate::i18n::Locale;

/// Minimum length of the session signing secret, in bytes.
pub const SESSION_SECRET_MIN: usize = 32;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    // ============================================
    // HTTP Listener
    // ============================================
    #[serde(default = "default_http_ip")]
    pub http_ip: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Directory holding `images/` and other static files.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// Honour `X-Forwarded-For` when resolving the client address.
    #[serde(default)]
    pub trust_proxy_headers: bool,

    // ============================================
    // MySQL Database Configuration
    // ============================================
    #[serde(default)]
    pub sql_ip: String,

    #[serde(default = "default_sql_port")]
    pub sql_port: u16,

    #[serde(default)]
    pub sql_id: String,

    #[serde(default)]
    pub sql_pw: String,

    #[serde(default)]
    pub sql_db: String,

    #[serde(default = "default_sql_max_connections")]
    pub sql_max_connections: u32,

    /// Full connection URL; takes precedence over the `sql_*` fields.
    #[serde(default)]
    pub database_url: Option<String>,

    // ============================================
    // Admin Credentials & Session
    // ============================================
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// bcrypt hash of the admin password (see the `hash_password` binary)
    pub admin_password_hash: String,

    /// HMAC key for the session cookie
    pub session_secret: String,

    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    #[serde(default = "default_session_max_age")]
    pub session_max_age_secs: u64,

    /// Mark the session cookie `Secure` (enable behind HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,

    #[serde(default = "default_login_max_failures")]
    pub login_max_failures: u32,

    #[serde(default = "default_login_lockout")]
    pub login_lockout_secs: u64,

    // ============================================
    // Public Site
    // ============================================
    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default = "default_whatsapp_url")]
    pub whatsapp_url: String,

    #[serde(default = "default_facebook_url")]
    pub facebook_url: String,

    #[serde(default = "default_maps_url")]
    pub maps_url: String,
}

// ============================================
// Default value functions
// These are called by serde when a field is missing
// ============================================

fn default_http_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_public_dir() -> String {
    "./public".to_string()
}

fn default_sql_port() -> u16 {
    3306
}

fn default_sql_max_connections() -> u32 {
    5
}

fn default_admin_username() -> String {
    "Holiday Travel Admin".to_string()
}

fn default_session_cookie() -> String {
    "admin_session".to_string()
}

fn default_session_max_age() -> u64 {
    60 * 60 * 24 * 7
}

fn default_login_max_failures() -> u32 {
    5
}

fn default_login_lockout() -> u64 {
    10 * 60
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_whatsapp_url() -> String {
    "https://wa.me/".to_string()
}

fn default_facebook_url() -> String {
    "https://www.facebook.com/profile.php?id=61550335186337".to_string()
}

fn default_maps_url() -> String {
    "https://maps.app.goo.gl/YBV8cWbQfwAKdGcG9?g_st=ic".to_string()
}

impl SiteConfig {
    /// Load configuration from a YAML file, apply environment overrides
    /// and validate.
    ///
    /// # Example
    /// ```no_run
    /// use holiday::config::SiteConfig;
    ///
    /// let config = SiteConfig::from_file("conf/site.yaml")
    ///     .expect("Failed to load config");
    /// println!("Listening on {}", config.bind_addr());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file and apply environment overrides,
    /// without validating.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: SiteConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?;

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides.
    ///
    /// Useful for testing
    pub fn from_str(contents: &str) -> Result<Self> {
        let config: SiteConfig = serde_yaml::from_str(contents)
            .context("Failed to parse YAML")?;

        config.validate()?;

        Ok(config)
    }

    /// Replace secrets with values from `lookup` (normally the process
    /// environment). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SESSION_SECRET") {
            self.session_secret = v;
        }
        if let Some(v) = get("ADMIN_USERNAME") {
            self.admin_username = v;
        }
        if let Some(v) = get("ADMIN_PASSWORD_HASH") {
            self.admin_password_hash = v.trim().to_string();
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database_url = Some(v);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.http_ip.is_empty(), "http_ip cannot be empty");

        let has_url = self.database_url.as_deref().is_some_and(|u| !u.is_empty());
        if !has_url {
            anyhow::ensure!(!self.sql_ip.is_empty(), "sql_ip cannot be empty");
            anyhow::ensure!(!self.sql_id.is_empty(), "sql_id cannot be empty");
            anyhow::ensure!(!self.sql_db.is_empty(), "sql_db cannot be empty");
        }
        anyhow::ensure!(
            self.sql_max_connections > 0,
            "sql_max_connections must be at least 1"
        );

        anyhow::ensure!(
            !self.admin_username.is_empty(),
            "admin_username cannot be empty"
        );
        anyhow::ensure!(
            is_bcrypt_hash(&self.admin_password_hash),
            "admin_password_hash is not a bcrypt hash (generate one with hash_password)"
        );
        anyhow::ensure!(
            self.session_secret.len() >= SESSION_SECRET_MIN,
            "session_secret too short: {} bytes (min {})",
            self.session_secret.len(),
            SESSION_SECRET_MIN
        );
        anyhow::ensure!(
            !self.session_cookie.is_empty()
                && self
                    .session_cookie
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "session_cookie must be a non-empty token of [A-Za-z0-9_-]"
        );
        anyhow::ensure!(
            self.session_max_age_secs > 0,
            "session_max_age_secs must be positive"
        );
        anyhow::ensure!(
            self.login_max_failures > 0,
            "login_max_failures must be at least 1"
        );

        anyhow::ensure!(
            self.default_locale.parse::<Locale>().is_ok(),
            "Unsupported default_locale: {}",
            self.default_locale
        );

        for (key, url) in [
            ("whatsapp_url", &self.whatsapp_url),
            ("facebook_url", &self.facebook_url),
            ("maps_url", &self.maps_url),
        ] {
            anyhow::ensure!(
                url.starts_with("https://") || url.starts_with("http://"),
                "{} must be an http(s) URL",
                key
            );
        }

        Ok(())
    }

    /// `ip:port` for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_ip, self.http_port)
    }

    /// Connection URL for the content database
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "mysql://{}:{}@{}:{}/{}",
                self.sql_id, self.sql_pw, self.sql_ip, self.sql_port, self.sql_db
            ),
        }
    }

    /// Locale served at `/`. Falls back to English if the configured
    /// value was never validated.
    pub fn default_locale(&self) -> Locale {
        self.default_locale.parse().unwrap_or(Locale::En)
    }

    /// Every setting with the length of its value, never the value itself.
    pub fn redacted_summary(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("http_ip", self.http_ip.len()),
            ("public_dir", self.public_dir.len()),
            ("sql_ip", self.sql_ip.len()),
            ("sql_id", self.sql_id.len()),
            ("sql_pw", self.sql_pw.len()),
            ("sql_db", self.sql_db.len()),
            ("database_url", self.database_url.as_deref().map_or(0, str::len)),
            ("admin_username", self.admin_username.len()),
            ("admin_password_hash", self.admin_password_hash.len()),
            ("session_secret", self.session_secret.len()),
            ("session_cookie", self.session_cookie.len()),
            ("default_locale", self.default_locale.len()),
            ("whatsapp_url", self.whatsapp_url.len()),
            ("facebook_url", self.facebook_url.len()),
            ("maps_url", self.maps_url.len()),
        ]
    }
}
