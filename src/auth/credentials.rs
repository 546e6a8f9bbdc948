/// bcrypt cost used for new admin password hashes.
pub const HASH_COST: u32 = 10;

/// Hash `password` for the `admin_password_hash` setting.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// True if `s` has the shape of a bcrypt hash: `$2a$`, `$2b$` or `$2y$`,
/// a two-digit cost, then 53 characters of bcrypt base64.
pub fn is_bcrypt_hash(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 60 {
        return false;
    }
    if !(s.starts_with("$2a$") || s.starts_with("$2b$") || s.starts_with("$2y$")) {
        return false;
    }
    if !bytes[4].is_ascii_digit() || !bytes[5].is_ascii_digit() || bytes[6] != b'$' {
        return false;
    }
    bytes[7..]
        .iter()
        .all(|&c| c.is_ascii_alphanumeric() || c == b'.' || c == b'/')
}

/// Check a login attempt against the configured admin account.
///
/// The username must match exactly; only then is the password run through
/// bcrypt. A hash bcrypt can't parse counts as a failed login.
pub fn verify_credentials(
    expected_username: &str,
    password_hash: &str,
    username: &str,
    password: &str,
) -> bool {
    if username != expected_username {
        tracing::debug!("[auth] [username_mismatch]");
        return false;
    }

    match bcrypt::verify(password, password_hash) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::error!("[auth] [bad_hash] admin_password_hash unusable: {}", e);
            false
        }
    }
}
