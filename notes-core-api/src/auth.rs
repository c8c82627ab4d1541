//! Magic-link authentication.
//!
//! A single shared secret unlocks the backend. The secret is handed out as a
//! login link; the client then presents it either through the session cookie
//! or the secret header on every request.

use rand::{distributions::Alphanumeric, Rng};

use crate::error::{ApiError, ApiResult};

/// Name of the cookie carrying the secret.
pub const SECRET_COOKIE: &str = "secret";

/// Name of the header carrying the secret.
pub const SECRET_HEADER: &str = "x-secret";

const GENERATED_SECRET_LEN: usize = 48;

/// Authentication outcome stored in the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Authenticated(pub bool);

/// The configured login secret.
///
/// The plaintext is kept to build the login link; presented credentials are
/// compared against its blake3 digest. `Debug` never prints either.
#[derive(Clone)]
pub struct SecretLink {
    secret: String,
    digest: blake3::Hash,
}

impl SecretLink {
    pub fn new(secret: impl Into<String>) -> ApiResult<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ApiError::ValidationError("secret must not be empty".to_string()));
        }
        let digest = blake3::hash(secret.as_bytes());
        Ok(Self { secret, digest })
    }

    /// Mint a fresh random secret.
    pub fn generate() -> Self {
        let secret: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_SECRET_LEN)
            .map(char::from)
            .collect();
        let digest = blake3::hash(secret.as_bytes());
        Self { secret, digest }
    }

    /// Login link that sets the session cookie when followed.
    pub fn login_url(&self, base_url: &str) -> String {
        format!("{}/login?secret={}", base_url.trim_end_matches('/'), self.secret)
    }

    /// Check a presented secret. Comparison is done on digests, which
    /// compare in constant time.
    pub fn verify(&self, presented: &str) -> bool {
        blake3::hash(presented.as_bytes()) == self.digest
    }

    /// Authenticate a request from its cookie and header values. Either one
    /// carrying the right secret is enough.
    pub fn authenticate(&self, cookie: Option<&str>, header: Option<&str>) -> Authenticated {
        let ok = [cookie, header]
            .into_iter()
            .flatten()
            .any(|presented| self.verify(presented));
        if !ok && (cookie.is_some() || header.is_some()) {
            tracing::debug!("rejected request with invalid secret");
        }
        Authenticated(ok)
    }
}

impl std::fmt::Debug for SecretLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretLink").field("secret", &"***").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert!(SecretLink::new("  ").is_err());
    }

    #[test]
    fn test_authenticate_by_cookie_or_header() {
        let link = SecretLink::new("open-sesame").unwrap();

        assert_eq!(link.authenticate(Some("open-sesame"), None), Authenticated(true));
        assert_eq!(link.authenticate(None, Some("open-sesame")), Authenticated(true));
        assert_eq!(link.authenticate(Some("wrong"), Some("open-sesame")), Authenticated(true));
        assert_eq!(link.authenticate(Some("wrong"), None), Authenticated(false));
        assert_eq!(link.authenticate(None, None), Authenticated(false));
    }

    #[test]
    fn test_generated_secret_round_trips_through_login_url() {
        let link = SecretLink::generate();
        let url = link.login_url("https://notes.local/");
        let presented = url.rsplit("secret=").next().unwrap();

        assert!(url.starts_with("https://notes.local/login?secret="));
        assert_eq!(presented.len(), GENERATED_SECRET_LEN);
        assert!(link.verify(presented));
    }

    #[test]
    fn test_debug_hides_secret() {
        let link = SecretLink::new("open-sesame").unwrap();
        assert!(!format!("{link:?}").contains("open-sesame"));
    }
}
