//! Passcode login and session gate.

use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, warn};

use super::cipher::{CryptoError, SessionCipher};

/// Cookie carrying the session marker.
pub const SESSION_COOKIE: &str = "session";

/// Cookie lifetime (30 days).
pub const SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Errors from [`Authenticator::login`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Submitted passcode did not match.
    #[error("Invalid passcode")]
    Unauthorized,

    /// The marker could not be sealed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// How [`Authenticator::authorize`] treats a presented cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Any non-empty session cookie is accepted. The sealed value is never
    /// re-checked, so a forged cookie passes.
    #[default]
    PresenceOnly,
    /// The cookie must open under the key and contain the passcode.
    Verify,
}

/// Sealed proof of a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Set-Cookie` header value for this token.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECS}",
            self.0
        )
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<sealed>)")
    }
}

/// Validates passcodes and gates page access.
#[derive(Debug, Clone)]
pub struct Authenticator {
    passcode: String,
    cipher: SessionCipher,
    mode: SessionMode,
}

impl Authenticator {
    #[must_use]
    pub fn new(passcode: impl Into<String>, cipher: SessionCipher, mode: SessionMode) -> Self {
        Self {
            passcode: passcode.into(),
            cipher,
            mode,
        }
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Check `submitted` against the configured passcode and seal a marker.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthorized`] on mismatch, [`AuthError::Crypto`] if
    /// sealing fails.
    pub fn login(&self, submitted: &str) -> Result<SessionToken, AuthError> {
        let matches: bool = submitted
            .as_bytes()
            .ct_eq(self.passcode.as_bytes())
            .into();
        if !matches {
            warn!("Rejected login with invalid passcode");
            return Err(AuthError::Unauthorized);
        }

        let sealed = self.cipher.seal(submitted)?;
        debug!("Issued session marker");
        Ok(SessionToken(sealed))
    }

    /// Whether a request carrying `cookie_value` may see the dashboard.
    #[must_use]
    pub fn authorize(&self, cookie_value: Option<&str>) -> bool {
        let Some(value) = cookie_value.filter(|v| !v.is_empty()) else {
            return false;
        };

        match self.mode {
            SessionMode::PresenceOnly => true,
            SessionMode::Verify => match self.cipher.open(value) {
                Ok(plain) => bool::from(plain.as_bytes().ct_eq(self.passcode.as_bytes())),
                Err(e) => {
                    debug!(error = %e, "Session marker failed verification");
                    false
                }
            },
        }
    }
}

/// Find the session cookie value in a `Cookie` request header.
#[must_use]
pub fn session_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}
