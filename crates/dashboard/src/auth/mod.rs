//! Passcode authentication with a sealed, client-side session marker.
//!
//! There is no server-side session table. A successful login seals the
//! passcode with AES-256-GCM under the process key and stores the result in
//! a cookie. By default the gate only checks that the cookie is present; see
//! [`SessionMode`].

mod cipher;
mod session;

pub use cipher::{CryptoError, SessionCipher, KEY_LEN, NONCE_LEN};
pub use session::{
    session_from_cookie_header, AuthError, Authenticator, SessionMode, SessionToken,
    SESSION_COOKIE, SESSION_MAX_AGE_SECS,
};
