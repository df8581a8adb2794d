//! Session extraction from the `user` cookie.
//!
//! The cookie is issued elsewhere; this adapter only reads it. It carries a
//! JSON user object, either raw or percent-encoded.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use serde_json::json;
use tracing::debug;

use crate::domain::{Error, SessionUser};

/// Name of the cookie holding the caller.
pub const USER_COOKIE: &str = "user";

/// Decode a cookie value into a [`SessionUser`].
///
/// # Errors
/// Returns `401 Unauthorized` with reason `invalid_session_cookie` when the
/// value is neither JSON nor percent-encoded JSON.
///
/// # Examples
/// ```
/// use crm_bff::inbound::http::session::parse_user_cookie;
///
/// let user = parse_user_cookie("%7B%22id%22%3A7%2C%22role%22%3A%22Admin%22%7D")
///     .expect("encoded cookie");
/// assert_eq!(user.id, Some(7));
/// assert!(user.is_admin());
/// ```
pub fn parse_user_cookie(raw: &str) -> Result<SessionUser, Error> {
    if let Ok(user) = serde_json::from_str(raw) {
        return Ok(user);
    }
    urlencoding::decode(raw)
        .ok()
        .and_then(|decoded| serde_json::from_str(&decoded).ok())
        .ok_or_else(|| {
            debug!("user cookie is not a JSON user object");
            Error::unauthorized("invalid session cookie")
                .with_details(json!({ "reason": "invalid_session_cookie" }))
        })
}

fn session_user(req: &HttpRequest) -> Result<SessionUser, Error> {
    let cookie = req.cookie(USER_COOKIE).ok_or_else(|| {
        Error::unauthorized("login required")
            .with_details(json!({ "reason": "missing_session_cookie" }))
    })?;
    parse_user_cookie(cookie.value())
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_user(req))
    }
}
