//! Request handlers.

pub mod filing;
pub mod workflows;

use axum::http::HeaderMap;

use store::Actor;

use crate::error::ApiError;

/// Pull the actor identity from the request headers: exactly one of
/// `X-User-Id` or `X-Session-Token`.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let user = header_value(headers, "x-user-id")?;
    let session = header_value(headers, "x-session-token")?;

    match (user, session) {
        (Some(user), None) => Ok(Actor::user(user)),
        (None, Some(session)) => Ok(Actor::session(session)),
        (None, None) => Err(ApiError::BadRequest(
            "missing actor identity: set X-User-Id or X-Session-Token".to_owned(),
        )),
        (Some(_), Some(_)) => Err(ApiError::BadRequest(
            "ambiguous actor identity: set only one of X-User-Id or X-Session-Token".to_owned(),
        )),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| ApiError::BadRequest(format!("header {name} is not valid UTF-8")))?;
            if value.is_empty() {
                Ok(None)
            } else {
                Ok(Some(value.to_owned()))
            }
        }
    }
}
