//! Authentication extractors
//!
//! The current user is a request-scoped value resolved from the session
//! cookie: verify the signed token, then re-fetch the user from the
//! store. Stale or missing sessions degrade to anonymous.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::session::{verify_session_token, SESSION_COOKIE};
use crate::data::User;
use crate::error::AppError;
use crate::web::flash;
use crate::AppState;

/// Flash message queued when a protected page is hit without a session.
pub const LOGIN_REQUIRED_FLASH: &str = "Please log in to view secrets";

/// Redirect an unauthenticated request to the login page.
///
/// Whether a flash message is queued is an explicit choice at the call
/// site; every protected route currently opts in.
pub fn login_redirect(flash_message: Option<&str>) -> Response {
    match flash_message {
        Some(message) => {
            let jar = CookieJar::new().add(flash::flash_cookie(message));
            (jar, Redirect::to("/login")).into_response()
        }
        None => Redirect::to("/login").into_response(),
    }
}

async fn resolve_session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let Some(session) = verify_session_token(cookie.value(), &state.config.auth.session_secret)
    else {
        return Ok(None);
    };

    // A session for a user that no longer exists is anonymous, not an error
    state.db.find_user_by_id(session.user_id).await
}

/// Rejection for [`CurrentUser`]
///
/// Unauthenticated requests bounce to the login page with a flash
/// message; store failures keep their 500 semantics.
#[derive(Debug)]
pub enum SessionRejection {
    Unauthenticated,
    Store(AppError),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => login_redirect(Some(LOGIN_REQUIRED_FLASH)),
            Self::Store(error) => error.into_response(),
        }
    }
}

/// Extractor for the current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        match resolve_session_user(parts, &app_state).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(SessionRejection::Unauthenticated),
            Err(error) => Err(SessionRejection::Store(error)),
        }
    }
}

/// Optional current user extractor
///
/// Returns None if not authenticated, instead of redirecting. Store
/// failures during lookup are logged and treated as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user = match resolve_session_user(parts, &app_state).await {
            Ok(user) => user,
            Err(error) => {
                tracing::warn!(%error, "Failed to resolve session user; treating as anonymous");
                None
            }
        };

        Ok(MaybeUser(user))
    }
}
