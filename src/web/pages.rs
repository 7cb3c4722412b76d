//! Public pages and local authentication routes
//!
//! - GET  /          landing page
//! - GET  /login     login form (renders queued flash)
//! - POST /login     credential check, session on success
//! - GET  /register  registration form
//! - POST /register  create account, session on success
//! - GET  /logout    clear session

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::{flash, views};
use crate::auth::{
    establish_session, hash_password, removal_session_cookie, verify_credentials, MaybeUser,
};
use crate::error::AppError;
use crate::AppState;

pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_form).post(login))
        .route("/register", get(register_form).post(register))
        .route("/logout", get(logout))
}

/// Form body for both /login and /register; the source app calls the
/// email field `username`.
#[derive(Debug, Deserialize)]
struct CredentialsForm {
    username: String,
    password: String,
}

/// GET /
async fn home(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(views::home_page(user.as_ref()))
}

/// GET /login
async fn login_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash_message) = flash::take_flash(jar);
    (jar, Html(views::login_page(flash_message.as_deref())))
}

/// POST /login
///
/// Delegates to the credential verifier. Refusals queue a flash and
/// bounce back to the form; only store failures become 500s.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match verify_credentials(&state.db, &form.username, &form.password).await? {
        Ok(user) => {
            let cookie = establish_session(&state.config, user.id)?;
            tracing::info!(user_id = user.id, "User logged in");
            Ok((jar.add(cookie), Redirect::to("/secrets")).into_response())
        }
        Err(failure) => {
            tracing::debug!(email = %form.username, %failure, "Login refused");
            let jar = jar.add(flash::flash_cookie(&failure.to_string()));
            Ok((jar, Redirect::to("/login")).into_response())
        }
    }
}

/// GET /register
async fn register_form() -> Html<String> {
    Html(views::register_page(None))
}

const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered. Choose another email.";

/// POST /register
///
/// The existence check keeps the common case friendly; the unique index
/// on email catches the race where two registrations slip past it, and
/// both paths render the same inline message.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    if state.db.find_user_by_email(&form.username).await?.is_some() {
        return Ok(Html(views::register_page(Some(DUPLICATE_EMAIL_MESSAGE))).into_response());
    }

    let password_hash = hash_password(&form.password, state.config.auth.bcrypt_cost)?;

    match state.db.insert_user(&form.username, &password_hash).await {
        Ok(user) => {
            let cookie = establish_session(&state.config, user.id)?;
            tracing::info!(user_id = user.id, "User registered");
            Ok((jar.add(cookie), Redirect::to("/secrets")).into_response())
        }
        Err(AppError::DuplicateEmail) => {
            Ok(Html(views::register_page(Some(DUPLICATE_EMAIL_MESSAGE))).into_response())
        }
        Err(error) => Err(error),
    }
}

/// GET /logout
///
/// Clears the session cookie and redirects home unconditionally.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(removal_session_cookie()), Redirect::to("/"))
}
